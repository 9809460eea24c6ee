use anyhow::{Context, Result, bail};
use mdblock_config::Config;
use mdblock_engine::{BlockEditor, Dom, EditorConfig, MarkdownRenderer, MemoryDom};
use std::{
    env, fs,
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
    process,
};

type Editor = BlockEditor<MemoryDom, MarkdownRenderer>;

/// One line of an editing script.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Click { index: usize, at: Option<(f64, f64)> },
    Outside,
    Blur,
    Type(String),
    Edit(usize),
    Save,
    Blocks,
    Html,
    Show,
    Write,
}

fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim_start();
    if line.trim().is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = line.split_once(' ').unwrap_or((line.trim_end(), ""));
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match word {
        "click" => {
            let index = parse_index(args.first().copied())?;
            let at = match args.get(1..3) {
                Some([x, y]) => Some((
                    x.parse::<f64>().with_context(|| format!("invalid x offset '{x}'"))?,
                    y.parse::<f64>().with_context(|| format!("invalid y offset '{y}'"))?,
                )),
                _ => None,
            };
            Command::Click { index, at }
        }
        "edit" => Command::Edit(parse_index(args.first().copied())?),
        "type" => Command::Type(unescape(rest)),
        "outside" => Command::Outside,
        "blur" => Command::Blur,
        "save" => Command::Save,
        "blocks" => Command::Blocks,
        "html" => Command::Html,
        "show" => Command::Show,
        "write" => Command::Write,
        other => bail!("unknown command '{other}'"),
    };
    Ok(Some(command))
}

fn parse_index(arg: Option<&str>) -> Result<usize> {
    let arg = arg.context("missing block index")?;
    arg.parse::<usize>()
        .with_context(|| format!("invalid block index '{arg}'"))
}

/// Expand `\n`, `\t` and `\\` so multi-line edits fit on one script line.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn apply(editor: &mut Editor, command: Command, path: &Path, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Click { index, at: None } => editor.click_block(index)?,
        Command::Click {
            index,
            at: Some((x, y)),
        } => {
            let element = editor
                .dom()
                .children(editor.container())
                .get(index)
                .copied()
                .with_context(|| format!("no block at index {index}"))?;
            editor.click(element, x, y)?;
        }
        Command::Outside => editor.click_outside()?,
        Command::Blur => editor.blur()?,
        Command::Type(text) => {
            if !editor.type_text(&text) {
                log::warn!("No active block to type into");
            }
        }
        Command::Edit(index) => editor.enable_editing(index)?,
        Command::Save => editor.save()?,
        Command::Blocks => {
            for (index, block) in editor.blocks().iter().enumerate() {
                let marker = if editor.active() == Some(index) { '*' } else { ' ' };
                writeln!(out, "{marker}{index}: {block:?}")?;
            }
        }
        Command::Html => writeln!(out, "{}", editor.dom().inner_html(editor.container()))?,
        Command::Show => writeln!(out, "{}", editor.markdown())?,
        Command::Write => {
            fs::write(path, format!("{}\n", editor.markdown()))
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
    }
    Ok(())
}

/// Run every command in `script`, then save and return the final markdown.
fn run_script(
    mut editor: Editor,
    script: impl BufRead,
    path: &Path,
    out: &mut impl Write,
) -> Result<String> {
    for (number, line) in script.lines().enumerate() {
        let line = line.context("failed to read script")?;
        let Some(command) =
            parse_command(&line).with_context(|| format!("script line {}", number + 1))?
        else {
            continue;
        };
        log::debug!("Applying {command:?}");
        apply(&mut editor, command, path, out)
            .with_context(|| format!("script line {}", number + 1))?;
    }

    editor.save()?;
    let markdown = editor.markdown();
    editor.cleanup(true)?;
    Ok(markdown)
}

fn open_editor(markdown: String, config: &Config) -> Result<Editor> {
    let dom = MemoryDom::new();
    let body = dom.body();
    let editor_config = EditorConfig::new(body)
        .with_render(MarkdownRenderer::new(config.renderer.clone()))
        .with_settings(config.editor.clone())
        .with_markdown(markdown);
    Ok(BlockEditor::new(dom, editor_config)?)
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <file.md> [script]", args[0]);
        eprintln!("Commands are read from the script file, or stdin when omitted.");
        process::exit(1);
    }

    let path = PathBuf::from(&args[1]);
    let markdown =
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;

    let config = Config::load_or_default()?;
    log::info!("Config path: {}", Config::config_path().display());

    let editor = open_editor(markdown, &config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let markdown = match args.get(2) {
        Some(script_path) => {
            let file = fs::File::open(script_path)
                .with_context(|| format!("failed to open script {script_path}"))?;
            run_script(editor, BufReader::new(file), &path, &mut out)?
        }
        None => run_script(editor, io::stdin().lock(), &path, &mut out)?,
    };

    writeln!(out, "{markdown}")?;
    Ok(())
}

/// Info unless the environment's filter says otherwise.
fn logger(env: env_logger::Env) -> env_logger::Builder {
    env_logger::Builder::from_env(env.default_filter_or("info"))
}

fn main() {
    logger(env_logger::Env::default()).init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
