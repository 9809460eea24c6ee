use pulldown_cmark::{Options, Parser, html};
use serde::{Deserialize, Serialize};

/// Turns markdown source into an HTML string.
///
/// For a whole document the output must contain one top-level element per
/// blank-line-delimited block; for any non-blank single block it must
/// contain at least one element. Any `Fn(&str) -> String` is a renderer.
pub trait Render {
    fn render(&self, markdown: &str) -> String;
}

impl<F> Render for F
where
    F: Fn(&str) -> String,
{
    fn render(&self, markdown: &str) -> String {
        self(markdown)
    }
}

/// CommonMark extensions enabled on the default renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    pub tables: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub footnotes: bool,
    pub smart_punctuation: bool,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            tasklists: true,
            footnotes: false,
            smart_punctuation: false,
        }
    }
}

impl RendererSettings {
    fn options(&self) -> Options {
        let mut options = Options::empty();
        options.set(Options::ENABLE_TABLES, self.tables);
        options.set(Options::ENABLE_STRIKETHROUGH, self.strikethrough);
        options.set(Options::ENABLE_TASKLISTS, self.tasklists);
        options.set(Options::ENABLE_FOOTNOTES, self.footnotes);
        options.set(Options::ENABLE_SMART_PUNCTUATION, self.smart_punctuation);
        options
    }
}

/// Default renderer backed by pulldown-cmark.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    settings: RendererSettings,
}

impl MarkdownRenderer {
    pub fn new(settings: RendererSettings) -> Self {
        Self { settings }
    }
}

impl Render for MarkdownRenderer {
    fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.settings.options());
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}
