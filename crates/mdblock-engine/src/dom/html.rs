//! Tokenizer for the HTML produced by markdown renderers.
//!
//! This is not a conforming HTML parser. It handles what renderer output
//! contains: elements with attributes, void and self-closing tags, comments
//! and doctypes (skipped), and character references in text.

use regex::Regex;
use std::sync::LazyLock;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<![^>]*>|</\s*([A-Za-z][A-Za-z0-9-]*)\s*>|<([A-Za-z][A-Za-z0-9-]*)((?:\s+[^\s/>"'=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*(/?)>"#,
    )
    .expect("token pattern is valid")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s/>"'=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("attribute pattern is valid")
});

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Open {
        tag: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close(String),
    Text(String),
}

/// Elements that never have content or a closing tag.
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub fn tokenize(html: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut last = 0usize;

    for caps in TOKEN_RE.captures_iter(html) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_text(&mut tokens, &html[last..whole.start()]);
        last = whole.end();

        if let Some(close) = caps.get(1) {
            tokens.push(Token::Close(close.as_str().to_ascii_lowercase()));
        } else if let Some(open) = caps.get(2) {
            let attrs = caps.get(3).map(|m| parse_attrs(m.as_str())).unwrap_or_default();
            let self_closing = caps.get(4).is_some_and(|m| !m.as_str().is_empty());
            tokens.push(Token::Open {
                tag: open.as_str().to_ascii_lowercase(),
                attrs,
                self_closing,
            });
        }
        // comments and doctypes fall through
    }
    push_text(&mut tokens, &html[last..]);

    tokens
}

fn push_text(tokens: &mut Vec<Token>, raw: &str) {
    if raw.is_empty() {
        return;
    }
    tokens.push(Token::Text(
        html_escape::decode_html_entities(raw).into_owned(),
    ));
}

fn parse_attrs(raw: &str) -> Vec<(String, String)> {
    ATTR_RE
        .captures_iter(raw)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| html_escape::decode_html_entities(m.as_str()).into_owned())
                .unwrap_or_default();
            Some((name, value))
        })
        .collect()
}
