//! Block splitting shared by document load and save expansion.
//!
//! A block is a run of non-blank lines. One or more blank (empty or
//! whitespace-only) lines separate blocks. Each block is trimmed, and the
//! line endings inside it are kept exactly as they appeared in the source.

use std::ops::Range;

/// Separator placed between blocks when the document is reassembled.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Returns true for empty or whitespace-only text.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Split markdown into trimmed, non-blank blocks on blank-line boundaries.
pub fn split_blocks(markdown: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<Range<usize>> = None;
    let mut offset = 0usize;

    for line in markdown.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        if is_blank(line) {
            if let Some(range) = current.take() {
                push_block(&mut blocks, &markdown[range]);
            }
            continue;
        }

        match current.as_mut() {
            Some(range) => range.end = offset,
            None => current = Some(start..offset),
        }
    }

    if let Some(range) = current {
        push_block(&mut blocks, &markdown[range]);
    }

    blocks
}

/// Join blocks back into a document with a blank line between entries.
pub fn join_blocks<S: AsRef<str>>(blocks: &[S]) -> String {
    let mut out = String::new();
    for block in blocks {
        if !out.is_empty() {
            out.push_str(BLOCK_SEPARATOR);
        }
        out.push_str(block.as_ref());
    }
    out
}

fn push_block(blocks: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        blocks.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("", true)]
    #[case("   ", true)]
    #[case("\n\t \n", true)]
    #[case("a", false)]
    #[case("  x  ", false)]
    fn test_is_blank(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_blank(input), expected);
    }

    #[rstest]
    #[case::single("Hello", &["Hello"])]
    #[case::two_paragraphs("Hello\n\nWorld", &["Hello", "World"])]
    #[case::many_blank_lines("a\n\n\n\nb", &["a", "b"])]
    #[case::whitespace_only_separator("a\n   \n\t\nb", &["a", "b"])]
    #[case::leading_and_trailing_blank("\n\n  a  \n\n", &["a"])]
    #[case::multi_line_block("# Title\nstill title?\n\nbody", &["# Title\nstill title?", "body"])]
    #[case::empty("", &[])]
    #[case::only_whitespace(" \n \n", &[])]
    fn test_split_blocks(#[case] input: &str, #[case] expected: &[&str]) {
        assert_eq!(split_blocks(input), expected);
    }

    #[test]
    fn test_split_preserves_inner_line_endings() {
        let blocks = split_blocks("line 1\r\nline 2\r\n\r\nnext");

        assert_eq!(blocks, vec!["line 1\r\nline 2", "next"]);
    }

    #[test]
    fn test_split_keeps_indentation_inside_block() {
        let blocks = split_blocks("```\nfn main() {\n    body();\n}\n```");

        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].contains("\n    body();\n"));
    }

    #[test]
    fn test_join_blocks() {
        assert_eq!(join_blocks(&["a", "b", "c"]), "a\n\nb\n\nc");
        assert_eq!(join_blocks(&["only"]), "only");
        assert_eq!(join_blocks::<&str>(&[]), "");
    }

    #[test]
    fn test_split_then_join_normalizes_document() {
        let input = "  # Heading  \n\n\n\nParagraph one\ncontinues\n \nParagraph two\n";

        let joined = join_blocks(&split_blocks(input));

        assert_eq!(
            joined,
            "# Heading\n\nParagraph one\ncontinues\n\nParagraph two"
        );
        // Normalised documents are a fixed point
        assert_eq!(join_blocks(&split_blocks(&joined)), joined);
    }
}
