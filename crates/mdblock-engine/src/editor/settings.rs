use serde::{Deserialize, Serialize};

use crate::render::{MarkdownRenderer, Render};

/// Behaviour switches for a [`crate::BlockEditor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Class put on the container while the editor is attached.
    pub class_name: String,
    /// Commit the active block when its element loses focus.
    pub save_on_focus_out: bool,
    /// Element created for a block inserted by a padding click.
    pub new_block_tag: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            class_name: "mdblock".to_string(),
            save_on_focus_out: true,
            new_block_tag: "p".to_string(),
        }
    }
}

/// Construction parameters for a [`crate::BlockEditor`].
pub struct EditorConfig<N, R = MarkdownRenderer> {
    /// Element, shadow root, or document whose children are the blocks.
    pub target: N,
    /// Initial document. Without it the editor stays empty until `init`.
    pub markdown: Option<String>,
    pub render: R,
    /// Clicks reaching this node save the active block. Defaults to the
    /// document.
    pub click_outside: Option<N>,
    pub settings: EditorSettings,
}

impl<N> EditorConfig<N, MarkdownRenderer> {
    pub fn new(target: N) -> Self {
        Self {
            target,
            markdown: None,
            render: MarkdownRenderer::default(),
            click_outside: None,
            settings: EditorSettings::default(),
        }
    }
}

impl<N, R: Render> EditorConfig<N, R> {
    pub fn with_markdown(mut self, markdown: impl Into<String>) -> Self {
        self.markdown = Some(markdown.into());
        self
    }

    pub fn with_render<R2: Render>(self, render: R2) -> EditorConfig<N, R2> {
        EditorConfig {
            target: self.target,
            markdown: self.markdown,
            render,
            click_outside: self.click_outside,
            settings: self.settings,
        }
    }

    pub fn with_click_outside(mut self, node: N) -> Self {
        self.click_outside = Some(node);
        self
    }

    pub fn with_settings(mut self, settings: EditorSettings) -> Self {
        self.settings = settings;
        self
    }
}
