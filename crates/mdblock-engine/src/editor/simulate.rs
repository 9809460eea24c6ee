//! Browser-style event dispatch for editors over a [`MemoryDom`].

use super::{BlockEditor, ClickEvent, Result};
use crate::dom::memory::{MemoryDom, NodeId};
use crate::dom::{Dom, Listener};
use crate::render::Render;

impl<R: Render> BlockEditor<MemoryDom, R> {
    /// Click `target` at an offset relative to its owning block.
    ///
    /// Focus leaves the edited element first (firing its focus-out listener)
    /// unless the click lands inside it, then the click bubbles through the
    /// listeners on the way to the document.
    pub fn click(&mut self, target: NodeId, offset_x: f64, offset_y: f64) -> Result<()> {
        if let Some(focused) = self.dom.focused()
            && !self.dom.contains(focused, target)
        {
            self.blur()?;
        }

        for (_, listener) in self.dom.dispatch_click(target) {
            match listener {
                Listener::BlockClick => {
                    self.handle_click(ClickEvent::new(target, offset_x, offset_y))?
                }
                Listener::OutsideClick => self.handle_outside_click()?,
                Listener::StopPropagation | Listener::FocusOut => {}
            }
        }
        Ok(())
    }

    /// Click the centre of the block at `index`.
    pub fn click_block(&mut self, index: usize) -> Result<()> {
        let (element, layout) = self.block_geometry(index)?;
        self.click(element, layout.width / 2.0, layout.height / 2.0)
    }

    /// Click the top-left corner of the block at `index`, inside its padding.
    pub fn click_block_padding(&mut self, index: usize) -> Result<()> {
        let (element, _) = self.block_geometry(index)?;
        self.click(element, 0.0, 0.0)
    }

    /// Click the document outside every block.
    pub fn click_outside(&mut self) -> Result<()> {
        let document = self.dom.document();
        self.click(document, 0.0, 0.0)
    }

    /// Move focus away from whatever has it.
    pub fn blur(&mut self) -> Result<()> {
        if let Some(node) = self.dom.blur()
            && self.dom.has_listener(node, Listener::FocusOut)
        {
            self.handle_focus_out()?;
        }
        Ok(())
    }

    /// Replace the active element's text, as typing would. Returns false
    /// when no block is being edited.
    pub fn type_text(&mut self, text: &str) -> bool {
        let Some(element) = self.active_element() else {
            return false;
        };
        self.dom.set_text_content(element, text);
        true
    }

    fn block_geometry(&self, index: usize) -> Result<(NodeId, crate::dom::LayoutBox)> {
        let children = self.dom.children(self.container);
        let element = *children
            .get(index)
            .ok_or(super::EditorError::IndexOutOfRange {
                index,
                len: children.len(),
            })?;
        Ok((element, self.dom.layout_box(element)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EditorConfig;
    use crate::dom::{LayoutBox, Padding};
    use pretty_assertions::assert_eq;

    fn editor(markdown: &str) -> BlockEditor<MemoryDom> {
        let dom = MemoryDom::new();
        let body = dom.body();
        BlockEditor::new(dom, EditorConfig::new(body).with_markdown(markdown)).unwrap()
    }

    #[test]
    fn test_click_content_enters_edit_mode() {
        let mut editor = editor("a\n\nb");

        editor.click_block(1).unwrap();

        assert_eq!(editor.active(), Some(1));
        assert_eq!(editor.blocks(), ["a", "b"]);
    }

    #[test]
    fn test_click_nested_node_resolves_owning_block() {
        let mut editor = editor("plain\n\nsome **bold** text");
        let paragraph = editor.dom().children(editor.container())[1];
        let strong = editor.dom().children(paragraph)[0];

        editor.click(strong, 100.0, 20.0).unwrap();

        assert_eq!(editor.active(), Some(1));
    }

    #[test]
    fn test_click_inside_active_block_keeps_editing() {
        let mut editor = editor("a\n\nb");
        editor.click_block(0).unwrap();
        editor.type_text("a edited");

        editor.click_block(0).unwrap();

        assert_eq!(editor.active(), Some(0));
        assert_eq!(editor.blocks(), ["a", "b"]);
    }

    #[test]
    fn test_click_padding_inserts_block_after() {
        let mut editor = editor("a\n\nb");

        editor.click_block_padding(0).unwrap();

        assert_eq!(editor.active(), Some(1));
        assert_eq!(editor.blocks(), ["a", "", "b"]);
        let inserted = editor.active_element().unwrap();
        assert_eq!(editor.dom().tag(inserted), Some("p"));
        assert_eq!(editor.dom().text_content(inserted), "");
    }

    #[test]
    fn test_padding_follows_layout_override() {
        let mut editor = editor("a");
        let element = editor.dom().children(editor.container())[0];
        editor
            .dom_mut()
            .set_layout(element, LayoutBox::new(200.0, 30.0, Padding::uniform(0.0)));

        editor.click(element, 1.0, 1.0).unwrap();

        assert_eq!(editor.active(), Some(0));
        assert_eq!(editor.blocks().len(), 1);
    }

    #[test]
    fn test_click_outside_saves() {
        let mut editor = editor("a\n\nb");
        editor.click_block(1).unwrap();
        editor.type_text("b\n\nc");

        editor.click_outside().unwrap();

        assert_eq!(editor.active(), None);
        assert_eq!(editor.blocks(), ["a", "b", "c"]);
    }

    #[test]
    fn test_blur_saves_when_enabled() {
        let mut editor = editor("a");
        editor.click_block(0).unwrap();
        editor.type_text("z");

        editor.blur().unwrap();

        assert_eq!(editor.active(), None);
        assert_eq!(editor.markdown(), "z");
    }

    #[test]
    fn test_blur_ignored_when_disabled() {
        let dom = MemoryDom::new();
        let body = dom.body();
        let settings = crate::EditorSettings {
            save_on_focus_out: false,
            ..Default::default()
        };
        let mut editor = BlockEditor::new(
            dom,
            EditorConfig::new(body)
                .with_markdown("a")
                .with_settings(settings),
        )
        .unwrap();
        editor.click_block(0).unwrap();

        editor.blur().unwrap();

        assert_eq!(editor.active(), Some(0));
    }

    #[test]
    fn test_type_text_without_active_block() {
        let mut editor = editor("a");

        assert!(!editor.type_text("nope"));
        assert_eq!(editor.markdown(), "a");
    }
}
