/*!
 * # Block Editor
 *
 * Keeps a flat list of markdown source blocks index-aligned with the
 * element children of a container, and lets one block at a time switch
 * from its rendered form to raw editable source.
 *
 * ## Model
 *
 * - **Blocks**: trimmed, non-blank markdown units, one per container child.
 *   `blocks().len() == children(container).len()` holds after every public
 *   operation, or that operation returns an error.
 * - **Active block**: at most one index in raw-text edit mode. While active,
 *   the element holds the editable source and the stored string is stale
 *   until [`BlockEditor::save`].
 *
 * ## Block lifecycle
 *
 * ```text
 * RENDERED -> EDITING -> RENDERED              (same or adjacent content)
 * RENDERED -> EDITING -> REMOVED               (saved blank)
 * RENDERED -> EDITING -> RENDERED, RENDERED..  (edit expanded into blocks)
 * ```
 *
 * Rendering is delegated to a [`Render`] implementation and all tree work to
 * a [`Dom`] backend. The host wires DOM listeners to
 * [`BlockEditor::handle_click`], [`BlockEditor::handle_outside_click`] and
 * [`BlockEditor::handle_focus_out`]; for [`crate::MemoryDom`] that wiring is
 * simulated by [`BlockEditor::click`] and friends.
 */

mod error;
mod settings;
mod simulate;

pub use error::{EditorError, Result};
pub use settings::{EditorConfig, EditorSettings};

use crate::blocks::{is_blank, join_blocks, split_blocks};
use crate::dom::{Dom, Listener};
use crate::render::{MarkdownRenderer, Render};

/// A click delivered to a block element's listener.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickEvent<N> {
    /// Innermost node that was clicked.
    pub target: N,
    /// Offset from the left edge of the owning block's bounding box.
    pub offset_x: f64,
    /// Offset from the top edge of the owning block's bounding box.
    pub offset_y: f64,
}

impl<N> ClickEvent<N> {
    pub fn new(target: N, offset_x: f64, offset_y: f64) -> Self {
        Self {
            target,
            offset_x,
            offset_y,
        }
    }
}

/// Notifications for subscribers registered with [`BlockEditor::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    /// The block at `index` entered edit mode.
    Focus { index: usize },
    /// The block at `index` is being saved and leaves edit mode.
    Unfocus { index: usize },
}

type Subscriber = Box<dyn FnMut(&EditorEvent)>;

pub struct BlockEditor<D: Dom, R = MarkdownRenderer> {
    dom: D,
    render: R,
    container: D::Node,
    click_outside: D::Node,
    blocks: Vec<String>,
    /// Markdown passed to the last `init`, restored by `cleanup(false)`
    original: String,
    active: Option<usize>,
    settings: EditorSettings,
    subscribers: Vec<Subscriber>,
}

impl<D: Dom, R: Render> BlockEditor<D, R> {
    /// Attach an editor to `config.target`, loading `config.markdown` if set.
    pub fn new(mut dom: D, config: EditorConfig<D::Node, R>) -> Result<Self> {
        let container = dom.normalize_target(config.target);
        let click_outside = config.click_outside.unwrap_or_else(|| dom.document());

        dom.listen(click_outside, Listener::OutsideClick);
        dom.add_class(container, &config.settings.class_name);

        let mut editor = Self {
            dom,
            render: config.render,
            container,
            click_outside,
            blocks: Vec::new(),
            original: String::new(),
            active: None,
            settings: config.settings,
            subscribers: Vec::new(),
        };

        if let Some(markdown) = config.markdown {
            editor.init(&markdown)?;
        }

        Ok(editor)
    }

    /// Replace the whole document. Can be called any number of times; an
    /// unsaved edit is discarded.
    pub fn init(&mut self, markdown: &str) -> Result<()> {
        self.active = None;

        let html = self.render.render(markdown);
        self.dom.set_inner_html(self.container, &html);
        self.blocks = split_blocks(markdown);
        self.original = markdown.to_string();

        let children = self.dom.children(self.container);
        if children.len() != self.blocks.len() {
            return Err(EditorError::ChildCountMismatch {
                children: children.len(),
                blocks: self.blocks.len(),
            });
        }

        for child in children {
            self.dom.listen(child, Listener::BlockClick);
        }

        log::info!("Loaded document with {} blocks", self.blocks.len());
        Ok(())
    }

    /// Index of the block being edited.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Current markdown, blocks joined by a blank line.
    pub fn markdown(&self) -> String {
        join_blocks(&self.blocks)
    }

    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    pub fn container(&self) -> D::Node {
        self.container
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    /// Mutable backend access for host-side input, e.g. typing into the
    /// active element. Adding or removing container children here breaks
    /// the block alignment.
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    /// Element of the active block.
    pub fn active_element(&self) -> Option<D::Node> {
        let index = self.active?;
        self.dom.children(self.container).get(index).copied()
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&EditorEvent) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Switch the block at `index` into raw-text edit mode.
    ///
    /// A different active block is saved first, and `index` is resolved
    /// against the block list as it stands after that save.
    pub fn enable_editing(&mut self, index: usize) -> Result<()> {
        if self.active == Some(index) {
            return Ok(());
        }
        self.save()?;

        let children = self.dom.children(self.container);
        let element = *children.get(index).ok_or(EditorError::IndexOutOfRange {
            index,
            len: children.len(),
        })?;
        let source = self.blocks.get(index).cloned().unwrap_or_default();

        self.dom.unlisten(element, Listener::BlockClick);
        self.dom.listen(element, Listener::StopPropagation);
        if self.settings.save_on_focus_out {
            self.dom.listen(element, Listener::FocusOut);
        }
        self.dom.set_text_content(element, &source);
        self.dom.set_attribute(element, "role", "textbox");
        self.dom.set_attribute(element, "contenteditable", "true");
        self.dom.set_style(element, "white-space", "pre-wrap");
        self.dom.focus(element);

        self.active = Some(index);
        log::debug!("Editing block {index}");
        self.emit(EditorEvent::Focus { index });
        Ok(())
    }

    /// Leave edit mode, committing the active element's text.
    ///
    /// Blank text removes the block. Otherwise the text is rendered and the
    /// resulting elements take the edited element's place. The text must
    /// split into exactly as many blocks as there are elements.
    pub fn save(&mut self) -> Result<()> {
        let Some(index) = self.active.take() else {
            return Ok(());
        };
        self.emit(EditorEvent::Unfocus { index });

        let children = self.dom.children(self.container);
        let element = *children.get(index).ok_or(EditorError::IndexOutOfRange {
            index,
            len: children.len(),
        })?;
        let raw = self.dom.text_content(element);

        if is_blank(&raw) {
            self.dom.remove_child(self.container, element);
            if index < self.blocks.len() {
                self.blocks.remove(index);
            }
            log::debug!("Removed blank block {index}");
            return self.check_sync();
        }

        let html = self.render.render(&raw);
        let fragment = self.dom.parse_fragment(&html);
        let Some((&first, rest)) = fragment.split_first() else {
            return Err(EditorError::EmptyRender);
        };

        for &node in &fragment {
            self.dom.listen(node, Listener::BlockClick);
        }
        self.dom.replace_child(self.container, first, element);

        let split = split_blocks(&raw);
        if split.len() != fragment.len() {
            return Err(EditorError::ExpansionMismatch {
                blocks: split.len(),
                elements: fragment.len(),
            });
        }

        if rest.is_empty() {
            self.blocks[index] = raw.trim().to_string();
            log::debug!("Saved block {index}");
            return Ok(());
        }

        self.splice_elements(index + 1, rest)?;
        for (offset, block) in split.into_iter().enumerate() {
            self.blocks[index + offset] = block;
        }
        log::debug!("Saved block {index} as {} blocks", fragment.len());
        Ok(())
    }

    /// Route a click from a block element's listener.
    ///
    /// A click inside the content box edits the owning block; a click in its
    /// padding inserts an empty block right after it and edits that instead.
    pub fn handle_click(&mut self, event: ClickEvent<D::Node>) -> Result<()> {
        let Some(origin) = self.find_origin(event.target) else {
            log::warn!("Ignoring click outside the editor's blocks");
            return Ok(());
        };

        if let Some(active) = self.active {
            if self.index_of(origin) == Some(active) {
                return Ok(());
            }
            self.save()?;
        }

        // saving may have shifted the clicked block
        let Some(index) = self.index_of(origin) else {
            log::warn!("Clicked block vanished while saving");
            return Ok(());
        };

        let layout = self.dom.layout_box(origin);
        if layout.is_padding_click(event.offset_x, event.offset_y) {
            let element = self.dom.create_element(&self.settings.new_block_tag);
            self.dom.listen(element, Listener::StopPropagation);
            self.splice_elements(index + 1, &[element])?;
            log::debug!("Inserted empty block at {}", index + 1);
            return self.enable_editing(index + 1);
        }

        self.enable_editing(index)
    }

    pub fn handle_outside_click(&mut self) -> Result<()> {
        self.save()
    }

    pub fn handle_focus_out(&mut self) -> Result<()> {
        if !self.settings.save_on_focus_out {
            return Ok(());
        }
        self.save()
    }

    /// Detach the editor and hand the DOM backend back.
    ///
    /// With `save`, the active block is committed and the current markdown is
    /// rendered. Without it, every edit since the last `init` is discarded
    /// and that markdown is rendered again.
    pub fn cleanup(mut self, save: bool) -> Result<D> {
        let markdown = if save {
            self.save()?;
            self.markdown()
        } else {
            self.active = None;
            self.original.clone()
        };

        let html = self.render.render(&markdown);
        self.dom.set_inner_html(self.container, &html);
        self.dom
            .remove_class(self.container, &self.settings.class_name);
        self.dom.unlisten(self.click_outside, Listener::OutsideClick);

        log::info!("Editor detached (saved: {save})");
        Ok(self.dom)
    }

    /// Insert detached `elements` at `index`, with an empty block for each.
    fn splice_elements(&mut self, index: usize, elements: &[D::Node]) -> Result<()> {
        let children = self.dom.children(self.container);
        if index > children.len() {
            return Err(EditorError::IndexOutOfRange {
                index,
                len: children.len(),
            });
        }

        if index == children.len() {
            for &element in elements {
                self.dom.append_child(self.container, element);
                self.blocks.push(String::new());
            }
        } else {
            let mut rebuilt = Vec::with_capacity(children.len() + elements.len());
            rebuilt.extend_from_slice(&children[..index]);
            rebuilt.extend_from_slice(elements);
            rebuilt.extend_from_slice(&children[index..]);
            self.dom.replace_children(self.container, &rebuilt);
            self.blocks.splice(
                index..index,
                std::iter::repeat_n(String::new(), elements.len()),
            );
        }

        self.check_sync()
    }

    /// Nearest ancestor of `target` (inclusive) that is a container child.
    fn find_origin(&self, target: D::Node) -> Option<D::Node> {
        let children = self.dom.children(self.container);
        let mut node = target;
        loop {
            if children.contains(&node) {
                return Some(node);
            }
            node = self.dom.parent(node)?;
        }
    }

    fn index_of(&self, element: D::Node) -> Option<usize> {
        self.dom
            .children(self.container)
            .iter()
            .position(|&c| c == element)
    }

    fn check_sync(&self) -> Result<()> {
        let children = self.dom.children(self.container).len();
        if children != self.blocks.len() {
            return Err(EditorError::Desync {
                children,
                blocks: self.blocks.len(),
            });
        }
        Ok(())
    }

    fn emit(&mut self, event: EditorEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
    }
}
