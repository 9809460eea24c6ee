//! The DOM capabilities the editor consumes.
//!
//! The editor never builds or styles documents itself. Everything it needs
//! from the host page (tree mutation, listener wiring, focus, and the layout
//! query used for padding hit-testing) goes through [`Dom`], so the same core
//! runs against a browser binding or the in-memory [`memory::MemoryDom`].

pub mod html;
pub mod memory;

use std::fmt::Debug;

/// Listener kinds the editor attaches to nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Listener {
    /// Rendered block: route the click to the editor and stop propagation.
    BlockClick,
    /// Stop propagation only. Used on the element being edited and on
    /// freshly inserted empty blocks so typing clicks are not "outside".
    StopPropagation,
    /// Anything reaching this node counts as a click outside the blocks.
    OutsideClick,
    /// The edited element lost focus.
    FocusOut,
}

/// Computed padding of an element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Bounding box of an element together with its computed padding.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutBox {
    pub width: f64,
    pub height: f64,
    pub padding: Padding,
}

impl LayoutBox {
    pub fn new(width: f64, height: f64, padding: Padding) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }

    /// True when an offset (relative to the box origin) lands strictly
    /// inside the content area.
    pub fn is_content_click(&self, x: f64, y: f64) -> bool {
        let p = &self.padding;
        x > p.left && x < self.width - p.right && y > p.top && y < self.height - p.bottom
    }

    /// True when an offset lands in the padding ring (or on its edge).
    pub fn is_padding_click(&self, x: f64, y: f64) -> bool {
        !self.is_content_click(x, y)
    }
}

/// Tree, listener, and geometry operations over some document model.
///
/// `Node` is a cheap handle; identity is preserved across every mutation,
/// so a node moved between parents keeps its listeners.
pub trait Dom {
    type Node: Copy + Eq + Debug;

    /// The document root. Default outside-click target.
    fn document(&self) -> Self::Node;

    /// Map a target onto the node whose children are the blocks. A document
    /// normalises to its body; everything else is returned unchanged.
    fn normalize_target(&self, target: Self::Node) -> Self::Node;

    /// Direct element children, in order. Text and comment nodes are skipped.
    fn children(&self, parent: Self::Node) -> Vec<Self::Node>;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Replace all content of `node` with the parsed `html`.
    fn set_inner_html(&mut self, node: Self::Node, html: &str);

    /// Parse `html` into detached top-level elements.
    fn parse_fragment(&mut self, html: &str) -> Vec<Self::Node>;

    fn create_element(&mut self, tag: &str) -> Self::Node;

    /// Concatenated text of the node and all its descendants.
    fn text_content(&self, node: Self::Node) -> String;

    /// Replace all content of `node` with a single text node.
    fn set_text_content(&mut self, node: Self::Node, text: &str);

    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);

    fn set_style(&mut self, node: Self::Node, property: &str, value: &str);

    fn add_class(&mut self, node: Self::Node, class: &str);

    fn remove_class(&mut self, node: Self::Node, class: &str);

    fn focus(&mut self, node: Self::Node);

    /// Append `child`, detaching it from any previous parent first.
    fn append_child(&mut self, parent: Self::Node, child: Self::Node);

    fn remove_child(&mut self, parent: Self::Node, child: Self::Node);

    /// Put `new` where `old` is and detach `old`.
    fn replace_child(&mut self, parent: Self::Node, new: Self::Node, old: Self::Node);

    /// Make `children` the complete, ordered child list of `parent`.
    fn replace_children(&mut self, parent: Self::Node, children: &[Self::Node]);

    fn listen(&mut self, node: Self::Node, listener: Listener);

    fn unlisten(&mut self, node: Self::Node, listener: Listener);

    /// Geometry query: bounding box and computed padding of an element.
    fn layout_box(&self, node: Self::Node) -> LayoutBox;
}
