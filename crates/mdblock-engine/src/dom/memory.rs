//! Arena-backed in-memory DOM.
//!
//! Nodes are never freed: detaching a node only clears its parent link, so
//! a [`NodeId`] stays valid (and keeps its listeners) for the lifetime of
//! the [`MemoryDom`]. This mirrors how element handles behave in a browser
//! and is what the editor relies on when it moves elements around.
//!
//! Every save allocates a fresh fragment, so memory grows with the number of
//! edits. Use it for tests and scripted sessions, not long-lived hosts.

use std::collections::BTreeSet;

use super::html::{self, Token};
use super::{Dom, LayoutBox, Listener, Padding};

/// Handle to a node in a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: BTreeSet<Listener>,
    layout: Option<LayoutBox>,
}

#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<NodeData>,
    document: NodeId,
    body: NodeId,
    focused: Option<NodeId>,
    default_layout: LayoutBox,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Create a document containing an empty body.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: NodeId(0),
            body: NodeId(0),
            focused: None,
            default_layout: LayoutBox::new(600.0, 40.0, Padding::uniform(8.0)),
        };
        dom.document = dom.alloc(NodeKind::Document);
        dom.body = dom.create_element("body");
        let (document, body) = (dom.document, dom.body);
        dom.append_child(document, body);
        dom
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Drop focus, returning the node that had it.
    pub fn blur(&mut self) -> Option<NodeId> {
        self.focused.take()
    }

    /// Tag name for element nodes.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Inline style value for `property`, if set.
    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        parse_style(self.attribute(node, "style")?)
            .into_iter()
            .find(|(key, _)| key == property)
            .map(|(_, value)| value)
    }

    pub fn has_listener(&self, node: NodeId, listener: Listener) -> bool {
        self.nodes[node.0].listeners.contains(&listener)
    }

    /// Override the layout box reported for one node.
    pub fn set_layout(&mut self, node: NodeId, layout: LayoutBox) {
        self.nodes[node.0].layout = Some(layout);
    }

    /// Layout box reported for nodes without an override.
    pub fn set_default_layout(&mut self, layout: LayoutBox) {
        self.default_layout = layout;
    }

    /// True when `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.nodes[n.0].parent;
        }
        false
    }

    /// Listeners that fire, in order, for a click on `target`.
    ///
    /// The event bubbles from `target` towards the document. `BlockClick`
    /// and `StopPropagation` end propagation at the node carrying them.
    pub fn dispatch_click(&self, target: NodeId) -> Vec<(NodeId, Listener)> {
        let mut fired = Vec::new();
        let mut current = Some(target);

        while let Some(node) = current {
            let listeners = &self.nodes[node.0].listeners;
            if listeners.contains(&Listener::BlockClick) {
                fired.push((node, Listener::BlockClick));
                break;
            }
            if listeners.contains(&Listener::StopPropagation) {
                fired.push((node, Listener::StopPropagation));
                break;
            }
            if listeners.contains(&Listener::OutsideClick) {
                fired.push((node, Listener::OutsideClick));
            }
            current = self.nodes[node.0].parent;
        }

        fired
    }

    /// Serialized content of `node`.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in &self.nodes[node.0].children {
            self.write_html(child, &mut out);
        }
        out
    }

    /// Serialized `node` including its own tag.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Document => {
                for &child in &self.nodes[node.0].children {
                    self.write_html(child, out);
                }
            }
            NodeKind::Text(text) => out.push_str(&html_escape::encode_text(text)),
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(value));
                    out.push('"');
                }
                out.push('>');
                if html::is_void(tag) {
                    return;
                }
                for &child in &self.nodes[node.0].children {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
            listeners: BTreeSet::new(),
            layout: None,
        });
        id
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    fn clear_children(&mut self, node: NodeId) {
        for child in std::mem::take(&mut self.nodes[node.0].children) {
            self.nodes[child.0].parent = None;
        }
    }

    /// Build detached nodes from `html`, returning the top-level ones.
    fn build(&mut self, source: &str) -> Vec<NodeId> {
        let mut roots = Vec::new();
        let mut open: Vec<NodeId> = Vec::new();

        for token in html::tokenize(source) {
            match token {
                Token::Text(text) => {
                    let node = self.alloc(NodeKind::Text(text));
                    self.attach_built(&mut roots, &open, node);
                }
                Token::Open {
                    tag,
                    attrs,
                    self_closing,
                } => {
                    let leaf = self_closing || html::is_void(&tag);
                    let node = self.alloc(NodeKind::Element { tag, attrs });
                    self.attach_built(&mut roots, &open, node);
                    if !leaf {
                        open.push(node);
                    }
                }
                Token::Close(tag) => {
                    // unmatched close tags are ignored
                    if let Some(pos) = open.iter().rposition(|&n| self.tag(n) == Some(tag.as_str())) {
                        open.truncate(pos);
                    }
                }
            }
        }

        roots
    }

    fn attach_built(&mut self, roots: &mut Vec<NodeId>, open: &[NodeId], node: NodeId) {
        match open.last() {
            Some(&parent) => {
                self.nodes[node.0].parent = Some(parent);
                self.nodes[parent.0].children.push(node);
            }
            None => roots.push(node),
        }
    }

    fn is_element(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].kind, NodeKind::Element { .. })
    }

    fn attrs_mut(&mut self, node: NodeId) -> Option<&mut Vec<(String, String)>> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element { attrs, .. } => Some(attrs),
            _ => None,
        }
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;

    fn document(&self) -> NodeId {
        self.document
    }

    fn normalize_target(&self, target: NodeId) -> NodeId {
        if target == self.document {
            self.body
        } else {
            target
        }
    }

    fn children(&self, parent: NodeId) -> Vec<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn set_inner_html(&mut self, node: NodeId, html: &str) {
        self.clear_children(node);
        for child in self.build(html) {
            self.nodes[child.0].parent = Some(node);
            self.nodes[node.0].children.push(child);
        }
    }

    fn parse_fragment(&mut self, html: &str) -> Vec<NodeId> {
        self.build(html)
            .into_iter()
            .filter(|&n| self.is_element(n))
            .collect()
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    fn text_content(&self, node: NodeId) -> String {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => text.clone(),
            _ => self.nodes[node.0]
                .children
                .iter()
                .map(|&c| self.text_content(c))
                .collect(),
        }
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        if let NodeKind::Text(existing) = &mut self.nodes[node.0].kind {
            *existing = text.to_string();
            return;
        }
        self.clear_children(node);
        if !text.is_empty() {
            let child = self.alloc(NodeKind::Text(text.to_string()));
            self.nodes[child.0].parent = Some(node);
            self.nodes[node.0].children.push(child);
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(attrs) = self.attrs_mut(node) else {
            return;
        };
        match attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        let mut declarations = self
            .attribute(node, "style")
            .map(parse_style)
            .unwrap_or_default();
        match declarations.iter_mut().find(|(key, _)| key == property) {
            Some((_, existing)) => *existing = value.to_string(),
            None => declarations.push((property.to_string(), value.to_string())),
        }
        let style = declarations
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect::<Vec<_>>()
            .join("; ");
        self.set_attribute(node, "style", &style);
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let classes = match self.attribute(node, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set_attribute(node, "class", &classes);
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        let Some(existing) = self.attribute(node, "class") else {
            return;
        };
        let remaining = existing
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        if remaining.is_empty() {
            if let Some(attrs) = self.attrs_mut(node) {
                attrs.retain(|(key, _)| key != "class");
            }
        } else {
            self.set_attribute(node, "class", &remaining);
        }
    }

    fn focus(&mut self, node: NodeId) {
        self.focused = Some(node);
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.nodes[child.0].parent == Some(parent) {
            self.detach(child);
        }
    }

    fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) {
        if new == old {
            return;
        }
        self.detach(new);
        let Some(index) = self.nodes[parent.0].children.iter().position(|&c| c == old) else {
            return;
        };
        self.nodes[parent.0].children[index] = new;
        self.nodes[new.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
    }

    fn replace_children(&mut self, parent: NodeId, children: &[NodeId]) {
        self.clear_children(parent);
        for &child in children {
            self.append_child(parent, child);
        }
    }

    fn listen(&mut self, node: NodeId, listener: Listener) {
        self.nodes[node.0].listeners.insert(listener);
    }

    fn unlisten(&mut self, node: NodeId, listener: Listener) {
        self.nodes[node.0].listeners.remove(&listener);
    }

    fn layout_box(&self, node: NodeId) -> LayoutBox {
        self.nodes[node.0].layout.unwrap_or(self.default_layout)
    }
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (key, value) = declaration.split_once(':')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_document_has_body() {
        let dom = MemoryDom::new();

        assert_eq!(dom.children(dom.document()), vec![dom.body()]);
        assert_eq!(dom.parent(dom.body()), Some(dom.document()));
        assert_eq!(dom.normalize_target(dom.document()), dom.body());
        assert_eq!(dom.normalize_target(dom.body()), dom.body());
    }

    #[test]
    fn test_inner_html_children_skip_text_nodes() {
        let mut dom = MemoryDom::new();
        let body = dom.body();

        dom.set_inner_html(body, "<h1>Title</h1>\n<p>Some <em>text</em></p>\n");

        let children = dom.children(body);
        assert_eq!(children.len(), 2);
        assert_eq!(dom.tag(children[0]), Some("h1"));
        assert_eq!(dom.text_content(children[1]), "Some text");
        assert_eq!(
            dom.inner_html(body),
            "<h1>Title</h1>\n<p>Some <em>text</em></p>\n"
        );
    }

    #[test]
    fn test_parse_fragment_is_detached() {
        let mut dom = MemoryDom::new();

        let nodes = dom.parse_fragment("<p>a</p>\n<ul>\n<li>b</li>\n</ul>\n");

        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|&n| dom.parent(n).is_none()));
        assert_eq!(dom.outer_html(nodes[1]), "<ul>\n<li>b</li>\n</ul>");
    }

    #[test]
    fn test_void_elements_do_not_swallow_siblings() {
        let mut dom = MemoryDom::new();

        let nodes = dom.parse_fragment("<hr>\n<p>after</p>");

        assert_eq!(nodes.len(), 2);
        assert_eq!(dom.outer_html(nodes[0]), "<hr>");
    }

    #[test]
    fn test_text_content_roundtrip_escapes_html() {
        let mut dom = MemoryDom::new();
        let p = dom.create_element("p");

        dom.set_text_content(p, "a < b\n\n**c**");

        assert_eq!(dom.text_content(p), "a < b\n\n**c**");
        assert_eq!(dom.outer_html(p), "<p>a &lt; b\n\n**c**</p>");

        dom.set_text_content(p, "");
        assert_eq!(dom.text_content(p), "");
        assert_eq!(dom.outer_html(p), "<p></p>");
    }

    #[test]
    fn test_replace_child_keeps_identity() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        dom.set_inner_html(body, "<p>a</p><p>b</p>");
        let [a, b] = dom.children(body)[..] else {
            panic!("expected two children");
        };
        dom.listen(b, Listener::BlockClick);
        let fresh = dom.create_element("h2");

        dom.replace_child(body, fresh, a);

        assert_eq!(dom.children(body), vec![fresh, b]);
        assert_eq!(dom.parent(a), None);
        assert!(dom.has_listener(b, Listener::BlockClick));
    }

    #[test]
    fn test_replace_children_reorders_existing_nodes() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        dom.set_inner_html(body, "<p>a</p>\n<p>b</p>\n");
        let children = dom.children(body);
        let inserted = dom.create_element("p");

        dom.replace_children(body, &[children[0], inserted, children[1]]);

        assert_eq!(dom.children(body), vec![children[0], inserted, children[1]]);
        assert_eq!(dom.inner_html(body), "<p>a</p><p></p><p>b</p>");
    }

    #[test]
    fn test_class_and_style_attributes() {
        let mut dom = MemoryDom::new();
        let body = dom.body();

        dom.add_class(body, "mdblock");
        dom.add_class(body, "mdblock");
        dom.add_class(body, "other");
        dom.set_style(body, "white-space", "pre-wrap");
        dom.set_style(body, "color", "red");
        dom.set_style(body, "white-space", "normal");

        assert_eq!(dom.attribute(body, "class"), Some("mdblock other"));
        assert_eq!(dom.style(body, "white-space").as_deref(), Some("normal"));
        assert_eq!(
            dom.attribute(body, "style"),
            Some("white-space: normal; color: red")
        );

        dom.remove_class(body, "mdblock");
        dom.remove_class(body, "other");
        assert_eq!(dom.attribute(body, "class"), None);
    }

    #[test]
    fn test_dispatch_click_bubbles_until_stopped() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let document = dom.document();
        dom.set_inner_html(body, "<p>Some <strong>bold</strong></p>");
        let p = dom.children(body)[0];
        let strong = dom.children(p)[0];
        dom.listen(document, Listener::OutsideClick);

        assert_eq!(
            dom.dispatch_click(strong),
            vec![(document, Listener::OutsideClick)]
        );

        dom.listen(p, Listener::BlockClick);
        assert_eq!(dom.dispatch_click(strong), vec![(p, Listener::BlockClick)]);

        dom.unlisten(p, Listener::BlockClick);
        dom.listen(p, Listener::StopPropagation);
        assert_eq!(
            dom.dispatch_click(strong),
            vec![(p, Listener::StopPropagation)]
        );
    }

    #[test]
    fn test_layout_defaults_and_overrides() {
        let mut dom = MemoryDom::new();
        let p = dom.create_element("p");
        let layout = LayoutBox::new(10.0, 10.0, Padding::uniform(1.0));

        assert_eq!(dom.layout_box(p).padding, Padding::uniform(8.0));

        dom.set_layout(p, layout);
        assert_eq!(dom.layout_box(p), layout);

        let wide = LayoutBox::new(900.0, 60.0, Padding::uniform(20.0));
        let q = dom.create_element("p");
        dom.set_default_layout(wide);
        assert_eq!(dom.layout_box(q), wide);
        assert_eq!(dom.layout_box(p), layout);
    }

    #[test]
    fn test_contains() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        dom.set_inner_html(body, "<p><em>x</em></p>");
        let p = dom.children(body)[0];
        let em = dom.children(p)[0];

        assert!(dom.contains(p, em));
        assert!(dom.contains(dom.document(), em));
        assert!(!dom.contains(em, p));
    }
}
