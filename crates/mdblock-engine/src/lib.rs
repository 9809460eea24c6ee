pub mod blocks;
pub mod dom;
pub mod editor;
pub mod render;

// Re-export key types for easier usage
pub use blocks::{is_blank, join_blocks, split_blocks};
pub use dom::{Dom, LayoutBox, Listener, Padding, memory::MemoryDom, memory::NodeId};
pub use editor::{BlockEditor, ClickEvent, EditorConfig, EditorError, EditorEvent, EditorSettings};
pub use render::{MarkdownRenderer, Render, RendererSettings};
