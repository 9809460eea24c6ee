/// Contract violations raised by the editor.
///
/// None of these are recoverable: the container and the block list can no
/// longer be assumed to line up, so the instance should be dropped.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("Child elements don't match markdown blocks: {children} elements, {blocks} blocks")]
    ChildCountMismatch { children: usize, blocks: usize },

    #[error("Non-blank block rendered to no elements")]
    EmptyRender,

    #[error("Rendered elements don't match edited blocks: {elements} elements, {blocks} blocks")]
    ExpansionMismatch { blocks: usize, elements: usize },

    #[error("Block list out of sync with container: {children} elements, {blocks} blocks")]
    Desync { children: usize, blocks: usize },

    #[error("Block index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, EditorError>;
