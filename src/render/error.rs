use thiserror::Error;

/// RenderError
///
/// Every way a render pass can fail. Both variants abort the whole render:
/// the caller never receives partial markup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The stored body could not be parsed into a node tree.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// A node or mark type has no renderer in the effective registry.
    #[error("no renderer registered for node type `{0}`")]
    UnknownNodeType(String),
}
