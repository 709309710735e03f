/// Errors from the diff protocol.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A property primitive was called with no object being serialized.
    #[error("no active object: property writes are only valid inside serialize()")]
    NoActiveObject,

    /// An attribute's text could not be parsed back to its typed value.
    #[error("property conversion failed: {0}")]
    Convert(#[from] rdl_convert::ConvertError),

    /// An object's own serialize/deserialize hook failed.
    #[error("object serialization failed: {0}")]
    Object(String),
}

impl DiffError {
    /// Wrap a failure raised by an object's serialize/deserialize hook.
    pub fn object(reason: impl Into<String>) -> Self {
        Self::Object(reason.into())
    }
}

/// Result alias for diff operations.
pub type DiffResult<T> = Result<T, DiffError>;
