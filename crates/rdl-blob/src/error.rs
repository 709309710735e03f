/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// The requested blob index does not exist.
    #[error("blob index {index} out of bounds (store holds {count})")]
    IndexOutOfBounds { index: usize, count: usize },

    /// A `Stream` attribute could not be decoded as base64.
    #[error("blob payload decode failed: {0}")]
    Decode(#[from] rdl_convert::ConvertError),

    /// I/O error from the scratch file, propagated unchanged.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for blob store operations.
pub type BlobResult<T> = Result<T, BlobError>;
