/// Errors from the markup layer.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    /// The input violates the document grammar.
    ///
    /// There is exactly one malformed-document kind: mismatched end tags,
    /// a missing `?xml` prologue, an unterminated element, or end-of-stream
    /// in the middle of an element all land here. The offset is the byte
    /// position in the input where the violation was detected.
    #[error("malformed document at byte {offset}: {reason}")]
    Malformed { offset: u64, reason: String },

    /// I/O error from the underlying stream, propagated unchanged.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MarkupError {
    pub(crate) fn malformed(offset: u64, reason: impl Into<String>) -> Self {
        Self::Malformed {
            offset,
            reason: reason.into(),
        }
    }
}

/// Result alias for markup operations.
pub type MarkupResult<T> = Result<T, MarkupError>;
