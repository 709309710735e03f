/// Errors from value conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// An escape sequence could not be decoded.
    #[error("bad escape sequence: &{entity}")]
    BadEntity {
        /// The entity body, without the leading `&` (may be truncated).
        entity: String,
    },

    /// A numeric character reference names an invalid code point.
    #[error("invalid character reference: &#{code};")]
    BadCodePoint { code: u32 },

    /// Text could not be parsed as a canonical boolean.
    #[error("not a canonical boolean: {value:?}")]
    BadBool { value: String },

    /// Text could not be parsed as a canonical number.
    #[error("not a canonical number: {value:?}")]
    BadNumber { value: String },

    /// Base64 payload could not be decoded.
    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Result alias for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;
