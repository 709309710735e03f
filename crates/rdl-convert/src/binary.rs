//! Base64 carriage for binary blob payloads.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::ConvertResult;

/// Encode raw bytes for storage in a `Stream` attribute.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a `Stream` attribute back to raw bytes.
pub fn from_base64(text: &str) -> ConvertResult<Vec<u8>> {
    Ok(STANDARD.decode(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_with_standard_alphabet_and_padding() {
        assert_eq!(to_base64(b"report"), "cmVwb3J0");
        assert_eq!(to_base64(b"a"), "YQ==");
    }

    #[test]
    fn decode_roundtrip() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        assert_eq!(from_base64(&to_base64(&bytes)).unwrap(), bytes);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(from_base64("not base64!").is_err());
    }
}
