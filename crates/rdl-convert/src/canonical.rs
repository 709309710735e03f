//! Canonical text forms for property values.
//!
//! The diff protocol compares properties by their serialized text, so every
//! value type needs exactly one canonical rendering. Numbers always use `.`
//! as the decimal separator regardless of host locale; booleans are the
//! lowercase words `true` and `false`.

use crate::error::{ConvertError, ConvertResult};

/// Canonical text form of a property value.
///
/// Two values are considered equal for diff purposes when their canonical
/// forms match, even if the in-memory representations differ.
pub trait Canonical {
    /// Render this value to its canonical text form.
    fn to_canonical(&self) -> String;
}

impl Canonical for bool {
    fn to_canonical(&self) -> String {
        if *self { "true" } else { "false" }.to_string()
    }
}

impl Canonical for str {
    fn to_canonical(&self) -> String {
        self.to_string()
    }
}

impl Canonical for String {
    fn to_canonical(&self) -> String {
        self.clone()
    }
}

macro_rules! canonical_via_display {
    ($($ty:ty),*) => {
        $(impl Canonical for $ty {
            fn to_canonical(&self) -> String {
                // Rust's Display for numbers is locale-invariant.
                self.to_string()
            }
        })*
    };
}

canonical_via_display!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64);

/// Parse a canonical boolean (`true` / `false`).
pub fn bool_from_canonical(text: &str) -> ConvertResult<bool> {
    match text {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConvertError::BadBool {
            value: text.to_string(),
        }),
    }
}

/// Parse a canonical 32-bit integer.
pub fn i32_from_canonical(text: &str) -> ConvertResult<i32> {
    text.parse().map_err(|_| ConvertError::BadNumber {
        value: text.to_string(),
    })
}

/// Parse a canonical single-precision float.
pub fn f32_from_canonical(text: &str) -> ConvertResult<f32> {
    text.parse().map_err(|_| ConvertError::BadNumber {
        value: text.to_string(),
    })
}

/// Parse a canonical double-precision float.
pub fn f64_from_canonical(text: &str) -> ConvertResult<f64> {
    text.parse().map_err(|_| ConvertError::BadNumber {
        value: text.to_string(),
    })
}
