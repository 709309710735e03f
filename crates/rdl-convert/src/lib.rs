//! Value conversion for RDL report documents.
//!
//! Every value that crosses the markup boundary goes through this crate:
//! attribute text is escaped and unescaped here, binary blobs are carried as
//! base64, and typed property values (numbers, booleans, references) are
//! rendered to their canonical text form. Canonical forms are
//! locale-invariant: a float always uses `.` as the decimal separator no
//! matter what the host locale says.
//!
//! # Key Types
//!
//! - [`xml_escape`] / [`xml_unescape`] — the markup escape codec
//! - [`to_base64`] / [`from_base64`] — blob payload encoding
//! - [`Canonical`] — canonical text form for property values
//! - [`ConvertError`] — conversion failures

pub mod binary;
pub mod canonical;
pub mod error;
pub mod escape;

pub use binary::{from_base64, to_base64};
pub use canonical::{
    bool_from_canonical, f32_from_canonical, f64_from_canonical, i32_from_canonical, Canonical,
};
pub use error::{ConvertError, ConvertResult};
pub use escape::{xml_escape, xml_unescape};
