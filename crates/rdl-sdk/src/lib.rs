//! High-level API for RDL report persistence.
//!
//! Ties the persistence core together for applications: a [`ReportFile`]
//! couples a markup [`Document`] with the [`BlobStore`] holding its
//! embedded binaries, and the primary types of every layer are re-exported
//! so embedding applications depend on this crate alone.

pub mod error;
pub mod report_file;

pub use error::{SdkError, SdkResult};
pub use report_file::ReportFile;

// Re-export key types
pub use rdl_blob::{BlobError, BlobStore, ScratchConfig};
pub use rdl_convert::{Canonical, ConvertError};
pub use rdl_diff::{
    are_equal, BaselineRegistry, Deserializable, DiffError, DiffReader, DiffWriter, Serializable,
    SerializeTarget,
};
pub use rdl_markup::{
    Document, MarkupError, Node, ReaderOptions, WriterOptions, XmlReader, XmlWriter,
};
