//! Binary blob side-store for RDL report documents.
//!
//! Large byte payloads (embedded images, attached files) never travel
//! through the text markup directly; they live in a [`BlobStore`] and are
//! referenced by index. The store either keeps payloads in memory or spills
//! them to a delete-on-close scratch file as they arrive, so loading a
//! document with hundreds of megabytes of images does not hold them all
//! resident at once.
//!
//! In the persisted document the store appears as a markup sub-document:
//!
//! ```text
//! <item Stream="<base64>" Source="<optional dedup key>"/>
//! ```
//!
//! one child per blob, in store order.
//!
//! # Key Types
//!
//! - [`BlobStore`] — the store; memory or file-backed mode
//! - [`ScratchConfig`] — scratch-file provisioning for file-backed mode
//! - [`BlobError`] — index and I/O failures
//!
//! # Design Rules
//!
//! 1. At most one entry per non-empty source key; `add_or_update` returns
//!    the existing index instead of duplicating storage.
//! 2. Entries hold `(offset, len)` tokens, never the scratch handle; every
//!    scratch read is one exclusive seek+read critical section.
//! 3. The scratch file is owned by exactly one store and is unlinked on
//!    creation; dropping the store releases the disk space.

pub mod error;
pub mod store;

pub use error::{BlobError, BlobResult};
pub use store::{BlobStore, ScratchConfig};
