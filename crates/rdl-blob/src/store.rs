//! The blob store proper.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use rdl_convert::{from_base64, to_base64};
use rdl_markup::Node;
use tracing::debug;

use crate::error::{BlobError, BlobResult};

/// Node name used for blob entries in the markup sub-document.
const ITEM_NAME: &str = "item";
/// Attribute carrying the base64 payload.
const STREAM_PROP: &str = "Stream";
/// Attribute carrying the optional dedup source key.
const SOURCE_PROP: &str = "Source";

/// Scratch-file provisioning for file-backed stores.
#[derive(Clone, Debug, Default)]
pub struct ScratchConfig {
    /// Directory for the scratch file. `None` uses the OS temp directory.
    pub dir: Option<PathBuf>,
}

/// Where one blob's bytes live.
#[derive(Debug)]
enum BlobData {
    /// Fully resident payload (memory mode).
    Memory(Vec<u8>),
    /// Range in the shared scratch file (file-backed mode). Entries hold
    /// only this token; all I/O goes through the store.
    Scratch { offset: u64, len: u64 },
}

/// One stored blob: payload location plus the optional dedup key.
#[derive(Debug)]
struct BlobEntry {
    data: BlobData,
    source: Option<String>,
}

/// Scratch-file state: the shared handle and the append position. Reads
/// move the file cursor, so appends re-seek to `len` every time.
#[derive(Debug)]
struct Scratch {
    file: File,
    len: u64,
}

/// Append-mostly store of binary payloads, optionally keyed for dedup.
///
/// Two backing modes, chosen once at construction:
///
/// - [`BlobStore::in_memory`] keeps every payload resident.
/// - [`BlobStore::file_backed`] spills each payload to a delete-on-close
///   scratch file the moment it is added and keeps only `(offset, len)`,
///   bounding peak memory regardless of document size.
///
/// The scratch handle is shared by all entries and lives behind a mutex:
/// every read is an exclusive seek+read pair, so [`BlobStore::get`] is safe
/// to call from multiple threads (e.g. while paginating a preview).
#[derive(Debug, Default)]
pub struct BlobStore {
    entries: Vec<BlobEntry>,
    scratch: Option<Mutex<Scratch>>,
}

impl BlobStore {
    /// Create a store that keeps every payload in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Create a file-backed store.
    ///
    /// The scratch file is created exclusively for this store and is
    /// already unlinked (delete-on-close): dropping the store releases it,
    /// and no path ever escapes.
    pub fn file_backed(config: ScratchConfig) -> BlobResult<Self> {
        let file = match &config.dir {
            Some(dir) => tempfile::tempfile_in(dir)?,
            None => tempfile::tempfile()?,
        };
        debug!("blob scratch file opened");
        Ok(Self {
            entries: Vec::new(),
            scratch: Some(Mutex::new(Scratch { file, len: 0 })),
        })
    }

    /// Whether payloads are spilled to the scratch file.
    pub fn is_file_backed(&self) -> bool {
        self.scratch.is_some()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a payload unconditionally. Returns its index.
    ///
    /// In file-backed mode the bytes are written to the scratch file
    /// immediately and not kept in memory.
    pub fn add(&mut self, bytes: &[u8]) -> BlobResult<usize> {
        self.push_entry(bytes, None)
    }

    /// Append a payload keyed by `source`, deduplicating on the key.
    ///
    /// A non-empty `source` that is already present returns the existing
    /// index without storing anything, even if `bytes` differs. An empty
    /// `source` never deduplicates.
    pub fn add_or_update(&mut self, bytes: &[u8], source: &str) -> BlobResult<usize> {
        if !source.is_empty() {
            if let Some(index) = self.find_source(source) {
                return Ok(index);
            }
        }
        self.push_entry(bytes, (!source.is_empty()).then(|| source.to_string()))
    }

    /// Index of the blob with the given source key.
    pub fn find_source(&self, source: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.source.as_deref() == Some(source))
    }

    /// Source key of the blob at `index`, if it has one.
    pub fn source(&self, index: usize) -> Option<&str> {
        self.entries.get(index).and_then(|e| e.source.as_deref())
    }

    /// Payload bytes of the blob at `index`.
    ///
    /// File-backed reads take the scratch lock for the duration of the
    /// seek+read pair.
    pub fn get(&self, index: usize) -> BlobResult<Vec<u8>> {
        let entry = self
            .entries
            .get(index)
            .ok_or(BlobError::IndexOutOfBounds {
                index,
                count: self.entries.len(),
            })?;
        match &entry.data {
            BlobData::Memory(bytes) => Ok(bytes.clone()),
            BlobData::Scratch { offset, len } => {
                let bytes = self.read_scratch(*offset, *len)?;
                debug!(index, offset, len, "scratch read");
                Ok(bytes)
            }
        }
    }

    /// Emit the blob sub-document: one `item` child per blob, in store
    /// order, with a base64 `Stream` attribute and `Source` when keyed.
    ///
    /// Each payload's encoded text lives only for its own iteration, so
    /// peak memory stays at one blob even for large file-backed stores.
    pub fn save(&self, parent: &mut Node) -> BlobResult<()> {
        for index in 0..self.entries.len() {
            let bytes = self.get(index)?;
            let child = parent.add();
            child.set_name(ITEM_NAME);
            child.set_prop(STREAM_PROP, &to_base64(&bytes));
            if let Some(source) = self.source(index) {
                child.set_prop(SOURCE_PROP, source);
            }
        }
        debug!(count = self.entries.len(), "blob section saved");
        Ok(())
    }

    /// Bulk-populate the store from a blob sub-document, consuming it.
    ///
    /// Each child's attributes are cleared the moment its payload has been
    /// decoded, so the encoded text and the decoded bytes of at most one
    /// blob coexist at any time. Children without a `Stream` attribute are
    /// skipped.
    pub fn load_destructive(&mut self, parent: &mut Node) -> BlobResult<()> {
        for child in parent.children_mut() {
            if !child.has_prop(STREAM_PROP) {
                continue;
            }
            let encoded = child.get_prop(STREAM_PROP).to_string();
            let source = child.get_prop(SOURCE_PROP).to_string();
            child.clear_props();

            let bytes = from_base64(&encoded)?;
            drop(encoded);
            self.add_or_update(&bytes, &source)?;
        }
        debug!(count = self.entries.len(), "blob section loaded");
        Ok(())
    }

    /// Drop all entries. A file-backed store truncates its scratch file and
    /// keeps it for reuse.
    pub fn clear(&mut self) -> BlobResult<()> {
        self.entries.clear();
        if let Some(scratch) = &self.scratch {
            let mut s = scratch.lock().expect("scratch mutex poisoned");
            s.file.set_len(0)?;
            s.len = 0;
        }
        Ok(())
    }

    fn push_entry(&mut self, bytes: &[u8], source: Option<String>) -> BlobResult<usize> {
        let data = match &self.scratch {
            Some(scratch) => {
                let mut s = scratch.lock().expect("scratch mutex poisoned");
                let offset = s.len;
                s.file.seek(SeekFrom::Start(offset))?;
                s.file.write_all(bytes)?;
                s.len += bytes.len() as u64;
                debug!(offset, len = bytes.len(), "scratch write");
                BlobData::Scratch {
                    offset,
                    len: bytes.len() as u64,
                }
            }
            None => BlobData::Memory(bytes.to_vec()),
        };
        self.entries.push(BlobEntry { data, source });
        Ok(self.entries.len() - 1)
    }

    /// The single chokepoint for scratch-file reads: exclusive access to
    /// the shared handle for the whole seek+read pair.
    fn read_scratch(&self, offset: u64, len: u64) -> BlobResult<Vec<u8>> {
        let scratch = self
            .scratch
            .as_ref()
            .expect("scratch entry in a memory-mode store");
        let mut s = scratch.lock().expect("scratch mutex poisoned");
        s.file.seek(SeekFrom::Start(offset))?;
        let mut bytes = vec![0u8; len as usize];
        s.file.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}
