//! A complete report file: document tree plus its blob section.

use std::io::{Read, Write};

use rdl_blob::BlobStore;
use rdl_markup::{Document, WriterOptions, XmlWriter};
use tracing::debug;

use crate::error::SdkResult;

/// Name of the blob section node under the document root.
const BLOBS_SECTION: &str = "Blobs";

/// One persisted report: a markup [`Document`] and the [`BlobStore`] its
/// embedded binaries live in.
///
/// On save, a `Blobs` section carrying the store's contents is appended to
/// a copy of the tree; on load, the section is pulled back out of the tree
/// and into the store, so the in-memory document never carries base64
/// payloads.
#[derive(Debug)]
pub struct ReportFile {
    document: Document,
    blobs: BlobStore,
}

impl Default for ReportFile {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFile {
    /// Create an empty report with a memory-mode blob store.
    pub fn new() -> Self {
        Self::with_blob_store(BlobStore::in_memory())
    }

    /// Create an empty report around an existing blob store (e.g. a
    /// file-backed one for large documents).
    pub fn with_blob_store(blobs: BlobStore) -> Self {
        Self {
            document: Document::new(),
            blobs,
        }
    }

    /// The markup document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the markup document.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// The blob store.
    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Mutable access to the blob store.
    pub fn blobs_mut(&mut self) -> &mut BlobStore {
        &mut self.blobs
    }

    /// Stream the report out: the document tree with a trailing `Blobs`
    /// section when any blobs are stored.
    pub fn save(&self, writer: impl Write) -> SdkResult<()> {
        let options = WriterOptions {
            indent: self.document.auto_indent,
            header: self.document.write_header,
        };

        if self.blobs.is_empty() {
            XmlWriter::with_options(writer, options).write_document(self.document.root())?;
        } else {
            let mut root = self.document.root().clone();
            let section = root.find_or_create(BLOBS_SECTION);
            self.blobs.save(section)?;
            XmlWriter::with_options(writer, options).write_document(&root)?;
        }
        debug!(blobs = self.blobs.len(), "report saved");
        Ok(())
    }

    /// Parse a report stream, replacing the document tree and restocking
    /// the blob store from the `Blobs` section.
    pub fn load(&mut self, reader: impl Read) -> SdkResult<()> {
        self.document.load(reader)?;
        self.blobs.clear()?;
        if let Some(index) = self.document.root().find(BLOBS_SECTION) {
            let mut section = self.document.root_mut().take_child(index);
            self.blobs.load_destructive(&mut section)?;
        }
        debug!(blobs = self.blobs.len(), "report loaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdl_blob::ScratchConfig;
    use rdl_diff::{
        BaselineRegistry, DiffError, DiffReader, DiffResult, DiffWriter, Serializable,
        SerializeTarget,
    };
    use rdl_markup::MarkupError;

    fn save_to_string(report: &ReportFile) -> String {
        let mut buf = Vec::new();
        report.save(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn settings_round_trip() {
        let mut report = ReportFile::new();
        report.document_mut().root_mut().set_name("Config");
        report
            .document_mut()
            .root_mut()
            .find_or_create("UIOptions")
            .set_prop("DisableHotkeys", "true");

        let text = save_to_string(&report);

        let mut reloaded = ReportFile::new();
        reloaded.load(text.as_bytes()).unwrap();
        assert_eq!(
            reloaded
                .document_mut()
                .root_mut()
                .find_or_create("UIOptions")
                .get_prop("DisableHotkeys"),
            "true"
        );
    }

    #[test]
    fn blob_sub_document_round_trip() {
        let mut report = ReportFile::new();
        report.document_mut().root_mut().set_name("Report");
        report.blobs_mut().add_or_update(b"png bytes", "img1").unwrap();
        report.blobs_mut().add(b"anonymous payload").unwrap();

        let text = save_to_string(&report);

        let mut reloaded = ReportFile::new();
        reloaded.load(text.as_bytes()).unwrap();
        assert_eq!(reloaded.blobs().len(), 2);
        assert_eq!(reloaded.blobs().source(0), Some("img1"));
        assert_eq!(reloaded.blobs().source(1), None);
        assert_eq!(reloaded.blobs().get(0).unwrap(), b"png bytes");
        assert_eq!(reloaded.blobs().get(1).unwrap(), b"anonymous payload");
        // The section was pulled out of the tree on load.
        assert!(reloaded.document().root().find("Blobs").is_none());
    }

    #[test]
    fn blob_section_round_trips_through_a_file_backed_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::file_backed(ScratchConfig {
            dir: Some(dir.path().to_path_buf()),
        })
        .unwrap();

        let mut report = ReportFile::with_blob_store(store);
        report.document_mut().root_mut().set_name("Report");
        let payload: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
        report.blobs_mut().add(&payload).unwrap();

        let text = save_to_string(&report);

        let mut reloaded = ReportFile::with_blob_store(
            BlobStore::file_backed(ScratchConfig::default()).unwrap(),
        );
        reloaded.load(text.as_bytes()).unwrap();
        assert_eq!(reloaded.blobs().get(0).unwrap(), payload);
    }

    #[test]
    fn save_does_not_mutate_the_document() {
        let mut report = ReportFile::new();
        report.document_mut().root_mut().set_name("Report");
        report.blobs_mut().add(b"bytes").unwrap();

        let _ = save_to_string(&report);
        assert!(report.document().root().find("Blobs").is_none());
    }

    #[test]
    fn malformed_input_is_rejected_whole() {
        let mut report = ReportFile::new();
        report.document_mut().root_mut().set_name("Keep");

        let err = report
            .load("<?xml version=\"1.0\"?><A><B></A></B>".as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::SdkError::Markup(MarkupError::Malformed { .. })
        ));
        assert_eq!(report.document().root().name(), "Keep");
    }

    // ---- end-to-end: diff writer -> report file -> diff reader ---------

    struct Page {
        name: String,
        width: f32,
        landscape: bool,
    }

    impl Default for Page {
        fn default() -> Self {
            Self {
                name: String::new(),
                width: 718.2,
                landscape: false,
            }
        }
    }

    impl Serializable for Page {
        fn item_name(&self) -> &str {
            &self.name
        }
        fn class_name(&self) -> &str {
            "Page"
        }
        fn serialize(&self, writer: &mut DiffWriter) -> DiffResult<()> {
            writer.write_f32("Width", self.width)?;
            writer.write_bool("Landscape", self.landscape)?;
            Ok(())
        }
    }

    #[test]
    fn diffed_object_graph_survives_persistence() {
        let mut registry = BaselineRegistry::new();
        registry.register("Page", || Box::<Page>::default() as Box<dyn Serializable>);

        let page = Page {
            name: "Page1".into(),
            landscape: true,
            ..Page::default()
        };
        let mut writer = DiffWriter::with_registry(SerializeTarget::Report, registry);
        writer.write(&page).unwrap();

        let mut report = ReportFile::new();
        report.document_mut().set_root(writer.into_root());
        let text = save_to_string(&report);

        // Only the changed property made it into the text.
        assert!(text.contains("Landscape=\"true\""));
        assert!(!text.contains("Width"));

        let mut reloaded = ReportFile::new();
        reloaded.load(text.as_bytes()).unwrap();
        let reader = DiffReader::new(reloaded.document().root());
        assert_eq!(reader.item_name(), "Page1");
        assert!(reader.read_bool_or("Landscape", false).unwrap());
        assert_eq!(reader.read_f32_or("Width", 718.2).unwrap(), 718.2);
    }

    #[test]
    fn object_failure_maps_into_sdk_error() {
        struct Broken;
        impl Serializable for Broken {
            fn item_name(&self) -> &str {
                "Broken"
            }
            fn class_name(&self) -> &str {
                "Broken"
            }
            fn serialize(&self, _writer: &mut DiffWriter) -> DiffResult<()> {
                Err(DiffError::object("no can do"))
            }
        }

        fn write_it() -> crate::error::SdkResult<()> {
            let mut writer = DiffWriter::new(SerializeTarget::Undo);
            writer.write(&Broken)?;
            Ok(())
        }
        assert!(matches!(
            write_it(),
            Err(crate::error::SdkError::Diff(DiffError::Object(_)))
        ));
    }
}
