//! Serialization targets and the Preview short-name table.

/// Destination mode for a diff-writer session.
///
/// The target changes two things only: whether property names are
/// abbreviated (Preview), and whether an object's alias is preferred over
/// its item name (Preview and SourcePages, where inherited objects appear
/// under their original names).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SerializeTarget {
    /// Full report document on disk.
    #[default]
    Report,
    /// Lightweight prepared-preview snapshot.
    Preview,
    /// Source pages of a prepared report.
    SourcePages,
    /// Clipboard transfer.
    Clipboard,
    /// Undo/redo buffer.
    Undo,
}

impl SerializeTarget {
    /// Whether property names are abbreviated for this target.
    pub fn abbreviates(self) -> bool {
        matches!(self, Self::Preview)
    }

    /// Whether an object's alias is preferred over its item name.
    pub fn uses_alias(self) -> bool {
        matches!(self, Self::Preview | Self::SourcePages)
    }
}

/// Fixed substitution table for the most frequent property names. Preview
/// snapshots repeat these on every object, so one letter each pays off.
const SHORT_NAMES: &[(&str, &str)] = &[
    ("Left", "l"),
    ("Top", "t"),
    ("Width", "w"),
    ("Height", "h"),
    ("Text", "x"),
    ("Font", "f"),
    ("Fill", "e"),
    ("Border", "b"),
    ("Visible", "v"),
    ("Name", "n"),
];

/// Short form of a property name, or the name itself when not in the table.
pub fn short_name(full: &str) -> &str {
    SHORT_NAMES
        .iter()
        .find(|(f, _)| *f == full)
        .map(|(_, s)| *s)
        .unwrap_or(full)
}

/// Full form of an abbreviated property name, or the name itself.
pub fn full_name(short: &str) -> &str {
    SHORT_NAMES
        .iter()
        .find(|(_, s)| *s == short)
        .map(|(f, _)| *f)
        .unwrap_or(short)
}
