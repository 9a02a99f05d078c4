//! Content-kind classification for dropped files.
//!
//! Classification is a pure suffix match on the file's base name. It never
//! touches the filesystem and never fails: anything that is not a recognized
//! descriptor comes back as [`ContentKind::Unrecognized`].

use std::fmt;
use std::path::{Path, PathBuf};

/// Suffix of binary torrent metadata files.
pub const TORRENT_EXTENSION: &str = ".torrent";

/// Suffix of text files holding a single magnet URI.
pub const MAGNET_EXTENSION: &str = ".magnet";

/// Suffix of usenet NZB payloads.
pub const NZB_EXTENSION: &str = ".nzb";

/// Every suffix the watcher forwards to the upload engine.
pub const WATCHED_EXTENSIONS: [&str; 3] = [TORRENT_EXTENSION, MAGNET_EXTENSION, NZB_EXTENSION];

/// Role of a dropped file, derived from its suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// `.torrent` metadata, uploaded as a binary form part.
    Torrent,
    /// `.magnet` descriptor, submitted as a text field.
    Magnet,
    /// `.nzb` payload, uploaded as a binary form part with a name.
    Usenet,
    /// Anything else. Never reaches the transport.
    Unrecognized,
}

impl ContentKind {
    /// Returns the stable lowercase label used in log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Torrent => "torrent",
            Self::Magnet => "magnet",
            Self::Usenet => "usenet",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Returns true for kinds the transport knows how to submit.
    #[must_use]
    pub fn is_recognized(self) -> bool {
        !matches!(self, Self::Unrecognized)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a path by the suffix of its base name.
///
/// Matching is case-sensitive: `movie.TORRENT` is unrecognized. Directory
/// components are ignored, so separators or spaces elsewhere in the path do
/// not affect the result.
#[must_use]
pub fn classify(path: &Path) -> ContentKind {
    let Some(name) = base_name(path) else {
        return ContentKind::Unrecognized;
    };

    if name.ends_with(TORRENT_EXTENSION) {
        ContentKind::Torrent
    } else if name.ends_with(MAGNET_EXTENSION) {
        ContentKind::Magnet
    } else if name.ends_with(NZB_EXTENSION) {
        ContentKind::Usenet
    } else {
        ContentKind::Unrecognized
    }
}

/// Cheap pre-filter used by the dispatcher before any task is spawned.
///
/// Mirrors the set recognized by [`classify`], so temp files such as
/// `movie.torrent.part` are dropped here.
#[must_use]
pub fn is_watched(path: &Path) -> bool {
    base_name(path).is_some_and(|name| WATCHED_EXTENSIONS.iter().any(|ext| name.ends_with(ext)))
}

/// Replaces every whitespace character in `name` with `separator`.
#[must_use]
pub fn sanitize_filename(name: &str, separator: char) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { separator } else { c })
        .collect()
}

fn base_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// One upload to perform, built once per qualifying watch event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// File to read the payload from.
    pub source_path: PathBuf,
    /// Classified role of the file.
    pub kind: ContentKind,
    /// Name reported to the service: base name, `.nzb` stripped for usenet.
    pub display_name: String,
}

impl UploadRequest {
    /// Builds a request for `path`, or `None` when the path is unrecognized.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let kind = classify(path);
        if !kind.is_recognized() {
            return None;
        }

        let file_name = base_name(path)?;
        let display_name = match kind {
            ContentKind::Usenet => file_name
                .strip_suffix(NZB_EXTENSION)
                .unwrap_or(&file_name)
                .to_string(),
            _ => file_name,
        };

        Some(Self {
            source_path: path.to_path_buf(),
            kind,
            display_name,
        })
    }

    /// Returns the request with whitespace in the display name replaced by `_`.
    #[must_use]
    pub fn with_sanitized_name(mut self) -> Self {
        self.display_name = sanitize_filename(&self.display_name, '_');
        self
    }

    /// Base filename of the source, used as the multipart file name.
    #[must_use]
    pub fn file_name(&self) -> String {
        base_name(&self.source_path).unwrap_or_else(|| self.display_name.clone())
    }
}
