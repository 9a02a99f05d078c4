//! Watch events as seen by the dispatcher.

use std::path::PathBuf;

use notify::event::{CreateKind, EventKind, ModifyKind, RenameMode};

/// Operation carried by a [`WatchEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventKind {
    /// A file appeared in the folder (created, or renamed into place).
    Create,
    /// Anything else; ignored by the dispatcher.
    Other,
}

/// A single filesystem notification for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    /// Path the event concerns.
    pub path: PathBuf,
    /// Operation observed.
    pub kind: WatchEventKind,
}

impl WatchEvent {
    /// Creates a creation event for `path`.
    pub fn created(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: WatchEventKind::Create,
        }
    }

    /// Creates an event the dispatcher will ignore.
    pub fn other(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: WatchEventKind::Other,
        }
    }

    /// Returns true for creation events.
    #[must_use]
    pub fn is_create(&self) -> bool {
        self.kind == WatchEventKind::Create
    }
}

/// Splits a notify event into per-path watch events.
///
/// Renames into the folder count as creations of the destination, since
/// many writers download to a temp name and rename when done. Only the
/// rename-to half is used: inotify follows a same-folder rename's `To` with
/// a paired `Both` event for the same destination.
pub(crate) fn from_notify(event: &notify::Event) -> Vec<WatchEvent> {
    match event.kind {
        EventKind::Create(CreateKind::Folder) => {
            event.paths.iter().cloned().map(WatchEvent::other).collect()
        }
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            event.paths.iter().cloned().map(WatchEvent::created).collect()
        }
        _ => event.paths.iter().cloned().map(WatchEvent::other).collect(),
    }
}
