//! Folder watching and per-event dispatch.
//!
//! # Architecture
//!
//! ```text
//! notify watcher thread          tokio runtime
//! ┌──────────────────┐   mpsc   ┌────────────┐   spawn   ┌──────────────┐
//! │ FolderWatcher    │ ───────► │ Dispatcher │ ────────► │ UploadEngine │ (one task per file)
//! │ (create/rename)  │          │ (filter)   │           └──────────────┘
//! └──────────────────┘          └────────────┘
//! ```
//!
//! The dispatcher only ends on shutdown or a fatal [`WatchError`]; per-file
//! failures stay inside their task.

mod dispatcher;
mod error;
mod event;
mod watcher;

pub use dispatcher::{
    DEFAULT_CONCURRENCY, DEFAULT_SETTLE_DELAY, DispatchOptions, DispatchStats, Dispatcher,
};
pub use error::WatchError;
pub use event::{WatchEvent, WatchEventKind};
pub use watcher::{DEFAULT_EVENT_CAPACITY, EventReceiver, FolderWatcher};
