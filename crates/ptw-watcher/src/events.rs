//! Event types for file change notifications.
//!
//! Raw `notify` events are normalised into [`FileEvent`]s carrying one of a
//! small set of [`FileEventKind`]s, a source path, and for moves a
//! destination path.
//!
//! # Event Flow
//!
//! ```text
//! notify::Event (watcher thread)
//!        │  FileEvent::from_notify
//!        ▼
//!   FileEvent { kind, src_path, dest_path }
//!        │  EventDispatcher::dispatch
//!        ▼
//!   PatternFilter ──► Trigger::emit
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use camino::Utf8PathBuf;
use notify::EventKind;
use notify::event::{ModifyKind, RenameMode};
use smallvec::SmallVec;

use crate::error::WatchError;

/// The kind of change a [`FileEvent`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileEventKind {
    /// A file or directory was created.
    Created,
    /// A file or directory was removed.
    Deleted,
    /// File contents or metadata changed.
    Modified,
    /// A file or directory was renamed; the event carries both paths.
    Moved,
    /// Anything else (access, close, unknown). Never triggers a run.
    Other,
}

impl FileEventKind {
    /// Returns a short lowercase label for logging.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Deleted => "deleted",
            Self::Modified => "modified",
            Self::Moved => "moved",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FileEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A normalised filesystem event.
///
/// # Examples
///
/// ```
/// use ptw_watcher::{FileEvent, FileEventKind};
///
/// let event = FileEvent::moved("a.tmp", "a.py");
/// assert_eq!(event.kind, FileEventKind::Moved);
/// assert_eq!(event.paths().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// What happened.
    pub kind: FileEventKind,

    /// The path the event happened to. For moves, the old path.
    pub src_path: Utf8PathBuf,

    /// The new path of a moved file. `None` for every other kind.
    pub dest_path: Option<Utf8PathBuf>,

    /// When the event was received.
    pub timestamp: Instant,
}

impl FileEvent {
    /// Creates a single-path event of the given kind.
    #[must_use]
    pub fn new(kind: FileEventKind, src_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            kind,
            src_path: src_path.into(),
            dest_path: None,
            timestamp: Instant::now(),
        }
    }

    /// Creates a move event from `src_path` to `dest_path`.
    #[must_use]
    pub fn moved(src_path: impl Into<Utf8PathBuf>, dest_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            kind: FileEventKind::Moved,
            src_path: src_path.into(),
            dest_path: Some(dest_path.into()),
            timestamp: Instant::now(),
        }
    }

    /// Returns the paths relevant to filtering: the source path, followed by
    /// the destination path for moves.
    #[must_use]
    pub fn paths(&self) -> SmallVec<[&camino::Utf8Path; 2]> {
        let mut paths = SmallVec::new();
        paths.push(self.src_path.as_path());
        if let Some(dest) = &self.dest_path {
            paths.push(dest.as_path());
        }
        paths
    }

    /// Normalises a raw `notify` event.
    ///
    /// One notify event may name several paths; each becomes its own
    /// [`FileEvent`], except a two-path rename which becomes a single move.
    /// Paths that are not valid UTF-8 are skipped.
    #[must_use]
    pub fn from_notify(event: notify::Event) -> SmallVec<[Self; 2]> {
        let kind = classify(event.kind);
        let mut paths = event.paths.into_iter().filter_map(|path| match utf8_path(path) {
            Ok(path) => Some(path),
            Err(error) => {
                tracing::warn!(error = %error, "Skipping file event");
                None
            }
        });

        let mut events = SmallVec::new();

        if kind == FileEventKind::Moved {
            if let (Some(src), Some(dest)) = (paths.next(), paths.next()) {
                events.push(Self::moved(src, dest));
            }
            return events;
        }

        events.extend(paths.map(|path| Self::new(kind, path)));
        events
    }
}

/// Maps a notify event kind onto a [`FileEventKind`].
///
/// Half renames (only the old or only the new name known) are reported as a
/// deletion or a creation respectively.
fn classify(kind: EventKind) -> FileEventKind {
    match kind {
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            FileEventKind::Created
        }
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            FileEventKind::Deleted
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => FileEventKind::Moved,
        EventKind::Modify(_) => FileEventKind::Modified,
        EventKind::Access(_) | EventKind::Any | EventKind::Other => FileEventKind::Other,
    }
}

fn utf8_path(path: PathBuf) -> Result<Utf8PathBuf, WatchError> {
    Utf8PathBuf::from_path_buf(path).map_err(WatchError::NonUtf8Path)
}
