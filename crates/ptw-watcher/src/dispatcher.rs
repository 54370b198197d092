//! Routing of filesystem events into the debounce trigger.

use std::sync::Arc;

use ptw_core::Trigger;
use tracing::{debug, info};

use crate::events::{FileEvent, FileEventKind};
use crate::filter::EventFilter;

/// Filters events and emits the shared [`Trigger`] for relevant ones.
///
/// Runs on the watcher's delivery thread. [`dispatch`](Self::dispatch) never
/// blocks beyond the trigger's O(1) critical section.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use ptw_core::Trigger;
/// use ptw_watcher::{EventDispatcher, FileEvent, FileEventKind, PatternFilter};
///
/// let trigger = Arc::new(Trigger::new(Duration::from_millis(200)));
/// let dispatcher = EventDispatcher::new(Arc::clone(&trigger), PatternFilter::default());
///
/// dispatcher.dispatch(&FileEvent::new(FileEventKind::Modified, "tests/test_x.py"));
/// assert!(trigger.is_active());
/// ```
#[derive(Debug)]
pub struct EventDispatcher<F> {
    trigger: Arc<Trigger>,
    filter: F,
}

impl<F: EventFilter> EventDispatcher<F> {
    /// Creates a dispatcher emitting `trigger` for events accepted by `filter`.
    #[must_use]
    pub const fn new(trigger: Arc<Trigger>, filter: F) -> Self {
        Self { trigger, filter }
    }

    /// Returns the filter in use.
    #[must_use]
    pub const fn filter(&self) -> &F {
        &self.filter
    }

    /// Returns `true` if `event` is of a watched kind and passes the filter.
    #[must_use]
    pub fn is_watched(&self, event: &FileEvent) -> bool {
        if !is_watched_kind(event.kind) {
            return false;
        }
        self.filter.is_watched(&event.paths())
    }

    /// Emits the trigger if `event` is watched.
    ///
    /// Returns whether the trigger was emitted.
    pub fn dispatch(&self, event: &FileEvent) -> bool {
        if self.is_watched(event) {
            self.trigger.emit();
            info!("{} {}", event.src_path, event.kind);
            true
        } else {
            debug!(kind = %event.kind, src = %event.src_path, "IGNORED event");
            false
        }
    }
}

/// The event kinds that can trigger a run.
const fn is_watched_kind(kind: FileEventKind) -> bool {
    matches!(
        kind,
        FileEventKind::Created
            | FileEventKind::Deleted
            | FileEventKind::Modified
            | FileEventKind::Moved
    )
}
