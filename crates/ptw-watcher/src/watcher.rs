//! Recursive file watcher feeding an [`EventHandler`].
//!
//! This module provides the [`FileWatcher`] type that owns a `notify`
//! watcher for the lifetime of a watch session.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Blocking Thread (spawn_blocking)                │
//! │  owns RecommendedWatcher, parks on the shutdown signal          │
//! └─────────────────────────────────────────────────────────────────┘
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 notify delivery thread                          │
//! │  notify::Event ─► FileEvent::from_notify ─► EventHandler        │
//! │                                         (EventDispatcher ─► Trigger)
//! └─────────────────────────────────────────────────────────────────┘
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Async Runtime (tokio)                           │
//! │  FileWatcher::start ◄── ready signal                            │
//! │  FileWatcher::shutdown ──► shutdown signal, then join           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use camino::Utf8Path;
//! use ptw_core::Trigger;
//! use ptw_watcher::{EventDispatcher, FileWatcher, PatternFilter};
//!
//! # async fn example() -> Result<(), ptw_watcher::WatchError> {
//! let trigger = Arc::new(Trigger::new(Duration::from_millis(200)));
//! let dispatcher = EventDispatcher::new(Arc::clone(&trigger), PatternFilter::default());
//!
//! let watcher = FileWatcher::start(Utf8Path::new("."), true, dispatcher).await?;
//! // ... poll `trigger` ...
//! watcher.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use notify::{RecursiveMode, Watcher};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::dispatcher::EventDispatcher;
use crate::error::WatchError;
use crate::events::FileEvent;
use crate::filter::EventFilter;

/// Receives normalised events on the watcher's delivery thread.
pub trait EventHandler: Send + 'static {
    /// Handles one event. Must not block.
    fn handle(&mut self, event: FileEvent);
}

impl<F: EventFilter> EventHandler for EventDispatcher<F> {
    fn handle(&mut self, event: FileEvent) {
        self.dispatch(&event);
    }
}

impl<T> EventHandler for T
where
    T: FnMut(FileEvent) + Send + 'static,
{
    fn handle(&mut self, event: FileEvent) {
        self(event);
    }
}

/// A running recursive watch on a directory.
///
/// # Lifecycle
///
/// 1. **Start**: [`FileWatcher::start`] validates the path, spawns a blocking
///    task owning the notify watcher and waits until the watch is registered.
///    A watch that cannot be registered is reported as an error here.
///
/// 2. **Delivery**: every event is normalised and handed to the handler on
///    notify's delivery thread.
///
/// 3. **Shutdown**: [`FileWatcher::shutdown`] signals the task to drop the
///    watcher and waits for it to finish. Dropping a `FileWatcher` sends the
///    signal without waiting.
pub struct FileWatcher {
    /// Shutdown signal sender. `None` once shutdown has been initiated.
    shutdown_tx: Option<oneshot::Sender<()>>,

    /// Handle to the blocking task owning the notify watcher.
    task_handle: Option<JoinHandle<()>>,

    /// The canonical path being watched.
    watch_path: Utf8PathBuf,
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("watch_path", &self.watch_path)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl FileWatcher {
    /// Starts watching `path`, delivering events to `handler`.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathNotFound`] if the path doesn't exist,
    /// [`WatchError::Notify`] if the watch cannot be registered, and
    /// [`WatchError::TaskFailed`] if the watch task dies during startup.
    pub async fn start<H: EventHandler>(
        path: &Utf8Path,
        recursive: bool,
        handler: H,
    ) -> Result<Self, WatchError> {
        if !path.exists() {
            return Err(WatchError::path_not_found(path));
        }

        let watch_path = path.canonicalize_utf8()?;

        let (ready_tx, ready_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task_path = watch_path.clone();
        let task_handle = tokio::task::spawn_blocking(move || {
            run_watcher_loop(&task_path, recursive, handler, ready_tx, shutdown_rx);
        });

        match ready_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                let _ = task_handle.await;
                return Err(error);
            }
            Err(_closed) => return Err(WatchError::TaskFailed),
        }

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
            watch_path,
        })
    }

    /// Returns the canonical path being watched.
    #[must_use]
    pub fn watch_path(&self) -> &Utf8Path {
        &self.watch_path
    }

    /// Returns `true` if the watch task is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some() && self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the watch and waits for the watch task to finish.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::TaskFailed`] if the watch task panicked.
    pub async fn shutdown(mut self) -> Result<(), WatchError> {
        if let Some(tx) = self.shutdown_tx.take() {
            // Ignore error if the task has already exited
            let _ = tx.send(());
        }

        if let Some(handle) = self.task_handle.take() {
            handle.await.map_err(|_join_error| WatchError::TaskFailed)?;
        }

        Ok(())
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Owns the notify watcher until the shutdown signal arrives.
///
/// Runs inside `spawn_blocking`. The startup outcome is reported through
/// `ready_tx` exactly once.
fn run_watcher_loop<H: EventHandler>(
    path: &Utf8Path,
    recursive: bool,
    mut handler: H,
    ready_tx: oneshot::Sender<Result<(), WatchError>>,
    shutdown_rx: oneshot::Receiver<()>,
) {
    let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
        Ok(event) => {
            for file_event in FileEvent::from_notify(event) {
                handler.handle(file_event);
            }
        }
        Err(error) => warn!(error = %error, "Watch error"),
    });

    let mut watcher = match watcher {
        Ok(watcher) => watcher,
        Err(error) => {
            let _ = ready_tx.send(Err(error.into()));
            return;
        }
    };

    let mode = if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };

    if let Err(error) = watcher.watch(path.as_std_path(), mode) {
        let _ = ready_tx.send(Err(error.into()));
        return;
    }

    info!(path = %path, recursive, "File watcher started");

    if ready_tx.send(Ok(())).is_err() {
        // Nobody is waiting for us any more.
        return;
    }

    let _ = shutdown_rx.blocking_recv();

    drop(watcher);
    info!(path = %path, "File watcher stopped");
}
