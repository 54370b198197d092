//! Filesystem watching, event filtering and dispatch into the debounce trigger.
//!
//! This crate turns raw `notify` events into [`FileEvent`]s, decides which of
//! them matter through a [`PatternFilter`], and emits the shared
//! [`Trigger`](ptw_core::Trigger) for every relevant change.
//!
//! # Overview
//!
//! - Watch a project directory recursively
//! - Normalise events into created/deleted/modified/moved
//! - Filter events by include and exclude glob patterns
//! - Push the trigger's due time forward on every relevant event
//!
//! Debouncing is not done here: each relevant event simply re-emits the
//! trigger, and the interactive loop fires once the trigger goes quiet.
//!
//! # Crate Dependencies
//!
//! ```text
//! ptw-cli ──► ptw-tui ──► ptw-watcher ──► ptw-core
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
//! let filter = PatternFilter::new(&["*.py"], &[".venv/**"])?;
//! let dispatcher = EventDispatcher::new(Arc::clone(&trigger), filter);
//!
//! let watcher = FileWatcher::start(Utf8Path::new("."), true, dispatcher).await?;
//!
//! loop {
//!     if trigger.check() {
//!         trigger.release();
//!         // run the tests
//!         break;
//!     }
//!     tokio::time::sleep(Duration::from_millis(100)).await;
//! }
//!
//! watcher.shutdown().await?;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod dispatcher;
pub mod error;
pub mod events;
pub mod filter;
pub mod watcher;

pub use dispatcher::EventDispatcher;
pub use error::WatchError;
pub use events::{FileEvent, FileEventKind};
pub use filter::{DEFAULT_PATTERNS, EventFilter, PatternFilter};
pub use watcher::{EventHandler, FileWatcher};
