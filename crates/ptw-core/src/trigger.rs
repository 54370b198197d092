//! Debounced run trigger.
//!
//! A [`Trigger`] records whether a test run has been requested and when it
//! becomes due. The filesystem-event thread pushes the due time forward with
//! [`Trigger::emit`] on every relevant change, so a burst of saves collapses
//! into one run scheduled `delay` after the *last* event. The interactive loop
//! polls [`Trigger::check`] and calls [`Trigger::release`] once the run has
//! been launched.
//!
//! # State
//!
//! ```text
//!            emit / emit_now                check() == true
//!   IDLE ─────────────────────► PENDING ─────────────────────► DUE
//!    ▲                            │ ▲ emit (pushes due time)    │
//!    │                            └─┘                           │
//!    └──────────────────────────── release ◄────────────────────┘
//! ```
//!
//! # Examples
//!
//! ```
//! use ptw_core::Trigger;
//! use std::time::Duration;
//!
//! let trigger = Trigger::new(Duration::from_secs(60));
//! assert!(!trigger.is_active());
//!
//! trigger.emit();
//! assert!(trigger.is_active());
//! assert!(!trigger.check()); // still inside the debounce window
//!
//! trigger.emit_now();
//! assert!(trigger.check());
//!
//! trigger.release();
//! assert!(!trigger.check());
//! ```

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Thread-safe holder of the next due time for a test run.
///
/// All reads and writes of the due time go through one lock, so the event
/// thread and the interactive loop never observe a torn value. Every
/// operation is O(1) and never blocks for longer than the critical section.
#[derive(Debug)]
pub struct Trigger {
    /// When the requested run becomes due. `None` means no run is requested.
    due_at: Mutex<Option<Instant>>,

    /// Quiet period applied by [`Trigger::emit`].
    delay: Duration,
}

impl Trigger {
    /// Creates an inactive trigger with the given debounce delay.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            due_at: Mutex::new(None),
            delay,
        }
    }

    /// Requests a run `delay` from now.
    ///
    /// Calling this again before the run is released pushes the due time
    /// forward.
    pub fn emit(&self) {
        *self.due_at.lock() = Some(Instant::now() + self.delay);
    }

    /// Requests a run that is due immediately, bypassing the debounce delay.
    pub fn emit_now(&self) {
        *self.due_at.lock() = Some(Instant::now());
    }

    /// Clears any pending request.
    pub fn release(&self) {
        *self.due_at.lock() = None;
    }

    /// Returns `true` if a run has been requested, due or not.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.due_at.lock().is_some()
    }

    /// Returns `true` if a run has been requested and its due time has passed.
    #[must_use]
    pub fn check(&self) -> bool {
        self.due_at.lock().is_some_and(|due| Instant::now() >= due)
    }

    /// Returns the current due time, if a run is requested.
    #[must_use]
    pub fn due_at(&self) -> Option<Instant> {
        *self.due_at.lock()
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_trigger_is_inactive() {
        let trigger = Trigger::new(Duration::from_millis(200));
        assert!(!trigger.is_active());
        assert!(!trigger.check());
        assert!(trigger.due_at().is_none());
    }

    #[test]
    fn test_emit_sets_due_time_after_delay() {
        let delay = Duration::from_millis(200);
        let trigger = Trigger::new(delay);

        let before = Instant::now();
        trigger.emit();
        let after = Instant::now();

        let due = trigger.due_at().expect("trigger should be active");
        assert!(due >= before + delay);
        assert!(due <= after + delay);
        assert!(trigger.is_active());
    }

    #[test]
    fn test_check_waits_for_delay() {
        let trigger = Trigger::new(Duration::from_millis(60));
        trigger.emit();
        assert!(!trigger.check());

        thread::sleep(Duration::from_millis(90));
        assert!(trigger.check());
        // Stays due until released.
        assert!(trigger.check());
    }

    #[test]
    fn test_repeated_emit_pushes_due_time_forward() {
        let trigger = Trigger::new(Duration::from_millis(100));

        trigger.emit();
        let first = trigger.due_at().expect("active");

        thread::sleep(Duration::from_millis(60));
        trigger.emit();
        let second = trigger.due_at().expect("active");

        assert!(second > first);
        assert!(!trigger.check());

        thread::sleep(Duration::from_millis(60));
        // 120ms after the first emit, but only 60ms after the last one.
        assert!(!trigger.check());

        thread::sleep(Duration::from_millis(80));
        assert!(trigger.check());
    }

    #[test]
    fn test_emit_now_is_immediately_due() {
        let trigger = Trigger::new(Duration::from_secs(3600));
        trigger.emit_now();
        assert!(trigger.is_active());
        assert!(trigger.check());
    }

    #[test]
    fn test_emit_now_overrides_pending_emit() {
        let trigger = Trigger::new(Duration::from_secs(3600));
        trigger.emit();
        assert!(!trigger.check());

        trigger.emit_now();
        assert!(trigger.check());
    }

    #[test]
    fn test_release_clears_trigger() {
        let trigger = Trigger::new(Duration::ZERO);
        trigger.emit_now();
        assert!(trigger.check());

        trigger.release();
        assert!(!trigger.check());
        assert!(!trigger.is_active());
    }

    #[test]
    fn test_concurrent_emit_and_check() {
        let trigger = Arc::new(Trigger::new(Duration::from_secs(3600)));

        let producer = {
            let trigger = Arc::clone(&trigger);
            thread::spawn(move || {
                for _ in 0..1_000 {
                    trigger.emit();
                }
            })
        };

        for _ in 0..1_000 {
            // Never due: the delay is an hour.
            assert!(!trigger.check());
        }

        producer.join().expect("producer thread panicked");
        assert!(trigger.is_active());
    }
}
