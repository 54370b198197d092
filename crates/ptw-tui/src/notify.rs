//! Desktop notifications for failed runs.
//!
//! - **macOS**: `osascript` AppleScript `display notification`
//! - **Windows / Linux**: the `notify_rust` crate
//!
//! Delivery is fire-and-forget. Failures are logged and never reach the loop.

use crate::runner::RunOutcome;

/// How long a notification stays visible where the platform lets us choose.
#[cfg(not(target_os = "macos"))]
const NOTIFICATION_TIMEOUT_MS: u32 = 5_000;

/// Delivers a notification to the user.
pub trait Notifier: Send {
    /// Shows `message` under `title`.
    fn notify(&self, title: &str, message: &str);
}

/// Sends native desktop notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) {
        #[cfg(not(target_os = "macos"))]
        {
            use notify_rust::Notification;

            if let Err(e) = Notification::new()
                .summary(title)
                .body(message)
                .timeout(notify_rust::Timeout::Milliseconds(NOTIFICATION_TIMEOUT_MS))
                .show()
            {
                tracing::warn!(error = %e, "Failed to send desktop notification");
            }
        }

        #[cfg(target_os = "macos")]
        {
            let script = format!(
                r#"display notification "{}" with title "{}""#,
                escape_for_applescript(message),
                escape_for_applescript(title),
            );
            if let Err(e) = std::process::Command::new("osascript")
                .arg("-e")
                .arg(&script)
                .output()
            {
                tracing::warn!(error = %e, "Failed to send macOS desktop notification");
            }
        }
    }
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _title: &str, _message: &str) {}
}

/// Builds the notification body for a failed run.
#[must_use]
pub fn failure_message(runner: &str, outcome: RunOutcome) -> String {
    match outcome.code {
        Some(code) => format!("{runner} exited with code {code}"),
        None => format!("{runner} was terminated by a signal"),
    }
}

/// Escapes a string for embedding inside an AppleScript double-quoted string.
///
/// Backslashes are escaped first so later replacements are not doubled.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn escape_for_applescript(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message() {
        assert_eq!(
            failure_message("pytest", RunOutcome { code: Some(1) }),
            "pytest exited with code 1"
        );
        assert_eq!(
            failure_message("pytest", RunOutcome { code: None }),
            "pytest was terminated by a signal"
        );
    }

    #[test]
    fn test_escape_for_applescript() {
        assert_eq!(
            escape_for_applescript(r#"say "hi" \ bye"#),
            r#"say \"hi\" \\ bye"#
        );
        assert_eq!(escape_for_applescript("a\nb"), "a\\nb");
    }
}
