/// Desktop notifications
/// Currently only implements macOS notifications

#[cfg(target_os = "macos")]
use std::process::Command;

use crate::session::PhaseCompletion;

/// Notification title and body for a finished phase
pub fn phase_message(completion: &PhaseCompletion) -> (String, String) {
    let title = format!("Pomodo - {} finished", completion.finished.label());
    let mut body = format!("Next up: {}", completion.next.label());
    if let (Some(name), Some(count)) = (&completion.task_name, completion.completed_sessions) {
        body = format!("{name}: {count} sessions done. {body}");
    }
    (title, body)
}

/// Send a notification when a phase runs out
pub fn notify_phase_complete(completion: &PhaseCompletion) {
    let (title, body) = phase_message(completion);

    #[cfg(target_os = "macos")]
    {
        let script = format!(
            r#"display notification "{}" with title "{}" sound name "Glass""#,
            body.replace('"', "\\\""),
            title.replace('"', "\\\"")
        );

        if let Err(error) = Command::new("osascript").arg("-e").arg(&script).output() {
            tracing::debug!(%error, "notification failed");
        }
    }

    #[cfg(not(target_os = "macos"))]
    {
        // No-op on other platforms
        tracing::debug!(%title, %body, "phase notification");
    }
}
