use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::{error, warn};

use crate::config::NotifyConfig;
use crate::error::HandleError;
use crate::event::NotificationEvent;
use crate::notify::{IconFile, Notifier};

/// Everything derived from one payload before any effect runs: the console
/// lines to print, the decoded event and the decoded icon bytes, if any.
pub struct Plan {
    pub console: Vec<String>,
    pub event: NotificationEvent,
    pub icon: Option<Vec<u8>>,
}

/// Per-message handler. Decoding and formatting are pure (`plan`); the
/// icon file lifecycle and the notify invocation are applied afterwards
/// (`apply`). Verbosity is fixed at construction time.
pub struct MessageHandler {
    verbose: bool,
    notifier: Notifier,
}

impl MessageHandler {
    pub fn new(verbose: bool, notify: &NotifyConfig) -> Self {
        Self {
            verbose,
            notifier: Notifier::new(notify),
        }
    }

    /// Entry point for the receive loop. Never lets a failure escape:
    /// bad messages are logged and dropped, the loop moves on.
    pub async fn handle(&self, payload: &[u8]) {
        let plan = match self.plan(payload) {
            Ok(plan) => plan,
            Err(e) => {
                warn!(error = %e, payload_len = payload.len(), "invalid payload, dropping message");
                return;
            }
        };

        for line in &plan.console {
            println!("{line}");
        }

        if let Err(e) = self.apply(&plan).await {
            error!(error = %e, app = %plan.event.app, "failed to process message");
        }
    }

    /// Decode the payload and lay out what to do about it.
    pub fn plan(&self, payload: &[u8]) -> Result<Plan, HandleError> {
        let event = NotificationEvent::from_payload(payload)?;

        let icon = match event.icon.as_deref() {
            Some(encoded) => match BASE64.decode(encoded) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!(error = %e, app = %event.app, "invalid base64 icon, showing notification without it");
                    None
                }
            },
            None => None,
        };

        let console = if self.verbose {
            console_summary(&event)
        } else {
            Vec::new()
        };

        Ok(Plan {
            console,
            event,
            icon,
        })
    }

    /// Materialize the icon file, run the notify command, drop the file.
    /// The file is removed on every exit path, including a spawn failure.
    async fn apply(&self, plan: &Plan) -> Result<(), HandleError> {
        let icon_file = match plan.icon.as_deref() {
            Some(bytes) => Some(IconFile::create(bytes).map_err(HandleError::Icon)?),
            None => None,
        };

        let event = &plan.event;
        self.notifier
            .send(
                &event.summary(),
                &event.text,
                event.urgency.to_notify(),
                icon_file.as_ref().map(|f| f.path()),
            )
            .await
            .map_err(HandleError::Notify)
    }
}

fn console_summary(event: &NotificationEvent) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} New notification from {} [{}]",
            event.urgency.marker(),
            event.app,
            event.urgency.as_str().to_uppercase()
        ),
        format!("   Title: {}", event.title),
        format!("   Text: {}", event.text),
    ];
    if !event.category.is_empty() {
        lines.push(format!("   Category: {}", event.category));
    }
    if let Some(time) = event.timestamp_utc() {
        lines.push(format!("   Time: {}", time));
    }
    lines.push(format!("   Package: {}", event.package));
    lines.push(format!(
        "   Urgency: {} (priority: {}, importance: {})",
        event.urgency.as_str(),
        event.priority,
        event.importance
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    fn handler_with_command(verbose: bool, command: &str) -> MessageHandler {
        MessageHandler::new(
            verbose,
            &NotifyConfig {
                command: command.to_string(),
                expire: Duration::from_secs(5),
            },
        )
    }

    /// A notify-send stand-in that records its argv, one argument per
    /// line, and appends ICON_PRESENT when its last argument names an
    /// existing file.
    #[cfg(unix)]
    fn fake_notify(dir: &Path) -> (PathBuf, PathBuf) {
        use std::os::unix::fs::PermissionsExt;

        let out = dir.join("argv.txt");
        let script = dir.join("fake-notify");
        let body = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > \"{out}\"\nfor arg in \"$@\"; do icon=\"$arg\"; done\nif [ -f \"$icon\" ]; then echo ICON_PRESENT >> \"{out}\"; fi\n",
            out = out.display()
        );
        std::fs::write(&script, body).unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();
        (script, out)
    }

    #[test]
    fn malformed_payload_is_a_payload_error() {
        let handler = handler_with_command(true, "notify-send");
        let result = handler.plan(br#"{"title": "x"#);
        assert!(matches!(result, Err(HandleError::Payload(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn malformed_payload_never_invokes_the_command() {
        let dir = tempfile::tempdir().unwrap();
        let (script, out) = fake_notify(dir.path());
        let handler = handler_with_command(false, script.to_str().unwrap());

        handler.handle(br#"{"title": "x"#).await;

        assert!(!out.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn high_urgency_scenario_invokes_critical_without_icon() {
        let dir = tempfile::tempdir().unwrap();
        let (script, out) = fake_notify(dir.path());
        let handler = handler_with_command(false, script.to_str().unwrap());

        handler
            .handle(br#"{"app":"Mail","title":"New message","text":"Hi","urgency":"high"}"#)
            .await;

        let argv = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = argv.lines().collect();
        assert_eq!(
            lines,
            vec!["Mail: New message", "Hi", "-t", "5000", "-u", "critical"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn icon_exists_at_invocation_and_is_gone_afterwards() {
        let dir = tempfile::tempdir().unwrap();
        let (script, out) = fake_notify(dir.path());
        let handler = handler_with_command(false, script.to_str().unwrap());

        let icon_bytes = b"\x89PNG\r\n\x1a\nfake";
        let payload = serde_json::json!({
            "app": "Mail",
            "title": "With icon",
            "icon": BASE64.encode(icon_bytes),
        });
        handler.handle(payload.to_string().as_bytes()).await;

        let argv = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = argv.lines().collect();
        assert!(argv.contains("ICON_PRESENT"));

        let icon_pos = lines.iter().position(|l| *l == "-i").unwrap();
        let icon_path = Path::new(lines[icon_pos + 1]);
        assert!(icon_path.to_string_lossy().ends_with(".png"));
        assert!(!icon_path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn icon_is_removed_when_the_command_fails() {
        use std::os::unix::fs::PermissionsExt;

        // records argv like fake_notify, then fails
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("argv.txt");
        let script = dir.path().join("fake-notify-failing");
        let body = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > \"{out}\"\nexit 7\n",
            out = out.display()
        );
        std::fs::write(&script, body).unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();

        let handler = handler_with_command(false, script.to_str().unwrap());
        let payload = serde_json::json!({"icon": BASE64.encode(b"bytes")});
        handler.handle(payload.to_string().as_bytes()).await;

        let argv = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = argv.lines().collect();
        let icon_pos = lines.iter().position(|l| *l == "-i").unwrap();
        assert!(!Path::new(lines[icon_pos + 1]).exists());
    }

    #[tokio::test]
    async fn spawn_failure_surfaces_as_notify_error() {
        let handler = handler_with_command(false, "/nonexistent/notify-send");
        let plan = handler.plan(b"{}").unwrap();
        let result = handler.apply(&plan).await;
        assert!(matches!(result, Err(HandleError::Notify(_))));
    }

    #[test]
    fn invalid_base64_icon_still_plans_a_notification() {
        let handler = handler_with_command(false, "notify-send");
        let plan = handler
            .plan(br#"{"app":"Mail","title":"T","icon":"@@not-base64@@"}"#)
            .unwrap();
        assert!(plan.icon.is_none());
        assert_eq!(plan.event.summary(), "Mail: T");
    }

    #[test]
    fn daemon_mode_suppresses_console_output_only() {
        let payload =
            br#"{"app":"Mail","title":"T","text":"B","urgency":"low","category":"email"}"#;
        let verbose = handler_with_command(true, "notify-send").plan(payload).unwrap();
        let quiet = handler_with_command(false, "notify-send").plan(payload).unwrap();

        assert!(!verbose.console.is_empty());
        assert!(quiet.console.is_empty());

        // identical notification either way
        assert_eq!(verbose.event.summary(), quiet.event.summary());
        assert_eq!(verbose.event.text, quiet.event.text);
        assert_eq!(
            verbose.event.urgency.to_notify(),
            quiet.event.urgency.to_notify()
        );
        assert_eq!(verbose.icon, quiet.icon);
    }

    #[test]
    fn verbose_summary_lists_event_fields() {
        let handler = handler_with_command(true, "notify-send");
        let plan = handler
            .plan(
                br#"{"app":"Mail","title":"New message","text":"Hi","urgency":"high","category":"email","timestamp":1700000000000,"package":"com.mail"}"#,
            )
            .unwrap();

        let text = plan.console.join("\n");
        assert!(text.contains("🔴"));
        assert!(text.contains("New notification from Mail [HIGH]"));
        assert!(text.contains("Title: New message"));
        assert!(text.contains("Text: Hi"));
        assert!(text.contains("Category: email"));
        assert!(text.contains("Time: 2023-11-14 22:13:20 UTC"));
        assert!(text.contains("Package: com.mail"));
        assert!(text.contains("importance: 3"));
    }
}
