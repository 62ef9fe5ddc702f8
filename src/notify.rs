use std::io::Write;
use std::path::Path;
use std::time::Duration;

use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::debug;

use crate::config::NotifyConfig;
use crate::event::NotifyUrgency;

/// Invokes the external notification-display command (notify-send by
/// default). Display failures are not escalated; only a failure to spawn
/// the command at all reaches the caller.
pub struct Notifier {
    command: String,
    expire: Duration,
}

impl Notifier {
    pub fn new(config: &NotifyConfig) -> Self {
        Self {
            command: config.command.clone(),
            expire: config.expire,
        }
    }

    /// The argv passed to the notify command, minus the program itself.
    pub fn args(
        &self,
        summary: &str,
        body: &str,
        urgency: NotifyUrgency,
        icon: Option<&Path>,
    ) -> Vec<String> {
        let mut args = vec![
            summary.to_string(),
            body.to_string(),
            "-t".to_string(),
            self.expire.as_millis().to_string(),
            "-u".to_string(),
            urgency.as_arg().to_string(),
        ];
        if let Some(path) = icon {
            args.push("-i".to_string());
            args.push(path.display().to_string());
        }
        args
    }

    pub async fn send(
        &self,
        summary: &str,
        body: &str,
        urgency: NotifyUrgency,
        icon: Option<&Path>,
    ) -> std::io::Result<()> {
        let args = self.args(summary, body, urgency, icon);
        let status = Command::new(&self.command).args(&args).status().await?;
        if !status.success() {
            debug!(command = %self.command, code = ?status.code(), "notify command exited non-zero");
        }
        Ok(())
    }
}

/// Scoped temporary icon file: uniquely named, `.png` suffixed, removed
/// when dropped on every exit path.
pub struct IconFile {
    file: NamedTempFile,
}

impl IconFile {
    pub fn create(bytes: &[u8]) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("mqtt-notify-")
            .suffix(".png")
            .tempfile()?;
        file.as_file_mut().write_all(bytes)?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn notifier() -> Notifier {
        Notifier::new(&NotifyConfig::default())
    }

    #[test]
    fn args_without_icon() {
        let args = notifier().args("Mail: New message", "Hi", NotifyUrgency::Critical, None);
        assert_eq!(
            args,
            vec!["Mail: New message", "Hi", "-t", "5000", "-u", "critical"]
        );
    }

    #[test]
    fn args_with_icon_path() {
        let icon = PathBuf::from("/tmp/mqtt-notify-abc123.png");
        let args = notifier().args("App: Title", "", NotifyUrgency::Low, Some(&icon));
        assert_eq!(
            args,
            vec![
                "App: Title",
                "",
                "-t",
                "5000",
                "-u",
                "low",
                "-i",
                "/tmp/mqtt-notify-abc123.png"
            ]
        );
    }

    #[test]
    fn expire_is_reported_in_milliseconds() {
        let notifier = Notifier::new(&NotifyConfig {
            command: "notify-send".to_string(),
            expire: Duration::from_secs(10),
        });
        let args = notifier.args("a", "b", NotifyUrgency::Normal, None);
        assert_eq!(args[3], "10000");
    }

    #[test]
    fn icon_file_holds_exact_bytes_and_vanishes_on_drop() {
        let bytes = b"\x89PNG\r\n\x1a\nnot really a png";
        let icon = IconFile::create(bytes).unwrap();
        let path = icon.path().to_path_buf();

        assert!(path.exists());
        assert!(path.extension().is_some_and(|ext| ext == "png"));
        assert_eq!(std::fs::read(&path).unwrap(), bytes);

        drop(icon);
        assert!(!path.exists());
    }

    #[test]
    fn concurrent_icon_files_get_distinct_paths() {
        let a = IconFile::create(b"a").unwrap();
        let b = IconFile::create(b"b").unwrap();
        assert_ne!(a.path(), b.path());
    }
}
