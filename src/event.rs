use serde::{Deserialize, Deserializer};

/// One inbound notification, reconstructed independently per message.
/// Every field is optional on the wire; missing keys get the defaults
/// below and unknown extra keys are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationEvent {
    #[serde(default = "default_package")]
    pub package: String,
    #[serde(default = "default_app")]
    pub app: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub text: String,
    /// Milliseconds since epoch, display only.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub priority: i64,
    #[serde(default = "default_importance")]
    pub importance: i64,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub category: String,
    /// Base64-encoded PNG bytes.
    #[serde(default)]
    pub icon: Option<String>,
}

fn default_package() -> String {
    "unknown".to_string()
}

fn default_app() -> String {
    "Unknown App".to_string()
}

fn default_title() -> String {
    "Notification".to_string()
}

fn default_importance() -> i64 {
    3
}

impl NotificationEvent {
    pub fn from_payload(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Title shown by the desktop notification.
    pub fn summary(&self) -> String {
        format!("{}: {}", self.app, self.title)
    }

    /// Humanized timestamp, or None when the sender did not provide one.
    pub fn timestamp_utc(&self) -> Option<String> {
        if self.timestamp <= 0 {
            return None;
        }
        chrono::DateTime::from_timestamp_millis(self.timestamp)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
    }
}

/// Sender-side urgency classification. Unknown values fall back to Normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Urgency {
    High,
    #[default]
    Normal,
    Low,
    Minimal,
}

impl<'de> Deserialize<'de> for Urgency {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Urgency::from_wire(&value))
    }
}

impl Urgency {
    fn from_wire(value: &str) -> Self {
        match value {
            "high" => Urgency::High,
            "low" => Urgency::Low,
            "minimal" => Urgency::Minimal,
            _ => Urgency::Normal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::High => "high",
            Urgency::Normal => "normal",
            Urgency::Low => "low",
            Urgency::Minimal => "minimal",
        }
    }

    /// Console marker, one per urgency class.
    pub fn marker(self) -> &'static str {
        match self {
            Urgency::High => "🔴",
            Urgency::Normal => "🟢",
            Urgency::Low => "🔵",
            Urgency::Minimal => "⚪",
        }
    }

    /// Map to the urgency levels the notify command understands.
    pub fn to_notify(self) -> NotifyUrgency {
        match self {
            Urgency::High => NotifyUrgency::Critical,
            Urgency::Low | Urgency::Minimal => NotifyUrgency::Low,
            Urgency::Normal => NotifyUrgency::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyUrgency {
    Low,
    Normal,
    Critical,
}

impl NotifyUrgency {
    pub fn as_arg(self) -> &'static str {
        match self {
            NotifyUrgency::Low => "low",
            NotifyUrgency::Normal => "normal",
            NotifyUrgency::Critical => "critical",
        }
    }
}
