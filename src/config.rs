use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MqttConfig {
    pub host: String,
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
    pub topic: String,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(with = "humantime_serde", default = "default_keep_alive")]
    pub keep_alive: Duration,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifyConfig {
    /// The external notification-display command, notify-send compatible.
    #[serde(default = "default_notify_command")]
    pub command: String,
    #[serde(with = "humantime_serde", default = "default_expire")]
    pub expire: Duration,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub console: ConsoleLogging,
    #[serde(default)]
    pub file: FileLogging,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConsoleLogging {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_console_level")]
    pub level: String,
    #[serde(default = "default_true")]
    pub colors: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FileLogging {
    #[serde(default = "default_false")]
    pub enabled: bool,
    #[serde(default = "default_file_level")]
    pub level: String,
    #[serde(default = "default_log_path")]
    pub path: PathBuf,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_client_id() -> String {
    "mqtt-notify-bridge".to_string()
}

fn default_keep_alive() -> Duration {
    Duration::from_secs(60)
}

fn default_notify_command() -> String {
    "notify-send".to_string()
}

fn default_expire() -> Duration {
    Duration::from_secs(5)
}

fn default_console_level() -> String {
    "info".to_string()
}

fn default_file_level() -> String {
    "debug".to_string()
}

fn default_log_path() -> PathBuf {
    PathBuf::from("logs/mqtt-notify-bridge.log")
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            command: default_notify_command(),
            expire: default_expire(),
        }
    }
}

impl Default for ConsoleLogging {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            colors: true,
        }
    }
}

impl Default for FileLogging {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "debug".to_string(),
            path: default_log_path(),
        }
    }
}

// Public function to load configuration
pub fn load_config(path: &str) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        // Primary format is YAML
        .add_source(config::File::with_name(path))
        // Add environment variable overrides, e.g. APP_MQTT__HOST
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?;

    settings.try_deserialize()
}
