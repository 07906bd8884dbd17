use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    /// Gemini generative API configuration for the video route
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default derived via field defaults

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Server validations
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        // Model validation
        if self.model.path.is_empty() {
            return Err("model.path must not be empty".into());
        }
        // Gemini validations
        if self.gemini.models.is_empty() {
            return Err("gemini.models must not be empty".into());
        }
        if self.gemini.max_attempts == 0 {
            return Err("gemini.max_attempts must be > 0".into());
        }
        if self.gemini.poll_interval_ms == 0 {
            return Err("gemini.poll_interval_ms must be > 0".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Cap on upload size; video uploads dominate, so the default is generous
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}
fn default_body_limit() -> usize {
    32 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// Classifier artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the exported ONNX classifier
    #[serde(default = "default_model_path")]
    pub path: String,
}

fn default_model_path() -> String {
    "parkinsons_mfcc_model.onnx".into()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

/// Gemini generative API settings
///
/// Several API keys may be configured; quota errors rotate through them.
/// Models are tried in order, falling back to the next entry when one is
/// unavailable or persistently throttled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSettings {
    /// API keys, tried in rotation. May also be supplied via the numbered
    /// `API_KEY_1`..`API_KEY_5` environment variables.
    #[serde(default)]
    pub api_keys: Vec<String>,

    /// Model fallback chain, primary first
    #[serde(default = "default_gemini_models")]
    pub models: Vec<String>,

    /// API origin; tests point this at a local mock
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Delay between file-state polls while the upload is processing
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Per-request timeout (uploads carry whole videos)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Total generation attempts across all keys and models
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_gemini_models() -> Vec<String> {
    vec![
        "models/gemini-2.0-flash".to_string(),
        "models/gemini-1.5-pro".to_string(),
    ]
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_request_timeout_ms() -> u64 {
    120_000
}

fn default_max_attempts() -> u32 {
    20
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            models: default_gemini_models(),
            base_url: default_gemini_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
            None => {
                // Try default root-level file
                let default_path = PathBuf::from("neuroscreen.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., NEUROSCREEN__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("NEUROSCREEN")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let mut merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        // Numbered key variables (API_KEY_1..API_KEY_5) fill in when the
        // config carries no keys of its own.
        if merged.gemini.api_keys.is_empty() {
            merged.gemini.api_keys = (1..=5)
                .filter_map(|i| std::env::var(format!("API_KEY_{i}")).ok())
                .filter(|k| !k.is_empty())
                .collect();
        }
        // Validate
        merged.validate()?;
        Ok(merged)
    }
}
