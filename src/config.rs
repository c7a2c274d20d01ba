use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::error;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_MODEL: &str = "qwen2.5-coder";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_DEBOUNCE_MS: u64 = 4000;
const DEFAULT_SUPPRESS_MS: u64 = 1000;
const DEFAULT_MAX_SCAN_FILES: usize = 200;
const DEFAULT_MAX_SYMBOLS_PER_FILE: usize = 30;

const CONFIG_FILE: &str = "ghostline.toml";

// ─── EndpointConfig ───────────────────────────────────────────────────────────

/// Inference endpoint configuration (`[endpoint]` in ghostline.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL of the local inference service. Default: http://127.0.0.1:11434.
    pub base_url: String,
    /// Model name sent in the request body. Default: "qwen2.5-coder".
    pub model: String,
    /// Per-request timeout in seconds. Default: 120.
    pub timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl EndpointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ─── TriggerConfig ────────────────────────────────────────────────────────────

/// Auto-trigger configuration (`[trigger]` in ghostline.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Start with auto-triggered completions enabled. Default: true.
    pub auto_trigger: bool,
    /// Trailing-edge debounce delay after the last qualifying edit (ms). Default: 4000.
    pub debounce_ms: u64,
    /// Self-edit suppression window raised after an accept (ms). Default: 1000.
    pub suppress_ms: u64,
    /// File extensions for which auto-trigger is forced off. Default: ["sql", "md"].
    pub disallowed_extensions: Vec<String>,
    /// Language labels for which auto-trigger is forced off. Default: ["SQL", "Markdown"].
    pub disallowed_languages: Vec<String>,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            auto_trigger: true,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            suppress_ms: DEFAULT_SUPPRESS_MS,
            disallowed_extensions: vec!["sql".to_string(), "md".to_string()],
            disallowed_languages: vec!["SQL".to_string(), "Markdown".to_string()],
        }
    }
}

impl TriggerConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn suppress(&self) -> Duration {
        Duration::from_millis(self.suppress_ms)
    }
}

// ─── ScanConfig ───────────────────────────────────────────────────────────────

/// Project summary scan limits (`[scan]` in ghostline.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum number of files included in one project summary. Default: 200.
    pub max_files: usize,
    /// Maximum symbols listed per file. Default: 30.
    pub max_symbols_per_file: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_SCAN_FILES,
            max_symbols_per_file: DEFAULT_MAX_SYMBOLS_PER_FILE,
        }
    }
}

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `{config_dir}/ghostline.toml` — all sections are optional overrides.
/// Priority: env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// Log level filter string, e.g. "debug", "info,ghostline=trace".
    log: Option<String>,
    /// Log output format: "pretty" (default) | "json".
    log_format: Option<String>,
    endpoint: Option<EndpointConfig>,
    trigger: Option<TriggerConfig>,
    scan: Option<ScanConfig>,
}

fn load_toml(config_dir: &Path) -> Option<TomlConfig> {
    let path = config_dir.join(CONFIG_FILE);
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse ghostline.toml — using defaults");
            None
        }
    }
}

// ─── EngineConfig ─────────────────────────────────────────────────────────────

/// Complete engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Log level filter string (GHOSTLINE_LOG env var, default: "info").
    pub log: String,
    /// Log output format: "pretty" (default) | "json".
    pub log_format: String,
    pub endpoint: EndpointConfig,
    pub trigger: TriggerConfig,
    pub scan: ScanConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log: "info".to_string(),
            log_format: "pretty".to_string(),
            endpoint: EndpointConfig::default(),
            trigger: TriggerConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Build config from env vars + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. Env vars — GHOSTLINE_BASE_URL, GHOSTLINE_MODEL, GHOSTLINE_LOG
    ///   2. TOML file at `{config_dir}/ghostline.toml`
    ///   3. Built-in defaults
    pub fn load(config_dir: &Path) -> Self {
        let toml = load_toml(config_dir).unwrap_or_default();

        let log = std::env::var("GHOSTLINE_LOG")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log)
            .unwrap_or_else(|| "info".to_string());

        let log_format = toml.log_format.unwrap_or_else(|| "pretty".to_string());

        let mut endpoint = toml.endpoint.unwrap_or_default();
        if let Ok(url) = std::env::var("GHOSTLINE_BASE_URL") {
            if !url.is_empty() {
                endpoint.base_url = url;
            }
        }
        if let Ok(model) = std::env::var("GHOSTLINE_MODEL") {
            if !model.is_empty() {
                endpoint.model = model;
            }
        }

        Self {
            log,
            log_format,
            endpoint,
            trigger: toml.trigger.unwrap_or_default(),
            scan: toml.scan.unwrap_or_default(),
        }
    }
}
