//! Configuration management for gapchart using the prefer crate.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::http_client::USER_AGENT;
use crate::pipeline::RateWindows;
use crate::render::{IndicatorSpec, ParseIndicatorError};

/// Default API root.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Default database filename inside the data directory.
pub const DEFAULT_DATABASE_FILENAME: &str = "gapchart.db";

/// Subdirectory for saved chart images.
const CHARTS_SUBDIR: &str = "charts";

/// Errors loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {format} config {path}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root URL of the dashboard API.
    pub api_url: String,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// User agent for HTTP requests.
    pub user_agent: String,
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Rate limit store ("sqlite" or "memory", None = sqlite).
    pub rate_limit_backend: Option<String>,
    pub standard_window_hours: u64,
    pub strict_window_hours: u64,
    /// Overlays drawn on charts, e.g. "vwap", "sma:20".
    pub indicators: Vec<String>,
    /// Rows of the chart price pane.
    pub chart_height: usize,
}

impl Default for Settings {
    fn default() -> Self {
        // Platform data dir, falling back to home, then the current dir.
        let data_dir = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gapchart");

        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: 30,
            user_agent: USER_AGENT.to_string(),
            data_dir,
            rate_limit_backend: None,
            standard_window_hours: 12,
            strict_window_hours: 12,
            indicators: Vec::new(),
            chart_height: 16,
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Path of the SQLite file holding rate limit records.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DEFAULT_DATABASE_FILENAME)
    }

    /// Where image charts are written.
    pub fn charts_dir(&self) -> PathBuf {
        self.data_dir.join(CHARTS_SUBDIR)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn rate_windows(&self) -> RateWindows {
        RateWindows {
            standard: Duration::from_secs(self.standard_window_hours.saturating_mul(3600)),
            strict: Duration::from_secs(self.strict_window_hours.saturating_mul(3600)),
        }
    }

    /// Parse the configured overlays.
    pub fn indicator_specs(&self) -> Result<Vec<IndicatorSpec>, ParseIndicatorError> {
        self.indicators.iter().map(|s| s.parse()).collect()
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create data directory '{}': {}",
                    self.data_dir.display(),
                    e
                ),
            )
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_window_hours: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_window_hours: Option<u64>,
}

impl RateLimitConfig {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicators: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<usize>,
}

impl ChartConfig {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Shape of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_backend: Option<String>,
    #[serde(default, skip_serializing_if = "RateLimitConfig::is_default")]
    pub rate_limit: RateLimitConfig,
    #[serde(default, skip_serializing_if = "ChartConfig::is_default")]
    pub chart: ChartConfig,
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Auto-discover a `gapchart` config file, falling back to defaults.
    pub async fn load() -> Self {
        match prefer::load("gapchart").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Ignoring config: {}", e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            Err(_) => Self::default(),
        }
    }

    /// Read a config file, picking the format by extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::parse(path, &contents)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let parse_error = |format: &'static str, message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        };

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        match ext {
            "toml" => toml::from_str(contents).map_err(|e| parse_error("TOML", e.to_string())),
            "yaml" | "yml" => {
                serde_yaml::from_str(contents).map_err(|e| parse_error("YAML", e.to_string()))
            }
            _ => serde_json::from_str(contents).map_err(|e| parse_error("JSON", e.to_string())),
        }
    }

    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Expand `~` and resolve relative paths against `base_dir`.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref api_url) = self.api_url {
            settings.api_url = api_url.clone();
        }
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(ref backend) = self.rate_limit_backend {
            settings.rate_limit_backend = Some(backend.clone());
        }
        if let Some(hours) = self.rate_limit.standard_window_hours {
            settings.standard_window_hours = hours;
        }
        if let Some(hours) = self.rate_limit.strict_window_hours {
            settings.strict_window_hours = hours;
        }
        if let Some(ref indicators) = self.chart.indicators {
            settings.indicators = indicators.clone();
        }
        if let Some(height) = self.chart.height {
            settings.chart_height = height;
        }
    }
}

/// Command-line inputs to settings resolution.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub api_url: Option<String>,
}

/// Apply environment overrides through `lookup`.
///
/// `GAPCHART_API_URL`, `GAPCHART_DATA_DIR` and `RATE_LIMIT_BACKEND` take
/// precedence over the config file. Empty values are ignored.
pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|s| !s.is_empty());

    if let Some(api_url) = var("GAPCHART_API_URL") {
        tracing::debug!("Using GAPCHART_API_URL from environment: {}", api_url);
        settings.api_url = api_url;
    }
    if let Some(data_dir) = var("GAPCHART_DATA_DIR") {
        tracing::debug!("Using GAPCHART_DATA_DIR from environment: {}", data_dir);
        settings.data_dir = PathBuf::from(shellexpand::tilde(&data_dir).as_ref());
    }
    if let Some(backend) = var("RATE_LIMIT_BACKEND") {
        tracing::debug!("Using RATE_LIMIT_BACKEND from environment: {}", backend);
        settings.rate_limit_backend = Some(backend);
    }
}

/// Load settings with explicit options.
///
/// Precedence: command-line options, environment, config file, defaults.
/// An explicit `--config` that cannot be loaded is an error; a discovered
/// one that cannot be loaded is skipped with a warning.
pub async fn load_settings_with_options(
    options: LoadOptions,
) -> Result<(Settings, Config), ConfigError> {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    };

    if let Some(ref path) = config.source_path {
        tracing::debug!("Loaded config from {}", path.display());
    }

    let mut settings = Settings::default();
    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    config.apply_to_settings(&mut settings, &base_dir);

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());

    if let Some(data_dir) = options.data_dir {
        settings.data_dir = data_dir;
    }
    if let Some(api_url) = options.api_url {
        settings.api_url = api_url;
    }

    Ok((settings, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_by_extension() {
        let toml = Config::parse(
            Path::new("gapchart.toml"),
            r#"
api_url = "https://gaps.example.com"
request_timeout = 10

[rate_limit]
strict_window_hours = 6

[chart]
indicators = ["vwap", "sma:20"]
"#,
        )
        .unwrap();
        assert_eq!(toml.api_url.as_deref(), Some("https://gaps.example.com"));
        assert_eq!(toml.rate_limit.strict_window_hours, Some(6));
        assert_eq!(toml.chart.indicators.as_ref().map(Vec::len), Some(2));

        let yaml = Config::parse(
            Path::new("gapchart.yaml"),
            "rate_limit_backend: memory\nchart:\n  height: 24\n",
        )
        .unwrap();
        assert_eq!(yaml.rate_limit_backend.as_deref(), Some("memory"));
        assert_eq!(yaml.chart.height, Some(24));

        let json = Config::parse(Path::new("gapchart.json"), r#"{"data_dir": "~/gaps"}"#).unwrap();
        assert_eq!(json.data_dir.as_deref(), Some("~/gaps"));

        assert!(matches!(
            Config::parse(Path::new("bad.toml"), "api_url = ["),
            Err(ConfigError::Parse { format: "TOML", .. })
        ));
    }

    #[test]
    fn test_apply_to_settings() {
        let config = Config {
            data_dir: Some("state".to_string()),
            request_timeout: Some(5),
            rate_limit: RateLimitConfig {
                standard_window_hours: Some(1),
                strict_window_hours: None,
            },
            chart: ChartConfig {
                indicators: Some(vec!["sma:5".to_string()]),
                height: None,
            },
            ..Default::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/etc/gapchart"));

        assert_eq!(settings.data_dir, PathBuf::from("/etc/gapchart/state"));
        assert_eq!(settings.timeout(), Duration::from_secs(5));
        assert_eq!(settings.rate_windows().standard, Duration::from_secs(3600));
        assert_eq!(settings.rate_windows().strict, Duration::from_secs(12 * 3600));
        assert_eq!(settings.indicator_specs().unwrap(), vec![IndicatorSpec::Sma(5)]);
        assert_eq!(settings.chart_height, 16);
        assert_eq!(settings.database_path(), PathBuf::from("/etc/gapchart/state/gapchart.db"));
    }

    #[test]
    fn test_huge_window_hours_saturate() {
        let settings = Settings {
            standard_window_hours: u64::MAX,
            strict_window_hours: u64::MAX / 3600 + 1,
            ..Settings::default()
        };
        let windows = settings.rate_windows();
        assert_eq!(windows.standard, Duration::from_secs(u64::MAX));
        assert_eq!(windows.strict, Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_env_overrides_skip_empty() {
        let env: HashMap<&str, &str> = [
            ("GAPCHART_API_URL", "http://10.0.0.2:8080"),
            ("GAPCHART_DATA_DIR", ""),
            ("RATE_LIMIT_BACKEND", "memory"),
        ]
        .into_iter()
        .collect();
        let mut settings = Settings::with_data_dir(PathBuf::from("/data"));
        apply_env_overrides(&mut settings, |name| env.get(name).map(|v| v.to_string()));

        assert_eq!(settings.api_url, "http://10.0.0.2:8080");
        assert_eq!(settings.data_dir, PathBuf::from("/data"));
        assert_eq!(settings.rate_limit_backend.as_deref(), Some("memory"));
    }

    #[tokio::test]
    async fn test_explicit_config_errors_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let missing = LoadOptions {
            config_path: Some(dir.path().join("missing.toml")),
            ..Default::default()
        };
        assert!(matches!(
            load_settings_with_options(missing).await,
            Err(ConfigError::Read { .. })
        ));

        let path = dir.path().join("gapchart.json");
        fs::write(&path, r#"{"api_url": "http://from-file:5000"}"#).unwrap();
        let options = LoadOptions {
            config_path: Some(path),
            data_dir: Some(dir.path().join("data")),
            api_url: None,
        };
        let (settings, config) = load_settings_with_options(options).await.unwrap();
        assert!(config.source_path.is_some());
        assert_eq!(settings.data_dir, dir.path().join("data"));
    }
}
