use anyhow::Context;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tariff_core::TariffConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Csv,
    Ndjson,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub format: InputFormat,
    /// Abort on the first bad record instead of skipping it.
    #[serde(default = "default_strict")]
    pub strict: bool,
}

fn default_strict() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// Counters are only recorded when this section is present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    /// Prometheus textfile-collector path written when the run finishes.
    pub textfile: Option<PathBuf>,
    /// Also print the rendered counters to stderr.
    #[serde(default)]
    pub print: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub tariff: TariffConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("RATE_SERVICE_CONFIG").unwrap_or_else(|_| "rate-config.toml".to_string());
        Self::from_path(&path)
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let cfg = Self::from_toml_str(&contents)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(cfg)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        cfg.tariff.validate()?;
        Ok(cfg)
    }
}
