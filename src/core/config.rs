use crate::core::price::DEFAULT_LOOKBACK_DAYS;
use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const FINNHUB_KEY_ENV: &str = "FINNHUB_API_KEY";
pub const ALPHA_VANTAGE_KEY_ENV: &str = "ALPHA_VANTAGE_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FinnhubProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AlphaVantageProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StooqProviderConfig {
    pub base_url: String,
}

/// Price providers, attempted in declaration order. A missing section disables
/// that provider.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub finnhub: Option<FinnhubProviderConfig>,
    pub alpha_vantage: Option<AlphaVantageProviderConfig>,
    pub stooq: Option<StooqProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            finnhub: Some(FinnhubProviderConfig {
                base_url: "https://finnhub.io/api/v1".to_string(),
                api_key: None,
            }),
            alpha_vantage: Some(AlphaVantageProviderConfig {
                base_url: "https://www.alphavantage.co".to_string(),
                api_key: None,
            }),
            stooq: Some(StooqProviderConfig {
                base_url: "https://stooq.com".to_string(),
            }),
        }
    }
}

fn default_symbol() -> String {
    "SPY".to_string()
}

fn default_lookback_days() -> u32 {
    DEFAULT_LOOKBACK_DAYS
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Benchmark instrument the round-ups are invested in.
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// CSV file with `date,amount,merchant,category` columns.
    pub contributions: PathBuf,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("app", "zai", "zai")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("app", "zai", "zai")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Contributions file path with a leading `~/` expanded to the home directory.
    pub fn contributions_path(&self) -> PathBuf {
        let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        match (self.contributions.strip_prefix("~"), home) {
            (Ok(rest), Some(home)) => home.join(rest),
            _ => self.contributions.clone(),
        }
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

impl FinnhubProviderConfig {
    /// Configured key, else the `FINNHUB_API_KEY` environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_key(self.api_key.as_deref(), FINNHUB_KEY_ENV)
    }
}

impl AlphaVantageProviderConfig {
    /// Configured key, else the `ALPHA_VANTAGE_API_KEY` environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_key(self.api_key.as_deref(), ALPHA_VANTAGE_KEY_ENV)
    }
}

fn resolve_key(configured: Option<&str>, env_var: &str) -> Option<String> {
    configured
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok())
        .filter(|k| !k.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization_with_defaults() {
        let yaml_str = r#"
contributions: "/home/me/roundups.csv"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.symbol, "SPY");
        assert_eq!(config.lookback_days, 120);
        assert_eq!(config.contributions, PathBuf::from("/home/me/roundups.csv"));
        assert!(config.data_path.is_none());

        let providers = config.providers;
        assert_eq!(
            providers.finnhub.unwrap().base_url,
            "https://finnhub.io/api/v1"
        );
        assert_eq!(
            providers.alpha_vantage.unwrap().base_url,
            "https://www.alphavantage.co"
        );
        assert_eq!(providers.stooq.unwrap().base_url, "https://stooq.com");
    }

    #[test]
    fn test_config_deserialization_with_providers() {
        let yaml_str = r#"
symbol: "VOO"
contributions: "roundups.csv"
lookback_days: 30
providers:
  finnhub:
    base_url: "http://example.com/finnhub"
    api_key: "abc"
  stooq:
    base_url: "http://example.com/stooq"
data_path: "/tmp/zai"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.symbol, "VOO");
        assert_eq!(config.lookback_days, 30);
        assert_eq!(config.data_path.as_deref(), Some("/tmp/zai"));

        let finnhub = config.providers.finnhub.unwrap();
        assert_eq!(finnhub.base_url, "http://example.com/finnhub");
        assert_eq!(finnhub.resolve_api_key().as_deref(), Some("abc"));
        assert!(config.providers.alpha_vantage.is_none());
        assert_eq!(
            config.providers.stooq.unwrap().base_url,
            "http://example.com/stooq"
        );
    }

    #[test]
    fn test_contributions_path_expands_home() {
        let config: AppConfig = serde_yaml::from_str("contributions: \"~/roundups.csv\"").unwrap();
        let path = config.contributions_path();
        if let Some(dirs) = BaseDirs::new() {
            assert_eq!(path, dirs.home_dir().join("roundups.csv"));
        }

        let config: AppConfig = serde_yaml::from_str("contributions: \"/data/r.csv\"").unwrap();
        assert_eq!(config.contributions_path(), PathBuf::from("/data/r.csv"));
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        assert_eq!(resolve_key(Some("  "), "ZAI_TEST_UNSET_KEY_VAR"), None);
        assert_eq!(
            resolve_key(Some("k"), "ZAI_TEST_UNSET_KEY_VAR").as_deref(),
            Some("k")
        );
    }

    #[test]
    fn test_load_from_missing_path_fails_with_context() {
        let err = AppConfig::load_from_path("/nonexistent/zai/config.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
