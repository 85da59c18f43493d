use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::holdings::Holdings;

/// One tracked metal: the cache key, its upstream quote symbol, and the
/// seed price used until a fetch succeeds. Fallback prices are a deployment
/// concern, so they live here rather than in code.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MetalConfig {
    pub name: String,
    pub symbol: String,
    pub fallback_price: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub metals: Vec<MetalConfig>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_refresh_interval_minutes")]
    pub refresh_interval_minutes: u64,
    #[serde(default)]
    pub holdings: Holdings,
}

fn default_refresh_interval_minutes() -> u64 {
    30
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "bullion")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn base_url(&self) -> &str {
        self.providers
            .yahoo
            .as_ref()
            .map_or("https://query1.finance.yahoo.com", |p| &p.base_url)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_minutes * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
metals:
  - name: gold
    symbol: "GC=F"
    fallback_price: 2050.00
  - name: silver
    symbol: "SI=F"
    fallback_price: 23.50

holdings:
  metals:
    - name: "10 oz silver bar"
      metal: silver
      weight_oz: 10.0
      purity: 0.999
      cost_basis: 250.0
      current_value: 310.0
  coins:
    - name: "Morgan Dollar 1921"
      material: silver
      cost_basis: 35.0
      worth: 42.0
  goldbacks:
    - denomination: 25
      count: 4
      cost_basis: 380.0
    - denomination: 0.5
      count: 10
      cost_basis: 30.0
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.metals.len(), 2);
        assert_eq!(config.metals[0].name, "gold");
        assert_eq!(config.metals[0].symbol, "GC=F");
        assert_eq!(config.metals[0].fallback_price, 2050.0);
        assert_eq!(config.metals[1].fallback_price, 23.5);

        // Defaults apply when the sections are omitted
        assert_eq!(config.refresh_interval_minutes, 30);
        assert_eq!(config.base_url(), "https://query1.finance.yahoo.com");

        assert_eq!(config.holdings.metals.len(), 1);
        assert_eq!(config.holdings.metals[0].metal, "silver");
        assert_eq!(config.holdings.metals[0].weight_oz, 10.0);
        assert_eq!(config.holdings.coins.len(), 1);
        assert_eq!(config.holdings.coins[0].worth, 42.0);
        assert_eq!(config.holdings.goldbacks.len(), 2);
        assert_eq!(config.holdings.goldbacks[0].denomination, 25.0);
        assert_eq!(config.holdings.goldbacks[1].denomination, 0.5);
        assert_eq!(config.holdings.goldbacks[1].count, 10);
    }

    #[test]
    fn test_config_with_provider_and_interval_overrides() {
        let yaml_str = r#"
metals:
  - name: gold
    symbol: "GC=F"
    fallback_price: 4500.00
providers:
  yahoo:
    base_url: "http://example.com/yahoo"
refresh_interval_minutes: 5
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.base_url(), "http://example.com/yahoo");
        assert_eq!(config.refresh_interval(), Duration::from_secs(300));
        assert_eq!(config.metals[0].fallback_price, 4500.0);
        assert!(config.holdings.is_empty());
    }
}
