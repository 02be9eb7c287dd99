use crate::models::Marketplace;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

/// Resale fee schedule applied to the average comparable sale price.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FeeSchedule {
    #[serde(default = "default_marketplace_rate")]
    pub marketplace_rate: f64,

    #[serde(default = "default_shipping_rate")]
    pub shipping_rate: f64,

    #[serde(default = "default_shipping_cap")]
    pub shipping_cap: f64,

    #[serde(default = "default_other_flat")]
    pub other_flat: f64,
}

/// Profit analyzer tuning
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub fees: FeeSchedule,

    /// Sale-price multiplier used when no comparables exist.
    #[serde(default = "default_fallback_markup")]
    pub fallback_markup: f64,

    /// (max - min) / mean above which confidence is demoted.
    #[serde(default = "default_variance_threshold")]
    pub variance_threshold: f64,
}

/// Search defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(default = "default_city")]
    pub default_city: String,

    #[serde(default = "default_marketplaces")]
    pub default_marketplaces: Vec<Marketplace>,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default)]
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Simulated,
    Csv,
}

/// Listing source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    /// Fixed seed for reproducible simulated data.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "default_listings_csv")]
    pub listings_csv: PathBuf,

    #[serde(default = "default_comparables_csv")]
    pub comparables_csv: PathBuf,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_marketplace_rate() -> f64 {
    0.13
}
fn default_shipping_rate() -> f64 {
    0.10
}
fn default_shipping_cap() -> f64 {
    25.0
}
fn default_other_flat() -> f64 {
    5.0
}
fn default_fallback_markup() -> f64 {
    1.5
}
fn default_variance_threshold() -> f64 {
    0.3
}
fn default_city() -> String {
    "san francisco".to_string()
}
fn default_marketplaces() -> Vec<Marketplace> {
    vec![
        Marketplace::Craigslist,
        Marketplace::Offerup,
        Marketplace::Facebook,
    ]
}
fn default_concurrency() -> usize {
    4
}
fn default_listings_csv() -> PathBuf {
    PathBuf::from("data/listings.csv")
}
fn default_comparables_csv() -> PathBuf {
    PathBuf::from("data/comparables.csv")
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            marketplace_rate: default_marketplace_rate(),
            shipping_rate: default_shipping_rate(),
            shipping_cap: default_shipping_cap(),
            other_flat: default_other_flat(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fees: FeeSchedule::default(),
            fallback_markup: default_fallback_markup(),
            variance_threshold: default_variance_threshold(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_city: default_city(),
            default_marketplaces: default_marketplaces(),
            concurrency: default_concurrency(),
            max_results: None,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            seed: None,
            listings_csv: default_listings_csv(),
            comparables_csv: default_comparables_csv(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("FLIP").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|e| {
            tracing::warn!("Invalid configuration ({}), using defaults", e);
            AppConfig::default()
        });
        Ok(app_cfg)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            search: SearchConfig::default(),
            source: SourceConfig::default(),
        }
    }
}
