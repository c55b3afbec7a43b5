use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::models::ModelProfile;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    #[serde(default = "default_content_root")]
    pub root: PathBuf,
    #[serde(default = "default_wiki_prefix")]
    pub wiki_prefix: String,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: default_content_root(),
            wiki_prefix: default_wiki_prefix(),
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_content_root() -> PathBuf {
    PathBuf::from("./content")
}
fn default_wiki_prefix() -> String {
    "/wiki/".to_string()
}
fn default_include_globs() -> Vec<String> {
    vec!["**/*.md".to_string()]
}

/// The two routing targets. Defaults match the reference pricing: a cheap
/// haiku-class tier and a sonnet-class quality tier.
#[derive(Debug, Deserialize, Clone)]
pub struct RoutingConfig {
    #[serde(default = "default_fast_profile")]
    pub fast: ModelProfile,
    #[serde(default = "default_quality_profile")]
    pub quality: ModelProfile,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            fast: default_fast_profile(),
            quality: default_quality_profile(),
        }
    }
}

fn default_fast_profile() -> ModelProfile {
    ModelProfile {
        id: "claude-3-5-haiku-latest".to_string(),
        max_output_tokens: 1024,
        input_cost_per_mtok: 0.80,
        output_cost_per_mtok: 4.00,
        description: "Fast, cheap tier for factual lookups".to_string(),
    }
}

fn default_quality_profile() -> ModelProfile {
    ModelProfile {
        id: "claude-sonnet-4-5".to_string(),
        max_output_tokens: 4096,
        input_cost_per_mtok: 3.00,
        output_cost_per_mtok: 15.00,
        description: "High-quality tier for analysis and synthesis".to_string(),
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Research-cache entry lifetime. Default 7 days.
    #[serde(default = "default_research_ttl_secs")]
    pub research_ttl_secs: u64,
    /// Word-set Jaccard threshold for the similarity fallback.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Character budget for the page-context prompt segment.
    #[serde(default = "default_context_budget_chars")]
    pub context_budget_chars: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            research_ttl_secs: default_research_ttl_secs(),
            similarity_threshold: default_similarity_threshold(),
            context_budget_chars: default_context_budget_chars(),
        }
    }
}

fn default_research_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}
fn default_similarity_threshold() -> f64 {
    0.85
}
fn default_context_budget_chars() -> usize {
    2000
}

#[derive(Debug, Deserialize, Clone)]
pub struct BudgetConfig {
    /// Daily cost above which an alert is emitted. Same currency unit as
    /// the pricing tables.
    #[serde(default = "default_daily_alert_threshold")]
    pub daily_alert_threshold: f64,
    #[serde(default = "default_monthly_target")]
    pub monthly_target: f64,
    /// Optional webhook URL to POST budget alerts to.
    #[serde(default)]
    pub alert_webhook: Option<String>,
    /// Cost-log entries older than this are dropped by cleanup.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            daily_alert_threshold: default_daily_alert_threshold(),
            monthly_target: default_monthly_target(),
            alert_webhook: None,
            retention_days: default_retention_days(),
        }
    }
}

fn default_daily_alert_threshold() -> f64 {
    1.0
}
fn default_monthly_target() -> f64 {
    15.0
}
fn default_retention_days() -> u32 {
    30
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PricingConfig {
    #[serde(default)]
    pub search: SearchPricing,
}

/// Per-call pricing for the external search service.
#[derive(Debug, Deserialize, Clone)]
pub struct SearchPricing {
    #[serde(default = "default_search_basic")]
    pub basic: f64,
    #[serde(default = "default_search_advanced")]
    pub advanced: f64,
}

impl Default for SearchPricing {
    fn default() -> Self {
        Self {
            basic: default_search_basic(),
            advanced: default_search_advanced(),
        }
    }
}

fn default_search_basic() -> f64 {
    0.008
}
fn default_search_advanced() -> f64 {
    0.016
}

impl Config {
    /// All-defaults config for commands that don't need a config file.
    pub fn minimal() -> Self {
        Self {
            content: ContentConfig::default(),
            routing: RoutingConfig::default(),
            cache: CacheConfig::default(),
            budget: BudgetConfig::default(),
            pricing: PricingConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.cache.context_budget_chars == 0 {
        anyhow::bail!("cache.context_budget_chars must be > 0");
    }

    if config.cache.research_ttl_secs == 0 {
        anyhow::bail!("cache.research_ttl_secs must be > 0");
    }

    if !(0.0..=1.0).contains(&config.cache.similarity_threshold) {
        anyhow::bail!("cache.similarity_threshold must be in [0.0, 1.0]");
    }

    for profile in [&config.routing.fast, &config.routing.quality] {
        if profile.input_cost_per_mtok < 0.0 || profile.output_cost_per_mtok < 0.0 {
            anyhow::bail!("routing profile '{}' has negative token costs", profile.id);
        }
    }

    if config.budget.daily_alert_threshold < 0.0 {
        anyhow::bail!("budget.daily_alert_threshold must be >= 0");
    }

    Ok(())
}
