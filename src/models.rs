//! Core data models used throughout wikigraph.
//!
//! These types represent the pages and link structure derived from a content
//! directory, plus the routing, prompt-assembly, and cost-accounting records
//! that flow through the query side of the crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One markdown document, parsed fresh from a single file on every graph
/// build. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct WikiPage {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub keywords: Vec<String>,
    pub related: Vec<String>,
    pub see_also: Vec<String>,
}

/// Bidirectional link graph over a set of wiki pages.
///
/// Ordered maps give deterministic iteration across builds. Targets that
/// reference a non-existent slug are retained as dangling edges; they are
/// dropped only when a derived view resolves them against `pages`.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    /// slug -> page, one entry per source file.
    pub pages: BTreeMap<String, WikiPage>,
    /// slug -> set of target slugs (in-body links ∪ frontmatter relations).
    pub forward_links: BTreeMap<String, BTreeSet<String>>,
    /// slug -> set of source slugs; the transpose of `forward_links`.
    pub backlinks: BTreeMap<String, BTreeSet<String>>,
}

/// Coarse classification of a query's expected processing difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryComplexity {
    Simple,
    Medium,
    Complex,
}

impl QueryComplexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryComplexity::Simple => "simple",
            QueryComplexity::Medium => "medium",
            QueryComplexity::Complex => "complex",
        }
    }
}

/// Static description of a routing target, defined at process start from
/// configuration. Never persisted.
#[derive(Debug, Deserialize, Clone)]
pub struct ModelProfile {
    pub id: String,
    pub max_output_tokens: u32,
    /// Cost per million input tokens.
    pub input_cost_per_mtok: f64,
    /// Cost per million output tokens.
    pub output_cost_per_mtok: f64,
    #[serde(default)]
    pub description: String,
}

/// Role of one segment in an assembled prompt payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentRole {
    System,
    User,
}

/// One segment of an assembled prompt payload.
///
/// `cacheable` is a hint to the downstream transport that repeated identical
/// segments may be served from a provider-side cache. It does not change
/// local behavior and nothing is stored here.
#[derive(Debug, Clone, Serialize)]
pub struct MessageSegment {
    pub role: SegmentRole,
    pub text: String,
    pub cacheable: bool,
}

/// One research-cache entry. Valid iff `now < expires_at`; expired entries
/// are evicted lazily on the next lookup.
#[derive(Debug, Clone)]
pub struct CachedResult {
    /// Normalized query the entry was stored under, kept for similarity
    /// matching against later lookups.
    pub query: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Append-only record of one external API call. In-process only; history is
/// lost on restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostLogEntry {
    pub timestamp: DateTime<Utc>,
    pub service: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_hit: bool,
    pub cost: f64,
    pub success: bool,
}

/// Aggregated view of the call log over a timestamp range.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CostSummary {
    pub total_cost: f64,
    pub call_count: usize,
    pub cache_hits: usize,
    pub cache_hit_rate: f64,
    pub by_service: BTreeMap<String, f64>,
}
