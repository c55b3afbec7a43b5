//! Research result cache with two-tier lookup.
//!
//! Tier one is an exact match on a SHA-256 key computed over normalized
//! parameters. Tier two scans all live entries and matches on word-set
//! Jaccard similarity between queries. The scan is O(n), acceptable at the
//! expected scale of tens to low hundreds of entries.
//!
//! Expired entries are evicted lazily, as a side effect of lookups that
//! touch them. Entries are never updated in place; `put` always overwrites
//! by exact key with a fresh expiry.

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};

use crate::config::Config;
use crate::models::CachedResult;

/// Parameters of one research request. Lookup keys are derived from the
/// normalized form, so case and whitespace variants of the same request
/// share an entry.
#[derive(Debug, Clone, Default)]
pub struct ResearchParams {
    pub query: String,
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
    /// Search depth tier; empty means the default, "basic".
    pub search_depth: String,
    /// Maximum results; zero means the default, 5.
    pub max_results: u32,
}

struct NormalizedParams {
    query: String,
    canonical: String,
}

impl ResearchParams {
    fn normalized(&self) -> Result<NormalizedParams> {
        let query = self
            .query
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        if query.is_empty() {
            bail!("research query must not be empty");
        }

        let mut include = self.include_domains.clone();
        include.sort();
        let mut exclude = self.exclude_domains.clone();
        exclude.sort();

        let depth = if self.search_depth.is_empty() {
            "basic"
        } else {
            self.search_depth.as_str()
        };
        let max_results = if self.max_results == 0 {
            5
        } else {
            self.max_results
        };

        let canonical = format!(
            "q={}|inc={}|exc={}|depth={}|max={}",
            query,
            include.join(","),
            exclude.join(","),
            depth,
            max_results
        );

        Ok(NormalizedParams { query, canonical })
    }
}

impl NormalizedParams {
    fn cache_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// How a lookup was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheHit {
    Exact,
    Similar,
}

/// In-memory research cache. Constructed by the caller and passed to
/// request handlers; no module-level state.
pub struct ResearchCache {
    entries: HashMap<String, CachedResult>,
    ttl: Duration,
    similarity_threshold: f64,
}

impl ResearchCache {
    pub fn new(config: &Config) -> Self {
        Self {
            entries: HashMap::new(),
            ttl: Duration::seconds(config.cache.research_ttl_secs as i64),
            similarity_threshold: config.cache.similarity_threshold,
        }
    }

    /// Look up a result. Exact key match first, then the similarity scan.
    pub fn get(&mut self, params: &ResearchParams) -> Result<Option<(CachedResult, CacheHit)>> {
        self.get_at(params, Utc::now())
    }

    /// Insert or overwrite the entry for these parameters with a fresh
    /// expiry.
    pub fn put(&mut self, params: &ResearchParams, payload: serde_json::Value) -> Result<()> {
        self.put_at(params, payload, Utc::now())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get_at(
        &mut self,
        params: &ResearchParams,
        now: DateTime<Utc>,
    ) -> Result<Option<(CachedResult, CacheHit)>> {
        let norm = params.normalized()?;
        let key = norm.cache_key();

        if let Some(entry) = self.entries.get(&key) {
            if now < entry.expires_at {
                return Ok(Some((entry.clone(), CacheHit::Exact)));
            }
            self.entries.remove(&key);
        }

        // Similarity fallback over live entries. Expired entries met during
        // the scan are evicted as a side effect.
        let query_words: BTreeSet<&str> = norm.query.split_whitespace().collect();
        let mut expired = Vec::new();
        let mut hit: Option<CachedResult> = None;

        for (entry_key, entry) in &self.entries {
            if now >= entry.expires_at {
                expired.push(entry_key.clone());
                continue;
            }
            if hit.is_none() {
                let entry_words: BTreeSet<&str> = entry.query.split_whitespace().collect();
                if jaccard(&query_words, &entry_words) >= self.similarity_threshold {
                    hit = Some(entry.clone());
                }
            }
        }

        for entry_key in expired {
            self.entries.remove(&entry_key);
        }

        if hit.is_some() {
            log::debug!(
                "research cache similarity hit ({} live entries)",
                self.entries.len()
            );
        }

        Ok(hit.map(|entry| (entry, CacheHit::Similar)))
    }

    fn put_at(
        &mut self,
        params: &ResearchParams,
        payload: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let norm = params.normalized()?;
        let key = norm.cache_key();

        self.entries.insert(
            key,
            CachedResult {
                query: norm.query,
                payload,
                created_at: now,
                expires_at: now + self.ttl,
            },
        );

        Ok(())
    }
}

/// Word-set Jaccard similarity: |A ∩ B| / |A ∪ B|.
fn jaccard(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cache() -> ResearchCache {
        ResearchCache::new(&Config::minimal())
    }

    fn params(query: &str) -> ResearchParams {
        ResearchParams {
            query: query.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_hit_after_normalization() {
        let mut cache = cache();
        cache
            .put(&params("Byzantine saloi"), json!({"r": 1}))
            .unwrap();

        // Case and whitespace variants normalize to the same key.
        let hit = cache.get(&params("byzantine  SALOI")).unwrap();
        let (entry, kind) = hit.expect("expected exact hit");
        assert_eq!(kind, CacheHit::Exact);
        assert_eq!(entry.payload, json!({"r": 1}));
    }

    #[test]
    fn test_miss_on_different_query() {
        let mut cache = cache();
        cache.put(&params("Byzantine saloi"), json!({})).unwrap();
        assert!(cache.get(&params("desert fathers")).unwrap().is_none());
    }

    #[test]
    fn test_domain_lists_sorted_into_key() {
        let mut cache = cache();
        let a = ResearchParams {
            query: "saloi".to_string(),
            include_domains: vec!["b.org".to_string(), "a.org".to_string()],
            ..Default::default()
        };
        let b = ResearchParams {
            query: "saloi".to_string(),
            include_domains: vec!["a.org".to_string(), "b.org".to_string()],
            ..Default::default()
        };
        cache.put(&a, json!({"r": 2})).unwrap();
        let (_, kind) = cache.get(&b).unwrap().expect("expected exact hit");
        assert_eq!(kind, CacheHit::Exact);
    }

    #[test]
    fn test_default_filled_optional_fields() {
        let mut cache = cache();
        let explicit = ResearchParams {
            query: "saloi".to_string(),
            search_depth: "basic".to_string(),
            max_results: 5,
            ..Default::default()
        };
        cache.put(&params("saloi"), json!({"r": 3})).unwrap();
        let (_, kind) = cache.get(&explicit).unwrap().expect("expected exact hit");
        assert_eq!(kind, CacheHit::Exact);
    }

    #[test]
    fn test_similarity_hit_on_word_reorder() {
        let mut cache = cache();
        cache
            .put(&params("byzantine holy fools"), json!({"r": 4}))
            .unwrap();

        // Same word set, different order: exact keys differ, Jaccard is 1.0.
        let hit = cache.get(&params("holy fools byzantine")).unwrap();
        let (entry, kind) = hit.expect("expected similarity hit");
        assert_eq!(kind, CacheHit::Similar);
        assert_eq!(entry.payload, json!({"r": 4}));
    }

    #[test]
    fn test_similarity_below_threshold_misses() {
        let mut cache = cache();
        cache
            .put(
                &params("byzantine saloi holy fools tradition"),
                json!({"r": 5}),
            )
            .unwrap();

        // {byzantine, holy, fools} vs a 5-word set: 3/5 = 0.6 < 0.85.
        assert!(cache.get(&params("byzantine holy fools")).unwrap().is_none());
    }

    #[test]
    fn test_expiry_and_lazy_eviction() {
        let mut cache = cache();
        let t0 = Utc::now();
        cache.put_at(&params("saloi"), json!({}), t0).unwrap();

        let just_before = t0 + Duration::seconds(7 * 24 * 60 * 60 - 1);
        assert!(cache.get_at(&params("saloi"), just_before).unwrap().is_some());

        let just_after = t0 + Duration::seconds(7 * 24 * 60 * 60 + 1);
        assert!(cache.get_at(&params("saloi"), just_after).unwrap().is_none());
        // Eviction happened as a side effect of the lookup.
        assert!(cache.is_empty());
    }

    #[test]
    fn test_scan_evicts_expired_entries() {
        let mut cache = cache();
        let t0 = Utc::now();
        cache.put_at(&params("alpha beta"), json!({}), t0).unwrap();
        cache.put_at(&params("gamma delta"), json!({}), t0).unwrap();
        assert_eq!(cache.len(), 2);

        // A lookup long after expiry sweeps both entries.
        let later = t0 + Duration::days(30);
        assert!(cache
            .get_at(&params("unrelated query"), later)
            .unwrap()
            .is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_overwrites_with_fresh_expiry() {
        let mut cache = cache();
        let t0 = Utc::now();
        cache.put_at(&params("saloi"), json!({"v": 1}), t0).unwrap();

        let t1 = t0 + Duration::days(6);
        cache.put_at(&params("saloi"), json!({"v": 2}), t1).unwrap();
        assert_eq!(cache.len(), 1);

        // Past the original expiry but within the refreshed one.
        let t2 = t0 + Duration::days(8);
        let (entry, _) = cache
            .get_at(&params("saloi"), t2)
            .unwrap()
            .expect("expected refreshed entry");
        assert_eq!(entry.payload, json!({"v": 2}));
    }

    #[test]
    fn test_empty_query_is_validation_error() {
        let mut cache = cache();
        assert!(cache.put(&params("   "), json!({})).is_err());
        assert!(cache.get(&params("")).is_err());
    }
}
