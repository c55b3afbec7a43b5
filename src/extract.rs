//! In-body link extraction.
//!
//! Three independent patterns are applied to the raw body text and their
//! matches unioned into one set:
//!
//! 1. Markdown links targeting the wiki route: `[label](/wiki/<slug>)`
//! 2. Double-bracket wiki links: `[[slug]]` or `[[display|slug]]`
//! 3. Bare route substrings: `/wiki/<slug>`
//!
//! Set semantics make extraction idempotent and order-independent.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// `[[slug]]` or `[[display|slug]]`. Prefix-independent, so compiled once.
static WIKI_BRACKET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]|]+)(?:\|([^\]|]+))?\]\]").unwrap());

/// Compiled link patterns for one wiki route prefix.
pub struct LinkExtractor {
    markdown_link: Regex,
    bare_route: Regex,
}

impl LinkExtractor {
    pub fn new(wiki_prefix: &str) -> Result<Self> {
        let prefix = regex::escape(wiki_prefix);
        let markdown_link = Regex::new(&format!(r"\[[^\]]*\]\({}([A-Za-z0-9-]+)\)", prefix))?;
        let bare_route = Regex::new(&format!(r"{}([A-Za-z0-9-]+)", prefix))?;
        Ok(Self {
            markdown_link,
            bare_route,
        })
    }

    /// Extract the deduplicated set of target slugs from body text.
    pub fn extract(&self, body: &str) -> BTreeSet<String> {
        let mut links = BTreeSet::new();

        for cap in self.markdown_link.captures_iter(body) {
            links.insert(cap[1].to_string());
        }

        for cap in WIKI_BRACKET.captures_iter(body) {
            match cap.get(2) {
                // `[[display|slug]]`: the right side is the slug, verbatim.
                Some(slug) => {
                    links.insert(slug.as_str().to_string());
                }
                // `[[slug]]`: the single segment is normalized.
                None => {
                    links.insert(normalize_slug(&cap[1]));
                }
            }
        }

        for cap in self.bare_route.captures_iter(body) {
            links.insert(cap[1].to_string());
        }

        links
    }
}

/// Normalize display text into a slug: lowercase, whitespace runs collapsed
/// to single hyphens.
pub fn normalize_slug(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
