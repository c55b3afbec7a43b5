//! Query complexity classification and model routing.
//!
//! Classification is ordered, first match wins: simple-intent patterns,
//! then complex-intent patterns, then length heuristics. Routing collapses
//! the three labels into two targets — simple queries go to the fast
//! profile, medium and complex both go to the quality profile. The
//! asymmetry is intentional.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Config;
use crate::models::{ModelProfile, QueryComplexity};

/// Definition requests, factual questions, explicit brevity requests.
static SIMPLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^what\s+(is|are|was|were)\b",
        r"(?i)^(who|when|where)\b",
        r"(?i)\bdefin(e|ition)\b",
        r"(?i)\bmeaning\s+of\b",
        r"(?i)\btl;?dr\b",
        r"(?i)\bbriefly\b",
        r"(?i)\bin\s+short\b",
        r"(?i)\bone\s+sentence\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Comparison, analysis, critique, causal language, explicit depth requests,
/// and terms that signal deep synthesis in this content domain.
static COMPLEX_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bcompar(e|ison|ing)\b",
        r"(?i)\bcontrast\b",
        r"(?i)\banaly(ze|se|sis|zing)\b",
        r"(?i)\bcritiq",
        r"(?i)\bevaluat",
        r"(?i)\bimplication",
        r"(?i)\bsignificance\b",
        r"(?i)\bwhy\s+(did|does|do|is|are)\b",
        r"(?i)\bin\s+depth\b",
        r"(?i)\bcomprehensive",
        r"(?i)\bsynthesi[sz]",
        r"(?i)\brelationship\s+between\b",
        r"(?i)\btheolog",
        r"(?i)\bmystic",
        r"(?i)\beschatolog",
        r"(?i)\bhermeneutic",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Classify a query. Deterministic: the same inputs always yield the same
/// label.
pub fn analyze_query_complexity(query: &str, selected_text: Option<&str>) -> QueryComplexity {
    if SIMPLE_PATTERNS.iter().any(|re| re.is_match(query)) {
        return QueryComplexity::Simple;
    }

    if COMPLEX_PATTERNS.iter().any(|re| re.is_match(query)) {
        return QueryComplexity::Complex;
    }

    let word_count = query.split_whitespace().count();
    let selected_len = selected_text.map(|s| s.chars().count()).unwrap_or(0);

    if word_count > 20 || selected_len > 100 {
        QueryComplexity::Medium
    } else if word_count <= 10 {
        QueryComplexity::Simple
    } else {
        QueryComplexity::Medium
    }
}

/// Pick the target profile for a query. Emits a debug routing record;
/// observability only, no effect on control flow.
pub fn route_query<'a>(
    config: &'a Config,
    query: &str,
    selected_text: Option<&str>,
) -> (&'a ModelProfile, QueryComplexity) {
    let complexity = analyze_query_complexity(query, selected_text);

    let profile = match complexity {
        QueryComplexity::Simple => &config.routing.fast,
        QueryComplexity::Medium | QueryComplexity::Complex => &config.routing.quality,
    };

    let prefix: String = query.chars().take(48).collect();
    log::debug!(
        "routed query \"{}\" as {} -> {}",
        prefix,
        complexity.as_str(),
        profile.id
    );

    (profile, complexity)
}

/// Run the route command: classify and print the chosen profile.
pub fn run_route(config: &Config, query: &str, selected_text: Option<&str>) -> anyhow::Result<()> {
    let (profile, complexity) = route_query(config, query, selected_text);

    println!("Complexity: {}", complexity.as_str());
    println!("Profile:    {}", profile.id);
    println!("Max output: {} tokens", profile.max_output_tokens);
    println!(
        "Pricing:    {}/{} per MTok (in/out)",
        profile.input_cost_per_mtok, profile.output_cost_per_mtok
    );
    if !profile.description.is_empty() {
        println!("Notes:      {}", profile.description);
    }

    Ok(())
}
