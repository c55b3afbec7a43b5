//! Frontmatter parsing for wiki pages.
//!
//! A frontmatter block is a leading `---` line, YAML metadata, and a closing
//! `---` line. Recognized keys: `title`, `description`, `category` (strings)
//! and `keywords`, `related`, `seeAlso` (string lists). Unrecognized keys are
//! ignored; a missing or malformed block yields all defaults and the whole
//! input is treated as body text.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub keywords: Vec<String>,
    pub related: Vec<String>,
    #[serde(rename = "seeAlso")]
    pub see_also: Vec<String>,
}

/// Split raw file content into the frontmatter block (without delimiters)
/// and the body text.
pub fn split_frontmatter(input: &str) -> (Option<&str>, &str) {
    let after = if let Some(rest) = input.strip_prefix("---\n") {
        rest
    } else if let Some(rest) = input.strip_prefix("---\r\n") {
        rest
    } else {
        return (None, input);
    };

    let mut offset = 0;
    for line in after.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let block = &after[..offset];
            let body = &after[offset + line.len()..];
            return (Some(block), body);
        }
        offset += line.len();
    }

    // Unterminated block: treat the whole input as body.
    (None, input)
}

/// Parse content into metadata and body. YAML errors degrade to defaults
/// rather than failing the page.
pub fn parse_frontmatter(input: &str) -> (Frontmatter, &str) {
    match split_frontmatter(input) {
        (Some(block), body) => {
            let fm = serde_yaml::from_str::<Frontmatter>(block).unwrap_or_else(|e| {
                log::warn!("malformed frontmatter ignored: {}", e);
                Frontmatter::default()
            });
            (fm, body)
        }
        (None, body) => (Frontmatter::default(), body),
    }
}
