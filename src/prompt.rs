//! Cached prompt payload assembly.
//!
//! Segments are assembled in a fixed order so that the stable prefix
//! (system prompt, then page context) stays byte-identical across requests
//! and is eligible for provider-side prompt caching. Volatile material
//! (selected text, the query itself) comes last and is never marked
//! cacheable.

use crate::config::Config;
use crate::models::{MessageSegment, SegmentRole};

/// Fixed system prompt, always the first segment.
pub const SYSTEM_PROMPT: &str = "You are a research assistant for a content wiki. Answer from the \
supplied page context when possible, cite page slugs for claims drawn from \
the wiki, and say plainly when the wiki does not cover a topic.";

/// Assemble the ordered message payload for one query.
///
/// Order: system prompt (cacheable), page context truncated to the
/// configured character budget (cacheable, when supplied), selected text
/// verbatim (not cacheable, when supplied), then the user query.
pub fn build_cached_messages(
    config: &Config,
    query: &str,
    page_context: Option<&str>,
    selected_text: Option<&str>,
) -> Vec<MessageSegment> {
    let mut segments = vec![MessageSegment {
        role: SegmentRole::System,
        text: SYSTEM_PROMPT.to_string(),
        cacheable: true,
    }];

    if let Some(context) = page_context {
        segments.push(MessageSegment {
            role: SegmentRole::System,
            text: truncate_context(context, config.cache.context_budget_chars),
            cacheable: true,
        });
    }

    if let Some(selected) = selected_text {
        segments.push(MessageSegment {
            role: SegmentRole::User,
            text: format!("Selected text:\n{}", selected),
            cacheable: false,
        });
    }

    segments.push(MessageSegment {
        role: SegmentRole::User,
        text: query.to_string(),
        cacheable: false,
    });

    segments
}

/// Truncate to a character budget, appending an ellipsis marker when the
/// source exceeds it. Counts chars, not bytes, so multi-byte text never
/// splits mid-codepoint.
fn truncate_context(text: &str, budget_chars: usize) -> String {
    let mut chars = text.char_indices();
    match chars.nth(budget_chars) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}…", &text[..cut]),
    }
}

/// Run the prompt command: resolve optional page context and print the
/// assembled segments.
pub fn run_prompt(
    config: &Config,
    query: &str,
    page: Option<&str>,
    selected_text: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let page_context = match page {
        Some(slug) => {
            let body = crate::graph::page_body(config, slug)?;
            if body.is_none() {
                log::warn!("no page found for slug '{}', omitting context", slug);
            }
            body
        }
        None => None,
    };

    let segments = build_cached_messages(config, query, page_context.as_deref(), selected_text);

    if json {
        println!("{}", serde_json::to_string_pretty(&segments)?);
        return Ok(());
    }

    for (i, segment) in segments.iter().enumerate() {
        println!(
            "[{}] {:?} cacheable={}",
            i, segment.role, segment.cacheable
        );
        println!("{}", segment.text);
        println!();
    }

    Ok(())
}
