//! Link graph construction and derived views.
//!
//! The graph is built in two passes over the full file set: pass one parses
//! every page and collects its forward links (in-body extraction unioned
//! with frontmatter `related`/`seeAlso`), pass two inverts the forward sets
//! into backlinks. An unreadable content root is terminal — callers get a
//! single error, never a partial graph.
//!
//! Cycles are valid and expected; no detection is attempted. Dangling edges
//! are kept in the maps and dropped only when a view resolves them.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::extract::LinkExtractor;
use crate::frontmatter::parse_frontmatter;
use crate::models::{LinkGraph, WikiPage};

/// Build the full bidirectional graph from the configured content root.
pub fn build_link_graph(config: &Config) -> Result<LinkGraph> {
    let files = content_files(config)?;
    let extractor = LinkExtractor::new(&config.content.wiki_prefix)?;

    let mut pages: BTreeMap<String, WikiPage> = BTreeMap::new();
    let mut forward_links: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    // First pass: parse every page and collect forward links.
    for path in &files {
        let slug = slug_for(path);
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read page: {}", path.display()))?;

        let (fm, body) = parse_frontmatter(&text);

        let mut targets = extractor.extract(body);
        targets.extend(fm.related.iter().cloned());
        targets.extend(fm.see_also.iter().cloned());

        if pages.contains_key(&slug) {
            log::warn!("duplicate slug '{}', later file wins: {}", slug, path.display());
        }

        let page = WikiPage {
            title: fm.title.unwrap_or_else(|| slug.clone()),
            description: fm.description,
            category: fm.category,
            keywords: fm.keywords,
            related: fm.related,
            see_also: fm.see_also,
            slug: slug.clone(),
        };

        forward_links.insert(slug.clone(), targets);
        pages.insert(slug, page);
    }

    // Second pass: invert forward links into backlinks.
    let mut backlinks: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (source, targets) in &forward_links {
        for target in targets {
            backlinks
                .entry(target.clone())
                .or_default()
                .insert(source.clone());
        }
    }

    Ok(LinkGraph {
        pages,
        forward_links,
        backlinks,
    })
}

/// Pages that link to `slug`, resolved against the page set. Dangling
/// sources are silently dropped; unknown slugs yield an empty list.
pub fn backlinks_for<'a>(graph: &'a LinkGraph, slug: &str) -> Vec<&'a WikiPage> {
    graph
        .backlinks
        .get(slug)
        .into_iter()
        .flatten()
        .filter_map(|source| graph.pages.get(source))
        .collect()
}

/// Pages declared in `slug`'s frontmatter `related` and `seeAlso` fields,
/// resolved and deduplicated. Empty for unknown slugs.
pub fn related_pages<'a>(graph: &'a LinkGraph, slug: &str) -> Vec<&'a WikiPage> {
    let Some(page) = graph.pages.get(slug) else {
        return Vec::new();
    };

    let declared: BTreeSet<&str> = page
        .related
        .iter()
        .chain(page.see_also.iter())
        .map(String::as_str)
        .collect();

    declared
        .into_iter()
        .filter_map(|target| graph.pages.get(target))
        .collect()
}

/// Pages sharing `slug`'s category, excluding the page itself. Empty when
/// the page is unknown or has no category.
pub fn category_pages<'a>(graph: &'a LinkGraph, slug: &str) -> Vec<&'a WikiPage> {
    let Some(category) = graph.pages.get(slug).and_then(|p| p.category.as_deref()) else {
        return Vec::new();
    };

    graph
        .pages
        .values()
        .filter(|p| p.slug != slug && p.category.as_deref() == Some(category))
        .collect()
}

/// Scan the content root for page files, sorted for deterministic ordering.
pub fn content_files(config: &Config) -> Result<Vec<PathBuf>> {
    let root = &config.content.root;
    if !root.exists() {
        bail!("Content root does not exist: {}", root.display());
    }

    let include_set = build_globset(&config.content.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/node_modules/**".to_string(),
        "**/target/**".to_string(),
    ];
    default_excludes.extend(config.content.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut files = Vec::new();

    let walker = WalkDir::new(root).follow_links(config.content.follow_symlinks);
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to scan: {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) {
            continue;
        }
        if !include_set.is_match(&rel_str) {
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();

    Ok(files)
}

/// Read the raw body text of one page by slug, for prompt-context assembly.
/// Returns `None` when no file with that stem exists.
pub fn page_body(config: &Config, slug: &str) -> Result<Option<String>> {
    for path in content_files(config)? {
        if slug_for(&path) == slug {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read page: {}", path.display()))?;
            let (_, body) = parse_frontmatter(&text);
            return Ok(Some(body.to_string()));
        }
    }
    Ok(None)
}

fn slug_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Run the build command: construct the graph and print a summary.
pub fn run_build(config: &Config) -> Result<()> {
    let graph = build_link_graph(config)?;

    let edge_count: usize = graph.forward_links.values().map(|t| t.len()).sum();
    let dangling: usize = graph
        .forward_links
        .values()
        .flatten()
        .filter(|target| !graph.pages.contains_key(*target))
        .count();

    println!("wikigraph — Link Graph Summary");
    println!("==============================");
    println!();
    println!("  Content root:   {}", config.content.root.display());
    println!("  Pages:          {}", graph.pages.len());
    println!("  Forward edges:  {}", edge_count);
    println!("  Dangling edges: {}", dangling);
    println!();

    // Most-referenced pages, by backlink count.
    let mut ranked: Vec<(&String, usize)> = graph
        .backlinks
        .iter()
        .filter(|(slug, _)| graph.pages.contains_key(*slug))
        .map(|(slug, sources)| (slug, sources.len()))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    if !ranked.is_empty() {
        println!("  Most referenced:");
        for (slug, count) in ranked.iter().take(5) {
            println!("    {:<28} {} backlinks", slug, count);
        }
    }

    Ok(())
}

/// Print one derived view as a page list.
pub fn run_view(config: &Config, view: &str, slug: &str) -> Result<()> {
    let graph = build_link_graph(config)?;

    let pages = match view {
        "backlinks" => backlinks_for(&graph, slug),
        "related" => related_pages(&graph, slug),
        "category" => category_pages(&graph, slug),
        other => bail!("Unknown view: {}", other),
    };

    if pages.is_empty() {
        println!("No pages found.");
        return Ok(());
    }

    println!("{:<24} {:<16} TITLE", "SLUG", "CATEGORY");
    for page in pages {
        println!(
            "{:<24} {:<16} {}",
            page.slug,
            page.category.as_deref().unwrap_or("-"),
            page.title
        );
    }

    Ok(())
}
