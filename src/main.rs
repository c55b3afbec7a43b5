//! # wikigraph CLI (`wg`)
//!
//! The `wg` binary exposes the link-graph builder and the query-routing
//! pipeline over a markdown content directory.
//!
//! ## Usage
//!
//! ```bash
//! wg --config ./wikigraph.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `wg build` | Build the link graph and print a summary |
//! | `wg backlinks <slug>` | Pages linking to a page |
//! | `wg related <slug>` | Pages declared related in frontmatter |
//! | `wg category <slug>` | Pages sharing the page's category |
//! | `wg route "<query>"` | Classify a query and pick a model profile |
//! | `wg prompt "<query>"` | Assemble the cached prompt payload |
//! | `wg costs report` | Aggregate an API call log over a period |
//! | `wg costs estimate` | Price a hypothetical model call |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use wikigraph::{config, cost, graph, prompt, router};

/// wikigraph CLI — link-graph builder and cost-aware query router for
/// markdown wikis.
#[derive(Parser)]
#[command(
    name = "wg",
    about = "wikigraph — link-graph builder and cost-aware query router for markdown wikis",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// All content, routing, cache, and budget settings are read from this
    /// file. Missing settings fall back to defaults.
    #[arg(long, global = true, default_value = "./wikigraph.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Build the link graph and print a summary.
    ///
    /// Scans the content root, parses every page, and reports page, edge,
    /// and dangling-edge counts plus the most-referenced pages. The graph
    /// is rebuilt from scratch on every invocation.
    Build,

    /// List pages that link to the given page.
    Backlinks {
        /// Page slug (filename stem).
        slug: String,
    },

    /// List pages declared related in the page's frontmatter.
    Related {
        /// Page slug (filename stem).
        slug: String,
    },

    /// List pages sharing the page's category.
    Category {
        /// Page slug (filename stem).
        slug: String,
    },

    /// Classify a query and print the routed model profile.
    ///
    /// Simple queries go to the fast profile; medium and complex queries
    /// both go to the quality profile.
    Route {
        /// The query string.
        query: String,

        /// Selected-text context accompanying the query, if any.
        #[arg(long)]
        selected_text: Option<String>,
    },

    /// Assemble the cached prompt payload for a query.
    ///
    /// Prints the ordered message segments with their cache-control hints.
    /// With `--page`, the page's body is included as a cacheable context
    /// segment, truncated to the configured character budget.
    Prompt {
        /// The query string.
        query: String,

        /// Slug of a page whose body is supplied as context.
        #[arg(long)]
        page: Option<String>,

        /// Selected-text context accompanying the query, if any.
        #[arg(long)]
        selected_text: Option<String>,

        /// Emit the segments as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Cost accounting over external API calls.
    Costs {
        #[command(subcommand)]
        action: CostsAction,
    },
}

/// Cost accounting subcommands.
#[derive(Subcommand)]
enum CostsAction {
    /// Aggregate a JSON-lines call log over a timestamp range.
    ///
    /// The in-process call log is not durable, so reports read from a log
    /// file with one JSON entry per line.
    Report {
        /// Path to the JSON-lines call log.
        #[arg(long, default_value = "./costs.jsonl")]
        log: PathBuf,

        /// Only include calls on or after this date (YYYY-MM-DD).
        #[arg(long)]
        since: Option<String>,

        /// Only include calls on or before this date (YYYY-MM-DD).
        #[arg(long)]
        until: Option<String>,
    },

    /// Price a hypothetical model call against a routing profile.
    Estimate {
        /// Routing profile: `fast` or `quality`.
        #[arg(long, default_value = "quality")]
        profile: String,

        #[arg(long)]
        input_tokens: u64,

        #[arg(long)]
        output_tokens: u64,

        /// Tokens served from the provider's prompt cache.
        #[arg(long, default_value_t = 0)]
        cache_read_tokens: u64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // Route, prompt, and cost estimation work with defaults when no config
    // file exists; the graph commands need a real content root.
    let cfg = match &cli.command {
        Commands::Route { .. } | Commands::Prompt { .. } | Commands::Costs { .. } => {
            config::load_config(&cli.config).unwrap_or_else(|_| config::Config::minimal())
        }
        _ => config::load_config(&cli.config)?,
    };

    match cli.command {
        Commands::Build => {
            graph::run_build(&cfg)?;
        }
        Commands::Backlinks { slug } => {
            graph::run_view(&cfg, "backlinks", &slug)?;
        }
        Commands::Related { slug } => {
            graph::run_view(&cfg, "related", &slug)?;
        }
        Commands::Category { slug } => {
            graph::run_view(&cfg, "category", &slug)?;
        }
        Commands::Route {
            query,
            selected_text,
        } => {
            router::run_route(&cfg, &query, selected_text.as_deref())?;
        }
        Commands::Prompt {
            query,
            page,
            selected_text,
            json,
        } => {
            prompt::run_prompt(&cfg, &query, page.as_deref(), selected_text.as_deref(), json)?;
        }
        Commands::Costs { action } => match action {
            CostsAction::Report { log, since, until } => {
                cost::run_report(&cfg, &log, since, until)?;
            }
            CostsAction::Estimate {
                profile,
                input_tokens,
                output_tokens,
                cache_read_tokens,
            } => {
                cost::run_estimate(&cfg, &profile, input_tokens, output_tokens, cache_read_tokens)?;
            }
        },
    }

    Ok(())
}
