//! # wikigraph
//!
//! A link-graph builder and cost-aware query router for markdown wikis.
//!
//! wikigraph scans a directory of markdown pages with YAML frontmatter,
//! derives a bidirectional link graph (forward links + backlinks) and its
//! views (related pages, category siblings), and routes natural-language
//! queries to a model profile by complexity, assembling prompt payloads
//! with provider-cache hints and tracking per-call cost against a budget.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌─────────────┐
//! │ content/*.md │──▶│  Link Graph   │──▶│   Views     │
//! │ frontmatter  │   │ fwd + back   │   │ backlinks.. │
//! └──────────────┘   └──────────────┘   └─────────────┘
//!
//! ┌──────────────┐   ┌──────────────┐   ┌─────────────┐
//! │    query     │──▶│  Classifier   │──▶│   Prompt    │
//! │ + selection  │   │   + Router   │   │  assembly   │
//! └──────────────┘   └──────┬───────┘   └─────────────┘
//!                           ▼
//!                    ┌──────────────┐   ┌─────────────┐
//!                    │ Research     │   │    Cost     │
//!                    │ cache        │   │  tracking   │
//!                    └──────────────┘   └─────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`frontmatter`] | Page metadata parsing |
//! | [`extract`] | In-body link extraction |
//! | [`graph`] | Graph construction and derived views |
//! | [`router`] | Query complexity classification and routing |
//! | [`prompt`] | Cached prompt payload assembly |
//! | [`research_cache`] | TTL + similarity research cache |
//! | [`cost`] | Cost accounting and budget alerts |

pub mod config;
pub mod cost;
pub mod extract;
pub mod frontmatter;
pub mod graph;
pub mod models;
pub mod prompt;
pub mod research_cache;
pub mod router;
