//! # Newsroom
//!
//! File-to-database-to-static-HTML content pipeline for the Influencer News
//! site. Plain-text files are the editorial interface: writers drop
//! `Key: Value` files into per-kind directories, and one `sync` run
//! reconciles those files against a SQLite store and regenerates the static
//! site.
//!
//! # Architecture: One Reconciling Pipeline
//!
//! ```text
//! content/{kind}/*.txt  →  parse  →  resolve  →  reconcile  →  store  →  site/
//! ```
//!
//! Each content kind (authors, categories, articles, trending) flows through
//! the same stages, in dependency order so article references always resolve
//! against already-committed authors and categories:
//!
//! 1. **Parse** each source file into a typed candidate record.
//! 2. **Resolve** article references (author name, category slug) to store ids.
//! 3. **Reconcile** disk slugs against store slugs into an add/delete plan.
//! 4. **Apply** the plan in one batch per kind; each record in a savepoint.
//! 5. **Generate** detail pages per kind, then every aggregate page wholesale.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`parse`] | Source file format: metadata block, `---` separator, body sections |
//! | [`resolve`] | Cross-reference resolution of article author/category to store ids |
//! | [`reconcile`] | Pure disk-versus-store slug diff producing the add/delete plan |
//! | [`store`] | SQLite persistence: schema, batches, savepoints, integrity checks |
//! | [`render`] | Pure Maud renderers from store records to markup |
//! | [`generate`] | Output tree writing and orphaned-page cleanup |
//! | [`sync`] | Orchestration: per-kind runs, failure collection, the run report |
//! | [`config`] | Optional `config.toml` with full defaults |
//! | [`model`] | Stored record types and the [`model::ContentKind`] enum |
//! | [`slug`] | Slug derivation shared by parser and tests |
//! | [`report`] | CLI output formatting for sync, stats, and status |
//!
//! # Design Decisions
//!
//! ## Slugs Are Identity; No Update Path
//!
//! A record's slug is its stable identity across runs. Sync adds records
//! whose slug is new and deletes records whose file is gone — it never
//! updates in place. Editing a published record is an explicit delete plus
//! recreate, which keeps every run a pure set diff and makes reruns
//! idempotent by construction.
//!
//! ## Hard References Down, Soft References Sideways
//!
//! Articles cannot exist without their author and category: references are
//! resolved before insert and backed by foreign keys, and deletes of a
//! referenced author or category are refused. Trending topics instead carry
//! advisory article ids with no enforcement — a topic may point at articles
//! that were never synced or have since been deleted, and pages simply skip
//! the dangling ones.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system, rather than Handlebars or Tera:
//!
//! - **Compile-time checking**: malformed HTML is a build error.
//! - **Type-safe**: template variables are Rust expressions.
//! - **XSS-safe by default**: all interpolation is auto-escaped, which is
//!   load-bearing here — source files are untrusted input.
//! - **Zero runtime files**: no template directory to ship.
//!
//! ## Regenerate Aggregates, Never Patch
//!
//! Listing pages and the homepage are rewritten from store state on every
//! run rather than incrementally patched. Counts shown on listings are
//! live queries; a stale count cannot survive a sync.

pub mod config;
pub mod generate;
pub mod model;
pub mod parse;
pub mod reconcile;
pub mod render;
pub mod report;
pub mod resolve;
pub mod slug;
pub mod store;
pub mod sync;
