//! Sync orchestration.
//!
//! Drives one full pipeline run: for each content kind in dependency order
//! (authors, categories, articles, trending), scan the kind's source
//! directory, parse each file, reconcile against the store, apply creates and
//! deletes in one batch, regenerate the kind's pages, and finally regenerate
//! the aggregate pages once everything has settled.
//!
//! ## Failure policy
//!
//! A single bad file never aborts the run. Parse errors, unresolved
//! references, slug collisions, and blocked deletes are collected per file
//! and reported at the end; every other record in the batch still commits.
//! Only losing the store or the output directory is fatal.
//!
//! When any of a kind's files fails to parse, that kind's deletes are
//! skipped for the run: the scan was incomplete, and a record must never be
//! deleted just because its source file became unreadable. Creates and the
//! other kinds proceed normally.

use crate::config::SiteConfig;
use crate::generate::{self, GenerateError};
use crate::model::ContentKind;
use crate::parse::{self, ParseError};
use crate::reconcile;
use crate::resolve::{self, ResolveError};
use crate::store::{Store, StoreError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Fatal errors that abort the whole run.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error("IO error reading content: {0}")]
    Io(#[from] std::io::Error),
}

/// Why one file was skipped. Everything here is recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The file could not be parsed into a candidate record.
    Parse,
    /// The file references an author or category that does not exist.
    Reference,
    /// The record collides with an existing slug or name.
    Constraint,
    /// The delete is blocked by records referencing the target.
    ReferentialIntegrity,
}

impl FailureKind {
    pub fn label(self) -> &'static str {
        match self {
            FailureKind::Parse => "parse",
            FailureKind::Reference => "reference",
            FailureKind::Constraint => "constraint",
            FailureKind::ReferentialIntegrity => "integrity",
        }
    }
}

/// One skipped file or blocked delete, with the message shown in the report.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub kind: ContentKind,
    pub slug: String,
    pub failure: FailureKind,
    pub message: String,
}

/// Per-kind outcome counts.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct KindStats {
    pub created: usize,
    pub deleted: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Everything one run did, for reporting and for the process exit code.
/// Serializes to JSON for the `sync --json` machine-readable report.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub kinds: Vec<(ContentKind, KindStats)>,
    pub failures: Vec<FileFailure>,
    pub pages_written: usize,
    pub orphans_removed: usize,
}

impl RunReport {
    /// True when any file was skipped; the CLI exits nonzero on this.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// A parsed candidate of any kind, keyed by slug until reconciliation
/// decides its fate.
enum Candidate {
    Author(parse::AuthorFile),
    Category(parse::CategoryFile),
    Article(parse::ArticleFile),
    Topic(parse::TopicFile),
}

impl Candidate {
    fn slug(&self) -> &str {
        match self {
            Candidate::Author(f) => &f.slug,
            Candidate::Category(f) => &f.slug,
            Candidate::Article(f) => &f.slug,
            Candidate::Topic(f) => &f.slug,
        }
    }
}

fn parse_candidate(kind: ContentKind, text: &str) -> Result<Candidate, ParseError> {
    Ok(match kind {
        ContentKind::Authors => Candidate::Author(parse::parse_author(text)?),
        ContentKind::Categories => Candidate::Category(parse::parse_category(text)?),
        ContentKind::Articles => Candidate::Article(parse::parse_article(text)?),
        ContentKind::Trending => Candidate::Topic(parse::parse_topic(text)?),
    })
}

/// Sync every content kind and regenerate the whole site.
pub fn sync_all(
    store: &Store,
    config: &SiteConfig,
    content_root: &Path,
    output_root: &Path,
) -> Result<RunReport, SyncError> {
    sync_kinds(store, config, &ContentKind::all(), content_root, output_root)
}

/// Sync the given kinds in the order passed, then regenerate their pages and
/// the aggregates. Aggregates always run last so counts reflect final state.
pub fn sync_kinds(
    store: &Store,
    config: &SiteConfig,
    kinds: &[ContentKind],
    content_root: &Path,
    output_root: &Path,
) -> Result<RunReport, SyncError> {
    let now = unix_now();
    let mut report = RunReport::default();

    for &kind in kinds {
        let stats = sync_kind(store, kind, content_root, &mut report.failures)?;
        report.kinds.push((kind, stats));
    }
    for &kind in kinds {
        let generated = generate::generate_kind(store, config, kind, output_root, now)?;
        report.pages_written += generated.pages_written;
        report.orphans_removed += generated.orphans_removed;
    }
    let generated = generate::generate_aggregates(store, config, output_root, now)?;
    report.pages_written += generated.pages_written;

    Ok(report)
}

/// Reconcile one kind's source directory against the store.
fn sync_kind(
    store: &Store,
    kind: ContentKind,
    content_root: &Path,
    failures: &mut Vec<FileFailure>,
) -> Result<KindStats, SyncError> {
    let dir = content_root.join(kind.dir_name());
    let mut stats = KindStats::default();

    // A missing or empty directory means "nothing to sync", never "delete
    // everything". Mass deletion requires the files to actually be gone from
    // a directory that still has peers.
    if !dir.is_dir() {
        return Ok(stats);
    }

    let mut files: Vec<_> = fs::read_dir(&dir)?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    if files.is_empty() {
        return Ok(stats);
    }
    files.sort();

    let mut disk: BTreeSet<String> = BTreeSet::new();
    let mut candidates: BTreeMap<String, Candidate> = BTreeMap::new();
    let mut scan_incomplete = false;

    for path in &files {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let outcome = match fs::read_to_string(path) {
            Ok(text) => parse_candidate(kind, &text).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match outcome {
            Ok(candidate) => {
                let slug = candidate.slug().to_string();
                if candidates.contains_key(&slug) {
                    // First file to claim a slug wins; later claims are
                    // collisions, reported against the losing file
                    stats.failed += 1;
                    failures.push(FileFailure {
                        kind,
                        slug: stem,
                        failure: FailureKind::Constraint,
                        message: format!("slug '{slug}' already claimed by another file"),
                    });
                } else {
                    disk.insert(slug.clone());
                    candidates.insert(slug, candidate);
                }
            }
            Err(message) => {
                scan_incomplete = true;
                stats.failed += 1;
                failures.push(FileFailure {
                    kind,
                    slug: stem,
                    failure: FailureKind::Parse,
                    message,
                });
            }
        }
    }

    let stored: BTreeSet<String> = store.slugs(kind)?.into_iter().collect();
    let mut plan = reconcile::plan(&disk, &stored);
    if scan_incomplete {
        // The disk picture is partial; deleting against it is unsafe
        plan.to_delete.clear();
    }
    stats.unchanged = plan.unchanged.len();

    store.begin_batch()?;
    let result = apply_plan(store, kind, &plan, &candidates, &mut stats, failures);
    match result {
        Ok(()) => store.commit_batch()?,
        Err(e) => {
            // Fatal error: drop the whole batch and stop the run
            let _ = store.rollback_batch();
            return Err(e);
        }
    }

    Ok(stats)
}

fn apply_plan(
    store: &Store,
    kind: ContentKind,
    plan: &reconcile::Plan,
    candidates: &BTreeMap<String, Candidate>,
    stats: &mut KindStats,
    failures: &mut Vec<FileFailure>,
) -> Result<(), SyncError> {
    for slug in &plan.to_create {
        let Some(candidate) = candidates.get(slug) else {
            continue;
        };
        match create_candidate(store, candidate) {
            Ok(()) => stats.created += 1,
            Err(CreateFailure::Recoverable(failure, message)) => {
                stats.failed += 1;
                failures.push(FileFailure {
                    kind,
                    slug: slug.clone(),
                    failure,
                    message,
                });
            }
            Err(CreateFailure::Fatal(e)) => return Err(e),
        }
    }
    for slug in &plan.to_delete {
        match store.delete_by_slug(kind, slug) {
            Ok(()) => stats.deleted += 1,
            Err(e @ StoreError::ReferentialIntegrity { .. }) => {
                stats.failed += 1;
                failures.push(FileFailure {
                    kind,
                    slug: slug.clone(),
                    failure: FailureKind::ReferentialIntegrity,
                    message: e.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

enum CreateFailure {
    Recoverable(FailureKind, String),
    Fatal(SyncError),
}

fn create_candidate(store: &Store, candidate: &Candidate) -> Result<(), CreateFailure> {
    let result = match candidate {
        Candidate::Author(f) => store.create_author(f).map(|_| ()),
        Candidate::Category(f) => store.create_category(f).map(|_| ()),
        Candidate::Topic(f) => store.create_topic(f).map(|_| ()),
        Candidate::Article(f) => match resolve::resolve_article(store, f.clone()) {
            Ok(resolved) => store.create_article(&resolved).map(|_| ()),
            Err(e @ ResolveError::MissingReference { .. }) => {
                return Err(CreateFailure::Recoverable(
                    FailureKind::Reference,
                    e.to_string(),
                ));
            }
            Err(ResolveError::Store(e)) => return Err(CreateFailure::Fatal(e.into())),
        },
    };
    match result {
        Ok(()) => Ok(()),
        Err(e @ StoreError::Constraint { .. }) => {
            Err(CreateFailure::Recoverable(FailureKind::Constraint, e.to_string()))
        }
        Err(e) => Err(CreateFailure::Fatal(e.into())),
    }
}

/// Seconds since the unix epoch, for relative dates on generated pages.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
