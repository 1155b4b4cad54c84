//! Output tree generation.
//!
//! Writes the rendered pages to disk and keeps the output tree consistent
//! with the store:
//!
//! - one detail page per record, at `{kind}/{prefix}_{slug}.html`
//! - a listing page per kind at `{kind}/index.html`
//! - the homepage and stylesheet at the root
//!
//! Detail pages for records that no longer exist are removed after each
//! kind's pages are written, so a deleted record's page never outlives the
//! record. Aggregate pages are regenerated wholesale on every run rather
//! than patched, which keeps listing counts live.

use crate::config::SiteConfig;
use crate::model::{Article, ContentKind};
use crate::render;
use crate::store::{Store, StoreError};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error writing output: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What one generation step did to the output tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateStats {
    pub pages_written: usize,
    pub orphans_removed: usize,
}

/// Write the detail pages for one content kind, then remove orphaned pages
/// left behind by deleted records.
pub fn generate_kind(
    store: &Store,
    config: &SiteConfig,
    kind: ContentKind,
    output_root: &Path,
    now: i64,
) -> Result<GenerateStats, GenerateError> {
    let dir = output_root.join(kind.dir_name());
    fs::create_dir_all(&dir)?;
    let site = &config.site;

    let mut stats = GenerateStats::default();
    let mut expected: BTreeSet<String> = BTreeSet::new();

    match kind {
        ContentKind::Authors => {
            for author in store.list_authors()? {
                let mut articles = Vec::new();
                for article in store.list_articles(Some(author.id), None)? {
                    let category = category_of(store, &article)?;
                    articles.push((article, category));
                }
                let page = render::render_author_page(site, &author, &articles, now);
                let name = kind.detail_page_name(&author.slug);
                fs::write(dir.join(&name), page.into_string())?;
                expected.insert(name);
                stats.pages_written += 1;
            }
        }
        ContentKind::Categories => {
            for category in store.list_categories()? {
                let mut articles = Vec::new();
                for article in store.list_articles(None, Some(category.id))? {
                    let author = author_of(store, &article)?;
                    articles.push((article, author));
                }
                let page = render::render_category_page(site, &category, &articles, now);
                let name = kind.detail_page_name(&category.slug);
                fs::write(dir.join(&name), page.into_string())?;
                expected.insert(name);
                stats.pages_written += 1;
            }
        }
        ContentKind::Articles => {
            for article in store.list_articles(None, None)? {
                let sections = store.sections_for_article(article.id)?;
                let author = author_of(store, &article)?;
                let category = category_of(store, &article)?;
                let page =
                    render::render_article_page(site, &article, &sections, &author, &category, now);
                let name = kind.detail_page_name(&article.slug);
                fs::write(dir.join(&name), page.into_string())?;
                expected.insert(name);
                stats.pages_written += 1;
            }
        }
        ContentKind::Trending => {
            for topic in store.list_topics()? {
                // Soft references: dangling ids are skipped, not errors
                let mut related = Vec::new();
                for id in &topic.related_article_ids {
                    if let Some(article) = store.find_article_by_id(*id)? {
                        related.push(article);
                    }
                }
                let page = render::render_topic_page(site, &topic, &related);
                let name = kind.detail_page_name(&topic.slug);
                fs::write(dir.join(&name), page.into_string())?;
                expected.insert(name);
                stats.pages_written += 1;
            }
        }
    }

    stats.orphans_removed = remove_orphans(&dir, kind, &expected)?;
    Ok(stats)
}

/// Regenerate the per-kind listing pages, the homepage, and the stylesheet.
/// Runs after all kinds have synced so every count and cross-link reflects
/// final state.
pub fn generate_aggregates(
    store: &Store,
    config: &SiteConfig,
    output_root: &Path,
    now: i64,
) -> Result<GenerateStats, GenerateError> {
    let site = &config.site;
    let mut stats = GenerateStats::default();
    let mut write = |path: &Path, html: String| -> Result<(), GenerateError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, html)?;
        stats.pages_written += 1;
        Ok(())
    };

    let mut author_counts = Vec::new();
    for author in store.list_authors()? {
        let count = store.count_articles_by_author(author.id)?;
        author_counts.push((author, count));
    }
    write(
        &output_root.join("authors/index.html"),
        render::render_author_listing(site, &author_counts).into_string(),
    )?;

    let mut category_counts = Vec::new();
    for category in store.list_categories()? {
        let count = store.count_articles_by_category(category.id)?;
        category_counts.push((category, count));
    }
    write(
        &output_root.join("categories/index.html"),
        render::render_category_listing(site, &category_counts).into_string(),
    )?;

    let mut articles = Vec::new();
    for article in store.list_articles(None, None)? {
        let author = author_of(store, &article)?;
        let category = category_of(store, &article)?;
        articles.push((article, author, category));
    }
    write(
        &output_root.join("articles/index.html"),
        render::render_article_listing(site, &articles, now).into_string(),
    )?;

    let mut topics = store.list_topics()?;
    topics.truncate(config.trending.listing_limit);
    write(
        &output_root.join("trending/index.html"),
        render::render_trending_listing(site, &topics).into_string(),
    )?;

    let recent: Vec<_> = articles
        .iter()
        .take(config.homepage.article_limit)
        .cloned()
        .collect();
    let top_topics: Vec<_> = topics.iter().take(5).cloned().collect();
    write(
        &output_root.join("index.html"),
        render::render_homepage(site, &recent, &category_counts, &top_topics, now).into_string(),
    )?;

    fs::create_dir_all(output_root.join("assets"))?;
    fs::write(
        output_root.join("assets/style.css"),
        include_str!("../static/style.css"),
    )?;

    Ok(stats)
}

/// Remove detail pages in `dir` whose record no longer exists. `index.html`
/// and non-HTML files are never touched.
fn remove_orphans(
    dir: &Path,
    kind: ContentKind,
    expected: &BTreeSet<String>,
) -> Result<usize, GenerateError> {
    let prefix = format!("{}_", kind.page_prefix());
    let mut removed = 0;
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.ends_with(".html") || !name.starts_with(&prefix) {
            continue;
        }
        if !expected.contains(&name) {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

fn author_of(store: &Store, article: &Article) -> Result<crate::model::Author, GenerateError> {
    store
        .find_author_by_id(article.author_id)?
        .ok_or_else(|| missing_row("author", article.author_id))
}

fn category_of(store: &Store, article: &Article) -> Result<crate::model::Category, GenerateError> {
    store
        .find_category_by_id(article.category_id)?
        .ok_or_else(|| missing_row("category", article.category_id))
}

// FK constraints make this unreachable short of external database edits.
fn missing_row(what: &str, id: i64) -> GenerateError {
    GenerateError::Store(StoreError::Unavailable {
        path: String::new(),
        reason: format!("article references missing {what} id {id}"),
    })
}
