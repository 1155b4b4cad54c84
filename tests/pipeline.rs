//! End-to-end pipeline tests: content tree in, store plus HTML tree out.

use newsroom::config::SiteConfig;
use newsroom::model::ContentKind;
use newsroom::store::Store;
use newsroom::sync::{self, FailureKind, RunReport};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_file(root: &Path, kind: &str, name: &str, text: &str) {
    let dir = root.join(kind);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), text).unwrap();
}

/// A small but complete newsroom: one author, one category, one article
/// with sections, one trending topic.
fn seed_content(root: &Path) {
    write_file(
        root,
        "authors",
        "jane.txt",
        "Name: Jane Doe\nTitle: Senior Writer\nEmail: jane@example.com\n---\nCovers the creator economy.",
    );
    write_file(
        root,
        "categories",
        "tech.txt",
        "Name: Technology\nSlug: tech\nColor: blue\nIcon: \u{1F4F1}\n---\nTech and platform news.",
    );
    write_file(
        root,
        "articles",
        "hello.txt",
        "Title: Hello\nAuthor: Jane Doe\nCategory: tech\nTags: intro, welcome\n---\n\
         Lead paragraph.\n\n## Background\nSome context.\n\n## Outlook\nWhat comes next.",
    );
    write_file(
        root,
        "trending",
        "ai-tools.txt",
        "Title: AI Tools\nHeat Score: 85\n---\nEveryone is shipping assistants.",
    );
}

struct Pipeline {
    tmp: TempDir,
    store: Store,
    config: SiteConfig,
}

impl Pipeline {
    fn new() -> Pipeline {
        let tmp = TempDir::new().unwrap();
        seed_content(&tmp.path().join("content"));
        Pipeline {
            store: Store::open(&tmp.path().join("data/newsroom.db")).unwrap(),
            config: SiteConfig::default(),
            tmp,
        }
    }

    fn content(&self) -> std::path::PathBuf {
        self.tmp.path().join("content")
    }

    fn site(&self) -> std::path::PathBuf {
        self.tmp.path().join("site")
    }

    fn run(&self) -> RunReport {
        sync::sync_all(&self.store, &self.config, &self.content(), &self.site()).unwrap()
    }
}

#[test]
fn full_run_builds_store_and_site() {
    let p = Pipeline::new();
    let report = p.run();

    assert!(!report.has_failures());
    let counts = p.store.counts().unwrap();
    assert_eq!(counts.authors, 1);
    assert_eq!(counts.categories, 1);
    assert_eq!(counts.articles, 1);
    assert_eq!(counts.topics, 1);

    // Detail pages use the singular-prefix naming
    assert!(p.site().join("authors/author_jane-doe.html").exists());
    assert!(p.site().join("categories/category_tech.html").exists());
    assert!(p.site().join("articles/article_hello.html").exists());
    assert!(p.site().join("trending/trend_ai-tools.html").exists());

    // Aggregates and assets
    assert!(p.site().join("index.html").exists());
    assert!(p.site().join("articles/index.html").exists());
    assert!(p.site().join("assets/style.css").exists());

    // Author round-trip: name and bio survive to the detail page
    let author_page =
        fs::read_to_string(p.site().join("authors/author_jane-doe.html")).unwrap();
    assert!(author_page.contains("Jane Doe"));
    assert!(author_page.contains("Covers the creator economy."));
}

#[test]
fn removed_category_page_and_listing_entry_disappear() {
    let p = Pipeline::new();
    write_file(
        &p.content(),
        "categories",
        "style.txt",
        "Name: Style\nSlug: style\nColor: pink\n---\nFashion and aesthetics.",
    );
    p.run();
    assert!(p.site().join("categories/category_style.html").exists());

    fs::remove_file(p.content().join("categories/style.txt")).unwrap();
    let report = p.run();
    assert!(!report.has_failures());

    assert!(!p.site().join("categories/category_style.html").exists());
    let listing = fs::read_to_string(p.site().join("categories/index.html")).unwrap();
    assert!(!listing.contains("Style"));
    assert!(listing.contains("Technology"));
}

#[test]
fn article_page_has_sections_and_cross_links() {
    let p = Pipeline::new();
    p.run();
    let html = fs::read_to_string(p.site().join("articles/article_hello.html")).unwrap();
    assert!(html.contains("Lead paragraph."));
    assert!(html.contains("Background"));
    assert!(html.contains("Outlook"));
    assert!(html.contains("author_jane-doe.html"));
    assert!(html.contains("category_tech.html"));
}

#[test]
fn second_run_is_idempotent_down_to_the_bytes() {
    let p = Pipeline::new();
    p.run();
    let first = fs::read_to_string(p.site().join("articles/article_hello.html")).unwrap();
    let first_home = fs::read_to_string(p.site().join("index.html")).unwrap();

    let report = p.run();
    for (_, stats) in &report.kinds {
        assert_eq!(stats.created, 0);
        assert_eq!(stats.deleted, 0);
    }
    let second = fs::read_to_string(p.site().join("articles/article_hello.html")).unwrap();
    let second_home = fs::read_to_string(p.site().join("index.html")).unwrap();
    assert_eq!(first, second);
    assert_eq!(first_home, second_home);
}

#[test]
fn edited_file_is_not_an_update() {
    let p = Pipeline::new();
    p.run();

    // Same slug, different content: the stored record wins
    write_file(
        &p.content(),
        "articles",
        "hello.txt",
        "Title: Hello\nAuthor: Jane Doe\nCategory: tech\n---\nCompletely rewritten.",
    );
    p.run();

    let article = p.store.find_article_by_slug("hello").unwrap().unwrap();
    assert_eq!(article.content, "Lead paragraph.");
}

#[test]
fn article_with_unknown_author_is_skipped_and_reported() {
    let p = Pipeline::new();
    write_file(
        &p.content(),
        "articles",
        "orphan.txt",
        "Title: Orphan\nAuthor: Nobody Real\nCategory: tech\n---\nBody.",
    );
    let report = p.run();

    assert!(report.has_failures());
    let failure = &report.failures[0];
    assert_eq!(failure.failure, FailureKind::Reference);
    assert_eq!(failure.kind, ContentKind::Articles);
    assert!(failure.message.contains("Nobody Real"));

    // The bad file never reached the store or the site
    assert!(p.store.find_article_by_slug("orphan").unwrap().is_none());
    assert!(!p.site().join("articles/article_orphan.html").exists());
    // The good article still synced in the same batch
    assert!(p.store.find_article_by_slug("hello").unwrap().is_some());
}

#[test]
fn referenced_author_survives_file_deletion_until_articles_go() {
    let p = Pipeline::new();
    p.run();
    // Keep the authors directory non-empty so the delete is attempted
    write_file(&p.content(), "authors", "sam.txt", "Name: Sam Lee\n---\nBio.");
    p.run();

    // Phase one: author file gone, article still references the record
    fs::remove_file(p.content().join("authors/jane.txt")).unwrap();
    let report = p.run();
    assert!(report.has_failures());
    assert_eq!(
        report.failures[0].failure,
        FailureKind::ReferentialIntegrity
    );
    assert!(p.store.find_author_by_slug("jane-doe").unwrap().is_some());
    assert!(p.site().join("authors/author_jane-doe.html").exists());

    // Phase two: article file gone too. Authors sync before articles, so
    // the author delete is blocked once more this run while the article
    // itself goes away.
    fs::remove_file(p.content().join("articles/hello.txt")).unwrap();
    write_file(
        &p.content(),
        "articles",
        "filler.txt",
        "Title: Filler\nAuthor: Sam Lee\nCategory: tech\n---\nKeeps the dir non-empty.",
    );
    let report = p.run();
    assert!(report.has_failures());
    assert!(p.store.find_article_by_slug("hello").unwrap().is_none());
    assert!(!p.site().join("articles/article_hello.html").exists());

    // Phase three: nothing references the author anymore
    let report = p.run();
    assert!(!report.has_failures());
    assert!(p.store.find_author_by_slug("jane-doe").unwrap().is_none());
    assert!(!p.site().join("authors/author_jane-doe.html").exists());
}

#[test]
fn listing_counts_follow_deletions() {
    let p = Pipeline::new();
    p.run();
    let html = fs::read_to_string(p.site().join("categories/index.html")).unwrap();
    assert!(html.contains("1 articles"));

    fs::remove_file(p.content().join("articles/hello.txt")).unwrap();
    write_file(
        &p.content(),
        "articles",
        "other.txt",
        "Title: Other\nAuthor: Jane Doe\nCategory: tech\n---\nStill here.",
    );
    p.run();

    let html = fs::read_to_string(p.site().join("categories/index.html")).unwrap();
    assert!(html.contains("1 articles"));
    assert!(!p.site().join("articles/article_hello.html").exists());
    assert!(p.site().join("articles/article_other.html").exists());
}

#[test]
fn slug_collision_keeps_first_record() {
    let p = Pipeline::new();
    write_file(
        &p.content(),
        "articles",
        "hello-2.txt",
        "Title: Hello Again\nSlug: hello\nAuthor: Jane Doe\nCategory: tech\n---\nImpostor.",
    );
    let report = p.run();

    // Files scan in sorted order, so hello-2.txt claims the slug first and
    // hello.txt is reported as the collision
    assert_eq!(p.store.counts().unwrap().articles, 1);
    assert!(report.has_failures());
    let failure = &report.failures[0];
    assert_eq!(failure.failure, FailureKind::Constraint);
    assert_eq!(failure.slug, "hello");
    assert!(p.store.find_article_by_slug("hello").unwrap().is_some());
}

#[test]
fn script_in_content_is_escaped_in_output() {
    let p = Pipeline::new();
    write_file(
        &p.content(),
        "authors",
        "evil.txt",
        "Name: <script>alert('xss')</script>\n---\nBio with <img src=x onerror=alert(1)>.",
    );
    p.run();

    let listing = fs::read_to_string(p.site().join("authors/index.html")).unwrap();
    assert!(!listing.contains("<script>alert"));
    assert!(listing.contains("&lt;script&gt;"));
}

#[test]
fn status_surfaces_schema() {
    let p = Pipeline::new();
    p.run();
    let tables = p.store.table_names().unwrap();
    for expected in ["authors", "categories", "articles", "sections", "trending_topics"] {
        assert!(tables.contains(&expected.to_string()), "missing {expected}");
    }
    assert!(p.store.foreign_keys_enabled().unwrap());
}
