//! SQLite content store.
//!
//! The store is the single source of truth between sync runs. It enforces at
//! the storage layer what the pipeline also checks proactively: slug
//! uniqueness per content kind and foreign-key integrity for article
//! references, so the invariants hold even under direct manual edits to the
//! database file.
//!
//! ## Handle, not singleton
//!
//! [`Store`] wraps one `rusqlite::Connection` and is passed explicitly into
//! every component that needs it (resolver, reconciler, page generator).
//! There is no global connection.
//!
//! ## Transactions
//!
//! The sync orchestrator brackets each content kind's creates and deletes in
//! one batch ([`Store::begin_batch`] / [`Store::commit_batch`]). Individual
//! record operations run inside a savepoint, so one failing record rolls back
//! only itself and the rest of the kind's batch still commits. Article
//! creation inserts the article row and all its section rows inside the same
//! savepoint — there is no partial article state.

use crate::model::{Article, Author, Category, ContentKind, Section, TrendingTopic};
use crate::parse::{AuthorFile, CategoryFile, TopicFile};
use crate::resolve::ResolvedArticle;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The database cannot be opened at all. Fatal for the whole run.
    #[error("store unavailable at {path}: {reason}")]
    Unavailable { path: String, reason: String },
    /// Uniqueness violation (duplicate slug or name within a kind).
    #[error("{} slug '{slug}' already exists", kind.page_prefix())]
    Constraint { kind: ContentKind, slug: String },
    /// Delete blocked by records referencing the target.
    #[error("cannot delete {} '{name}': referenced by {count} {}", kind.page_prefix(), if *count == 1 { "article" } else { "articles" })]
    ReferentialIntegrity {
        kind: ContentKind,
        name: String,
        count: i64,
    },
    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),
}

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS authors (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    slug        TEXT NOT NULL UNIQUE,
    title       TEXT NOT NULL DEFAULT 'Contributor',
    bio         TEXT NOT NULL DEFAULT '',
    email       TEXT NOT NULL DEFAULT '',
    location    TEXT NOT NULL DEFAULT 'Remote',
    expertise   TEXT NOT NULL DEFAULT '[]',
    twitter     TEXT NOT NULL DEFAULT '',
    linkedin    TEXT NOT NULL DEFAULT '',
    created_at  INTEGER NOT NULL DEFAULT (strftime('%s','now'))
);

CREATE TABLE IF NOT EXISTS categories (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    slug        TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    color       TEXT NOT NULL DEFAULT '#6B7280',
    icon        TEXT NOT NULL DEFAULT '📁',
    sort_order  INTEGER NOT NULL DEFAULT 999,
    created_at  INTEGER NOT NULL DEFAULT (strftime('%s','now'))
);

CREATE TABLE IF NOT EXISTS articles (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    slug        TEXT NOT NULL UNIQUE,
    excerpt     TEXT NOT NULL DEFAULT '',
    content     TEXT NOT NULL DEFAULT '',
    author_id   INTEGER NOT NULL REFERENCES authors(id),
    category_id INTEGER NOT NULL REFERENCES categories(id),
    tags        TEXT NOT NULL DEFAULT '[]',
    status      TEXT NOT NULL DEFAULT 'published',
    created_at  INTEGER NOT NULL DEFAULT (strftime('%s','now'))
);

CREATE TABLE IF NOT EXISTS sections (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id  INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
    heading     TEXT NOT NULL,
    body        TEXT NOT NULL DEFAULT '',
    position    INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS trending_topics (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    title            TEXT NOT NULL,
    slug             TEXT NOT NULL UNIQUE,
    description      TEXT NOT NULL DEFAULT '',
    hashtag          TEXT NOT NULL DEFAULT '',
    heat_score       INTEGER NOT NULL DEFAULT 50,
    category_slug    TEXT NOT NULL DEFAULT '',
    related_articles TEXT NOT NULL DEFAULT '[]',
    created_at       INTEGER NOT NULL DEFAULT (strftime('%s','now'))
);
";

/// Handle to the SQLite content store.
pub struct Store {
    conn: Connection,
}

/// Per-kind record counts, reported by the `stats` command.
#[derive(Debug, Clone, Copy)]
pub struct StoreCounts {
    pub authors: i64,
    pub categories: i64,
    pub articles: i64,
    pub topics: i64,
}

impl Store {
    /// Open (creating if needed) the store at `path` and apply the schema.
    ///
    /// Failure here is [`StoreError::Unavailable`] — fatal for the run, since
    /// no further progress is possible without the store.
    pub fn open(path: &Path) -> Result<Store, StoreError> {
        let unavailable = |reason: String| StoreError::Unavailable {
            path: path.display().to_string(),
            reason,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| unavailable(e.to_string()))?;
            }
        }
        let conn = Connection::open(path).map_err(|e| unavailable(e.to_string()))?;
        Self::init(conn).map_err(|e| unavailable(e.to_string()))
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Store, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::Sql)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Store, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Store { conn })
    }

    // ========================================================================
    // Batching
    // ========================================================================

    /// Begin a content-kind batch. All creates and deletes until
    /// [`commit_batch`](Store::commit_batch) become one unit of work.
    pub fn begin_batch(&self) -> Result<(), StoreError> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    pub fn commit_batch(&self) -> Result<(), StoreError> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    pub fn rollback_batch(&self) -> Result<(), StoreError> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    /// Run one record operation inside a savepoint. On error only this
    /// record's statements are rolled back; the surrounding batch survives.
    fn record_op<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.conn.execute_batch("SAVEPOINT record")?;
        match f(&self.conn) {
            Ok(v) => {
                self.conn.execute_batch("RELEASE record")?;
                Ok(v)
            }
            Err(e) => {
                // Best effort: the savepoint may already be gone if the
                // failure aborted the transaction.
                let _ = self.conn.execute_batch("ROLLBACK TO record; RELEASE record");
                Err(e)
            }
        }
    }

    /// Map uniqueness violations onto the Constraint variant; pass the rest
    /// through as SQL errors.
    fn map_constraint(kind: ContentKind, slug: &str, e: rusqlite::Error) -> StoreError {
        if let rusqlite::Error::SqliteFailure(f, _) = &e {
            if f.code == rusqlite::ErrorCode::ConstraintViolation {
                return StoreError::Constraint {
                    kind,
                    slug: slug.to_string(),
                };
            }
        }
        StoreError::Sql(e)
    }

    // ========================================================================
    // Creates
    // ========================================================================

    pub fn create_author(&self, author: &AuthorFile) -> Result<i64, StoreError> {
        self.record_op(|conn| {
            let expertise = serde_json::to_string(&author.expertise).unwrap_or_default();
            conn.execute(
                "INSERT INTO authors (name, slug, title, bio, email, location, expertise, twitter, linkedin)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    author.name,
                    author.slug,
                    author.title,
                    author.bio,
                    author.email,
                    author.location,
                    expertise,
                    author.twitter,
                    author.linkedin,
                ],
            )
            .map_err(|e| Self::map_constraint(ContentKind::Authors, &author.slug, e))?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn create_category(&self, category: &CategoryFile) -> Result<i64, StoreError> {
        self.record_op(|conn| {
            conn.execute(
                "INSERT INTO categories (name, slug, description, color, icon, sort_order)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    category.name,
                    category.slug,
                    category.description,
                    category.color,
                    category.icon,
                    category.sort_order,
                ],
            )
            .map_err(|e| Self::map_constraint(ContentKind::Categories, &category.slug, e))?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Insert an article and all of its sections as one unit. The article
    /// never exists without its sections, and never with dangling references
    /// — the FK constraints are the backstop behind the resolver.
    pub fn create_article(&self, article: &ResolvedArticle) -> Result<i64, StoreError> {
        self.record_op(|conn| {
            let file = &article.file;
            let tags = serde_json::to_string(&file.tags).unwrap_or_default();
            conn.execute(
                "INSERT INTO articles (title, slug, excerpt, content, author_id, category_id, tags, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    file.title,
                    file.slug,
                    file.excerpt,
                    file.lead,
                    article.author_id,
                    article.category_id,
                    tags,
                    file.status,
                ],
            )
            .map_err(|e| Self::map_constraint(ContentKind::Articles, &file.slug, e))?;
            let article_id = conn.last_insert_rowid();
            for (position, section) in file.sections.iter().enumerate() {
                conn.execute(
                    "INSERT INTO sections (article_id, heading, body, position)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![article_id, section.heading, section.body, position as i64],
                )?;
            }
            Ok(article_id)
        })
    }

    pub fn create_topic(&self, topic: &TopicFile) -> Result<i64, StoreError> {
        self.record_op(|conn| {
            let related = serde_json::to_string(&topic.related_article_ids).unwrap_or_default();
            conn.execute(
                "INSERT INTO trending_topics (title, slug, description, hashtag, heat_score, category_slug, related_articles)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    topic.title,
                    topic.slug,
                    topic.description,
                    topic.hashtag,
                    topic.heat_score,
                    topic.category_slug,
                    related,
                ],
            )
            .map_err(|e| Self::map_constraint(ContentKind::Trending, &topic.slug, e))?;
            Ok(conn.last_insert_rowid())
        })
    }

    // ========================================================================
    // Deletes
    // ========================================================================

    /// Delete an author unless articles still reference them. Deleting a
    /// record that is already gone is a no-op.
    pub fn delete_author(&self, slug: &str) -> Result<(), StoreError> {
        let Some(author) = self.find_author_by_slug(slug)? else {
            return Ok(());
        };
        let count = self.count_articles_by_author(author.id)?;
        if count > 0 {
            return Err(StoreError::ReferentialIntegrity {
                kind: ContentKind::Authors,
                name: author.name,
                count,
            });
        }
        self.record_op(|conn| {
            conn.execute("DELETE FROM authors WHERE id = ?1", params![author.id])?;
            Ok(())
        })
    }

    /// Delete a category unless articles still reference it.
    pub fn delete_category(&self, slug: &str) -> Result<(), StoreError> {
        let Some(category) = self.find_category_by_slug(slug)? else {
            return Ok(());
        };
        let count = self.count_articles_by_category(category.id)?;
        if count > 0 {
            return Err(StoreError::ReferentialIntegrity {
                kind: ContentKind::Categories,
                name: category.slug,
                count,
            });
        }
        self.record_op(|conn| {
            conn.execute("DELETE FROM categories WHERE id = ?1", params![category.id])?;
            Ok(())
        })
    }

    /// Delete an article. Its sections cascade. Trending topics that listed
    /// the article keep their (now dangling) soft reference by design.
    pub fn delete_article(&self, slug: &str) -> Result<(), StoreError> {
        self.record_op(|conn| {
            conn.execute("DELETE FROM articles WHERE slug = ?1", params![slug])?;
            Ok(())
        })
    }

    pub fn delete_topic(&self, slug: &str) -> Result<(), StoreError> {
        self.record_op(|conn| {
            conn.execute("DELETE FROM trending_topics WHERE slug = ?1", params![slug])?;
            Ok(())
        })
    }

    /// Dispatch a delete by content kind, used by the reconcile loop.
    pub fn delete_by_slug(&self, kind: ContentKind, slug: &str) -> Result<(), StoreError> {
        match kind {
            ContentKind::Authors => self.delete_author(slug),
            ContentKind::Categories => self.delete_category(slug),
            ContentKind::Articles => self.delete_article(slug),
            ContentKind::Trending => self.delete_topic(slug),
        }
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub fn find_author_by_slug(&self, slug: &str) -> Result<Option<Author>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT * FROM authors WHERE slug = ?1",
                params![slug],
                author_from_row,
            )
            .optional()?)
    }

    /// Exact-match, case-sensitive lookup used by the cross-reference
    /// resolver. A casing mismatch between files is a user-facing failure,
    /// not silently resolved.
    pub fn find_author_by_name(&self, name: &str) -> Result<Option<Author>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT * FROM authors WHERE name = ?1",
                params![name],
                author_from_row,
            )
            .optional()?)
    }

    pub fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT * FROM categories WHERE slug = ?1",
                params![slug],
                category_from_row,
            )
            .optional()?)
    }

    pub fn find_article_by_slug(&self, slug: &str) -> Result<Option<Article>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT * FROM articles WHERE slug = ?1",
                params![slug],
                article_from_row,
            )
            .optional()?)
    }

    pub fn find_article_by_id(&self, id: i64) -> Result<Option<Article>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT * FROM articles WHERE id = ?1",
                params![id],
                article_from_row,
            )
            .optional()?)
    }

    pub fn find_author_by_id(&self, id: i64) -> Result<Option<Author>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT * FROM authors WHERE id = ?1",
                params![id],
                author_from_row,
            )
            .optional()?)
    }

    pub fn find_category_by_id(&self, id: i64) -> Result<Option<Category>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT * FROM categories WHERE id = ?1",
                params![id],
                category_from_row,
            )
            .optional()?)
    }

    // ========================================================================
    // Listings
    // ========================================================================

    pub fn list_authors(&self) -> Result<Vec<Author>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT * FROM authors ORDER BY name")?;
        let rows = stmt.query_map([], author_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM categories ORDER BY sort_order, name")?;
        let rows = stmt.query_map([], category_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// List articles, newest first, optionally filtered by author and/or
    /// category. Used for reconciliation and for recomputing aggregate
    /// counts — counts on listing pages are always live, never cached.
    pub fn list_articles(
        &self,
        author_id: Option<i64>,
        category_id: Option<i64>,
    ) -> Result<Vec<Article>, StoreError> {
        let mut sql = String::from("SELECT * FROM articles");
        let mut filters: Vec<&str> = Vec::new();
        let mut values: Vec<i64> = Vec::new();
        if let Some(id) = author_id {
            filters.push("author_id = ?");
            values.push(id);
        }
        if let Some(id) = category_id {
            filters.push("category_id = ?");
            values.push(id);
        }
        if !filters.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&filters.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(values), article_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Sections for one article, in order of appearance.
    pub fn sections_for_article(&self, article_id: i64) -> Result<Vec<Section>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM sections WHERE article_id = ?1 ORDER BY position")?;
        let rows = stmt.query_map(params![article_id], section_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Topics ordered by heat score descending (the trending listing order).
    pub fn list_topics(&self) -> Result<Vec<TrendingTopic>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM trending_topics ORDER BY heat_score DESC, id")?;
        let rows = stmt.query_map([], topic_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Slugs currently stored for one kind, used by the reconciler.
    pub fn slugs(&self, kind: ContentKind) -> Result<Vec<String>, StoreError> {
        let table = match kind {
            ContentKind::Authors => "authors",
            ContentKind::Categories => "categories",
            ContentKind::Articles => "articles",
            ContentKind::Trending => "trending_topics",
        };
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT slug FROM {table} ORDER BY slug"))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // ========================================================================
    // Counts and diagnostics
    // ========================================================================

    pub fn count_articles_by_author(&self, author_id: i64) -> Result<i64, StoreError> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM articles WHERE author_id = ?1",
            params![author_id],
            |row| row.get(0),
        )?)
    }

    pub fn count_articles_by_category(&self, category_id: i64) -> Result<i64, StoreError> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM articles WHERE category_id = ?1",
            params![category_id],
            |row| row.get(0),
        )?)
    }

    /// Per-kind record counts for the `stats` command.
    pub fn counts(&self) -> Result<StoreCounts, StoreError> {
        let count = |table: &str| -> Result<i64, rusqlite::Error> {
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })
        };
        Ok(StoreCounts {
            authors: count("authors")?,
            categories: count("categories")?,
            articles: count("articles")?,
            topics: count("trending_topics")?,
        })
    }

    /// Table names in the store, for the `status` command.
    pub fn table_names(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Whether the foreign-key backstop is active on this connection.
    pub fn foreign_keys_enabled(&self) -> Result<bool, StoreError> {
        let enabled: i64 = self
            .conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
        Ok(enabled == 1)
    }
}

// ============================================================================
// Row mapping
// ============================================================================

/// JSON list columns tolerate malformed content by reading as empty, the
/// same recovery the original data had for hand-edited rows.
fn json_list<T: serde::de::DeserializeOwned + Default>(raw: &str) -> T {
    serde_json::from_str(raw).unwrap_or_default()
}

fn author_from_row(row: &Row<'_>) -> rusqlite::Result<Author> {
    let expertise: String = row.get("expertise")?;
    Ok(Author {
        id: row.get("id")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
        title: row.get("title")?,
        bio: row.get("bio")?,
        email: row.get("email")?,
        location: row.get("location")?,
        expertise: json_list(&expertise),
        twitter: row.get("twitter")?,
        linkedin: row.get("linkedin")?,
        created_at: row.get("created_at")?,
    })
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
        description: row.get("description")?,
        color: row.get("color")?,
        icon: row.get("icon")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
    })
}

fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
    let tags: String = row.get("tags")?;
    Ok(Article {
        id: row.get("id")?,
        title: row.get("title")?,
        slug: row.get("slug")?,
        excerpt: row.get("excerpt")?,
        content: row.get("content")?,
        author_id: row.get("author_id")?,
        category_id: row.get("category_id")?,
        tags: json_list(&tags),
        status: row.get("status")?,
        created_at: row.get("created_at")?,
    })
}

fn section_from_row(row: &Row<'_>) -> rusqlite::Result<Section> {
    Ok(Section {
        id: row.get("id")?,
        article_id: row.get("article_id")?,
        heading: row.get("heading")?,
        body: row.get("body")?,
        position: row.get("position")?,
    })
}

fn topic_from_row(row: &Row<'_>) -> rusqlite::Result<TrendingTopic> {
    let related: String = row.get("related_articles")?;
    Ok(TrendingTopic {
        id: row.get("id")?,
        title: row.get("title")?,
        slug: row.get("slug")?,
        description: row.get("description")?,
        hashtag: row.get("hashtag")?,
        heat_score: row.get("heat_score")?,
        category_slug: row.get("category_slug")?,
        related_article_ids: json_list(&related),
        created_at: row.get("created_at")?,
    })
}
