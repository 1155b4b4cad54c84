//! Record types shared across the pipeline.
//!
//! Two families of types live here:
//!
//! - **Stored records** ([`Author`], [`Category`], [`Article`], [`Section`],
//!   [`TrendingTopic`]) — rows read back from the store, with ids assigned.
//! - **[`ContentKind`]** — the four content kinds, their source directories,
//!   and their generated-page naming.
//!
//! Candidate types produced by the parser (records not yet persisted) live in
//! [`crate::parse`]; this module only knows about committed state.

use serde::{Deserialize, Serialize};

/// The four content kinds, in dependency order.
///
/// Authors and Categories are independent; Articles reference both; Trending
/// topics may loosely reference articles and categories. A full sync iterates
/// in exactly this order so references always resolve against committed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Authors,
    Categories,
    Articles,
    Trending,
}

impl ContentKind {
    /// All kinds in sync dependency order.
    pub fn all() -> [ContentKind; 4] {
        [
            ContentKind::Authors,
            ContentKind::Categories,
            ContentKind::Articles,
            ContentKind::Trending,
        ]
    }

    /// Source directory name under the content root, and output directory
    /// name under the output root. The two trees mirror each other.
    pub fn dir_name(self) -> &'static str {
        match self {
            ContentKind::Authors => "authors",
            ContentKind::Categories => "categories",
            ContentKind::Articles => "articles",
            ContentKind::Trending => "trending",
        }
    }

    /// Singular prefix for generated detail pages: `author_{slug}.html`,
    /// `category_{slug}.html`, `article_{slug}.html`, `trend_{slug}.html`.
    pub fn page_prefix(self) -> &'static str {
        match self {
            ContentKind::Authors => "author",
            ContentKind::Categories => "category",
            ContentKind::Articles => "article",
            ContentKind::Trending => "trend",
        }
    }

    /// Filename of the detail page for a record of this kind.
    pub fn detail_page_name(self, slug: &str) -> String {
        format!("{}_{}.html", self.page_prefix(), slug)
    }

    /// Human-readable label used in reports.
    pub fn label(self) -> &'static str {
        self.dir_name()
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// A staff writer or contributor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub title: String,
    pub bio: String,
    pub email: String,
    pub location: String,
    /// Comma-separated on input, stored as a JSON array column.
    pub expertise: Vec<String>,
    pub twitter: String,
    pub linkedin: String,
    /// Unix timestamp assigned by the store on insert.
    pub created_at: i64,
}

/// An article category. Articles must reference an existing category by slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    /// Hex color for listing badges (named colors are mapped at parse time).
    pub color: String,
    pub icon: String,
    pub sort_order: i64,
    pub created_at: i64,
}

/// A published article. Cannot exist without a valid author and category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    /// Lead text before the first `## ` heading. Sub-sections are stored
    /// separately as [`Section`] rows owned by this article.
    pub content: String,
    pub author_id: i64,
    pub category_id: i64,
    pub tags: Vec<String>,
    pub status: String,
    pub created_at: i64,
}

/// An ordered sub-section of an article, split from `## Heading` lines.
/// Sections belong to exactly one article and are deleted with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    pub article_id: i64,
    pub heading: String,
    pub body: String,
    /// Order of appearance within the article, starting at 0.
    pub position: i64,
}

/// A trending topic, ranked by heat score on the trending listing.
///
/// `related_article_ids` are advisory soft references: plain identifiers with
/// no foreign-key enforcement and no cascade, tolerant of dangling targets.
/// Topics may legitimately reference articles that were never synced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingTopic {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub hashtag: String,
    pub heat_score: i64,
    /// Optional category slug. Soft reference, not validated.
    pub category_slug: String,
    pub related_article_ids: Vec<i64>,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_in_dependency_order() {
        let kinds = ContentKind::all();
        assert_eq!(kinds[0], ContentKind::Authors);
        assert_eq!(kinds[1], ContentKind::Categories);
        assert_eq!(kinds[2], ContentKind::Articles);
        assert_eq!(kinds[3], ContentKind::Trending);
    }

    #[test]
    fn detail_page_names() {
        assert_eq!(
            ContentKind::Articles.detail_page_name("hello"),
            "article_hello.html"
        );
        assert_eq!(
            ContentKind::Authors.detail_page_name("jane-doe"),
            "author_jane-doe.html"
        );
        assert_eq!(
            ContentKind::Trending.detail_page_name("ai-tools"),
            "trend_ai-tools.html"
        );
    }

    #[test]
    fn dir_names_are_plural() {
        assert_eq!(ContentKind::Categories.dir_name(), "categories");
        assert_eq!(ContentKind::Trending.dir_name(), "trending");
    }
}
