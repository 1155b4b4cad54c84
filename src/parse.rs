//! Content file parsing.
//!
//! Turns one source file's text into a typed, validated candidate record.
//! Parsing is a pure function of the file content — no filesystem access,
//! no store access, no side effects.
//!
//! ## File Format
//!
//! Every content kind uses the same layout: a metadata block of `Key: Value`
//! lines, a `---` separator line, then a free-text content block.
//!
//! ```text
//! Title: Hello World
//! Author: Jane Doe
//! Category: tech
//! Tags: creators, platforms
//! ---
//! Lead paragraph of the article.
//!
//! ## First Section
//! Section body text.
//! ```
//!
//! Metadata keys are normalized to lowercase with spaces replaced by
//! underscores (`Heat Score:` → `heat_score`). Lines without a colon in the
//! metadata block are ignored.
//!
//! ## Failure Modes
//!
//! Parsing fails (it never silently defaults) on:
//! - a missing `---` separator line
//! - a missing required key (`Name` for authors/categories, `Title` plus
//!   `Author` and `Category` for articles, `Title` for trending topics)
//! - a required key present but empty after trimming
//! - a non-numeric value where a number is required (`Heat Score`,
//!   `Sort Order`, `Related Articles` entries)

use crate::slug::slugify;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("missing '---' separator line")]
    MissingSeparator,
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("field '{field}' is not a number: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

/// Raw parse result: normalized metadata plus the free-text content block.
#[derive(Debug, Clone)]
pub struct Document {
    pub meta: BTreeMap<String, String>,
    pub body: String,
}

/// Candidate author record, not yet persisted.
#[derive(Debug, Clone)]
pub struct AuthorFile {
    pub name: String,
    pub slug: String,
    pub title: String,
    pub bio: String,
    pub email: String,
    pub location: String,
    pub expertise: Vec<String>,
    pub twitter: String,
    pub linkedin: String,
}

/// Candidate category record, not yet persisted.
#[derive(Debug, Clone)]
pub struct CategoryFile {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub color: String,
    pub icon: String,
    pub sort_order: i64,
}

/// Candidate article record. `author_name` and `category_slug` are unresolved
/// references; the cross-reference resolver turns them into ids against the
/// store before insertion.
#[derive(Debug, Clone)]
pub struct ArticleFile {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    /// Text before the first `## ` heading.
    pub lead: String,
    pub sections: Vec<SectionFile>,
    pub author_name: String,
    pub category_slug: String,
    pub tags: Vec<String>,
    pub status: String,
}

/// One `## Heading` sub-section of an article body.
#[derive(Debug, Clone)]
pub struct SectionFile {
    pub heading: String,
    pub body: String,
}

/// Candidate trending topic record, not yet persisted.
#[derive(Debug, Clone)]
pub struct TopicFile {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub hashtag: String,
    pub heat_score: i64,
    pub category_slug: String,
    pub related_article_ids: Vec<i64>,
}

/// Split raw file text into a metadata map and a content block.
///
/// The separator is the first line consisting of exactly `---` (after
/// trimming). Everything above it is metadata; everything below is the body.
pub fn parse_document(text: &str) -> Result<Document, ParseError> {
    let mut meta = BTreeMap::new();
    let mut body_lines: Vec<&str> = Vec::new();
    let mut seen_separator = false;

    for line in text.lines() {
        if !seen_separator {
            if line.trim() == "---" {
                seen_separator = true;
            } else if let Some((key, value)) = line.split_once(':') {
                let key = key.trim().to_lowercase().replace(' ', "_");
                meta.insert(key, value.trim().to_string());
            }
            // Metadata lines without a colon are ignored
        } else {
            body_lines.push(line);
        }
    }

    if !seen_separator {
        return Err(ParseError::MissingSeparator);
    }

    Ok(Document {
        meta,
        body: body_lines.join("\n").trim().to_string(),
    })
}

impl Document {
    /// Fetch a required key, failing if absent or empty after trimming.
    fn required(&self, key: &'static str) -> Result<String, ParseError> {
        match self.meta.get(key) {
            Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
            _ => Err(ParseError::MissingField(key)),
        }
    }

    /// Fetch an optional key with a default.
    fn optional(&self, key: &str, default: &str) -> String {
        match self.meta.get(key) {
            Some(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => default.to_string(),
        }
    }

    /// Parse an optional numeric key. Absence yields the default; a present
    /// but malformed value is an error, never a silent fallback.
    fn optional_number(&self, key: &'static str, default: i64) -> Result<i64, ParseError> {
        match self.meta.get(key) {
            Some(v) if !v.trim().is_empty() => {
                v.trim()
                    .parse::<i64>()
                    .map_err(|_| ParseError::InvalidNumber {
                        field: key,
                        value: v.trim().to_string(),
                    })
            }
            _ => Ok(default),
        }
    }

    /// Explicit slug if present, otherwise derived from the given source text.
    fn slug_or_derive(&self, source: &str) -> String {
        match self.meta.get("slug") {
            Some(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => slugify(source),
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping empties.
fn comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Named colors accepted in category files, mapped to their hex values.
/// Unknown names and anything not starting with `#` fall back to gray.
fn category_color(value: &str) -> String {
    match value {
        "blue" => "#3B82F6",
        "green" => "#10B981",
        "orange" => "#F59E0B",
        "pink" => "#EC4899",
        "purple" => "#8B5CF6",
        "red" => "#EF4444",
        "gray" => "#6B7280",
        other if other.starts_with('#') => other,
        _ => "#6B7280",
    }
    .to_string()
}

/// Parse an author file. Requires `Name`.
pub fn parse_author(text: &str) -> Result<AuthorFile, ParseError> {
    let doc = parse_document(text)?;
    let name = doc.required("name")?;
    let slug = doc.slug_or_derive(&name);
    // The content block is the extended bio; the Bio key is a short summary
    // and falls back to the block's first paragraph.
    let bio = match doc.meta.get("bio") {
        Some(b) if !b.trim().is_empty() => b.trim().to_string(),
        _ => doc.body.clone(),
    };
    Ok(AuthorFile {
        slug,
        title: doc.optional("title", "Contributor"),
        bio,
        email: doc.optional("email", ""),
        location: doc.optional("location", "Remote"),
        expertise: comma_list(&doc.optional("expertise", "")),
        twitter: doc.optional("twitter", ""),
        linkedin: doc.optional("linkedin", ""),
        name,
    })
}

/// Parse a category file. Requires `Name`.
pub fn parse_category(text: &str) -> Result<CategoryFile, ParseError> {
    let doc = parse_document(text)?;
    let name = doc.required("name")?;
    let slug = doc.slug_or_derive(&name);
    // Description falls back to the first line of the content block.
    let description = match doc.meta.get("description") {
        Some(d) if !d.trim().is_empty() => d.trim().to_string(),
        _ => doc.body.lines().next().unwrap_or("").trim().to_string(),
    };
    Ok(CategoryFile {
        slug,
        description,
        color: category_color(&doc.optional("color", "gray")),
        icon: doc.optional("icon", "📁"),
        sort_order: doc.optional_number("sort_order", 999)?,
        name,
    })
}

/// Parse an article file. Requires `Title`, `Author`, and `Category`.
///
/// The content block is split into ordered sections on lines beginning with
/// `## `. Text before the first heading becomes the article lead.
pub fn parse_article(text: &str) -> Result<ArticleFile, ParseError> {
    let doc = parse_document(text)?;
    let title = doc.required("title")?;
    let author_name = doc.required("author")?;
    let category_slug = doc.required("category")?;
    let slug = doc.slug_or_derive(&title);
    let (lead, sections) = split_sections(&doc.body);

    Ok(ArticleFile {
        slug,
        excerpt: doc.optional("excerpt", ""),
        lead,
        sections,
        tags: comma_list(&doc.optional("tags", "")),
        status: doc.optional("status", "published"),
        title,
        author_name,
        category_slug,
    })
}

/// Parse a trending topic file. Requires `Title` (the legacy `Topic` key is
/// accepted as an alias).
pub fn parse_topic(text: &str) -> Result<TopicFile, ParseError> {
    let doc = parse_document(text)?;
    let title = match (doc.meta.get("title"), doc.meta.get("topic")) {
        (Some(t), _) if !t.trim().is_empty() => t.trim().to_string(),
        (_, Some(t)) if !t.trim().is_empty() => t.trim().to_string(),
        _ => return Err(ParseError::MissingField("title")),
    };
    let slug = doc.slug_or_derive(&title);
    let description = match doc.meta.get("description") {
        Some(d) if !d.trim().is_empty() => d.trim().to_string(),
        _ => doc.body.lines().next().unwrap_or("").trim().to_string(),
    };

    let mut related_article_ids = Vec::new();
    for entry in comma_list(&doc.optional("related_articles", "")) {
        let id = entry
            .parse::<i64>()
            .map_err(|_| ParseError::InvalidNumber {
                field: "related_articles",
                value: entry.clone(),
            })?;
        related_article_ids.push(id);
    }

    Ok(TopicFile {
        slug,
        description,
        hashtag: doc.optional("hashtag", ""),
        heat_score: doc.optional_number("heat_score", 50)?,
        category_slug: doc.optional("category", ""),
        related_article_ids,
        title,
    })
}

/// Split an article body into its lead and `## `-delimited sections.
fn split_sections(body: &str) -> (String, Vec<SectionFile>) {
    let mut lead_lines: Vec<&str> = Vec::new();
    let mut sections: Vec<SectionFile> = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in body.lines() {
        if let Some(heading) = line.strip_prefix("## ") {
            if let Some((h, lines)) = current.take() {
                sections.push(SectionFile {
                    heading: h,
                    body: lines.join("\n").trim().to_string(),
                });
            }
            current = Some((heading.trim().to_string(), Vec::new()));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        } else {
            lead_lines.push(line);
        }
    }
    if let Some((h, lines)) = current.take() {
        sections.push(SectionFile {
            heading: h,
            body: lines.join("\n").trim().to_string(),
        });
    }

    (lead_lines.join("\n").trim().to_string(), sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTHOR_FILE: &str = "\
Name: Jane Doe
Title: Senior Writer
Email: jane@example.com
Expertise: Tech, Creator Economy
---
Jane has covered the creator economy since 2019.";

    #[test]
    fn parse_document_splits_meta_and_body() {
        let doc = parse_document("Title: Hi\nHeat Score: 80\n---\nBody text").unwrap();
        assert_eq!(doc.meta.get("title").unwrap(), "Hi");
        assert_eq!(doc.meta.get("heat_score").unwrap(), "80");
        assert_eq!(doc.body, "Body text");
    }

    #[test]
    fn missing_separator_is_error() {
        let result = parse_document("Title: Hi\nBody text");
        assert!(matches!(result, Err(ParseError::MissingSeparator)));
    }

    #[test]
    fn metadata_lines_without_colon_ignored() {
        let doc = parse_document("Title: Hi\nnot a key line\n---\nBody").unwrap();
        assert_eq!(doc.meta.len(), 1);
    }

    #[test]
    fn author_parsed_with_defaults() {
        let author = parse_author(AUTHOR_FILE).unwrap();
        assert_eq!(author.name, "Jane Doe");
        assert_eq!(author.slug, "jane-doe");
        assert_eq!(author.title, "Senior Writer");
        assert_eq!(author.location, "Remote");
        assert_eq!(author.expertise, vec!["Tech", "Creator Economy"]);
        assert!(author.bio.contains("creator economy"));
    }

    #[test]
    fn author_missing_name_is_error() {
        let result = parse_author("Title: Writer\n---\nBio");
        assert!(matches!(result, Err(ParseError::MissingField("name"))));
    }

    #[test]
    fn author_empty_name_is_error() {
        let result = parse_author("Name:   \n---\nBio");
        assert!(matches!(result, Err(ParseError::MissingField("name"))));
    }

    #[test]
    fn explicit_slug_wins_over_derivation() {
        let author = parse_author("Name: Jane Doe\nSlug: janed\n---\nBio").unwrap();
        assert_eq!(author.slug, "janed");
    }

    #[test]
    fn category_named_color_mapped_to_hex() {
        let cat = parse_category("Name: Technology\nColor: blue\n---\nTech news").unwrap();
        assert_eq!(cat.color, "#3B82F6");
    }

    #[test]
    fn category_unknown_color_falls_back_to_gray() {
        let cat = parse_category("Name: Misc\nColor: chartreuse\n---\nx").unwrap();
        assert_eq!(cat.color, "#6B7280");
    }

    #[test]
    fn category_hex_color_passes_through() {
        let cat = parse_category("Name: Misc\nColor: #123456\n---\nx").unwrap();
        assert_eq!(cat.color, "#123456");
    }

    #[test]
    fn category_description_falls_back_to_first_body_line() {
        let cat = parse_category("Name: Tech\n---\nFirst line.\nSecond line.").unwrap();
        assert_eq!(cat.description, "First line.");
    }

    #[test]
    fn category_bad_sort_order_is_error() {
        let result = parse_category("Name: Tech\nSort Order: soon\n---\nx");
        assert!(matches!(
            result,
            Err(ParseError::InvalidNumber {
                field: "sort_order",
                ..
            })
        ));
    }

    #[test]
    fn article_requires_title_author_category() {
        assert!(matches!(
            parse_article("Author: J\nCategory: tech\n---\nx"),
            Err(ParseError::MissingField("title"))
        ));
        assert!(matches!(
            parse_article("Title: T\nCategory: tech\n---\nx"),
            Err(ParseError::MissingField("author"))
        ));
        assert!(matches!(
            parse_article("Title: T\nAuthor: J\n---\nx"),
            Err(ParseError::MissingField("category"))
        ));
    }

    #[test]
    fn article_sections_split_in_order() {
        let text = "\
Title: Hello
Author: Jane Doe
Category: tech
---
Lead paragraph.

## First
Body one.

## Second
Body two.";
        let article = parse_article(text).unwrap();
        assert_eq!(article.lead, "Lead paragraph.");
        assert_eq!(article.sections.len(), 2);
        assert_eq!(article.sections[0].heading, "First");
        assert_eq!(article.sections[0].body, "Body one.");
        assert_eq!(article.sections[1].heading, "Second");
    }

    #[test]
    fn article_without_headings_has_no_sections() {
        let article =
            parse_article("Title: Hello\nAuthor: J\nCategory: tech\n---\nJust a lead.").unwrap();
        assert!(article.sections.is_empty());
        assert_eq!(article.lead, "Just a lead.");
    }

    #[test]
    fn article_slug_derived_from_title() {
        let article = parse_article("Title: Hello\nAuthor: J\nCategory: tech\n---\nx").unwrap();
        assert_eq!(article.slug, "hello");
    }

    #[test]
    fn topic_heat_score_defaults_when_absent() {
        let topic = parse_topic("Title: AI Tools\n---\nEveryone is talking.").unwrap();
        assert_eq!(topic.heat_score, 50);
    }

    #[test]
    fn topic_malformed_heat_score_is_error() {
        let result = parse_topic("Title: AI Tools\nHeat Score: hot\n---\nx");
        assert!(matches!(
            result,
            Err(ParseError::InvalidNumber {
                field: "heat_score",
                ..
            })
        ));
    }

    #[test]
    fn topic_accepts_legacy_topic_key() {
        let topic = parse_topic("Topic: AI Tools\n---\nx").unwrap();
        assert_eq!(topic.title, "AI Tools");
    }

    #[test]
    fn topic_related_articles_parsed_as_ids() {
        let topic = parse_topic("Title: T\nRelated Articles: 3, 7, 12\n---\nx").unwrap();
        assert_eq!(topic.related_article_ids, vec![3, 7, 12]);
    }

    #[test]
    fn topic_malformed_related_id_is_error() {
        let result = parse_topic("Title: T\nRelated Articles: 3, seven\n---\nx");
        assert!(matches!(result, Err(ParseError::InvalidNumber { .. })));
    }
}
