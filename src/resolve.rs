//! Cross-reference resolution for article candidates.
//!
//! An article file names its author and category as strings; before the
//! article can be persisted both must resolve to existing store records.
//! Resolution is exact-string and case-sensitive — `Author` matches on
//! `Author.name`, `Category` on `Category.slug`. A casing mismatch between
//! files fails resolution rather than being silently normalized; this is a
//! documented behavioral contract of the pipeline.
//!
//! On failure the candidate is rejected whole. There is no partial insert.

use crate::parse::ArticleFile;
use crate::store::{Store, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    /// The named author or category does not exist in the store.
    #[error("unresolved {field} reference: no {field} matches '{value}'")]
    MissingReference { field: &'static str, value: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An article candidate with its references resolved to store ids.
#[derive(Debug, Clone)]
pub struct ResolvedArticle {
    pub file: ArticleFile,
    pub author_id: i64,
    pub category_id: i64,
}

/// Resolve an article candidate against the current store snapshot.
///
/// Returns the candidate with `author_id`/`category_id` populated, or a
/// [`ResolveError::MissingReference`] naming the field and the value that
/// failed to match.
pub fn resolve_article(store: &Store, file: ArticleFile) -> Result<ResolvedArticle, ResolveError> {
    let author = store.find_author_by_name(&file.author_name)?.ok_or_else(|| {
        ResolveError::MissingReference {
            field: "author",
            value: file.author_name.clone(),
        }
    })?;
    let category = store
        .find_category_by_slug(&file.category_slug)?
        .ok_or_else(|| ResolveError::MissingReference {
            field: "category",
            value: file.category_slug.clone(),
        })?;
    Ok(ResolvedArticle {
        author_id: author.id,
        category_id: category.id,
        file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse_article, parse_author, parse_category};

    fn store_with_refs() -> Store {
        let store = Store::open_in_memory().unwrap();
        let author = parse_author("Name: Jane Doe\n---\nBio.").unwrap();
        store.create_author(&author).unwrap();
        let category = parse_category("Name: Technology\nSlug: tech\n---\nx").unwrap();
        store.create_category(&category).unwrap();
        store
    }

    fn article(author: &str, category: &str) -> ArticleFile {
        parse_article(&format!(
            "Title: Hello\nAuthor: {author}\nCategory: {category}\n---\nLead."
        ))
        .unwrap()
    }

    #[test]
    fn resolves_both_references() {
        let store = store_with_refs();
        let resolved = resolve_article(&store, article("Jane Doe", "tech")).unwrap();
        assert!(resolved.author_id > 0);
        assert!(resolved.category_id > 0);
    }

    #[test]
    fn unknown_author_names_field_and_value() {
        let store = store_with_refs();
        let err = resolve_article(&store, article("John Roe", "tech")).unwrap_err();
        match err {
            ResolveError::MissingReference { field, value } => {
                assert_eq!(field, "author");
                assert_eq!(value, "John Roe");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn unknown_category_rejected() {
        let store = store_with_refs();
        let err = resolve_article(&store, article("Jane Doe", "fashion")).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::MissingReference {
                field: "category",
                ..
            }
        ));
    }

    #[test]
    fn author_match_is_case_sensitive() {
        let store = store_with_refs();
        let err = resolve_article(&store, article("jane doe", "tech"));
        assert!(err.is_err());
    }

    #[test]
    fn category_match_is_case_sensitive() {
        let store = store_with_refs();
        let err = resolve_article(&store, article("Jane Doe", "Tech"));
        assert!(err.is_err());
    }
}
