//! Slug derivation.
//!
//! Slugs are the stable identity of every record: the reconciler matches
//! source files to store records by slug, and the page generator derives
//! output paths from them (see [`crate::model::ContentKind`]).
//!
//! ## Derivation
//!
//! When a source file carries no explicit `Slug:` key, the slug is derived
//! from the record's title or name via a lowercase-kebab transformation:
//! - `"Jane Doe"` → `jane-doe`
//! - `"Hello, World!"` → `hello-world`
//! - `"Creator Economy: 2026"` → `creator-economy-2026`

/// Derive a URL-safe slug from a title or name.
///
/// Lowercases, converts whitespace runs to single dashes, drops everything
/// that is not ASCII alphanumeric or a dash, and trims leading/trailing
/// dashes. Consecutive dashes collapse to one.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_dash = true; // suppress leading dash
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if (c.is_whitespace() || c == '-' || c == '_') && !last_dash {
            slug.push('-');
            last_dash = true;
        }
        // All other punctuation is dropped entirely
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
