//! Site configuration.
//!
//! Loaded from an optional `config.toml` next to the content tree. All
//! fields have defaults; user config files are sparse and override only the
//! values they set. Unknown keys are rejected to catch typos early.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_root = "content"       # Source .txt files, one dir per kind
//! output_root = "site"           # Generated HTML tree
//! db_path = "data/newsroom.db"   # SQLite store
//!
//! [site]
//! name = "Influencer News"
//! tagline = "Breaking stories. Real insights."
//!
//! [homepage]
//! article_limit = 6              # Recent articles shown on the homepage
//!
//! [trending]
//! listing_limit = 20             # Topics shown on the trending listing
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding the source content tree (`authors/`, `categories/`,
    /// `articles/`, `trending/`).
    pub content_root: String,
    /// Directory the static HTML tree is generated into.
    pub output_root: String,
    /// Path of the SQLite store.
    pub db_path: String,
    /// Site identity shown in headers and page titles.
    pub site: SiteMeta,
    pub homepage: HomepageConfig,
    pub trending: TrendingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_root: "content".to_string(),
            output_root: "site".to_string(),
            db_path: "data/newsroom.db".to_string(),
            site: SiteMeta::default(),
            homepage: HomepageConfig::default(),
            trending: TrendingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    pub name: String,
    pub tagline: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            name: "Influencer News".to_string(),
            tagline: "Breaking stories. Real insights.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HomepageConfig {
    /// How many recent articles the homepage lists.
    pub article_limit: usize,
}

impl Default for HomepageConfig {
    fn default() -> Self {
        Self { article_limit: 6 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrendingConfig {
    /// How many topics the trending listing shows, hottest first.
    pub listing_limit: usize,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self { listing_limit: 20 }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.name.trim().is_empty() {
            return Err(ConfigError::Validation("site.name must not be empty".into()));
        }
        if self.homepage.article_limit == 0 {
            return Err(ConfigError::Validation(
                "homepage.article_limit must be at least 1".into(),
            ));
        }
        if self.trending.listing_limit == 0 {
            return Err(ConfigError::Validation(
                "trending.listing_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Load `config.toml` from `path`, falling back to defaults when the file
/// does not exist. A file that exists but fails to parse or validate is an
/// error, never silently defaulted.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    if !path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(path)?;
    let config: SiteConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config.content_root, "content");
        assert_eq!(config.site.name, "Influencer News");
        assert_eq!(config.homepage.article_limit, 6);
    }

    #[test]
    fn sparse_override() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[site]\nname = \"Creator Daily\"\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.site.name, "Creator Daily");
        // Untouched values keep their defaults
        assert_eq!(config.output_root, "site");
        assert_eq!(config.trending.listing_limit, 20);
    }

    #[test]
    fn unknown_keys_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "contnet_root = \"content\"\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn zero_article_limit_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[homepage]\narticle_limit = 0\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
    }
}
