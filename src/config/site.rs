//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable overriding `cms.endpoint`
pub const ENDPOINT_ENV: &str = "PRISMIC_API_ENDPOINT";
/// Environment variable overriding `cms.access_token`
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub logo: String,

    // Directory
    pub public_dir: String,

    // Content API
    #[serde(default)]
    pub cms: CmsConfig,

    // Date / Time format
    #[serde(default)]
    pub date: DateConfig,

    // Home page
    pub per_page: usize,

    // Reading time
    pub words_per_minute: u32,

    // Seconds a generated post page stays fresh before the server re-renders it
    pub revalidate_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            logo: "/logo.svg".to_string(),

            public_dir: "public".to_string(),

            cms: CmsConfig::default(),
            date: DateConfig::default(),

            per_page: 5,
            words_per_minute: 200,
            revalidate_secs: 60 * 30,
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Apply `PRISMIC_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(ACCESS_TOKEN_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, token: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            tracing::debug!("Using CMS endpoint from {}", ENDPOINT_ENV);
            self.cms.endpoint = endpoint;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.cms.access_token = Some(token);
        }
    }

    /// Hash of the settings that affect rendered output
    ///
    /// Stable within one build of the binary only: the std hasher may change
    /// between Rust releases, in which case the next `generate` rebuilds
    /// every page once.
    pub fn output_hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.title.hash(&mut hasher);
        self.description.hash(&mut hasher);
        self.logo.hash(&mut hasher);
        self.date.locale.hash(&mut hasher);
        self.date.pattern.hash(&mut hasher);
        self.date.timezone.hash(&mut hasher);
        self.words_per_minute.hash(&mut hasher);
        hasher.finish()
    }
}

/// Content API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// Repository API endpoint, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub endpoint: String,
    /// Forwarded verbatim as `access_token`, never interpreted
    pub access_token: Option<String>,
    /// Custom type holding blog posts
    pub document_type: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
            document_type: "posts".to_string(),
            request_timeout_secs: 10,
            max_retries: 1,
            retry_backoff_ms: 250,
        }
    }
}

/// Date display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DateConfig {
    /// POSIX locale name (`pt_BR`, `en_US`, ...)
    pub locale: String,
    /// date-fns style pattern
    pub pattern: String,
    /// IANA timezone used for display
    pub timezone: String,
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            locale: "pt_BR".to_string(),
            pattern: "dd MMM yyyy".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.per_page, 5);
        assert_eq!(config.words_per_minute, 200);
        assert_eq!(config.cms.document_type, "posts");
        assert_eq!(config.date.pattern, "dd MMM yyyy");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
per_page: 20
cms:
  endpoint: https://example.cdn.prismic.io/api/v2
  max_retries: 3
date:
  locale: en_US
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.per_page, 20);
        assert_eq!(config.cms.endpoint, "https://example.cdn.prismic.io/api/v2");
        assert_eq!(config.cms.max_retries, 3);
        assert_eq!(config.cms.request_timeout_secs, 10);
        assert_eq!(config.date.locale, "en_US");
        assert_eq!(config.date.pattern, "dd MMM yyyy");
    }

    #[test]
    fn test_env_overrides_ignore_blank_values() {
        let mut config = SiteConfig::default();
        config.apply_overrides(Some("  ".to_string()), Some("secret".to_string()));
        assert_eq!(config.cms.endpoint, CmsConfig::default().endpoint);
        assert_eq!(config.cms.access_token.as_deref(), Some("secret"));

        config.apply_overrides(Some("https://other.prismic.io/api/v2".to_string()), None);
        assert_eq!(config.cms.endpoint, "https://other.prismic.io/api/v2");
    }

    #[test]
    fn test_output_hash_tracks_date_settings() {
        let a = SiteConfig::default();
        let mut b = SiteConfig::default();
        assert_eq!(a.output_hash(), b.output_hash());
        b.date.pattern = "yyyy-MM-dd".to_string();
        assert_ne!(a.output_hash(), b.output_hash());
    }
}
