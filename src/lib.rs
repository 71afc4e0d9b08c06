//! prismic-blog: a blog frontend over a headless CMS
//!
//! Posts are read from a Prismic-style content API and rendered with Tera
//! templates embedded in the binary. `generate` precomputes every known post
//! page; `server` serves them and renders unknown or stale posts on demand.

pub mod cache;
pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod pages;
pub mod richtext;
pub mod server;
pub mod templates;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cms::{ContentApi, PrismicClient};
use config::SiteConfig;
use helpers::DateFormatter;
use pages::PageLoader;

/// The main blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Content API shared by every page load
    pub api: Arc<dyn ContentApi>,
    /// Display date formatter
    pub dates: DateFormatter,
}

impl Blog {
    /// Create a blog from a directory, talking to the configured CMS
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config = Self::load_config(&base_dir)?;
        let client = PrismicClient::new(&config.cms).context("Failed to create CMS client")?;
        tracing::debug!("Using content API at {}", client.endpoint());
        Self::with_api(base_dir, config, Arc::new(client))
    }

    /// Create a blog around an existing content API
    pub fn with_api<P: AsRef<Path>>(
        base_dir: P,
        config: SiteConfig,
        api: Arc<dyn ContentApi>,
    ) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let dates = DateFormatter::new(&config.date)?;
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            public_dir,
            api,
            dates,
        })
    }

    /// `_config.yml` from `base_dir` (defaults when absent) plus environment overrides
    pub fn load_config(base_dir: &Path) -> Result<SiteConfig> {
        let config_path = base_dir.join("_config.yml");
        let mut config = if config_path.exists() {
            SiteConfig::load(&config_path)?
        } else {
            SiteConfig::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Page loader borrowing this blog's API and config
    pub fn loader(&self) -> PageLoader<'_> {
        PageLoader::new(self.api.as_ref(), &self.config, &self.dates)
    }

    /// Generate the static site
    pub async fn generate(&self, force: bool) -> Result<commands::generate::GenerateStats> {
        commands::generate::run(self, force).await
    }

    /// Clean the public directory and build cache
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
