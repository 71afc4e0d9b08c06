//! Cache module for incremental generation
//!
//! Tracks the `last_publication_date` of every generated post so a rebuild
//! only renders posts the CMS changed since the previous run. Post pages
//! also carry previous/next links, so the neighbours of a changed post are
//! rebuilt along with it.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::pages::StaticPath;

/// Cache directory, relative to the site directory
pub const CACHE_DIR: &str = ".blog-cache";

/// Cache file name inside [`CACHE_DIR`]
const CACHE_FILE: &str = "db.json";

/// Represents a generated post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Edit timestamp the page was generated from
    pub last_publication_date: Option<String>,
    /// Output path relative to public dir
    pub output_path: String,
}

/// Cache database for tracking CMS changes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheDb {
    /// Version of the cache format
    pub version: u32,
    /// Hash of the output-relevant site config (changes trigger full rebuild)
    pub config_hash: u64,
    /// Generated posts keyed by slug
    pub posts: BTreeMap<String, CacheEntry>,
}

impl CacheDb {
    /// Current cache format version
    const VERSION: u32 = 1;

    /// Load cache from disk, or create a new empty cache
    pub fn load(base_dir: &Path) -> Self {
        let cache_path = base_dir.join(CACHE_DIR).join(CACHE_FILE);
        if let Ok(content) = fs::read_to_string(&cache_path) {
            match serde_json::from_str::<CacheDb>(&content) {
                Ok(cache) if cache.version == Self::VERSION => return cache,
                Ok(_) => tracing::info!("Cache version mismatch, rebuilding cache"),
                Err(e) => tracing::warn!("Ignoring unreadable cache {:?}: {}", cache_path, e),
            }
        }
        Self::default()
    }

    /// Save cache to disk
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let cache_dir = base_dir.join(CACHE_DIR);
        fs::create_dir_all(&cache_dir)?;

        let content = serde_json::to_string_pretty(self)?;
        fs::write(cache_dir.join(CACHE_FILE), content)?;
        Ok(())
    }

    /// Create a new cache with version set
    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            ..Default::default()
        }
    }

    /// Whether nothing was generated yet
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Record the posts of a finished build
    pub fn update(&mut self, config_hash: u64, paths: &[StaticPath]) {
        self.version = Self::VERSION;
        self.config_hash = config_hash;
        self.posts = paths
            .iter()
            .map(|p| {
                (
                    p.slug.clone(),
                    CacheEntry {
                        last_publication_date: p.last_publication_date.clone(),
                        output_path: crate::helpers::post_output_path(&p.slug),
                    },
                )
            })
            .collect();
    }
}

/// Change detection result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    /// Posts that need regeneration (slug)
    pub changed_posts: Vec<String>,
    /// Posts that disappeared from the CMS, with their old output path
    pub deleted_posts: Vec<(String, String)>,
    /// Whether to regenerate everything (config changed or no cache)
    pub full_rebuild: bool,
}

impl ChangeSet {
    /// Create a changeset indicating full rebuild is needed
    pub fn full_rebuild() -> Self {
        Self {
            changed_posts: Vec::new(),
            deleted_posts: Vec::new(),
            full_rebuild: true,
        }
    }

    /// Create an empty changeset (no changes)
    pub fn empty() -> Self {
        Self {
            changed_posts: Vec::new(),
            deleted_posts: Vec::new(),
            full_rebuild: false,
        }
    }

    /// Check if any changes were detected
    pub fn has_changes(&self) -> bool {
        self.full_rebuild || !self.changed_posts.is_empty() || !self.deleted_posts.is_empty()
    }

    /// Whether the post behind `slug` must be rendered
    pub fn needs_render(&self, slug: &str) -> bool {
        self.full_rebuild || self.changed_posts.iter().any(|s| s == slug)
    }

    /// Get summary of changes for logging
    pub fn summary(&self) -> String {
        if self.full_rebuild {
            return "full rebuild required".to_string();
        }

        let mut parts = Vec::new();
        if !self.changed_posts.is_empty() {
            parts.push(format!("{} posts changed", self.changed_posts.len()));
        }
        if !self.deleted_posts.is_empty() {
            parts.push(format!("{} posts deleted", self.deleted_posts.len()));
        }

        if parts.is_empty() {
            "no changes".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Detect changes between the CMS state and cached state
pub fn detect_changes(cache: &CacheDb, config_hash: u64, current: &[StaticPath]) -> ChangeSet {
    if cache.is_empty() {
        return ChangeSet::full_rebuild();
    }
    if cache.config_hash != config_hash {
        tracing::info!("Config changed, full rebuild required");
        return ChangeSet::full_rebuild();
    }

    let mut touched: BTreeSet<&str> = BTreeSet::new();
    for path in current {
        match cache.posts.get(&path.slug) {
            Some(cached) if cached.last_publication_date == path.last_publication_date => {}
            Some(_) => {
                tracing::debug!("Post changed: {}", path.slug);
                touched.insert(&path.slug);
            }
            None => {
                tracing::debug!("New post: {}", path.slug);
                touched.insert(&path.slug);
            }
        }
    }

    let current_slugs: BTreeSet<&str> = current.iter().map(|p| p.slug.as_str()).collect();
    let mut changeset = ChangeSet::empty();
    for (slug, cached) in &cache.posts {
        if !current_slugs.contains(slug.as_str()) {
            tracing::debug!("Deleted post: {}", slug);
            touched.insert(slug);
            changeset
                .deleted_posts
                .push((slug.clone(), cached.output_path.clone()));
        }
    }

    // Previous/next links follow edit order, in the old and the new listing
    let old_order = edit_order(
        cache
            .posts
            .iter()
            .map(|(slug, e)| (slug.as_str(), e.last_publication_date.as_deref())),
    );
    let new_order = edit_order(
        current
            .iter()
            .map(|p| (p.slug.as_str(), p.last_publication_date.as_deref())),
    );

    let mut rebuild: BTreeSet<&str> = BTreeSet::new();
    for &slug in &touched {
        rebuild.insert(slug);
        rebuild.extend(neighbours(&old_order, slug));
        rebuild.extend(neighbours(&new_order, slug));
    }

    changeset.changed_posts = current
        .iter()
        .filter(|p| rebuild.contains(p.slug.as_str()))
        .map(|p| p.slug.clone())
        .collect();
    changeset
}

/// Remove the cache directory
pub fn clear(base_dir: &Path) -> Result<()> {
    let cache_dir = base_dir.join(CACHE_DIR);
    if cache_dir.exists() {
        fs::remove_dir_all(&cache_dir)?;
        tracing::info!("Deleted: {:?}", cache_dir);
    }
    Ok(())
}

/// Slugs sorted by edit timestamp, ties broken by slug
fn edit_order<'a>(entries: impl Iterator<Item = (&'a str, Option<&'a str>)>) -> Vec<&'a str> {
    let mut entries: Vec<_> = entries.collect();
    entries.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));
    entries.into_iter().map(|(slug, _)| slug).collect()
}

fn neighbours<'a>(order: &[&'a str], slug: &str) -> Vec<&'a str> {
    let Some(idx) = order.iter().position(|s| *s == slug) else {
        return Vec::new();
    };
    let mut result = Vec::new();
    if idx > 0 {
        result.push(order[idx - 1]);
    }
    if let Some(next) = order.get(idx + 1) {
        result.push(*next);
    }
    result
}
