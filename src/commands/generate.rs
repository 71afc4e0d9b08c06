//! Generate static files

use anyhow::{Context, Result};

use crate::cache::{self, CacheDb, ChangeSet};
use crate::generator::Generator;
use crate::Blog;

/// What a generate run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateStats {
    /// Post pages rendered
    pub rendered: usize,
    /// Post pages left untouched
    pub skipped: usize,
    /// Post pages removed
    pub deleted: usize,
}

/// Generate the static site (with incremental support)
pub async fn run(blog: &Blog, force: bool) -> Result<GenerateStats> {
    let start = std::time::Instant::now();

    let paths = blog
        .loader()
        .static_paths()
        .await
        .context("Failed to list posts from the CMS")?;
    tracing::info!("Found {} posts", paths.len());

    let cache = CacheDb::load(&blog.base_dir);
    let config_hash = blog.config.output_hash();

    let changeset = if force {
        tracing::info!("Full generation (force)");
        ChangeSet::full_rebuild()
    } else {
        cache::detect_changes(&cache, config_hash, &paths)
    };
    tracing::info!("Changes detected: {}", changeset.summary());

    let generator = Generator::new(blog)?;

    // The home page and 404 are cheap and always reflect the latest list
    generator.generate_index().await?;
    generator.generate_not_found()?;

    let mut stats = GenerateStats::default();
    for (slug, output_path) in &changeset.deleted_posts {
        tracing::debug!("Removing deleted post: {}", slug);
        generator.remove_output(output_path)?;
        stats.deleted += 1;
    }

    let mut generated = Vec::with_capacity(paths.len());
    for path in &paths {
        let output_exists = blog
            .public_dir
            .join(crate::helpers::post_output_path(&path.slug))
            .exists();
        if !changeset.needs_render(&path.slug) && output_exists {
            stats.skipped += 1;
            generated.push(path.clone());
            continue;
        }
        if generator.generate_post(&path.slug).await? {
            stats.rendered += 1;
            generated.push(path.clone());
        }
    }

    let mut new_cache = CacheDb::new();
    new_cache.update(config_hash, &generated);
    new_cache.save(&blog.base_dir)?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} posts ({} unchanged, {} removed) in {:.2}s",
        stats.rendered,
        stats.skipped,
        stats.deleted,
        duration.as_secs_f64()
    );

    Ok(stats)
}
