//! Generator module - writes static HTML files using built-in Tera templates

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cms::ContentRef;
use crate::helpers::post_output_path;
use crate::pages::PostPage;
use crate::templates::TemplateRenderer;
use crate::Blog;

/// Output file of the not-found page
pub const NOT_FOUND_FILE: &str = "404.html";

/// Static site generator using Tera templates
pub struct Generator<'a> {
    blog: &'a Blog,
    renderer: TemplateRenderer,
}

impl<'a> Generator<'a> {
    /// Create a new generator
    pub fn new(blog: &'a Blog) -> Result<Self> {
        let renderer = TemplateRenderer::new(&blog.config)?;
        Ok(Self { blog, renderer })
    }

    /// Render the home page with the first batch of posts
    pub async fn generate_index(&self) -> Result<()> {
        let page = self
            .blog
            .loader()
            .home(&ContentRef::Master)
            .await
            .context("Failed to load the post list")?;
        let html = self.renderer.render_home(&page, false)?;
        write_page(&self.blog.public_dir, "index.html", &html)?;
        Ok(())
    }

    /// Render the page served for unknown routes
    pub fn generate_not_found(&self) -> Result<()> {
        let html = self.renderer.render_not_found(false)?;
        write_page(&self.blog.public_dir, NOT_FOUND_FILE, &html)?;
        Ok(())
    }

    /// Render one post page; `false` when the CMS no longer has it
    pub async fn generate_post(&self, slug: &str) -> Result<bool> {
        let page = self
            .blog
            .loader()
            .post(slug, &ContentRef::Master)
            .await
            .with_context(|| format!("Failed to load post {}", slug))?;

        match page {
            PostPage::Found(detail) => {
                let html = self.renderer.render_post(&detail, false)?;
                write_page(&self.blog.public_dir, &post_output_path(slug), &html)?;
                Ok(true)
            }
            PostPage::NotFound => {
                tracing::warn!("Post disappeared while generating: {}", slug);
                Ok(false)
            }
        }
    }

    /// Delete a previously generated post page
    pub fn remove_output(&self, output_path: &str) -> Result<()> {
        let file = self.blog.public_dir.join(output_path);
        if file.exists() {
            fs::remove_file(&file)?;
            tracing::debug!("Removed: {:?}", file);
        }
        if let Some(dir) = file.parent() {
            // Only succeeds when the post directory is now empty
            if dir != self.blog.public_dir && fs::remove_dir(dir).is_ok() {
                tracing::debug!("Removed: {:?}", dir);
            }
        }
        Ok(())
    }
}

/// Write a rendered page below `public_dir`, creating parent directories
///
/// The page is written to a temporary sibling and renamed into place, so a
/// concurrent reader sees either the previous file or the complete new one.
pub fn write_page(public_dir: &Path, relative: &str, html: &str) -> Result<PathBuf> {
    let output_path = public_dir.join(relative);
    let parent = output_path.parent().unwrap_or(public_dir);
    fs::create_dir_all(parent)?;

    let mut file = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create a temporary file in {}", parent.display()))?;
    file.write_all(html.as_bytes())
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file().set_permissions(fs::Permissions::from_mode(0o644))?;
    }
    file.persist(&output_path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    tracing::debug!("Generated: {:?}", output_path);
    Ok(output_path)
}
