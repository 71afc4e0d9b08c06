//! Built-in blog templates using Tera template engine
//!
//! All templates are embedded directly in the binary, so the generator and
//! the server render the same markup without a theme directory.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::PostDetail;
use crate::pages::HomePage;

/// Template renderer with the embedded blog templates
pub struct TemplateRenderer {
    tera: Tera,
    site: SiteData,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        // Paths and trusted CMS HTML are emitted verbatim; text goes through `escape`
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("blog/layout.html")),
            ("index.html", include_str!("blog/index.html")),
            ("post.html", include_str!("blog/post.html")),
            ("not_found.html", include_str!("blog/not_found.html")),
            ("error.html", include_str!("blog/error.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("blog/partials/header.html"),
            ),
            (
                "partials/preview.html",
                include_str!("blog/partials/preview.html"),
            ),
            (
                "partials/summary.html",
                include_str!("blog/partials/summary.html"),
            ),
        ])?;

        Ok(Self {
            tera,
            site: SiteData::from(config),
        })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Context shared by every page
    fn base_context(&self, preview: bool) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("preview", &preview);
        context
    }

    /// Home page with the first batch of summaries
    pub fn render_home(&self, page: &HomePage, preview: bool) -> Result<String> {
        let mut context = self.base_context(preview);
        context.insert("page", page);
        self.render("index.html", &context)
    }

    /// Post detail page
    pub fn render_post(&self, post: &PostDetail, preview: bool) -> Result<String> {
        let mut context = self.base_context(preview);
        context.insert("post", post);
        self.render("post.html", &context)
    }

    pub fn render_not_found(&self, preview: bool) -> Result<String> {
        self.render("not_found.html", &self.base_context(preview))
    }

    /// Error page shown when the content API cannot be reached
    pub fn render_error(&self, message: &str, preview: bool) -> Result<String> {
        let mut context = self.base_context(preview);
        context.insert("message", message);
        self.render("error.html", &context)
    }
}

/// Site-wide values available to every template as `site`
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub logo: String,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            logo: config.logo.clone(),
        }
    }
}
