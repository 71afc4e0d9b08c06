//! CLI entry point for prismic-blog

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prismic_blog::cms::memory::InMemoryApi;
use prismic_blog::Blog;

#[derive(Parser)]
#[command(name = "prismic-blog")]
#[command(author = "prismic-blog contributors")]
#[command(version = "0.1.0")]
#[command(about = "A blog frontend for Prismic-style headless CMS content", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Read documents from a local JSON file instead of the CMS
    #[arg(long, global = true)]
    fixtures: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Ignore the build cache and render every post
        #[arg(short, long)]
        force: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Skip generation before serving
        #[arg(long)]
        no_generate: bool,
    },

    /// List published posts
    List,

    /// Clean the public folder and cache
    Clean,

    /// Display version information
    Version,
}

fn open_blog(base_dir: &Path, fixtures: Option<&Path>) -> Result<Blog> {
    match fixtures {
        Some(path) => {
            let path = base_dir.join(path);
            let api = InMemoryApi::from_file(&path)
                .with_context(|| format!("Failed to load fixtures from {}", path.display()))?;
            let config = Blog::load_config(base_dir)?;
            Blog::with_api(base_dir, config, Arc::new(api))
        }
        None => Blog::new(base_dir),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "prismic_blog=debug,tower_http=debug,info"
    } else {
        "prismic_blog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };
    let fixtures = cli.fixtures.as_deref();

    match cli.command {
        Commands::Generate { force } => {
            let blog = open_blog(&base_dir, fixtures)?;
            tracing::info!("Generating static files...");
            blog.generate(force).await?;
            println!("Generated successfully!");
        }

        Commands::Server {
            port,
            ip,
            no_generate,
        } => {
            let blog = open_blog(&base_dir, fixtures)?;

            if !no_generate {
                tracing::info!("Generating static files...");
                if let Err(e) = blog.generate(false).await {
                    // Pages are still rendered on demand
                    tracing::warn!("Generation failed: {:#}", e);
                }
            }

            tracing::info!("Starting server at http://{}:{}", ip, port);
            prismic_blog::server::start(blog, &ip, port).await?;
        }

        Commands::List => {
            let blog = open_blog(&base_dir, fixtures)?;
            prismic_blog::commands::list::run(&blog).await?;
        }

        Commands::Clean => {
            let blog = open_blog(&base_dir, fixtures)?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("prismic-blog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
