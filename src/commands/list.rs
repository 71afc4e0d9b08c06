//! List site content

use anyhow::{Context, Result};

use crate::cms::ContentRef;
use crate::content::{PostFeed, PostSummary};
use crate::Blog;

/// Every published post, newest first, following the load-more cursors
pub async fn posts(blog: &Blog) -> Result<Vec<PostSummary>> {
    let loader = blog.loader();
    let query = loader.home_query(&ContentRef::Master);
    let feed = PostFeed::collect_all(blog.api.as_ref(), &query, &blog.dates)
        .await
        .context("Failed to list posts from the CMS")?;
    Ok(feed.into_posts())
}

/// Print every post
pub async fn run(blog: &Blog) -> Result<()> {
    let posts = posts(blog).await?;
    println!("Posts ({}):", posts.len());
    for post in posts {
        println!(
            "  {} - {} [{}]",
            post.publication_date, post.title, post.slug
        );
    }
    Ok(())
}
