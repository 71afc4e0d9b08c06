use std::path::PathBuf;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use prismic_blog::cms::memory::InMemoryApi;
use prismic_blog::cms::{ContentApi, ContentRef, RawDocument};
use prismic_blog::config::SiteConfig;
use prismic_blog::content::PostFeed;
use prismic_blog::pages::PostPage;
use prismic_blog::Blog;
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/posts.json")
}

fn fixture_blog(dir: &TempDir) -> (Arc<InMemoryApi>, Blog) {
    let api = Arc::new(InMemoryApi::from_file(&fixtures()).unwrap());
    let blog = Blog::with_api(dir.path(), SiteConfig::default(), api.clone()).unwrap();
    (api, blog)
}

fn post_with_body(uid: &str, day: u32, words: usize) -> RawDocument {
    let body = vec!["palavra"; words].join(" ");
    serde_json::from_value(serde_json::json!({
        "id": uid.to_uppercase(),
        "uid": uid,
        "type": "posts",
        "first_publication_date": format!("2021-03-{:02}T00:00:00Z", day),
        "last_publication_date": format!("2021-03-{:02}T00:00:00Z", day),
        "data": {
            "title": format!("Post {}", uid),
            "content": [{ "heading": "Seção", "body": [{ "type": "paragraph", "text": body, "spans": [] }] }]
        }
    }))
    .unwrap()
}

#[tokio::test]
async fn test_home_lists_only_posts_newest_first() {
    let dir = TempDir::new().unwrap();
    let (_api, blog) = fixture_blog(&dir);

    let home = blog.loader().home(&ContentRef::Master).await.unwrap();
    let slugs: Vec<_> = home.results.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["criando-um-app-cra-do-zero", "como-utilizar-hooks"]);
    assert!(home.next_page.is_none());

    let cra = &home.results[0];
    assert_eq!(cra.title, "Criando um app CRA do zero");
    assert_eq!(cra.author, "Danilo Vieira");
    assert_eq!(cra.publication_date, "25 mar 2021");
    // A malformed subtitle degrades to an empty string
    assert_eq!(cra.subtitle, "");

    assert_eq!(home.results[1].publication_date, "15 mar 2021");
}

#[tokio::test]
async fn test_post_detail_from_fixtures() {
    let dir = TempDir::new().unwrap();
    let (_api, blog) = fixture_blog(&dir);

    let page = blog
        .loader()
        .post("como-utilizar-hooks", &ContentRef::Master)
        .await
        .unwrap();
    let PostPage::Found(post) = page else {
        panic!("fixture post should exist");
    };

    assert_eq!(post.title, "Como utilizar Hooks");
    assert_eq!(post.author, "Joseph Oliveira");
    assert_eq!(post.first_publication_date, "15 mar 2021");
    assert_eq!(post.last_publication_date.as_deref(), Some("19 mar 2021"));
    assert_eq!(
        post.banner_url,
        "https://images.prismic.io/spacetraveling/banner-hooks.png"
    );
    assert_eq!(post.estimated_read_minutes, 1);
    assert_eq!(post.content.len(), 1);
    assert_eq!(post.content[0].anchor, "proin-et-varius");
    assert!(post.content[0]
        .body_html
        .starts_with(r#"<p><strong>Nullam</strong> dolor <a href="https://example.com">sapien</a>"#));
    assert!(post.content[0]
        .body_html
        .ends_with("<ul><li>Cras laoreet mi</li></ul>"));

    assert!(post.navigation.previous.is_none());
    let next = post.navigation.next.unwrap();
    assert_eq!(next.slug, "criando-um-app-cra-do-zero");
    assert_eq!(next.path, "/post/criando-um-app-cra-do-zero");
}

#[tokio::test]
async fn test_reading_time_rounds_body_words() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(InMemoryApi::new(vec![
        post_with_body("quatrocentas", 1, 400),
        post_with_body("vazio", 2, 0),
    ]));
    let blog = Blog::with_api(dir.path(), SiteConfig::default(), api).unwrap();

    for (slug, minutes) in [("quatrocentas", 2), ("vazio", 1)] {
        let PostPage::Found(post) = blog.loader().post(slug, &ContentRef::Master).await.unwrap()
        else {
            panic!("{} should exist", slug);
        };
        assert_eq!(post.estimated_read_minutes, minutes, "{}", slug);
    }
}

#[tokio::test]
async fn test_unknown_slug_skips_adjacency_queries() {
    let dir = TempDir::new().unwrap();
    let (api, blog) = fixture_blog(&dir);

    let page = blog
        .loader()
        .post("nao-existe", &ContentRef::Master)
        .await
        .unwrap();
    assert_eq!(page, PostPage::NotFound);
    assert_eq!(api.queries().len(), 1);
}

#[tokio::test]
async fn test_load_more_accumulates_every_batch() {
    let dir = TempDir::new().unwrap();
    let docs: Vec<_> = (1..=12).map(|i| post_with_body(&format!("p{}", i), i, 10)).collect();
    let api = Arc::new(InMemoryApi::new(docs));
    let blog = Blog::with_api(dir.path(), SiteConfig::default(), api.clone()).unwrap();

    let loader = blog.loader();
    let first = api
        .query(&loader.home_query(&ContentRef::Master))
        .await
        .unwrap();
    let mut feed = PostFeed::from_page(first, &blog.dates);

    let mut batches = vec![feed.posts().len()];
    while feed.has_more() {
        batches.push(feed.load_more(api.as_ref(), &blog.dates).await.unwrap());
    }

    assert_eq!(batches, vec![5, 5, 2]);
    assert_eq!(feed.posts().len(), 12);
    assert!(feed.next_cursor().is_none());
    assert_eq!(feed.posts()[0].slug, "p12");
}

#[tokio::test]
async fn test_generate_then_regenerate_from_fixtures() {
    let dir = TempDir::new().unwrap();
    let (_api, blog) = fixture_blog(&dir);

    let stats = blog.generate(false).await.unwrap();
    assert_eq!(stats.rendered, 2);

    let public = dir.path().join("public");
    let index = std::fs::read_to_string(public.join("index.html")).unwrap();
    assert!(index.contains(r#"<a href="/post/como-utilizar-hooks">"#));
    assert!(public.join("post/criando-um-app-cra-do-zero/index.html").exists());
    assert!(!public.join("post/homepage").exists());
    assert!(public.join("404.html").exists());

    let stats = blog.generate(false).await.unwrap();
    assert_eq!(stats.rendered, 0);
    assert_eq!(stats.skipped, 2);

    blog.clean().unwrap();
    assert!(!public.exists());
}
