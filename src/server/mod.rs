//! HTTP server
//!
//! Serves the generated site and fills the gaps at request time: the home
//! page is always rendered from fresh CMS data, post pages come from the
//! public directory while they are younger than `revalidate_secs` and are
//! otherwise rendered on demand (blocking) and written back. Preview
//! sessions bypass the prebuilt files entirely.

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cms::{CmsError, ContentRef, Cursor};
use crate::generator::write_page;
use crate::helpers::{is_safe_slug, post_output_path};
use crate::pages::{Fallback, PostPage, FALLBACK};
use crate::templates::TemplateRenderer;
use crate::Blog;

/// Cookie holding the preview ref token
pub const PREVIEW_COOKIE: &str = "io.prismic.preview";

/// Server state
struct ServerState {
    blog: Blog,
    renderer: TemplateRenderer,
}

type SharedState = Arc<ServerState>;

/// Build the application router
pub fn router(blog: Blog) -> Result<Router> {
    let renderer = TemplateRenderer::new(&blog.config)?;
    let public_dir = blog.public_dir.clone();
    let state = Arc::new(ServerState { blog, renderer });

    Ok(Router::new()
        .route("/", get(home_handler))
        .route("/post/:slug", get(post_handler))
        .route("/api/posts", get(more_handler))
        .route("/api/preview", get(preview_handler))
        .route("/api/exit-preview", get(exit_preview_handler))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the server
pub async fn start(blog: Blog, ip: &str, port: u16) -> Result<()> {
    let app = router(blog)?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn content_ref(jar: &CookieJar) -> ContentRef {
    match jar.get(PREVIEW_COOKIE) {
        Some(cookie) if !cookie.value().is_empty() => {
            ContentRef::Preview(cookie.value().to_string())
        }
        _ => ContentRef::Master,
    }
}

fn html_page(status: StatusCode, rendered: Result<String>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Template error: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

fn cms_failure(state: &ServerState, err: &CmsError, preview: bool) -> Response {
    tracing::error!("Content API request failed: {}", err);
    html_page(
        StatusCode::BAD_GATEWAY,
        state.renderer.render_error(
            "O conteúdo não pôde ser carregado agora. Tente novamente em instantes.",
            preview,
        ),
    )
}

async fn home_handler(State(state): State<SharedState>, jar: CookieJar) -> Response {
    let content_ref = content_ref(&jar);
    let preview = content_ref.is_preview();

    match state.blog.loader().home(&content_ref).await {
        Ok(page) => html_page(StatusCode::OK, state.renderer.render_home(&page, preview)),
        Err(e) => cms_failure(&state, &e, preview),
    }
}

async fn post_handler(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    jar: CookieJar,
) -> Response {
    let content_ref = content_ref(&jar);
    let preview = content_ref.is_preview();

    if !is_safe_slug(&slug) {
        return html_page(StatusCode::NOT_FOUND, state.renderer.render_not_found(preview));
    }

    let relative = post_output_path(&slug);
    if !preview {
        let file = state.blog.public_dir.join(&relative);
        let max_age = Duration::from_secs(state.blog.config.revalidate_secs);
        if let Some(html) = fresh_page(&file, max_age).await {
            tracing::debug!("Serving prebuilt page for {}", slug);
            return Html(html).into_response();
        }
    }

    match FALLBACK {
        Fallback::Blocking => tracing::debug!("Rendering {} on demand", slug),
    }

    match state.blog.loader().post(&slug, &content_ref).await {
        Ok(PostPage::Found(detail)) => {
            let rendered = state.renderer.render_post(&detail, preview);
            if let (false, Ok(html)) = (preview, &rendered) {
                if let Err(e) = write_page(&state.blog.public_dir, &relative, html) {
                    tracing::warn!("Could not store rendered page for {}: {:#}", slug, e);
                }
            }
            html_page(StatusCode::OK, rendered)
        }
        Ok(PostPage::NotFound) => {
            html_page(StatusCode::NOT_FOUND, state.renderer.render_not_found(preview))
        }
        Err(e) => cms_failure(&state, &e, preview),
    }
}

/// Contents of a prebuilt page younger than `max_age`
async fn fresh_page(path: &std::path::Path, max_age: Duration) -> Option<String> {
    let modified = tokio::fs::metadata(path).await.ok()?.modified().ok()?;
    if modified.elapsed().unwrap_or_default() >= max_age {
        return None;
    }
    tokio::fs::read_to_string(path).await.ok()
}

#[derive(Debug, Deserialize)]
struct MoreParams {
    cursor: String,
}

async fn more_handler(
    State(state): State<SharedState>,
    Query(params): Query<MoreParams>,
) -> Response {
    let cursor = Cursor::new(params.cursor);
    match state.blog.loader().more(&cursor).await {
        Ok(page) => Json(page).into_response(),
        Err(CmsError::InvalidCursor(cursor)) => {
            tracing::warn!("Rejected cursor: {}", cursor);
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "invalid cursor" })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Load more failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": "content API unavailable" })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct PreviewParams {
    token: String,
    #[serde(rename = "documentId")]
    document_id: String,
}

async fn preview_handler(
    State(state): State<SharedState>,
    Query(params): Query<PreviewParams>,
    jar: CookieJar,
) -> Response {
    let path = match state
        .blog
        .loader()
        .preview_path(&params.document_id, &params.token)
        .await
    {
        Ok(path) => path,
        Err(e) => return cms_failure(&state, &e, false),
    };

    let location = path.unwrap_or_else(|| "/".to_string());
    tracing::info!("Entering preview for {}", location);

    let cookie = Cookie::build((PREVIEW_COOKIE, params.token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    (jar.add(cookie), Redirect::temporary(&location)).into_response()
}

async fn exit_preview_handler(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(Cookie::build(PREVIEW_COOKIE).path("/"));
    (jar, Redirect::temporary("/"))
}
