//! Development server that renders entries on request

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::page::PageGenerator;
use crate::render::MarkdownRenderer;
use crate::templates::{SiteData, TemplateRenderer};
use crate::Blog;

/// Server state
struct ServerState {
    pages: PageGenerator<MarkdownRenderer>,
    templates: TemplateRenderer,
    site: SiteData,
}

/// Result of a render request
enum Outcome {
    Found(String),
    Missing,
}

impl ServerState {
    fn render_index(&self) -> crate::error::Result<Outcome> {
        let catalog = self.pages.catalog().load_all()?;
        Ok(Outcome::Found(
            self.templates.render_index(&self.site, &catalog)?,
        ))
    }

    /// Identifiers outside the route table are rejected before the entry is loaded
    fn render_entry(&self, identifier: &str) -> crate::error::Result<Outcome> {
        let routes = self.pages.enumerate_routes()?;
        if !routes.contains(identifier) {
            tracing::debug!("No route for {:?}", identifier);
            return Ok(Outcome::Missing);
        }

        let page = self.pages.build_page(identifier)?;
        Ok(Outcome::Found(self.templates.render_post(&self.site, &page)?))
    }

    fn not_found_page(&self) -> String {
        self.templates
            .render_not_found(&self.site)
            .unwrap_or_else(|_| "Not found".to_string())
    }
}

/// Build the application router
pub fn router(blog: &Blog) -> Result<Router> {
    let state = Arc::new(ServerState {
        pages: blog.page_generator(),
        templates: TemplateRenderer::new()?,
        site: SiteData::from(&blog.config),
    });

    Ok(Router::new()
        .route("/", get(index_handler))
        .route("/blog/:identifier", get(entry_handler))
        .route("/blog/:identifier/", get(entry_handler))
        .fallback_service(ServeDir::new(&blog.static_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http()))
}

/// Start the development server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let app = router(blog)?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Entries are rendered fresh on every request. Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index_handler(State(state): State<Arc<ServerState>>) -> Response {
    respond(state, |state| state.render_index()).await
}

async fn entry_handler(
    State(state): State<Arc<ServerState>>,
    Path(identifier): Path<String>,
) -> Response {
    respond(state, move |state| state.render_entry(&identifier)).await
}

/// Run a render on the blocking pool and map the outcome to a response
async fn respond<F>(state: Arc<ServerState>, work: F) -> Response
where
    F: FnOnce(&ServerState) -> crate::error::Result<Outcome> + Send + 'static,
{
    let worker = Arc::clone(&state);
    match tokio::task::spawn_blocking(move || work(&worker)).await {
        Ok(Ok(Outcome::Found(html))) => Html(html).into_response(),
        Ok(Ok(Outcome::Missing)) => {
            (StatusCode::NOT_FOUND, Html(state.not_found_page())).into_response()
        }
        Ok(Err(e)) if e.is_not_found() => {
            tracing::warn!("{}", e);
            (StatusCode::NOT_FOUND, Html(state.not_found_page())).into_response()
        }
        Ok(Err(e)) => {
            tracing::error!("Render failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!("Render task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::fs;
    use tempfile::TempDir;

    fn state(files: &[(&str, &str)]) -> (TempDir, Arc<ServerState>) {
        let dir = TempDir::new().unwrap();
        let blog = Blog::with_config(dir.path().to_path_buf(), SiteConfig::default());
        fs::create_dir_all(&blog.content_dir).unwrap();
        for (name, content) in files {
            fs::write(blog.content_dir.join(name), content).unwrap();
        }

        let state = Arc::new(ServerState {
            pages: blog.page_generator(),
            templates: TemplateRenderer::new().unwrap(),
            site: SiteData::from(&blog.config),
        });
        (dir, state)
    }

    async fn body(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_entry_is_rendered_on_request() {
        let (_dir, state) = state(&[("hello.mdx", "---\ntitle: Hello\n---\n# Hi\n")]);

        let response = entry_handler(State(state), Path("hello".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await.contains(r#"<h1 id="hi">"#));
    }

    #[tokio::test]
    async fn test_unknown_entry_is_404() {
        let (_dir, state) = state(&[("hello.mdx", "Hi")]);

        let response = entry_handler(State(state), Path("missing".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body(response).await.contains("Not found"));
    }

    #[tokio::test]
    async fn test_file_outside_route_table_is_not_served() {
        // "post.draft.mdx" routes as "post", so "post.draft" is not a route
        let (_dir, state) = state(&[("post.draft.mdx", "secret")]);

        let response = entry_handler(State(state), Path("post.draft".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_path_traversal_is_not_served() {
        let (dir, state) = state(&[("hello.mdx", "Hi")]);
        fs::write(dir.path().join("secret.mdx"), "secret").unwrap();

        let response = entry_handler(State(state), Path("../secret".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_broken_entry_is_500() {
        let (_dir, state) = state(&[("bad.mdx", "---\ntitle: [\n---\n")]);

        let response = entry_handler(State(state), Path("bad".to_string())).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_index_lists_entries() {
        let (_dir, state) = state(&[
            ("a.mdx", "---\ntitle: Alpha\ndate: \"2020-01-01\"\n---\n"),
            ("b.mdx", "---\ntitle: Beta\ndate: \"2021-01-01\"\n---\n"),
        ]);

        let response = index_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body(response).await;
        assert!(html.find("Beta").unwrap() < html.find("Alpha").unwrap());
    }
}
