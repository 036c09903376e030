//! Development server with live reload
//!
//! Pages are rendered from the posts directory on every request, so an
//! edited post shows up on the next reload without a generate step.

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::{Request, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;
use crate::helpers::{article_dir, inject_before_body_end, url_for};
use crate::pages::PageBuilder;
use crate::{Blog, CONFIG_FILE};

/// Websocket endpoint the reload script connects to
const LIVE_RELOAD_PATH: &str = "/__livereload";

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
"#;

/// Server state
struct ServerState {
    pages: Arc<PageBuilder>,
    static_dir: PathBuf,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

/// Start the development server
pub async fn start(blog: &Blog, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    // Create broadcast channel for live reload notifications
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let pages = PageBuilder::new(blog).context("Failed to set up page rendering")?;
    let state = Arc::new(ServerState {
        pages: Arc::new(pages),
        static_dir: blog.static_dir.clone(),
        reload_tx: reload_tx.clone(),
        live_reload: watch,
    });

    let app = router(&blog.config, state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port)
        .parse()
        .with_context(|| format!("Invalid address {}:{}", ip, port))?;

    let url = format!("http://{}:{}{}", ip, port, url_for(&blog.config, "/"));
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    // Open browser if requested
    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    // Start file watcher if watch mode is enabled
    if watch {
        let blog = blog.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(&blog, reload_tx) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    // Start server
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(config: &SiteConfig, state: Arc<ServerState>) -> Router {
    let mut app = Router::new().route(LIVE_RELOAD_PATH, get(livereload_handler));
    for path in home_routes(config) {
        app = app.route(&path, get(home_handler));
    }
    for path in article_routes(config) {
        app = app.route(&path, get(article_handler));
    }
    app.fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Paths the home page answers on
fn home_routes(config: &SiteConfig) -> Vec<String> {
    let home = url_for(config, "/");
    let bare = home.trim_end_matches('/');
    if bare.is_empty() {
        vec![home]
    } else {
        vec![bare.to_string(), home]
    }
}

/// Paths the detail pages answer on, with and without a trailing slash
fn article_routes(config: &SiteConfig) -> Vec<String> {
    let route = url_for(config, &format!("{}/:slug", article_dir(config)));
    vec![route.clone(), format!("{}/", route)]
}

/// Request path relative to the site root, `None` outside of it
fn strip_root<'a>(config: &SiteConfig, path: &'a str) -> Option<&'a str> {
    let home = url_for(config, "/");
    if path == home.trim_end_matches('/') {
        return Some("");
    }
    path.strip_prefix(home.as_str())
}

/// Watch the posts, static files and config, and tell clients to reload
fn watch_and_reload(blog: &Blog, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel::<DebounceEventResult>();

    // Create debouncer to coalesce bursts of writes
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for dir in [&blog.posts_dir, &blog.static_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    let config_path = blog.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    // Handle file change events
    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                // Filter out editor and VCS noise
                let relevant_events: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".git")
                            && !path_str.contains(".DS_Store")
                            && !path_str.ends_with('~')
                    })
                    .collect();

                if relevant_events.is_empty() {
                    continue;
                }

                for event in &relevant_events {
                    tracing::info!("File changed: {}", event.path.display());
                    if event.path.ends_with(CONFIG_FILE) {
                        tracing::warn!("{} changed, restart the server to apply it", CONFIG_FILE);
                    }
                }

                // Notify all connected clients to reload
                let _ = reload_tx.send(());
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            // Wait for reload signal
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            // Handle incoming messages (ping/pong)
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

async fn home_handler(State(state): State<Arc<ServerState>>) -> Response {
    render_page(state, |pages| pages.render_home().map(|html| (StatusCode::OK, html))).await
}

async fn article_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    render_page(state, move |pages| {
        pages
            .render_article(&slug)
            .map(|html| (StatusCode::OK, html))
    })
    .await
}

/// Serve a static file, or the not-found page
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    mut request: Request<Body>,
) -> Response {
    let relative = strip_root(state.pages.config(), request.uri().path()).map(str::to_string);

    if let Some(relative) = relative {
        if let Ok(uri) = format!("/{}", relative).parse::<Uri>() {
            *request.uri_mut() = uri;
            let mut service = ServeDir::new(&state.static_dir);
            match service.try_call(request).await {
                Ok(response) if response.status() != StatusCode::NOT_FOUND => {
                    return response.into_response();
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("Failed to serve static file: {}", e);
                    return (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response();
                }
            }
        }
    }

    render_page(state, |pages| {
        pages
            .render_not_found(None)
            .map(|html| (StatusCode::NOT_FOUND, html))
    })
    .await
}

/// Build a page off the async runtime and turn the outcome into a response
///
/// A missing post answers with the not-found page rather than an error.
async fn render_page<F>(state: Arc<ServerState>, build: F) -> Response
where
    F: FnOnce(&PageBuilder) -> crate::Result<(StatusCode, String)> + Send + 'static,
{
    let pages = state.pages.clone();
    let outcome = tokio::task::spawn_blocking(move || -> crate::Result<(StatusCode, String)> {
        match build(pages.as_ref()) {
            Err(crate::Error::NotFound(name)) => {
                tracing::debug!("Not found: {}", name);
                let slug = name.strip_suffix(".md").unwrap_or(&name);
                let html = pages.render_not_found(Some(slug))?;
                Ok((StatusCode::NOT_FOUND, html))
            }
            other => other,
        }
    })
    .await;

    match outcome {
        Ok(Ok((status, html))) => page_response(&state, status, html),
        Ok(Err(e)) => {
            tracing::error!("Failed to build page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!("Page build panicked: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

fn page_response(state: &ServerState, status: StatusCode, html: String) -> Response {
    let html = if state.live_reload {
        inject_before_body_end(&html, LIVE_RELOAD_SCRIPT)
    } else {
        html
    };
    (status, Html(html)).into_response()
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config_with_root(root: &str) -> SiteConfig {
        SiteConfig {
            root: root.to_string(),
            ..Default::default()
        }
    }

    fn state_for(files: &[(&str, &str)], live_reload: bool) -> (tempfile::TempDir, Arc<ServerState>) {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("posts");
        fs::create_dir_all(&posts).unwrap();
        for (name, content) in files {
            fs::write(posts.join(name), content).unwrap();
        }
        let blog = Blog::new(dir.path()).unwrap();
        let (reload_tx, _) = broadcast::channel(1);
        let state = Arc::new(ServerState {
            pages: Arc::new(PageBuilder::new(&blog).unwrap()),
            static_dir: blog.static_dir.clone(),
            reload_tx,
            live_reload,
        });
        (dir, state)
    }

    #[test]
    fn test_routes_at_site_root() {
        let config = SiteConfig::default();
        assert_eq!(home_routes(&config), vec!["/"]);
        assert_eq!(
            article_routes(&config),
            vec!["/article/:slug", "/article/:slug/"]
        );
    }

    #[test]
    fn test_routes_below_subdirectory() {
        let config = config_with_root("/blog/");
        assert_eq!(home_routes(&config), vec!["/blog", "/blog/"]);
        assert_eq!(
            article_routes(&config),
            vec!["/blog/article/:slug", "/blog/article/:slug/"]
        );
    }

    #[test]
    fn test_strip_root() {
        let config = config_with_root("/blog/");
        assert_eq!(strip_root(&config, "/blog/img/a.png"), Some("img/a.png"));
        assert_eq!(strip_root(&config, "/blog"), Some(""));
        assert_eq!(strip_root(&config, "/other/a.png"), None);

        let config = SiteConfig::default();
        assert_eq!(strip_root(&config, "/css/site.css"), Some("css/site.css"));
    }

    #[tokio::test]
    async fn test_article_handler_statuses() {
        let (_dir, state) = state_for(&[("hello.md", "---\ntitle: Hello\n---\n# Hi")], false);

        let response = article_handler(State(state.clone()), Path("hello".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = article_handler(State(state.clone()), Path("missing".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = home_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_broken_post_is_server_error() {
        let (_dir, state) = state_for(&[("bad.md", "---\ntitle: [oops\n---\n")], false);
        let response = article_handler(State(state), Path("bad".to_string())).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
