//! Variant-aware HTTP server over a built site.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_http::services::ServeDir;

use gcare_static::SiteVariant;

use crate::live::{live_client_script, LiveHub, LiveMessage};

/// Path of the live reload socket.
pub const LIVE_PATH: &str = "/__live";

/// Configuration for serving a built site.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Built site to serve
    pub output_dir: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dist"),
            port: 4000,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ServerError::InvalidAddress(format!("{}:{}", self.host, self.port)))
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("Directory not found: {0}. Run 'gcare build' first.")]
    MissingOutput(String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error("Failed to prepare dev output: {0}")]
    OutputError(String),

    #[error("Build failed: {0}")]
    BuildError(#[from] gcare_static::BuildError),
}

/// Shared server state.
struct ServerState {
    output_dir: PathBuf,
    live: Option<LiveHub>,
}

#[derive(Debug, Deserialize)]
struct VariantQuery {
    subdomain: Option<String>,
}

/// Build the router for a site in `output_dir`.
///
/// `/` serves the page of the variant the request host selects. With a hub,
/// the live reload socket and client script are mounted too.
pub fn router(output_dir: &Path, live: Option<LiveHub>) -> Router {
    let with_live = live.is_some();
    let state = Arc::new(ServerState {
        output_dir: output_dir.to_path_buf(),
        live,
    });

    let mut app = Router::new().route("/", get(variant_handler));

    if with_live {
        app = app
            .route(LIVE_PATH, get(ws_handler))
            .route("/__live.js", get(live_script_handler));
    }

    app.nest_service("/assets", ServeDir::new(output_dir.join("assets")))
        .nest_service("/docs", ServeDir::new(output_dir.join("docs")))
        .fallback_service(ServeDir::new(output_dir))
        .with_state(state)
}

/// Bind and serve until the process ends.
pub(crate) async fn run(config: &ServerConfig, app: Router) -> Result<(), ServerError> {
    let addr = config.addr()?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

    tracing::info!("Serving {} at http://{}", config.output_dir.display(), addr);

    if config.open {
        let url = format!("http://{}", addr);
        let _ = open::that(&url);
    }

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

    Ok(())
}

/// Serves an existing build without watching.
pub struct PreviewServer {
    config: ServerConfig,
}

impl PreviewServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub async fn start(self) -> Result<(), ServerError> {
        if !self.config.output_dir.exists() {
            return Err(ServerError::MissingOutput(
                self.config.output_dir.display().to_string(),
            ));
        }

        let app = router(&self.config.output_dir, None);
        run(&self.config, app).await
    }
}

/// Page file for a variant, if the variant has one.
fn page_path(output_dir: &Path, variant: &SiteVariant) -> Option<PathBuf> {
    variant
        .is_known()
        .then(|| output_dir.join(variant.as_str()).join("index.html"))
}

/// Handler for the variant page.
async fn variant_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Query(query): Query<VariantQuery>,
) -> Response {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let variant = SiteVariant::classify(host, query.subdomain.as_deref());

    let Some(path) = page_path(&state.output_dir, &variant) else {
        tracing::debug!("No page for variant '{}' (host {})", variant, host);
        return not_found();
    };

    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            not_found()
        }
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(
            r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Page not found</title></head>
<body><h1>404</h1><p>This page does not exist.</p></body>
</html>"#,
        ),
    )
        .into_response()
}

/// Handler for the live reload WebSocket endpoint.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<ServerState>>) -> Response {
    match state.live.clone() {
        Some(hub) => ws.on_upgrade(move |socket| handle_ws(socket, hub)),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Forward hub messages to one connected page.
async fn handle_ws(mut socket: WebSocket, hub: LiveHub) {
    let mut rx = hub.subscribe();

    if send_message(&mut socket, &LiveMessage::Connected).await.is_err() {
        return;
    }

    while let Ok(msg) = rx.recv().await {
        if send_message(&mut socket, &msg).await.is_err() {
            break;
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &LiveMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}

/// Handler for the live reload client script.
async fn live_script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        live_client_script(LIVE_PATH),
    )
}
