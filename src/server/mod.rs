// src/server/mod.rs

//! Development HTTP server for the `browsersync` task.
//!
//! - Static files come from the app directory (`tower-http` `ServeDir`).
//! - Every response carries no-cache headers.
//! - HTML responses get the live-reload client injected.
//! - [`inject::WEBSOCKET_PATH`] upgrades to a websocket that streams
//!   [`ReloadMessage`]s from the [`ReloadHub`] as JSON.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::Context;
use axum::body::Body;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Request, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, EXPIRES, PRAGMA};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tracing::{debug, info, warn};

use crate::config::ServerSection;
use crate::errors::{Result, SitepipeError};

pub mod inject;
pub mod reload;

pub use reload::{ReloadHub, ReloadMessage};

/// A bound, not yet serving, dev server.
#[derive(Debug)]
pub struct DevServer {
    listener: TcpListener,
    router: Router,
}

impl DevServer {
    /// Bind the listener. Serving starts with [`DevServer::serve`].
    pub async fn bind(server: &ServerSection, app_dir: PathBuf, hub: ReloadHub) -> Result<Self> {
        let ip: IpAddr = server.host.parse().map_err(|e| {
            SitepipeError::ConfigError(format!("invalid server host {:?}: {e}", server.host))
        })?;
        let addr = SocketAddr::new(ip, server.port);
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding dev server to {addr}"))?;

        Ok(Self {
            listener,
            router: router(app_dir, hub),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the future is dropped or the listener fails.
    pub async fn serve(self) -> Result<()> {
        if let Ok(addr) = self.listener.local_addr() {
            info!("dev server listening on http://{addr}");
        }
        axum::serve(self.listener, self.router)
            .await
            .context("dev server stopped")?;
        Ok(())
    }
}

/// Routes of the dev server, rooted at `app_dir`.
pub fn router(app_dir: PathBuf, hub: ReloadHub) -> Router {
    Router::new()
        .route(inject::WEBSOCKET_PATH, get(reload_socket))
        .route(inject::CLIENT_SCRIPT_PATH, get(client_script))
        .fallback_service(ServeDir::new(app_dir))
        .layer(middleware::from_fn(inject_livereload))
        .layer(middleware::from_fn(no_cache))
        .with_state(hub)
}

async fn client_script() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "application/javascript; charset=utf-8")],
        inject::CLIENT_SCRIPT,
    )
}

async fn reload_socket(ws: WebSocketUpgrade, State(hub): State<ReloadHub>) -> Response {
    let rx = hub.subscribe();
    ws.on_upgrade(move |socket| push_reloads(socket, rx))
}

async fn push_reloads(mut socket: WebSocket, mut rx: broadcast::Receiver<ReloadMessage>) {
    debug!("live-reload client connected");
    loop {
        tokio::select! {
            msg = rx.recv() => {
                let msg = match msg {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "live-reload client lagged; forcing reload");
                        ReloadMessage::Reload
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let Ok(text) = serde_json::to_string(&msg) else { continue };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            }
        }
    }
    debug!("live-reload client disconnected");
}

async fn inject_livereload(req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    let is_html = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));
    if !is_html {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "failed to buffer html response");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let html = inject::inject_client_script(&String::from_utf8_lossy(&bytes));
    parts.headers.remove(CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(html))
}

async fn no_cache(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    insert_no_cache_headers(response.headers_mut());
    response
}

fn insert_no_cache_headers(headers: &mut HeaderMap) {
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));
}
