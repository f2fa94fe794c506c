//! MCP over HTTP: single-shot JSON-RPC on `POST /mcp` and a session-based
//! SSE channel under `/mcp/sse`.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use odoo_mcp::McpServer;
use odoo_mcp_core::TransportKind;

use crate::serve::{shutdown_signal, ToolServer, ToolSurface};

/// Path clients POST session messages to.
pub const SSE_MESSAGES_PATH: &str = "/mcp/sse/messages";

const SESSION_BUFFER: usize = 32;

type Sessions = Arc<Mutex<HashMap<String, mpsc::Sender<String>>>>;

#[derive(Clone)]
struct StreamingState {
    mcp: Arc<McpServer>,
    sessions: Sessions,
}

impl StreamingState {
    fn sender(&self, session_id: &str) -> Option<mpsc::Sender<String>> {
        self.sessions
            .lock()
            .ok()
            .and_then(|sessions| sessions.get(session_id).cloned())
    }
}

/// Removes its session from the table when the SSE stream is dropped.
struct SessionGuard {
    id: String,
    sessions: Sessions,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.remove(&self.id);
        }
        info!(session = %self.id, "SSE session closed");
    }
}

/// Build the streaming MCP router.
pub fn streaming_router(mcp: Arc<McpServer>) -> Router {
    let state = StreamingState {
        mcp,
        sessions: Arc::new(Mutex::new(HashMap::new())),
    };

    Router::new()
        .route("/mcp", post(rpc_post))
        .route("/mcp/sse", get(sse_connect))
        .route(SSE_MESSAGES_PATH, post(sse_message))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `POST /mcp`: one JSON-RPC message in, its response out (202 for notifications).
async fn rpc_post(State(state): State<StreamingState>, body: String) -> Response {
    match state.mcp.handle_line(&body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn sse_connect(
    State(state): State<StreamingState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = uuid::Uuid::new_v4().simple().to_string();
    let (tx, rx) = mpsc::channel::<String>(SESSION_BUFFER);

    if let Ok(mut sessions) = state.sessions.lock() {
        sessions.insert(session_id.clone(), tx);
    }
    info!(session = %session_id, "SSE session opened");

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("{SSE_MESSAGES_PATH}?session_id={session_id}"));

    let guard = SessionGuard {
        id: session_id,
        sessions: state.sessions.clone(),
    };
    let messages = ReceiverStream::new(rx).map(move |json| {
        let _session = &guard;
        Ok::<_, Infallible>(Event::default().event("message").data(json))
    });

    let events = stream::once(async move { Ok::<_, Infallible>(endpoint) }).chain(messages);
    Sse::new(events).keep_alive(KeepAlive::default())
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    session_id: Option<String>,
}

/// `POST /mcp/sse/messages?session_id=`: the response goes out on the session's stream.
async fn sse_message(
    State(state): State<StreamingState>,
    Query(query): Query<SessionQuery>,
    body: String,
) -> Response {
    let Some(session_id) = query.session_id.filter(|s| !s.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "session_id is required").into_response();
    };
    let Some(tx) = state.sender(&session_id) else {
        return (StatusCode::NOT_FOUND, "Could not find session").into_response();
    };

    if let Some(response) = state.mcp.handle_line(&body).await {
        let json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to encode response");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };
        debug!(session = %session_id, response = %json, "Queueing SSE response");
        if tx.send(json).await.is_err() {
            return (StatusCode::NOT_FOUND, "Could not find session").into_response();
        }
    }
    StatusCode::ACCEPTED.into_response()
}

pub struct StreamingHttpServer {
    addr: String,
}

impl StreamingHttpServer {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait]
impl ToolServer for StreamingHttpServer {
    fn transport(&self) -> TransportKind {
        TransportKind::Http
    }

    async fn serve(&self, surface: ToolSurface) -> anyhow::Result<()> {
        let mcp = McpServer::new(surface.registry, surface.erp).with_transport(TransportKind::Http);
        let app = streaming_router(Arc::new(mcp));

        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .with_context(|| format!("failed to bind {}", self.addr))?;
        info!("Starting Odoo MCP server with HTTP transport on {}", self.addr);
        info!("  POST http://{}/mcp", self.addr);
        info!("  GET  http://{}/mcp/sse", self.addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP transport failed")?;
        Ok(())
    }
}
