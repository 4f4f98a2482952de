//! HTTP server mode exposing the filtered record stream

use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::{CancellationToken, DropGuard};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{validate_threshold, AppConfig};
use crate::engine::{FinishReason, Outcome, Pipeline, Subscription};
use crate::error::{Error, ErrorKind, Result};
use crate::fetch::PageFetcher;
use crate::stream::FilterStage;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Source of pages for every request
    pub fetcher: Arc<dyn PageFetcher>,
    /// Threshold used when the request does not supply one
    pub default_min_abv: f64,
}

impl ServerConfig {
    /// Build the server configuration from application config
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Arc::new(config.upstream.build_fetcher()?),
            default_min_abv: config.filter.min_abv,
        })
    }
}

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    config: ServerConfig,
}

impl AppState {
    /// A fresh pipeline for one request; allocates nothing until subscribed
    fn pipeline(&self, min_abv: f64) -> Pipeline {
        Pipeline::new(
            Arc::clone(&self.config.fetcher),
            FilterStage::abv_above(min_abv),
        )
    }
}

/// Query parameters for the record endpoints
#[derive(Debug, Deserialize)]
struct BeerQuery {
    /// Overrides the configured threshold
    #[serde(default)]
    min_abv: Option<f64>,
}

/// Error envelope
#[derive(Debug, Serialize)]
struct ApiError {
    success: bool,
    error: String,
}

impl ApiError {
    fn new(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

/// Build the application router
pub fn router(config: ServerConfig) -> Router {
    let state = AppState { config };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/beer", get(list_beers))
        .route("/beer/stream", get(stream_beers))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server
pub async fn serve(config: ServerConfig, host: &str, port: u16) -> Result<()> {
    let app = router(config);
    let listener = bind(host, port).await?;

    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Starting HTTP server on http://{}", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Bind the listen socket; `host` may be a name or an IPv4/IPv6 literal
async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .map_err(|source| Error::Bind {
            addr: format!("{host}:{port}"),
            source,
        })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Materialized response: the complete filtered collection or an error
///
/// The pipeline runs on its own task. If this handler is dropped because
/// the client went away, the guard cancels the worker.
async fn list_beers(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<BeerQuery>, QueryRejection>,
) -> Response {
    let min_abv = match resolve_threshold(query, state.config.default_min_abv) {
        Ok(v) => v,
        Err(response) => return response,
    };

    let token = CancellationToken::new();
    let _guard = token.clone().drop_guard();
    let worker = state.pipeline(min_abv).spawn_collect(token);

    match worker.await {
        Ok(Ok(Outcome::Complete(records))) => (StatusCode::OK, Json(records)).into_response(),
        Ok(Ok(Outcome::Cancelled)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new("Request cancelled")),
        )
            .into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(e) => {
            tracing::error!("Pipeline worker failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new("Pipeline worker failed")),
            )
                .into_response()
        }
    }
}

/// Streamed response: a JSON array written record by record
///
/// An upstream failure aborts the body after the records already sent,
/// leaving the array unterminated.
async fn stream_beers(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<BeerQuery>, QueryRejection>,
) -> Response {
    let min_abv = match resolve_threshold(query, state.config.default_min_abv) {
        Ok(v) => v,
        Err(response) => return response,
    };

    let token = CancellationToken::new();
    let subscription = state.pipeline(min_abv).subscribe(token.clone());
    let body = json_array_body(subscription, token.drop_guard());

    (
        [(header::CONTENT_TYPE, "application/json")],
        Body::from_stream(body),
    )
        .into_response()
}

fn resolve_threshold(
    query: std::result::Result<Query<BeerQuery>, QueryRejection>,
    default: f64,
) -> std::result::Result<f64, Response> {
    let bad_request = |msg: String| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(format!("Invalid min_abv: {msg}"))),
        )
            .into_response()
    };

    let Query(query) = query.map_err(|rejection| bad_request(rejection.body_text()))?;
    let Some(value) = query.min_abv else {
        return Ok(default);
    };
    validate_threshold(value).map_err(bad_request)
}

/// Map a pipeline error to a response
fn error_response(error: &Error) -> Response {
    let status = match (error, error.kind()) {
        (Error::Timeout { .. }, _) => StatusCode::GATEWAY_TIMEOUT,
        (_, ErrorKind::Network | ErrorKind::Decode) => StatusCode::BAD_GATEWAY,
        (_, ErrorKind::Config | ErrorKind::Io) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::warn!("Request failed with {}: {}", status, error);
    (status, Json(ApiError::new(error.to_string()))).into_response()
}

// ============================================================================
// Streaming body
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum BodyState {
    Open,
    Items { first: bool },
    Done,
}

struct ArrayBody {
    records: Subscription,
    state: BodyState,
    // Dropped with the body when the client disconnects
    _guard: DropGuard,
}

/// Encode a subscription as the chunks of a JSON array
fn json_array_body(
    records: Subscription,
    guard: DropGuard,
) -> impl Stream<Item = Result<Bytes>> + Send {
    let body = ArrayBody {
        records,
        state: BodyState::Open,
        _guard: guard,
    };

    futures::stream::unfold(body, |mut body| async move {
        match body.state {
            BodyState::Open => {
                body.state = BodyState::Items { first: true };
                Some((Ok(Bytes::from_static(b"[")), body))
            }
            BodyState::Items { first } => match body.records.next().await {
                Some(Ok(record)) => {
                    let mut chunk = if first { Vec::new() } else { b",".to_vec() };
                    let item = match serde_json::to_writer(&mut chunk, &record) {
                        Ok(()) => {
                            body.state = BodyState::Items { first: false };
                            Ok(Bytes::from(chunk))
                        }
                        Err(e) => {
                            body.state = BodyState::Done;
                            Err(Error::from(e))
                        }
                    };
                    Some((item, body))
                }
                Some(Err(e)) => {
                    body.state = BodyState::Done;
                    Some((Err(e), body))
                }
                None if body.records.finish_reason() == Some(FinishReason::Cancelled) => None,
                None => {
                    body.state = BodyState::Done;
                    Some((Ok(Bytes::from_static(b"]")), body))
                }
            },
            BodyState::Done => None,
        }
    })
}
