//! Health and metrics endpoints using Axum

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

use crate::metrics::Metrics;

/// Missed ticks tolerated before the monitor reports itself stalled.
pub const STALL_AFTER_INTERVALS: u64 = 3;

#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<Metrics>,
    pub symbols: usize,
    pub scan_interval_seconds: u64,
    pub start_time: Arc<Instant>,
}

impl AppState {
    pub fn new(metrics: Arc<Metrics>, symbols: usize, scan_interval_seconds: u64) -> Self {
        Self {
            metrics,
            symbols,
            scan_interval_seconds,
            start_time: Arc::new(Instant::now()),
        }
    }

    /// Seconds since the scheduler last ticked, or since startup before the
    /// first tick.
    fn seconds_since_tick(&self, now: DateTime<Utc>) -> u64 {
        match self.metrics.last_tick_timestamp.get() {
            0 => self.start_time.elapsed().as_secs(),
            ts => (now.timestamp() - ts).max(0) as u64,
        }
    }

    fn is_stalled(&self, now: DateTime<Utc>) -> bool {
        let allowance = self.scan_interval_seconds.max(1) * STALL_AFTER_INTERVALS;
        self.seconds_since_tick(now) > allowance
    }
}

fn timestamp_rfc3339(ts: i64) -> Option<String> {
    match ts {
        0 => None,
        ts => Utc.timestamp_opt(ts, 0).single().map(|at| at.to_rfc3339()),
    }
}

/// `200 healthy` while the scheduler keeps ticking, `503 stalled` once it
/// has missed several intervals in a row.
pub async fn health_check(State(state): State<AppState>) -> Response {
    let now = Utc::now();
    let stalled = state.is_stalled(now);
    let body = json!({
        "status": if stalled { "stalled" } else { "healthy" },
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "service": "marketwatch",
        "symbols": state.symbols,
        "scan_interval_seconds": state.scan_interval_seconds,
        "cycles": state.metrics.cycles_total.get(),
        "skipped_ticks": state.metrics.cycles_skipped_total.get(),
        "last_cycle": timestamp_rfc3339(state.metrics.last_cycle_timestamp.get()),
        "last_tick": timestamp_rfc3339(state.metrics.last_tick_timestamp.get()),
    });
    if stalled {
        warn!(
            seconds_since_tick = state.seconds_since_tick(now),
            "Health check: scheduler stalled"
        );
        (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
    } else {
        Json(body).into_response()
    }
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Counts requests per matched route and status code.
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    state.metrics.http_requests_in_flight.dec();

    let status = response.status();
    state
        .metrics
        .http_requests_total
        .with_label_values(&[route.as_str(), status.as_str()])
        .inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(start.elapsed().as_secs_f64());

    if status.is_server_error() {
        warn!(route = %route, status = %status, "HTTP request failed");
    }

    response
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            metrics_middleware,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn start_server<F>(port: u16, state: AppState, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;

    info!(port = port, "Health and metrics on http://0.0.0.0:{}", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
