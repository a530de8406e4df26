use crate::config::ServerConfig;
use crate::registry::{ChannelRegistry, UpsertOutcome};
use crate::structs::WiFiChannel;
use crate::Error;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Web 服务器状态
pub struct AppState {
    pub registry: Arc<ChannelRegistry>,
}

pub type WebServerState = State<Arc<AppState>>;

/// Builds the router with every `/api` route bound to `registry`.
pub fn build_router(registry: Arc<ChannelRegistry>) -> Router {
    let app_state = Arc::new(AppState { registry });

    let api = Router::new()
        .route("/channel", post(api_upsert_channel))
        .route(
            "/channel/{channel_number}/{frequency_band}",
            delete(api_remove_channel),
        )
        .route("/channels", get(api_list_channels))
        .route("/bestChannelSummary", get(api_best_channel_summary))
        .route("/bestChannelsPerBand", get(api_best_channels_per_band))
        .route("/history", get(api_history));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// 启动 Web 服务器，直到收到 Ctrl-C
pub async fn run_server(config: &ServerConfig, registry: Arc<ChannelRegistry>) -> crate::Result<()> {
    let app = build_router(registry);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("🌐 Channel registry listening on {}", config.bind_addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::WebServer(e.into()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        // Without a signal handler we keep serving until the process is killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("🛑 Shutdown signal received.");
}

// --- Route Handlers ---

/// POST /api/channel
async fn api_upsert_channel(
    State(state): WebServerState,
    payload: Result<Json<WiFiChannel>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(channel) = payload.map_err(|e| Error::MalformedBody(e.body_text()))?;

    let outcome = state.registry.upsert(channel);
    tracing::info!(
        key = %channel.key(),
        updated = outcome == UpsertOutcome::Updated,
        "Channel stored"
    );

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Channel added/updated successfully." })),
    ))
}

/// DELETE /api/channel/{channel_number}/{frequency_band}
async fn api_remove_channel(
    State(state): WebServerState,
    Path((channel_number, frequency_band)): Path<(String, String)>,
) -> Result<impl IntoResponse, Error> {
    let (channel_number, frequency_band) = parse_channel_path(&channel_number, &frequency_band)?;

    let removed = state.registry.remove(channel_number, frequency_band);
    tracing::info!(channel_number, frequency_band, removed, "Channel remove requested");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Channel removed successfully." })),
    ))
}

/// GET /api/channels
async fn api_list_channels(State(state): WebServerState) -> impl IntoResponse {
    let channels = state.registry.list();
    tracing::debug!("Handling /api/channels: {} entries", channels.len());
    (StatusCode::OK, Json(channels))
}

/// GET /api/bestChannelSummary
///
/// 注意：分数越低越好
async fn api_best_channel_summary(State(state): WebServerState) -> impl IntoResponse {
    match state.registry.best_summary() {
        Some(best) => {
            tracing::debug!(key = %best.key(), score = best.score(), "Best channel selected");
            (StatusCode::OK, Json(best)).into_response()
        }
        None => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "No channel data available." })),
        )
            .into_response(),
    }
}

/// GET /api/bestChannelsPerBand
async fn api_best_channels_per_band(State(state): WebServerState) -> impl IntoResponse {
    (StatusCode::OK, Json(state.registry.best_per_band()))
}

/// GET /api/history
async fn api_history(State(state): WebServerState) -> impl IntoResponse {
    (StatusCode::OK, Json(state.registry.history()))
}

/// Parses the DELETE path segments. Bad input is rejected instead of being
/// read as zero, which would target the wrong record.
fn parse_channel_path(channel_number: &str, frequency_band: &str) -> crate::Result<(i32, f64)> {
    let number = channel_number
        .parse::<i32>()
        .map_err(|_| Error::InvalidPathParam {
            name: "channel number",
            value: channel_number.to_string(),
        })?;

    let band = frequency_band
        .parse::<f64>()
        .ok()
        .filter(|band| band.is_finite())
        .ok_or_else(|| Error::InvalidPathParam {
            name: "frequency band",
            value: frequency_band.to_string(),
        })?;

    Ok((number, band))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_path() {
        assert_eq!(parse_channel_path("6", "2.4").unwrap(), (6, 2.4));
        assert_eq!(parse_channel_path("36", "5").unwrap(), (36, 5.0));
    }

    #[test]
    fn rejects_non_numeric_channel() {
        let err = parse_channel_path("six", "2.4").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidPathParam { name: "channel number", ref value } if value == "six"
        ));
    }

    #[test]
    fn rejects_non_finite_band() {
        assert!(parse_channel_path("6", "ghz").is_err());
        assert!(parse_channel_path("6", "NaN").is_err());
        assert!(parse_channel_path("6", "inf").is_err());
    }
}
