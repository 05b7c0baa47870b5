//! Data API for the Discord Activity webview.
//!
//! The embedded app fetches everything it renders from here; this server
//! never produces HTML. CORS is wide open because the webview is served
//! through Discord's activity proxy origin.
//!
//! # API Endpoints
//!
//! | Method | Path                    | Description                         |
//! |--------|-------------------------|-------------------------------------|
//! | GET    | `/` / `/healthz`        | Health check                        |
//! | GET    | `/api/config`           | Public client configuration         |
//! | GET    | `/api/tabs`             | Configured worksheet tab names      |
//! | GET    | `/api/sheet-data`       | Default tab as a JSON row array     |
//! | GET    | `/api/sheet-data/{tab}` | Named tab as a JSON row array       |

use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::core::standings::{SheetError, StandingsError, StandingsService};
use crate::core::table::SheetTable;
use crate::infra::sheets::GoogleSheetsClient;

#[derive(Clone)]
pub struct ApiState {
    pub standings: Arc<StandingsService<GoogleSheetsClient>>,
    /// Discord application client id, exposed so the webview can boot the
    /// embedded-app SDK. Optional: the API works without it.
    pub client_id: Option<String>,
}

/// Start the HTTP server. Runs until the process exits.
pub async fn start_server(port: u16, state: ApiState) -> anyhow::Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = Router::new()
        .route("/", get(health))
        .route("/healthz", get(health))
        .route("/api/config", get(client_config))
        .route("/api/tabs", get(tab_names))
        .route("/api/sheet-data", get(default_sheet_data))
        .route("/api/sheet-data/{tab}", get(sheet_data))
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Activity data API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn client_config(State(state): State<ApiState>) -> Json<Value> {
    Json(json!({ "clientId": state.client_id }))
}

async fn tab_names(State(state): State<ApiState>) -> Json<Value> {
    let names: Vec<&str> = state
        .standings
        .tabs()
        .iter()
        .map(|tab| tab.name.as_str())
        .collect();
    Json(json!({ "tabs": names }))
}

async fn default_sheet_data(
    State(state): State<ApiState>,
) -> Result<Json<SheetTable>, (StatusCode, Json<Value>)> {
    fetch_table(&state, None).await
}

async fn sheet_data(
    State(state): State<ApiState>,
    Path(tab): Path<String>,
) -> Result<Json<SheetTable>, (StatusCode, Json<Value>)> {
    fetch_table(&state, Some(&tab)).await
}

/// The table serializes as a JSON array of row objects; an empty sheet is an
/// empty array, not an error.
async fn fetch_table(
    state: &ApiState,
    tab: Option<&str>,
) -> Result<Json<SheetTable>, (StatusCode, Json<Value>)> {
    match state.standings.get_table(tab).await {
        Ok((_, table)) => Ok(Json(table)),
        Err(err) => {
            tracing::warn!("Sheet data request failed: {err}");
            Err((error_status(&err), Json(json!({ "error": err.to_string() }))))
        }
    }
}

fn error_status(err: &StandingsError) -> StatusCode {
    match err {
        StandingsError::UnknownTab(_) => StatusCode::NOT_FOUND,
        StandingsError::Source(SheetError::Upstream { .. })
        | StandingsError::Source(SheetError::Transport(_)) => StatusCode::BAD_GATEWAY,
        StandingsError::Source(SheetError::Auth(_))
        | StandingsError::Source(SheetError::NotConfigured(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tabs_map_to_404_and_upstream_failures_to_502() {
        assert_eq!(
            error_status(&StandingsError::UnknownTab("D9".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&StandingsError::Source(SheetError::Upstream {
                status: 500,
                body: String::new(),
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            error_status(&StandingsError::Source(SheetError::NotConfigured("x"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
