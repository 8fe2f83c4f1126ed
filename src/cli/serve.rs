//! HTTP endpoint running one extraction per request

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use clap::Parser;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::extract::{extract_category, Cli, RunConfig};
use super::CliError;
use crate::fetcher::http::LookupHttpClient;
use crate::Category;

/// Job family used when the query omits `jobFamily`
pub const DEFAULT_JOB_FAMILY: &str = "Business and Financial Operations";

/// Serve command arguments
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    config: Arc<RunConfig>,
    client: LookupHttpClient,
}

impl AppState {
    /// Create state from a resolved config and a shared client
    pub fn new(config: RunConfig, client: LookupHttpClient) -> Self {
        Self {
            config: Arc::new(config),
            client,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(rename = "jobFamily")]
    job_family: Option<String>,
}

/// Build the router
///
/// - `GET /extract?jobFamily=<TEXT>` - run one extraction and export it
/// - `GET /health` - liveness check
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/extract", get(extract_handler))
        .route("/health", get(health_check))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn extract_handler(State(state): State<AppState>, Query(query): Query<ExtractQuery>) -> Response {
    let raw = query
        .job_family
        .unwrap_or_else(|| DEFAULT_JOB_FAMILY.to_string());

    let category = match Category::parse(&raw) {
        Ok(category) => category,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &CliError::from(e)),
    };

    info!("Extraction requested for {}", category);

    match extract_category(state.client.clone(), &state.config, &category, None).await {
        Ok(summary) => {
            let status = if summary.is_complete() { "success" } else { "partial" };
            Json(json!({
                "status": status,
                "records": summary.records,
                "jobFamily": summary.category,
                "output": summary.output.as_ref().map(|p| p.display().to_string()),
                "failedPages": summary.failed_pages,
            }))
            .into_response()
        }
        Err(e) => {
            error!("Extraction failed for {}: {}", category, e);
            let status = match e {
                CliError::FetcherError(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error_response(status, &e)
        }
    }
}

fn error_response(status: StatusCode, err: &CliError) -> Response {
    (
        status,
        Json(json!({
            "status": "error",
            "error": err.to_string(),
        })),
    )
        .into_response()
}

impl ServeArgs {
    /// Execute the serve command; runs until the listener fails
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let mut config = RunConfig::from_cli(cli);
        config.show_progress = false;
        config.fetch.validate()?;

        let client = LookupHttpClient::new(config.fetch.base_url.clone(), config.fetch.request_timeout)?;
        let app = router(AppState::new(config, client));

        let listener = TcpListener::bind(self.bind)
            .await
            .map_err(|e| CliError::ServerError(format!("Failed to bind {}: {}", self.bind, e)))?;

        info!("Listening on http://{}", self.bind);

        axum::serve(listener, app)
            .await
            .map_err(|e| CliError::ServerError(e.to_string()))
    }
}
