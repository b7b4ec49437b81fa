use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use crate::config::ViewConfig;
use crate::models::Period;
use crate::services::{PairPipeline, ViewError, ViewParams};
use super::view::TableView;

pub struct AppState {
    pub pipeline: Arc<PairPipeline>,
    pub view: ViewConfig,
}

/// Query string of `GET /pairs`. Omitted fields fall back to `[view]` config.
#[derive(Debug, Default, Deserialize)]
pub struct PairsQuery {
    pub period: Option<String>,
    pub target_liquidity: Option<f64>,
    pub min_liquidity: Option<f64>,
    /// Comma-separated column names; an empty value selects nothing.
    pub columns: Option<String>,
}

impl PairsQuery {
    pub fn params(&self, defaults: &ViewConfig) -> Result<ViewParams, ViewError> {
        let period: Period = self.period.as_deref().unwrap_or(&defaults.period).parse()?;
        ViewParams::new(
            period,
            self.target_liquidity.unwrap_or(defaults.target_liquidity),
            self.min_liquidity.unwrap_or(defaults.min_liquidity),
        )
    }

    pub fn selected_columns(&self) -> Option<Vec<String>> {
        self.columns.as_ref().map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}

/// GET /pairs
async fn get_pairs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PairsQuery>,
) -> Result<(StatusCode, Json<TableView>), (StatusCode, Json<serde_json::Value>)> {
    let params = query.params(&state.view).map_err(|e| {
        (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": e.to_string() })))
    })?;

    let output = state.pipeline.run(params).await;
    let selected = query.selected_columns();
    let view = TableView::build(&output, selected.as_deref(), &state.view.columns);

    let status = if output.error.is_some() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };
    Ok((status, Json(view)))
}

/// GET /periods
async fn get_periods(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let default = state.view.period.parse::<Period>().unwrap_or_default();
    let periods: Vec<serde_json::Value> = Period::ALL
        .into_iter()
        .map(|p| serde_json::json!({
            "label": p.label(),
            "key": p.api_key(),
            "default": p == default,
        }))
        .collect();
    Json(serde_json::Value::Array(periods))
}

/// GET /health
async fn health() -> &'static str {
    "OK"
}

pub fn create_rest_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/pairs", get(get_pairs))
        .route("/periods", get(get_periods))
        .route("/health", get(health))
        .with_state(state)
}
