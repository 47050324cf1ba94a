//! HTTP request handlers for the web adapter.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

use crate::domain::backtest::run_backtest as run_backtest_engine;
use crate::domain::error::TradesimError;
use crate::domain::report::{BacktestOutcome, NO_DATA, last_bar_per_day};
use crate::domain::strategy::StrategyConfig;

use super::{AppState, WebError};

#[derive(Debug, Deserialize)]
pub struct BacktestRequest {
    pub ticker: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

/// One stored bar per calendar day.
#[derive(Debug, Serialize)]
pub struct DailyBar {
    pub time: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Serialize)]
pub struct BarHistory {
    pub ticker: String,
    pub bars: Vec<DailyBar>,
}

pub async fn run_backtest(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BacktestRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(request) = payload?;
    let ticker = request.ticker.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(WebError::bad_request("ticker is required"));
    }
    let config = StrategyConfig::from_params(&request.params)?;

    info!(ticker = %ticker, params = %serde_json::Value::Object(request.params), "running backtest");

    let data_port = Arc::clone(&state.data_port);
    let outcome = tokio::task::spawn_blocking(move || -> Result<BacktestOutcome, TradesimError> {
        let bars = data_port.fetch_bars(&ticker)?;
        run_backtest_engine(&ticker, &bars, &config)
    })
    .await
    .map_err(|e| WebError::internal(format!("backtest task failed: {e}")))??;

    Ok(match outcome {
        BacktestOutcome::NoData { .. } => (StatusCode::NOT_FOUND, Json(outcome)).into_response(),
        BacktestOutcome::Report(_) => Json(outcome).into_response(),
    })
}

pub async fn list_tickers(State(state): State<Arc<AppState>>) -> Result<Response, WebError> {
    let data_port = Arc::clone(&state.data_port);
    let tickers = tokio::task::spawn_blocking(move || data_port.list_tickers())
        .await
        .map_err(|e| WebError::internal(format!("ticker listing failed: {e}")))??;
    Ok(Json(tickers).into_response())
}

pub async fn bar_history(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Response, WebError> {
    let ticker = ticker.trim().to_uppercase();
    let data_port = Arc::clone(&state.data_port);
    let lookup = ticker.clone();
    let bars = tokio::task::spawn_blocking(move || data_port.fetch_bars(&lookup))
        .await
        .map_err(|e| WebError::internal(format!("bar lookup failed: {e}")))??;

    let bars: Vec<DailyBar> = last_bar_per_day(&bars)
        .into_iter()
        .map(|i| {
            let bar = &bars[i];
            DailyBar {
                time: bar.date().format("%Y-%m-%d").to_string(),
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
            }
        })
        .collect();

    if bars.is_empty() {
        return Err(WebError::not_found(NO_DATA));
    }
    Ok(Json(BarHistory { ticker, bars }).into_response())
}

pub async fn not_found() -> WebError {
    WebError::not_found("Not found")
}
