//! HTTP adapter.
//!
//! JSON API over the backtest engine: `POST /backtest` runs one ticker,
//! `GET /tickers` lists what the store holds and
//! `GET /tickers/{ticker}/bars` returns one stored bar per day.

mod error;
mod handlers;

pub use error::WebError;
pub use handlers::*;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::ports::data_port::DataPort;

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

pub struct AppState {
    pub data_port: Arc<dyn DataPort + Send + Sync>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/backtest", post(handlers::run_backtest))
        .route("/tickers", get(handlers::list_tickers))
        .route("/tickers/{ticker}/bars", get(handlers::bar_history))
        .fallback(handlers::not_found)
        .with_state(Arc::new(state))
}
