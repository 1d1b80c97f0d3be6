//! JSON REST API for Restock.
//!
//! Exposes an axum [`Router`] backed by any
//! [`restock_core::store::ForecastStore`] and
//! [`restock_core::producer::ForecastProducer`]. TLS, auth and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(restock_api::api_router(ApiState::new(store, producer)))
//! ```

pub mod error;
pub mod forecast;
pub mod history;
pub mod optimize;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use restock_core::{producer::ForecastProducer, store::ForecastStore};

pub use error::ApiError;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:    Arc<S>,
  pub producer: Arc<dyn ForecastProducer>,
}

impl<S> ApiState<S> {
  pub fn new(store: Arc<S>, producer: Arc<dyn ForecastProducer>) -> Self {
    Self { store, producer }
  }
}

// Manual impl: `S` itself need not be `Clone`.
impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      producer: Arc::clone(&self.producer),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be merged or nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: ForecastStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    // Planning
    .route("/forecast", post(forecast::run::<S>))
    .route("/optimize", post(optimize::handler))
    // History
    .route(
      "/forecasts",
      get(history::list::<S>).delete(history::delete::<S>),
    )
    .route("/forecasts/export", get(history::export::<S>))
    .route("/forecasts/{id}", get(history::get_one::<S>))
    .route("/forecasts/{id}/trigger", put(history::correct_trigger::<S>))
    .with_state(state)
}

async fn health() -> &'static str { "ok" }
