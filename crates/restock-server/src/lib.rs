//! HTTP server assembly for Restock.
//!
//! Loads [`ServerConfig`] and wraps the [`restock_api`] router in request
//! tracing. The binary in `main.rs` does the rest.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use restock_api::{ApiState, api_router};
use restock_core::{
  producer::{MovingAverageProducer, ProducerSettings},
  store::ForecastStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `restock.toml` and
/// `RESTOCK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// Settings for the built-in moving-average forecaster.
  #[serde(default)]
  pub forecast:   ProducerSettings,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8000 }
fn default_store_path() -> PathBuf { PathBuf::from("forecast.db") }

/// Layer the optional TOML file at `path` under the environment.
///
/// Nested keys use a double underscore: `RESTOCK_FORECAST__WINDOW=14`.
pub fn load_config(path: &Path) -> Result<ServerConfig, config::ConfigError> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("RESTOCK")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()?
    .try_deserialize()
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the traced application router.
///
/// Fails if `settings` are out of range.
pub fn app<S>(
  store: Arc<S>,
  settings: ProducerSettings,
) -> restock_core::Result<Router>
where
  S: ForecastStore + 'static,
{
  let producer = MovingAverageProducer::new(settings)?;
  let state = ApiState::new(store, Arc::new(producer));
  Ok(api_router(state).layer(TraceLayer::new_for_http()))
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use config::{File, FileFormat};
  use restock_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  fn parse(toml: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = parse("");
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8000);
    assert_eq!(cfg.store_path, PathBuf::from("forecast.db"));
    assert_eq!(cfg.forecast, ProducerSettings::default());
  }

  #[test]
  fn partial_forecast_section_keeps_other_defaults() {
    let cfg = parse(
      r#"
        port = 9000
        store_path = "~/restock/history.db"

        [forecast]
        window = 14
      "#,
    );
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.forecast.window, 14);
    assert_eq!(cfg.forecast.horizon_days, 30);
  }

  #[test]
  fn missing_config_file_is_not_an_error() {
    let cfg = load_config(Path::new("/nonexistent/restock.toml")).unwrap();
    assert!(!cfg.host.is_empty());
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/restock.db")),
      PathBuf::from(home).join("restock.db")
    );
    assert_eq!(
      expand_tilde(Path::new("/var/restock.db")),
      PathBuf::from("/var/restock.db")
    );
  }

  #[tokio::test]
  async fn app_serves_health() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let router = app(store, ProducerSettings::default()).unwrap();

    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn app_rejects_bad_settings() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let settings = ProducerSettings { horizon_days: 0, ..Default::default() };
    assert!(app(store, settings).is_err());
  }
}
