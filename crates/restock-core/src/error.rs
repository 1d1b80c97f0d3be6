//! Error types for `restock-core`.

use rust_decimal::Decimal;
use strum::IntoStaticStr;
use thiserror::Error;

#[derive(Debug, Error, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Error {
  #[error("invalid forecast input: {0}")]
  InvalidForecastInput(String),

  #[error("invalid trigger mode parameters: {0}")]
  InvalidModeParameters(String),

  #[error("stock mode requires a stock table")]
  MissingStockData,

  #[error("invalid stock data: {0}")]
  InvalidStockData(String),

  #[error("invalid constraint data: {0}")]
  InvalidConstraintData(String),

  #[error("budget must be a non-negative amount, got {0}")]
  InvalidBudget(Decimal),

  #[error("unknown optimization objective: {0:?}")]
  InvalidObjective(String),

  #[error("unit cost for sku {sku:?} must be positive")]
  InvalidUnitCost { sku: String },

  #[error("unknown reorder trigger label: {0:?}")]
  UnknownTrigger(String),

  #[error("invalid sales history: {0}")]
  InvalidSalesHistory(String),

  #[error("invalid forecast producer settings: {0}")]
  InvalidProducerSettings(String),
}

impl Error {
  /// Stable snake_case name of the variant, suitable for machine-readable
  /// error payloads.
  pub fn kind(&self) -> &'static str { self.into() }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
