//! Error types for the restock-csv codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("table has no data rows")]
  Empty,

  #[error("missing required column(s): {}", .0.join(", "))]
  MissingColumns(Vec<String>),

  #[error("line {line}: {source}")]
  Row {
    line:   u64,
    #[source]
    source: csv::Error,
  },

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("csv writer error: {0}")]
  Writer(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
