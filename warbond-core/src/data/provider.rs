//! Table provider trait and structured error types.
//!
//! The TableProvider trait abstracts over the two upstream sources (NBU fair
//! values, MoF coupon rates) so the pipeline can run against canned tables in
//! tests.

use chrono::NaiveDate;
use polars::prelude::{DataFrame, PolarsError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("no published file within {days} days before {from}")]
    LookbackExhausted { days: u32, from: NaiveDate },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("invalid value {value:?} in column {column} at row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("dataframe error: {0}")]
    Frame(#[from] PolarsError),
}

/// Where a raw table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    /// NBU daily fair-value spreadsheet.
    NbuFairValue,
    /// MoF war-bond issuance page.
    MofCouponRates,
    /// Canned table (tests, offline runs).
    Fixture,
}

/// Trait for raw table providers.
///
/// Implementations return the provider's own schema as a frame of string
/// columns; renaming and type coercion belong to [`super::normalize`].
pub trait TableProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    /// Fetch the most recent table available as of `today`.
    fn fetch(&self, today: NaiveDate) -> Result<DataFrame, DataError>;
}

/// Provider that hands out a fixed frame. Used for offline runs and tests.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    name: String,
    frame: DataFrame,
}

impl StaticProvider {
    pub fn new(name: impl Into<String>, frame: DataFrame) -> Self {
        Self {
            name: name.into(),
            frame,
        }
    }
}

impl TableProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn source(&self) -> DataSource {
        DataSource::Fixture
    }

    fn fetch(&self, _today: NaiveDate) -> Result<DataFrame, DataError> {
        Ok(self.frame.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn static_provider_returns_its_frame() {
        let frame = df!("ISIN" => &["UA4000227045"]).unwrap();
        let provider = StaticProvider::new("canned", frame.clone());
        assert_eq!(provider.name(), "canned");
        assert_eq!(provider.source(), DataSource::Fixture);
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(provider.fetch(today).unwrap().equals(&frame));
    }
}
