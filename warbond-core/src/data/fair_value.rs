//! NBU fair-value provider.
//!
//! The National Bank of Ukraine publishes one spreadsheet per business day at
//! `{base}/{YYYYMM}/{YYYYMMDD}_fv.xlsx`. Today's file is usually not out yet,
//! so the provider walks back one calendar day at a time until a date answers
//! with something other than 404.

use chrono::{Duration, NaiveDate};
use polars::prelude::DataFrame;
use tracing::{debug, info};

use super::http::{BlockingHttp, HttpFetch};
use super::provider::{DataError, DataSource, TableProvider};
use super::table::read_xlsx;
use crate::config::SourceConfig;

/// Dated URL of the fair-value file for `date`.
pub fn fair_value_url(base_url: &str, date: NaiveDate) -> String {
    format!(
        "{}/{}/{}_fv.xlsx",
        base_url.trim_end_matches('/'),
        date.format("%Y%m"),
        date.format("%Y%m%d")
    )
}

pub struct FairValueProvider<H = BlockingHttp> {
    http: H,
    base_url: String,
    max_lookback_days: Option<u32>,
}

impl FairValueProvider<BlockingHttp> {
    pub fn from_config(config: &SourceConfig) -> Result<Self, DataError> {
        let http = BlockingHttp::new(&config.user_agent)?;
        Ok(Self::with_http(
            http,
            config.fair_value_base_url.clone(),
            config.max_lookback_days,
        ))
    }
}

impl<H: HttpFetch> FairValueProvider<H> {
    pub fn with_http(http: H, base_url: impl Into<String>, max_lookback_days: Option<u32>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            max_lookback_days,
        }
    }

    /// Find the most recent published file at or before `today`.
    ///
    /// Returns the publication date and the raw workbook bytes.
    pub fn latest_file(&self, today: NaiveDate) -> Result<(NaiveDate, Vec<u8>), DataError> {
        let mut lookup_date = today;
        let mut days_back: u32 = 0;

        loop {
            if let Some(max) = self.max_lookback_days {
                if days_back >= max {
                    return Err(DataError::LookbackExhausted {
                        days: max,
                        from: today,
                    });
                }
            }

            let url = fair_value_url(&self.base_url, lookup_date);
            debug!(%url, "probing fair-value file");
            let resp = self.http.get(&url)?;

            if resp.is_not_found() {
                lookup_date -= Duration::days(1);
                days_back += 1;
                continue;
            }
            if !resp.is_success() {
                return Err(DataError::HttpStatus {
                    url,
                    status: resp.status,
                });
            }

            info!(date = %lookup_date, days_back, "fair-value file found");
            return Ok((lookup_date, resp.body));
        }
    }
}

impl<H: HttpFetch> TableProvider for FairValueProvider<H> {
    fn name(&self) -> &str {
        "nbu_fair_value"
    }

    fn source(&self) -> DataSource {
        DataSource::NbuFairValue
    }

    fn fetch(&self, today: NaiveDate) -> Result<DataFrame, DataError> {
        let (_, bytes) = self.latest_file(today)?;
        read_xlsx(&bytes)
    }
}
