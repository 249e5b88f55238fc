//! MoF coupon-rate provider.
//!
//! The Ministry of Finance lists war-bond issues in an HTML table whose header
//! sits in an ordinary `<td>` row. The provider returns the table with
//! positional column names; normalization promotes the header row.

use chrono::NaiveDate;
use polars::prelude::DataFrame;
use tracing::info;

use super::http::{BlockingHttp, HttpFetch};
use super::provider::{DataError, DataSource, TableProvider};
use super::table::{extract_first_table, positional_frame};
use crate::config::SourceConfig;

pub struct CouponRateProvider<H = BlockingHttp> {
    http: H,
    url: String,
}

impl CouponRateProvider<BlockingHttp> {
    pub fn from_config(config: &SourceConfig) -> Result<Self, DataError> {
        let http = BlockingHttp::new(&config.user_agent)?;
        Ok(Self::with_http(http, config.coupon_rate_url.clone()))
    }
}

impl<H: HttpFetch> CouponRateProvider<H> {
    pub fn with_http(http: H, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

impl<H: HttpFetch> TableProvider for CouponRateProvider<H> {
    fn name(&self) -> &str {
        "mof_coupon_rates"
    }

    fn source(&self) -> DataSource {
        DataSource::MofCouponRates
    }

    fn fetch(&self, _today: NaiveDate) -> Result<DataFrame, DataError> {
        let resp = self.http.get(&self.url)?;
        if !resp.is_success() {
            return Err(DataError::HttpStatus {
                url: self.url.clone(),
                status: resp.status,
            });
        }

        let rows = extract_first_table(&resp.text())?;
        info!(rows = rows.len(), "coupon-rate table fetched");
        positional_frame(&rows)
    }
}
