//! BondRecord: one normalized row joining price and coupon-rate data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Isin;

/// Normalized bond facts, ready to be turned into a [`crate::bond::Bond`].
///
/// `maturity_date` is strictly after the date normalization ran with and
/// `price` is positive. `coupon_rate` is a fraction (0.195 for 19.5%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondRecord {
    pub isin: Isin,
    pub maturity_date: NaiveDate,
    pub price: f64,
    pub coupon_rate: Option<f64>,
}
