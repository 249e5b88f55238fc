//! Bond valuation model.
//!
//! A [`Bond`] is built once from pricing facts and an explicit evaluation date,
//! computes its maturity arithmetic eagerly, and exposes derived yield metrics
//! as pure functions of that state. Discount and coupon instruments share every
//! metric except total return, which dispatches on [`BondKind`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::ValuationConfig;
use crate::domain::BondRecord;

/// Fixed day-count divisor. No leap-year adjustment.
pub const DAYS_IN_YEAR: f64 = 365.0;
pub const DEFAULT_FACE_VALUE: f64 = 1_000.0;
pub const DEFAULT_COUPON_FREQUENCY: u32 = 2;

const RULE: &str = "───────────────────────────────────";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BondError {
    #[error("bond {isin} already matured: maturity {maturity_date} is not after {today}")]
    AlreadyMatured {
        isin: String,
        maturity_date: NaiveDate,
        today: NaiveDate,
    },

    #[error("bond {isin} has a coupon frequency of zero")]
    ZeroFrequency { isin: String },
}

/// Instrument kind. Only total return differs between kinds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BondKind {
    /// Pays principal only at maturity.
    Discount,
    /// Pays `per_period_rate * face_value` on each remaining payout plus principal.
    Coupon {
        per_period_rate: f64,
        frequency: u32,
        payouts_remaining: u32,
    },
}

/// Immutable valuation entity for a single bond.
#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    isin: String,
    maturity_date: NaiveDate,
    price: f64,
    face_value: f64,
    days_to_maturity: i64,
    years_to_maturity: f64,
    kind: BondKind,
}

impl Bond {
    /// Start building a bond. Face value and coupon terms default as in
    /// [`DEFAULT_FACE_VALUE`] / [`DEFAULT_COUPON_FREQUENCY`].
    pub fn builder(isin: impl Into<String>, maturity_date: NaiveDate, price: f64) -> BondBuilder {
        BondBuilder {
            isin: isin.into(),
            maturity_date,
            price,
            face_value: DEFAULT_FACE_VALUE,
            coupon_rate: None,
            frequency: DEFAULT_COUPON_FREQUENCY,
        }
    }

    /// Discount bond with the default face value.
    pub fn discount(
        isin: impl Into<String>,
        maturity_date: NaiveDate,
        price: f64,
        today: NaiveDate,
    ) -> Result<Self, BondError> {
        Self::builder(isin, maturity_date, price).build(today)
    }

    /// Coupon bond with the default face value and semi-annual payouts.
    pub fn coupon(
        isin: impl Into<String>,
        maturity_date: NaiveDate,
        price: f64,
        annual_coupon_rate: f64,
        today: NaiveDate,
    ) -> Result<Self, BondError> {
        Self::builder(isin, maturity_date, price)
            .coupon(annual_coupon_rate)
            .build(today)
    }

    /// Build from a normalized record: coupon bond when the record carries a
    /// coupon rate, discount bond otherwise.
    pub fn from_record(
        record: &BondRecord,
        valuation: &ValuationConfig,
        today: NaiveDate,
    ) -> Result<Self, BondError> {
        let mut builder = Self::builder(record.isin.clone(), record.maturity_date, record.price)
            .face_value(valuation.face_value)
            .frequency(valuation.coupon_frequency);
        if let Some(rate) = record.coupon_rate {
            builder = builder.coupon(rate);
        }
        builder.build(today)
    }

    pub fn isin(&self) -> &str {
        &self.isin
    }

    pub fn maturity_date(&self) -> NaiveDate {
        self.maturity_date
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn face_value(&self) -> f64 {
        self.face_value
    }

    pub fn days_to_maturity(&self) -> i64 {
        self.days_to_maturity
    }

    pub fn years_to_maturity(&self) -> f64 {
        self.years_to_maturity
    }

    pub fn kind(&self) -> BondKind {
        self.kind
    }

    pub fn is_coupon(&self) -> bool {
        matches!(self.kind, BondKind::Coupon { .. })
    }

    /// Total amount received by holding to maturity, undiscounted.
    pub fn total_return(&self) -> f64 {
        match self.kind {
            BondKind::Discount => self.face_value,
            BondKind::Coupon {
                per_period_rate,
                payouts_remaining,
                ..
            } => {
                let coupon_payout = self.face_value * per_period_rate;
                self.face_value + f64::from(payouts_remaining) * coupon_payout
            }
        }
    }

    pub fn interest(&self) -> f64 {
        self.total_return() - self.price
    }

    /// Return on investment over the whole holding period.
    pub fn roi(&self) -> f64 {
        self.interest() / self.price
    }

    /// Straight-line annualization of [`Bond::roi`]. Not a yield to maturity.
    pub fn annual_rate(&self) -> f64 {
        self.roi() / self.years_to_maturity
    }

    /// Human-readable report of the bond and its metrics.
    pub fn summary(&self) -> String {
        self.to_string()
    }

    /// Serializable snapshot of all fields and metrics.
    pub fn metrics(&self) -> BondMetrics {
        BondMetrics {
            isin: self.isin.clone(),
            maturity_date: self.maturity_date,
            price: self.price,
            face_value: self.face_value,
            days_to_maturity: self.days_to_maturity,
            years_to_maturity: self.years_to_maturity,
            kind: self.kind,
            total_return: self.total_return(),
            interest: self.interest(),
            roi: self.roi(),
            annual_rate: self.annual_rate(),
        }
    }
}

impl fmt::Display for Bond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ISIN: {}", self.isin)?;
        writeln!(f, "Face value: {:.2}", self.face_value)?;
        writeln!(f, "Maturity date: {}", self.maturity_date)?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Price: {:.2}", self.price)?;
        writeln!(f, "Days to maturity: {}", self.days_to_maturity)?;
        writeln!(f, "Years to maturity: {:.2}", self.years_to_maturity)?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Total return: {:.2}", self.total_return())?;
        writeln!(f, "Interest: {:.2}", self.interest())?;
        writeln!(f, "ROI: {:.2}%", self.roi() * 100.0)?;
        writeln!(f, "Annual rate: {:.2}%", self.annual_rate() * 100.0)?;
        writeln!(f, "{RULE}")
    }
}

/// Builder for [`Bond`]. Validation happens in [`BondBuilder::build`].
#[derive(Debug, Clone)]
pub struct BondBuilder {
    isin: String,
    maturity_date: NaiveDate,
    price: f64,
    face_value: f64,
    coupon_rate: Option<f64>,
    frequency: u32,
}

impl BondBuilder {
    pub fn face_value(mut self, face_value: f64) -> Self {
        self.face_value = face_value;
        self
    }

    /// Annual coupon rate as a fraction (0.195 for 19.5%). Makes this a coupon bond.
    pub fn coupon(mut self, annual_rate: f64) -> Self {
        self.coupon_rate = Some(annual_rate);
        self
    }

    /// Coupon payouts per year. Ignored for discount bonds.
    pub fn frequency(mut self, frequency: u32) -> Self {
        self.frequency = frequency;
        self
    }

    /// Compute maturity arithmetic against `today` and freeze the bond.
    pub fn build(self, today: NaiveDate) -> Result<Bond, BondError> {
        let days_to_maturity = (self.maturity_date - today).num_days();
        if days_to_maturity < 1 {
            return Err(BondError::AlreadyMatured {
                isin: self.isin,
                maturity_date: self.maturity_date,
                today,
            });
        }
        let years_to_maturity = days_to_maturity as f64 / DAYS_IN_YEAR;

        let kind = match self.coupon_rate {
            None => BondKind::Discount,
            Some(_) if self.frequency == 0 => {
                return Err(BondError::ZeroFrequency { isin: self.isin });
            }
            Some(annual_rate) => {
                let frequency = f64::from(self.frequency);
                BondKind::Coupon {
                    per_period_rate: annual_rate / frequency,
                    frequency: self.frequency,
                    payouts_remaining: (years_to_maturity * frequency).ceil() as u32,
                }
            }
        };

        Ok(Bond {
            isin: self.isin,
            maturity_date: self.maturity_date,
            price: self.price,
            face_value: self.face_value,
            days_to_maturity,
            years_to_maturity,
            kind,
        })
    }
}

/// Flat view of a bond and its derived metrics, for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondMetrics {
    pub isin: String,
    pub maturity_date: NaiveDate,
    pub price: f64,
    pub face_value: f64,
    pub days_to_maturity: i64,
    pub years_to_maturity: f64,
    pub kind: BondKind,
    pub total_return: f64,
    pub interest: f64,
    pub roi: f64,
    pub annual_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn discount_bond_returns_face_value() {
        let bond = Bond::discount("UA4000000001", today() + Duration::days(200), 870.0, today())
            .unwrap();
        assert_eq!(bond.total_return(), 1_000.0);
        assert_eq!(bond.interest(), 130.0);
        assert!(!bond.is_coupon());
    }

    #[test]
    fn coupon_bond_one_year_semi_annual() {
        let bond = Bond::builder("UA4000000002", today() + Duration::days(365), 1_000.0)
            .coupon(0.20)
            .build(today())
            .unwrap();

        assert_eq!(bond.years_to_maturity(), 1.0);
        match bond.kind() {
            BondKind::Coupon {
                per_period_rate,
                frequency,
                payouts_remaining,
            } => {
                assert_eq!(per_period_rate, 0.10);
                assert_eq!(frequency, 2);
                assert_eq!(payouts_remaining, 2);
            }
            BondKind::Discount => panic!("expected coupon bond"),
        }
        assert_eq!(bond.total_return(), 1_200.0);
        assert_eq!(bond.interest(), 200.0);
        assert_eq!(bond.roi(), 0.2);
        assert_eq!(bond.annual_rate(), 0.2);
    }

    #[test]
    fn partial_period_rounds_payouts_up() {
        // 200 days -> 0.548 years -> 1.096 semi-annual periods -> 2 payouts
        let bond = Bond::coupon("UA4000000003", today() + Duration::days(200), 990.0, 0.18, today())
            .unwrap();
        assert_eq!(bond.days_to_maturity(), 200);
        assert!(matches!(
            bond.kind(),
            BondKind::Coupon { payouts_remaining: 2, .. }
        ));
        assert!((bond.total_return() - 1_180.0).abs() < 1e-9);
    }

    #[test]
    fn maturity_today_is_rejected() {
        let err = Bond::discount("UA4000000004", today(), 990.0, today()).unwrap_err();
        assert!(matches!(err, BondError::AlreadyMatured { .. }));
    }

    #[test]
    fn past_maturity_is_rejected() {
        let err = Bond::coupon("UA4000000005", today() - Duration::days(3), 990.0, 0.1, today())
            .unwrap_err();
        assert_eq!(
            err,
            BondError::AlreadyMatured {
                isin: "UA4000000005".into(),
                maturity_date: today() - Duration::days(3),
                today: today(),
            }
        );
    }

    #[test]
    fn maturity_tomorrow_is_valid() {
        let bond = Bond::discount("UA4000000006", today() + Duration::days(1), 999.0, today())
            .unwrap();
        assert_eq!(bond.days_to_maturity(), 1);
        assert_eq!(bond.years_to_maturity(), 1.0 / 365.0);
    }

    #[test]
    fn zero_frequency_is_rejected() {
        let err = Bond::builder("UA4000000007", today() + Duration::days(90), 990.0)
            .coupon(0.1)
            .frequency(0)
            .build(today())
            .unwrap_err();
        assert!(matches!(err, BondError::ZeroFrequency { .. }));
    }

    #[test]
    fn zero_frequency_is_ignored_for_discount_bonds() {
        assert!(Bond::builder("UA4000000008", today() + Duration::days(90), 990.0)
            .frequency(0)
            .build(today())
            .is_ok());
    }

    #[test]
    fn custom_face_value_scales_coupon() {
        let bond = Bond::builder("UA4000000009", today() + Duration::days(365), 9_500.0)
            .face_value(10_000.0)
            .coupon(0.1)
            .frequency(1)
            .build(today())
            .unwrap();
        assert_eq!(bond.total_return(), 11_000.0);
        assert_eq!(bond.interest(), 1_500.0);
    }

    #[test]
    fn from_record_picks_kind_from_coupon_rate() {
        let valuation = ValuationConfig::default();
        let mut record = BondRecord {
            isin: "UA4000000010".into(),
            maturity_date: today() + Duration::days(100),
            price: 950.0,
            coupon_rate: None,
        };
        let discount = Bond::from_record(&record, &valuation, today()).unwrap();
        assert_eq!(discount.kind(), BondKind::Discount);

        record.coupon_rate = Some(0.195);
        let coupon = Bond::from_record(&record, &valuation, today()).unwrap();
        assert!(coupon.is_coupon());
    }

    #[test]
    fn summary_lists_metrics() {
        let bond = Bond::coupon("UA4000000011", today() + Duration::days(365), 1_000.0, 0.2, today())
            .unwrap();
        let summary = bond.summary();
        assert!(summary.starts_with("ISIN: UA4000000011\n"));
        assert!(summary.contains("Face value: 1000.00"));
        assert!(summary.contains("Maturity date: 2024-12-31"));
        assert!(summary.contains("Days to maturity: 365"));
        assert!(summary.contains("Total return: 1200.00"));
        assert!(summary.contains("ROI: 20.00%"));
        assert!(summary.contains("Annual rate: 20.00%"));
        assert_eq!(summary.matches(RULE).count(), 3);
    }

    #[test]
    fn metrics_serialize_to_json() {
        let bond = Bond::discount("UA4000000012", today() + Duration::days(30), 990.0, today())
            .unwrap();
        let json = serde_json::to_value(bond.metrics()).unwrap();
        assert_eq!(json["isin"], "UA4000000012");
        assert_eq!(json["kind"]["type"], "discount");
        assert_eq!(json["total_return"], 1_000.0);
    }
}
