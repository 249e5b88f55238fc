//! End-to-end run: fetch → normalize → value.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

use crate::bond::{Bond, BondError};
use crate::config::PipelineConfig;
use crate::data::{bond_records, DataError, TableProvider};
use crate::domain::BondRecord;
use crate::projection::{project_growth, GrowthSeries, ProjectionError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Bond(#[from] BondError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

/// How to treat records that fail bond construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidRecordPolicy {
    /// First failure aborts the run.
    #[default]
    Abort,
    /// Log and drop the record.
    Skip,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub today: NaiveDate,
    pub records: Vec<BondRecord>,
    pub bonds: Vec<Bond>,
    pub skipped: Vec<BondError>,
}

impl PipelineOutput {
    /// Project every bond's annual rate from the same principal.
    pub fn projection(&self, principal: f64, years: usize) -> Result<Vec<GrowthSeries>, ProjectionError> {
        let principals = vec![principal; self.bonds.len()];
        let rates: Vec<f64> = self.bonds.iter().map(Bond::annual_rate).collect();
        project_growth(&principals, &rates, years)
    }
}

/// Fetch both tables, normalize them and build one bond per record.
pub fn run_pipeline(
    price_provider: &dyn TableProvider,
    coupon_provider: &dyn TableProvider,
    config: &PipelineConfig,
    policy: InvalidRecordPolicy,
    today: NaiveDate,
) -> Result<PipelineOutput, PipelineError> {
    info!(
        provider = price_provider.name(),
        source = ?price_provider.source(),
        "fetching price table"
    );
    let price_raw = price_provider.fetch(today)?;
    info!(
        provider = coupon_provider.name(),
        source = ?coupon_provider.source(),
        "fetching coupon-rate table"
    );
    let coupon_raw = coupon_provider.fetch(today)?;

    let records = bond_records(&price_raw, &coupon_raw, today, &config.valuation.isin_prefix)?;
    let (bonds, skipped) = build_bonds(&records, config, policy, today)?;

    info!(bonds = bonds.len(), skipped = skipped.len(), "pipeline complete");
    Ok(PipelineOutput {
        today,
        records,
        bonds,
        skipped,
    })
}

/// Build bonds from records under `policy`. Returns the bonds and the errors
/// of skipped records.
pub fn build_bonds(
    records: &[BondRecord],
    config: &PipelineConfig,
    policy: InvalidRecordPolicy,
    today: NaiveDate,
) -> Result<(Vec<Bond>, Vec<BondError>), BondError> {
    let mut bonds = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();

    for record in records {
        match Bond::from_record(record, &config.valuation, today) {
            Ok(bond) => bonds.push(bond),
            Err(e) if policy == InvalidRecordPolicy::Skip => {
                warn!(isin = %record.isin, error = %e, "skipping invalid record");
                skipped.push(e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok((bonds, skipped))
}
