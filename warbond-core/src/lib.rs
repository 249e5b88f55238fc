//! Warbond Core: valuation model, data acquisition and normalization for
//! Ukrainian war bonds.
//!
//! This crate contains the whole pipeline short of presentation:
//! - Domain record joining price and coupon-rate facts
//! - Bond valuation model (discount and coupon kinds, straight-line annual rate)
//! - NBU fair-value and MoF coupon-rate providers
//! - Normalization of provider tables into bond records
//! - Compound-growth projection
//! - TOML configuration

pub mod bond;
pub mod config;
pub mod data;
pub mod domain;
pub mod pipeline;
pub mod projection;

pub use bond::{Bond, BondBuilder, BondError, BondKind, BondMetrics};
pub use config::{ConfigError, PipelineConfig};
pub use domain::BondRecord;
pub use pipeline::{run_pipeline, InvalidRecordPolicy, PipelineError, PipelineOutput};
pub use projection::{compound, project_growth, GrowthSeries, ProjectionError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: public value types are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Bond>();
        require_sync::<Bond>();
        require_send::<BondRecord>();
        require_sync::<BondRecord>();
        require_send::<GrowthSeries>();
        require_sync::<GrowthSeries>();
        require_send::<PipelineConfig>();
        require_sync::<PipelineConfig>();
    }
}
