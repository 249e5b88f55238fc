//! Domain types shared by normalization and valuation

pub mod record;

pub use record::BondRecord;

/// ISIN type alias
pub type Isin = String;
