//! Data acquisition and normalization

pub mod coupon_rate;
pub mod fair_value;
pub mod http;
pub mod normalize;
pub mod provider;
pub mod table;

pub use coupon_rate::CouponRateProvider;
pub use fair_value::{fair_value_url, FairValueProvider};
pub use http::{BlockingHttp, HttpFetch, HttpResponse};
pub use normalize::{bond_records, clean_coupon_rate_table, clean_price_table, join_bond_records};
pub use provider::{DataError, DataSource, StaticProvider, TableProvider};
