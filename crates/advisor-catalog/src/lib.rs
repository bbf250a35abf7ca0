//! Catalog-backed provider query sources
//!
//! Deterministic `ProviderQuery` implementations priced from public
//! on-demand list prices for AWS and GCP. Real pricing-API clients live
//! outside this system; the catalog gives the engine, the CLI, and the
//! test suite a provider source with realistic numbers and no network.

mod catalog;
mod query;

pub use catalog::{compute_hourly_price, storage_gb_month_price};
pub use query::CatalogQuery;
