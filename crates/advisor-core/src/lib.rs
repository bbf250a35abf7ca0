//! Core abstractions and data model for the multi-cloud cost advisor
//!
//! This crate defines the types shared by the orchestration, caching, and
//! scoring layers: the workload requirement submitted by callers, the
//! priced records produced per provider, the cache fingerprint, and the
//! `ProviderQuery` capability every pricing source implements.

pub mod error;
pub mod fingerprint;
pub mod provider;
pub mod record;
pub mod requirement;

pub use error::{CoreError, Result};
pub use fingerprint::Fingerprint;
pub use provider::{ProviderError, ProviderId, ProviderQuery};
pub use record::{CostCategory, Currency, ProviderRecord, QuoteLine, RecordStatus};
pub use requirement::{
    AnalysisKind, ComputeShape, PerformancePriority, ResourceRequirement, StorageClass,
};
