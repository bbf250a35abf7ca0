//! Command-line interface for the multi-cloud cost advisor
//!
//! Runs one analysis over the catalog-backed providers and prints the
//! comprehensive result as JSON — the same payload an API layer would
//! serialize to its callers.

use advisor_core::{
    AnalysisKind, ComputeShape, PerformancePriority, ProviderId, ResourceRequirement,
    StorageClass,
};
use advisor_engine::{CostAdvisor, OrchestratorConfig};
use anyhow::{Context, bail};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "advisor")]
#[command(about = "Compare cloud provider costs and get a ranked recommendation", long_about = None)]
struct Args {
    /// Providers to evaluate (aws, gcp), repeatable
    #[arg(short, long, default_values_t = vec!["aws".to_string(), "gcp".to_string()])]
    provider: Vec<String>,

    /// Machine class: medium, large, or xlarge
    #[arg(long, default_value = "medium")]
    shape: String,

    /// Deployment region
    #[arg(long, default_value = "us-east-1")]
    region: String,

    /// Storage tier: standard, infrequent, archive, or deep-archive
    #[arg(long, default_value = "standard")]
    storage_class: String,

    /// Storage footprint in GB
    #[arg(long, default_value_t = 100)]
    storage_gb: u64,

    /// TCO horizon in months
    #[arg(long, default_value_t = 12)]
    horizon_months: u32,

    /// Advisory monthly budget in USD
    #[arg(long)]
    budget: Option<f64>,

    /// Performance priority: low, balanced, or high
    #[arg(long, default_value = "balanced")]
    priority: String,

    /// Analysis kind: compute, storage, or comprehensive
    #[arg(long, default_value = "comprehensive")]
    kind: String,

    /// Per-request deadline in seconds
    #[arg(long, default_value_t = 10)]
    deadline_secs: u64,
}

fn parse_provider(name: &str) -> anyhow::Result<ProviderId> {
    match name.to_lowercase().as_str() {
        "aws" => Ok(ProviderId::Aws),
        "gcp" => Ok(ProviderId::Gcp),
        "azure" => Ok(ProviderId::Azure),
        other => bail!("unknown provider '{other}' (expected aws, gcp, or azure)"),
    }
}

fn parse_shape(name: &str) -> anyhow::Result<ComputeShape> {
    match name.to_lowercase().as_str() {
        "medium" => Ok(ComputeShape::Medium),
        "large" => Ok(ComputeShape::Large),
        "xlarge" => Ok(ComputeShape::Xlarge),
        other => bail!("unknown shape '{other}' (expected medium, large, or xlarge)"),
    }
}

fn parse_storage_class(name: &str) -> anyhow::Result<StorageClass> {
    match name.to_lowercase().as_str() {
        "standard" => Ok(StorageClass::Standard),
        "infrequent" => Ok(StorageClass::Infrequent),
        "archive" => Ok(StorageClass::Archive),
        "deep-archive" | "deep_archive" => Ok(StorageClass::DeepArchive),
        other => bail!(
            "unknown storage class '{other}' (expected standard, infrequent, archive, or deep-archive)"
        ),
    }
}

fn parse_priority(name: &str) -> anyhow::Result<PerformancePriority> {
    match name.to_lowercase().as_str() {
        "low" => Ok(PerformancePriority::Low),
        "balanced" => Ok(PerformancePriority::Balanced),
        "high" => Ok(PerformancePriority::High),
        other => bail!("unknown priority '{other}' (expected low, balanced, or high)"),
    }
}

fn parse_kind(name: &str) -> anyhow::Result<AnalysisKind> {
    match name.to_lowercase().as_str() {
        "compute" => Ok(AnalysisKind::Compute),
        "storage" => Ok(AnalysisKind::Storage),
        "comprehensive" => Ok(AnalysisKind::Comprehensive),
        other => bail!("unknown analysis kind '{other}' (expected compute, storage, or comprehensive)"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    advisor_utils::init_tracing("info");

    let args = Args::parse();

    let providers = args
        .provider
        .iter()
        .map(|name| parse_provider(name))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut builder = ResourceRequirement::builder()
        .compute_shape(parse_shape(&args.shape)?)
        .region(args.region.as_str())
        .storage_class(parse_storage_class(&args.storage_class)?)
        .storage_gb(args.storage_gb)
        .horizon_months(args.horizon_months)
        .performance_priority(parse_priority(&args.priority)?)
        .analysis_kind(parse_kind(&args.kind)?);
    if let Some(budget) = args.budget {
        builder = builder.monthly_budget(budget);
    }
    let requirement = builder.build().context("invalid requirement")?;

    let advisor = CostAdvisor::builder()
        .register_query(Arc::new(advisor_catalog::CatalogQuery::aws()))
        .register_query(Arc::new(advisor_catalog::CatalogQuery::gcp()))
        .orchestrator_config(
            OrchestratorConfig::builder()
                .request_deadline(Duration::from_secs(args.deadline_secs))
                .build()?,
        )
        .build()?;

    info!(
        request_id = %requirement.request_id,
        providers = ?providers,
        "starting analysis"
    );

    let result = advisor
        .analyze_and_recommend(&requirement, &providers)
        .await
        .context("analysis failed")?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
