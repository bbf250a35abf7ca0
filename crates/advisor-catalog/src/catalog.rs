//! Public on-demand list prices for the supported providers
//!
//! Compute is priced per hour, storage per GB-month, both in USD. Every
//! entry is a published on-demand list price; reserved and committed-use
//! discounts are out of scope.

use advisor_core::{ComputeShape, ProviderId, StorageClass};

/// Hourly on-demand price and the provider's own name for a machine class
pub struct ComputePrice {
    pub instance_type: &'static str,
    pub hourly_usd: f64,
}

/// Per-GB-month price and the provider's own name for a storage tier
pub struct StoragePrice {
    pub class_name: &'static str,
    pub gb_month_usd: f64,
}

/// Hourly compute price for a provider/shape pair, if catalogued
pub fn compute_hourly_price(provider: ProviderId, shape: ComputeShape) -> Option<ComputePrice> {
    let (instance_type, hourly_usd) = match (provider, shape) {
        (ProviderId::Aws, ComputeShape::Medium) => ("t3.medium", 0.0416),
        (ProviderId::Aws, ComputeShape::Large) => ("m5.large", 0.096),
        (ProviderId::Aws, ComputeShape::Xlarge) => ("c5.xlarge", 0.17),
        (ProviderId::Gcp, ComputeShape::Medium) => ("e2-medium", 0.0335),
        (ProviderId::Gcp, ComputeShape::Large) => ("n2-standard-2", 0.0971),
        (ProviderId::Gcp, ComputeShape::Xlarge) => ("c2-standard-4", 0.1592),
        (ProviderId::Azure, _) => return None,
    };

    Some(ComputePrice {
        instance_type,
        hourly_usd,
    })
}

/// Per-GB-month storage price for a provider/class pair, if catalogued
pub fn storage_gb_month_price(
    provider: ProviderId,
    class: StorageClass,
) -> Option<StoragePrice> {
    let (class_name, gb_month_usd) = match (provider, class) {
        (ProviderId::Aws, StorageClass::Standard) => ("S3 Standard", 0.023),
        (ProviderId::Aws, StorageClass::Infrequent) => ("S3 Standard-IA", 0.0125),
        (ProviderId::Aws, StorageClass::Archive) => ("S3 Glacier", 0.004),
        (ProviderId::Aws, StorageClass::DeepArchive) => ("S3 Glacier Deep Archive", 0.00099),
        (ProviderId::Gcp, StorageClass::Standard) => ("GCS Standard", 0.020),
        (ProviderId::Gcp, StorageClass::Infrequent) => ("GCS Nearline", 0.010),
        (ProviderId::Gcp, StorageClass::Archive) => ("GCS Coldline", 0.004),
        (ProviderId::Gcp, StorageClass::DeepArchive) => ("GCS Archive", 0.0012),
        (ProviderId::Azure, _) => return None,
    };

    Some(StoragePrice {
        class_name,
        gb_month_usd,
    })
}

/// Hours billed per month for converting hourly prices
pub(crate) const HOURS_PER_MONTH: f64 = 24.0 * 30.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_shape_priced_for_aws_and_gcp() {
        for provider in [ProviderId::Aws, ProviderId::Gcp] {
            for shape in [ComputeShape::Medium, ComputeShape::Large, ComputeShape::Xlarge] {
                assert!(
                    compute_hourly_price(provider, shape).is_some(),
                    "{provider} {shape} missing from catalog"
                );
            }
        }
    }

    #[test]
    fn test_every_storage_class_priced_for_aws_and_gcp() {
        for provider in [ProviderId::Aws, ProviderId::Gcp] {
            for class in [
                StorageClass::Standard,
                StorageClass::Infrequent,
                StorageClass::Archive,
                StorageClass::DeepArchive,
            ] {
                assert!(
                    storage_gb_month_price(provider, class).is_some(),
                    "{provider} {class} missing from catalog"
                );
            }
        }
    }

    #[test]
    fn test_azure_not_catalogued() {
        assert!(compute_hourly_price(ProviderId::Azure, ComputeShape::Medium).is_none());
        assert!(storage_gb_month_price(ProviderId::Azure, StorageClass::Standard).is_none());
    }

    #[test]
    fn test_known_price_points() {
        let aws = compute_hourly_price(ProviderId::Aws, ComputeShape::Medium).unwrap();
        assert_eq!(aws.instance_type, "t3.medium");
        assert_eq!(aws.hourly_usd, 0.0416);

        let gcs = storage_gb_month_price(ProviderId::Gcp, StorageClass::DeepArchive).unwrap();
        assert_eq!(gcs.class_name, "GCS Archive");
        assert_eq!(gcs.gb_month_usd, 0.0012);
    }
}
