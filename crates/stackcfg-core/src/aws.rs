//! Shared AWS SDK configuration

use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Load SDK configuration for an explicit region
///
/// Credentials still come from the default provider chain; only the region
/// is pinned so both backends talk to the same place.
pub async fn load_sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}
