use crate::pricing::models::Provider;

/// Canonical region code -> AWS pricing `location` attribute
const AWS_LOCATIONS: &[(&str, &str)] = &[
    ("us-east-1", "US East (N. Virginia)"),
    ("us-east-2", "US East (Ohio)"),
    ("us-west-1", "US West (N. California)"),
    ("us-west-2", "US West (Oregon)"),
    ("ca-central-1", "Canada (Central)"),
    ("eu-west-1", "EU (Ireland)"),
    ("eu-west-2", "EU (London)"),
    ("eu-central-1", "EU (Frankfurt)"),
    ("eu-north-1", "EU (Stockholm)"),
    ("ap-south-1", "Asia Pacific (Mumbai)"),
    ("ap-southeast-1", "Asia Pacific (Singapore)"),
    ("ap-southeast-2", "Asia Pacific (Sydney)"),
    ("ap-northeast-1", "Asia Pacific (Tokyo)"),
    ("sa-east-1", "South America (Sao Paulo)"),
];

/// Canonical region code -> Azure `armRegionName`
const AZURE_REGIONS: &[(&str, &str)] = &[
    ("us-east-1", "eastus"),
    ("us-east-2", "eastus2"),
    ("us-west-1", "westus"),
    ("us-west-2", "westus2"),
    ("ca-central-1", "canadacentral"),
    ("eu-west-1", "northeurope"),
    ("eu-west-2", "uksouth"),
    ("eu-central-1", "germanywestcentral"),
    ("eu-north-1", "swedencentral"),
    ("ap-south-1", "centralindia"),
    ("ap-southeast-1", "southeastasia"),
    ("ap-southeast-2", "australiaeast"),
    ("ap-northeast-1", "japaneast"),
    ("sa-east-1", "brazilsouth"),
];

/// Translate a canonical region code into the provider's native location string.
///
/// Codes missing from the table are returned unchanged, so callers may pass
/// native names (`eastus`, `US East (Ohio)`) straight through.
pub fn translate(provider: Provider, canonical: &str) -> String {
    let table = match provider {
        Provider::Aws => AWS_LOCATIONS,
        Provider::Azure => AZURE_REGIONS,
    };

    table
        .iter()
        .find(|(code, _)| *code == canonical)
        .map(|(_, native)| native.to_string())
        .unwrap_or_else(|| canonical.to_string())
}
