use crate::pricing::models::{Category, PriceMap};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub aws: AwsConfig,
    #[serde(default)]
    pub azure: AzureConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// "text" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Deadline for one pricing request, covering every storage lookup it issues
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite URL of the raw pricing store (e.g. "sqlite:./data/pricing.db")
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingConfig {
    /// Canonical region used when a request omits one
    #[serde(default = "default_region")]
    pub default_region: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_region: default_region(),
        }
    }
}

/// Static default prices, substituted wholesale for a category that
/// produced no live price
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DefaultTables {
    pub compute: PriceMap,
    pub storage: PriceMap,
    pub transfer: PriceMap,
}

impl DefaultTables {
    pub fn get(&self, category: Category) -> &PriceMap {
        match category {
            Category::Compute => &self.compute,
            Category::Storage => &self.storage,
            Category::Transfer => &self.transfer,
        }
    }
}

/// Default tables as written in config; an omitted category keeps the
/// provider's built-in table
#[derive(Deserialize)]
struct PartialTables {
    compute: Option<PriceMap>,
    storage: Option<PriceMap>,
    transfer: Option<PriceMap>,
}

impl PartialTables {
    fn merge_into(self, builtin: DefaultTables) -> DefaultTables {
        DefaultTables {
            compute: self.compute.unwrap_or(builtin.compute),
            storage: self.storage.unwrap_or(builtin.storage),
            transfer: self.transfer.unwrap_or(builtin.transfer),
        }
    }
}

fn aws_tables<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DefaultTables, D::Error> {
    Ok(PartialTables::deserialize(deserializer)?.merge_into(default_aws_tables()))
}

fn azure_tables<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DefaultTables, D::Error> {
    Ok(PartialTables::deserialize(deserializer)?.merge_into(default_azure_tables()))
}

/// Exact-match `product.attributes` predicate
///
/// Kept as a list of name/value pairs since config keys are case-folded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FixedAttribute {
    pub name: String,
    pub value: String,
}

/// Candidate SKUs and defaults for AWS offer documents
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AwsConfig {
    #[serde(default = "default_aws_compute_service")]
    pub compute_service: String,
    #[serde(default = "default_aws_compute_family")]
    pub compute_family: String,
    /// Instance types, matched exactly on `instanceType`
    #[serde(default = "default_aws_compute_candidates")]
    pub compute_candidates: Vec<String>,
    /// Extra exact-match attributes narrowing compute offers to one variant
    #[serde(default = "default_aws_compute_attributes")]
    pub compute_attributes: Vec<FixedAttribute>,

    #[serde(default = "default_aws_storage_service")]
    pub storage_service: String,
    #[serde(default = "default_aws_storage_family")]
    pub storage_family: String,
    /// Storage class labels, matched as case-insensitive substrings of `storageClass`
    #[serde(default = "default_aws_storage_candidates")]
    pub storage_candidates: Vec<String>,

    #[serde(default = "default_aws_transfer_service")]
    pub transfer_service: String,
    #[serde(default = "default_aws_transfer_family")]
    pub transfer_family: String,

    #[serde(default = "default_aws_tables", deserialize_with = "aws_tables")]
    pub defaults: DefaultTables,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            compute_service: default_aws_compute_service(),
            compute_family: default_aws_compute_family(),
            compute_candidates: default_aws_compute_candidates(),
            compute_attributes: default_aws_compute_attributes(),
            storage_service: default_aws_storage_service(),
            storage_family: default_aws_storage_family(),
            storage_candidates: default_aws_storage_candidates(),
            transfer_service: default_aws_transfer_service(),
            transfer_family: default_aws_transfer_family(),
            defaults: default_aws_tables(),
        }
    }
}

/// Candidate SKUs and defaults for Azure retail records
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AzureConfig {
    #[serde(default = "default_azure_compute_service")]
    pub compute_service: String,
    /// ARM SKU names, matched exactly on `arm_sku_name`
    #[serde(default = "default_azure_compute_candidates")]
    pub compute_candidates: Vec<String>,

    #[serde(default = "default_azure_storage_service")]
    pub storage_service: String,
    /// Meter name labels, matched as case-insensitive substrings
    #[serde(default = "default_azure_storage_candidates")]
    pub storage_candidates: Vec<String>,

    #[serde(default = "default_azure_transfer_service")]
    pub transfer_service: String,
    #[serde(default = "default_azure_transfer_meter")]
    pub transfer_meter: String,

    #[serde(default = "default_price_type")]
    pub price_type: String,

    #[serde(default = "default_azure_tables", deserialize_with = "azure_tables")]
    pub defaults: DefaultTables,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            compute_service: default_azure_compute_service(),
            compute_candidates: default_azure_compute_candidates(),
            storage_service: default_azure_storage_service(),
            storage_candidates: default_azure_storage_candidates(),
            transfer_service: default_azure_transfer_service(),
            transfer_meter: default_azure_transfer_meter(),
            price_type: default_price_type(),
            defaults: default_azure_tables(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_endpoint")]
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            endpoint: default_metrics_endpoint(),
        }
    }
}

/// Key every provider uses for internet egress in the transfer category
pub const EGRESS_KEY: &str = "internet_egress";

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_database_url() -> String {
    "sqlite:./data/pricing.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_aws_compute_service() -> String {
    "AmazonEC2".to_string()
}

fn default_aws_compute_family() -> String {
    "Compute Instance".to_string()
}

fn default_aws_compute_candidates() -> Vec<String> {
    ["t3.micro", "t3.small", "t3.medium", "t3.large", "m5.large", "c5.large", "r5.large"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_aws_compute_attributes() -> Vec<FixedAttribute> {
    [
        ("operatingSystem", "Linux"),
        ("tenancy", "Shared"),
        ("preInstalledSw", "NA"),
        ("capacitystatus", "Used"),
    ]
    .iter()
    .map(|(name, value)| FixedAttribute {
        name: name.to_string(),
        value: value.to_string(),
    })
    .collect()
}

fn default_aws_storage_service() -> String {
    "AmazonS3".to_string()
}

fn default_aws_storage_family() -> String {
    "Storage".to_string()
}

fn default_aws_storage_candidates() -> Vec<String> {
    ["General Purpose", "Infrequent Access", "Archive"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_aws_transfer_service() -> String {
    "AWSDataTransfer".to_string()
}

fn default_aws_transfer_family() -> String {
    "Data Transfer".to_string()
}

fn default_aws_tables() -> DefaultTables {
    DefaultTables {
        compute: price_table(&[
            ("t3_micro", 0.0104),
            ("t3_small", 0.0208),
            ("t3_medium", 0.0416),
            ("t3_large", 0.0832),
            ("m5_large", 0.096),
            ("c5_large", 0.085),
            ("r5_large", 0.126),
        ]),
        storage: price_table(&[
            ("general_purpose", 0.023),
            ("infrequent_access", 0.0125),
            ("archive", 0.004),
        ]),
        transfer: price_table(&[(EGRESS_KEY, 0.09)]),
    }
}

fn default_azure_compute_service() -> String {
    "Virtual Machines".to_string()
}

fn default_azure_compute_candidates() -> Vec<String> {
    [
        "Standard_B1s",
        "Standard_B2s",
        "Standard_D2s_v3",
        "Standard_D4s_v3",
        "Standard_F2s_v2",
        "Standard_E2s_v3",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_azure_storage_service() -> String {
    "Storage".to_string()
}

fn default_azure_storage_candidates() -> Vec<String> {
    ["Hot LRS Data Stored", "Cool LRS Data Stored", "Archive LRS Data Stored"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_azure_transfer_service() -> String {
    "Bandwidth".to_string()
}

fn default_azure_transfer_meter() -> String {
    "Data Transfer Out".to_string()
}

fn default_price_type() -> String {
    "Consumption".to_string()
}

fn default_azure_tables() -> DefaultTables {
    DefaultTables {
        compute: price_table(&[
            ("b1s", 0.0104),
            ("b2s", 0.0416),
            ("d2s_v3", 0.096),
            ("d4s_v3", 0.192),
            ("f2s_v2", 0.085),
            ("e2s_v3", 0.126),
        ]),
        storage: price_table(&[
            ("hot_lrs_data_stored", 0.0184),
            ("cool_lrs_data_stored", 0.01),
            ("archive_lrs_data_stored", 0.00099),
        ]),
        transfer: price_table(&[(EGRESS_KEY, 0.087)]),
    }
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_metrics_endpoint() -> String {
    "/metrics".to_string()
}

fn price_table(entries: &[(&str, f64)]) -> PriceMap {
    entries
        .iter()
        .map(|(key, price)| (key.to_string(), *price))
        .collect::<BTreeMap<_, _>>()
}

/// Load configuration from `path` (optional) layered with
/// `CLOUD_PRICING__SECTION__KEY` environment variables
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("CLOUD_PRICING").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("Server port must be non-zero");
    }

    if cfg.server.request_timeout_seconds == 0 {
        anyhow::bail!("Request timeout must be at least one second");
    }

    match cfg.server.log_format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("Invalid log format '{}', expected 'text' or 'json'", other),
    }

    if cfg.database.url.is_empty() {
        anyhow::bail!("Database URL cannot be empty");
    }

    if cfg.pricing.default_region.is_empty() {
        anyhow::bail!("Default region cannot be empty");
    }

    if cfg.aws.compute_candidates.is_empty() {
        anyhow::bail!("AWS compute candidate list cannot be empty");
    }
    if cfg.aws.storage_candidates.is_empty() {
        anyhow::bail!("AWS storage candidate list cannot be empty");
    }
    if cfg.azure.compute_candidates.is_empty() {
        anyhow::bail!("Azure compute candidate list cannot be empty");
    }
    if cfg.azure.storage_candidates.is_empty() {
        anyhow::bail!("Azure storage candidate list cannot be empty");
    }
    if cfg.azure.transfer_meter.is_empty() {
        anyhow::bail!("Azure transfer meter label cannot be empty");
    }

    validate_tables(&cfg.aws.defaults, "aws")?;
    validate_tables(&cfg.azure.defaults, "azure")?;

    Ok(())
}

fn validate_tables(tables: &DefaultTables, provider: &str) -> anyhow::Result<()> {
    for category in Category::ALL {
        let table = tables.get(category);
        if table.is_empty() {
            anyhow::bail!("Default {} table for {} cannot be empty", category, provider);
        }
        for (key, price) in table {
            if !price.is_finite() || *price < 0.0 {
                anyhow::bail!(
                    "Default {} price '{}' for {} must be a non-negative number, got {}",
                    category,
                    key,
                    provider,
                    price
                );
            }
        }
    }
    Ok(())
}
