//! Read-only access to the raw pricing collections
//!
//! The store only filters rows by indexed columns and document attributes and
//! hands back the first qualifying row. Interpreting the row (walking nested
//! terms, rejecting sentinel prices) is left to the extractors.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use std::str::FromStr;
use std::time::Duration;

/// Storage failures. Extractors treat these as a miss for the affected SKU.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// How an attribute value is compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    /// Case-insensitive substring
    Contains,
}

/// Predicate on one `product.attributes` field of an offer document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeFilter {
    pub name: String,
    pub value: String,
    pub mode: MatchMode,
}

impl AttributeFilter {
    pub fn exact(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            mode: MatchMode::Exact,
        }
    }

    pub fn contains(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            mode: MatchMode::Contains,
        }
    }
}

/// Filter set for one AWS offer document lookup
#[derive(Debug, Clone)]
pub struct AwsDocumentFilter<'a> {
    pub service_code: &'a str,
    pub product_family: &'a str,
    /// Native location string, matched exactly
    pub location: &'a str,
    pub attributes: &'a [AttributeFilter],
}

/// Flat column an Azure SKU filter applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AzureSkuField {
    ArmSkuName,
    MeterName,
}

impl AzureSkuField {
    fn column(&self) -> &'static str {
        match self {
            AzureSkuField::ArmSkuName => "arm_sku_name",
            AzureSkuField::MeterName => "meter_name",
        }
    }
}

/// SKU or meter predicate for an Azure retail record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureSkuFilter {
    pub field: AzureSkuField,
    pub value: String,
    pub mode: MatchMode,
}

/// Filter set for one Azure retail record lookup
#[derive(Debug, Clone)]
pub struct AzureRecordFilter<'a> {
    pub service_name: &'a str,
    /// `None` searches every region
    pub region: Option<&'a str>,
    pub sku: &'a AzureSkuFilter,
    pub price_type: &'a str,
}

/// The fields of an Azure retail record the extractor reads
#[derive(Debug, Clone, PartialEq)]
pub struct AzureRecord {
    pub retail_price: Option<f64>,
    pub arm_sku_name: Option<String>,
    pub meter_name: Option<String>,
}

#[async_trait]
pub trait RawPricingStore: Send + Sync {
    /// Raw JSON text of the first AWS offer document matching `filter`
    async fn find_aws_document(
        &self,
        filter: &AwsDocumentFilter<'_>,
    ) -> Result<Option<String>, StoreError>;

    /// First Azure retail record matching `filter`
    async fn find_azure_record(
        &self,
        filter: &AzureRecordFilter<'_>,
    ) -> Result<Option<AzureRecord>, StoreError>;

    /// Cheap connectivity check for readiness probes
    async fn ping(&self) -> Result<(), StoreError>;
}

/// SQLite-backed raw pricing store
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open a connection pool and apply the embedded migrations
    ///
    /// `sqlite::memory:` databases are per-connection, so pass
    /// `max_connections = 1` for those.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Raw pricing store ready");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// json_extract raises on malformed JSON, so every document access is guarded
// by json_valid. CASE evaluates only the chosen branch.
const VALID_DOC: &str = "CASE WHEN json_valid(document) THEN ";

#[async_trait]
impl RawPricingStore for SqliteStore {
    async fn find_aws_document(
        &self,
        filter: &AwsDocumentFilter<'_>,
    ) -> Result<Option<String>, StoreError> {
        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT document FROM aws_raw_pricing WHERE service_code = ");
        qb.push_bind(filter.service_code);
        qb.push(" AND product_family = ");
        qb.push_bind(filter.product_family);

        qb.push(" AND ");
        qb.push(VALID_DOC);
        qb.push("json_type(document, '$.terms.OnDemand') END = 'object'");

        qb.push(" AND ");
        qb.push(VALID_DOC);
        qb.push("json_extract(document, '$.product.attributes.location') END = ");
        qb.push_bind(filter.location);

        for attribute in filter.attributes {
            let path = format!("$.product.attributes.\"{}\"", attribute.name.replace('"', ""));
            qb.push(" AND ");
            match attribute.mode {
                MatchMode::Exact => {
                    qb.push(VALID_DOC);
                    qb.push("json_extract(document, ");
                    qb.push_bind(path);
                    qb.push(") END = ");
                    qb.push_bind(attribute.value.as_str());
                }
                MatchMode::Contains => {
                    qb.push("instr(lower(");
                    qb.push(VALID_DOC);
                    qb.push("json_extract(document, ");
                    qb.push_bind(path);
                    qb.push(") END), lower(");
                    qb.push_bind(attribute.value.as_str());
                    qb.push(")) > 0");
                }
            }
        }
        qb.push(" LIMIT 1");

        let document = qb
            .build_query_scalar::<String>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(document)
    }

    async fn find_azure_record(
        &self,
        filter: &AzureRecordFilter<'_>,
    ) -> Result<Option<AzureRecord>, StoreError> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT CAST(retail_price AS REAL), arm_sku_name, meter_name \
             FROM azure_raw_pricing WHERE service_name = ",
        );
        qb.push_bind(filter.service_name);
        qb.push(" AND price_type = ");
        qb.push_bind(filter.price_type);

        if let Some(region) = filter.region {
            qb.push(" AND arm_region_name = ");
            qb.push_bind(region);
        }

        let column = filter.sku.field.column();
        match filter.sku.mode {
            MatchMode::Exact => {
                qb.push(format!(" AND {} = ", column));
                qb.push_bind(filter.sku.value.as_str());
            }
            MatchMode::Contains => {
                qb.push(format!(" AND instr(lower({}), lower(", column));
                qb.push_bind(filter.sku.value.as_str());
                qb.push(")) > 0");
            }
        }
        qb.push(" LIMIT 1");

        let row = qb
            .build_query_as::<(Option<f64>, Option<String>, Option<String>)>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(retail_price, arm_sku_name, meter_name)| AzureRecord {
            retail_price,
            arm_sku_name,
            meter_name,
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
