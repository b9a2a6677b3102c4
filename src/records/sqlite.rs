use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

use super::{CaseRecord, ClaimRecord, RecordStore};
use crate::config::DatabaseConfig;
use crate::error::{StorageError, StorageResult};

/// Static migrator that embeds migrations at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite-backed record store.
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Open (or create) the database at the configured path and run
    /// migrations.
    pub async fn new(config: &DatabaseConfig) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Connection {
                message: format!("Failed to create database directory: {}", e),
            })?;
        }

        let database_url = format!("sqlite://{}?mode=rwc", config.path.display());

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to connect to database: {}", e),
            })?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// In-memory store for tests; a single connection keeps the database
    /// alive for the pool's lifetime.
    pub async fn new_in_memory() -> StorageResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to open in-memory database: {}", e),
            })?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Run database migrations using embedded sqlx migrations
    async fn run_migrations(&self) -> StorageResult<()> {
        info!("Running database migrations...");

        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Migration {
                message: format!("Failed to run migrations: {}", e),
            })?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the underlying pool for advanced queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a case record.
    pub async fn insert_case(&self, case: &CaseRecord) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cases (case_number, description, comments, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&case.case_number)
        .bind(&case.description)
        .bind(&case.comments)
        .bind(case.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a claim record.
    pub async fn insert_claim(&self, claim: &ClaimRecord) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO claims (
                claim_number, case_number, base_rate, units, discount,
                calculated_amount, expected_amount, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&claim.claim_number)
        .bind(&claim.case_number)
        .bind(claim.base_rate)
        .bind(claim.units)
        .bind(claim.discount)
        .bind(claim.calculated_amount)
        .bind(claim.expected_amount)
        .bind(claim.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn fetch_case(&self, case_number: &str) -> StorageResult<Option<CaseRecord>> {
        let row: Option<CaseRow> = sqlx::query_as(
            r#"
            SELECT case_number, description, comments, created_at
            FROM cases
            WHERE case_number = ?
            "#,
        )
        .bind(case_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn fetch_claim(&self, claim_number: &str) -> StorageResult<Option<ClaimRecord>> {
        let row: Option<ClaimRow> = sqlx::query_as(
            r#"
            SELECT claim_number, case_number, base_rate, units, discount,
                   calculated_amount, expected_amount, created_at
            FROM claims
            WHERE claim_number = ?
            "#,
        )
        .bind(claim_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_cases(&self) -> StorageResult<Vec<CaseRecord>> {
        let rows: Vec<CaseRow> = sqlx::query_as(
            r#"
            SELECT case_number, description, comments, created_at
            FROM cases
            ORDER BY case_number
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn list_claims(&self) -> StorageResult<Vec<ClaimRecord>> {
        let rows: Vec<ClaimRow> = sqlx::query_as(
            r#"
            SELECT claim_number, case_number, base_rate, units, discount,
                   calculated_amount, expected_amount, created_at
            FROM claims
            ORDER BY claim_number
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn list_claims_for_case(&self, case_number: &str) -> StorageResult<Vec<ClaimRecord>> {
        let rows: Vec<ClaimRow> = sqlx::query_as(
            r#"
            SELECT claim_number, case_number, base_rate, units, discount,
                   calculated_amount, expected_amount, created_at
            FROM claims
            WHERE case_number = ?
            ORDER BY claim_number
            "#,
        )
        .bind(case_number)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }
}

#[derive(sqlx::FromRow)]
struct CaseRow {
    case_number: String,
    description: String,
    comments: String,
    created_at: String,
}

impl From<CaseRow> for CaseRecord {
    fn from(row: CaseRow) -> Self {
        use chrono::DateTime;

        Self {
            case_number: row.case_number,
            description: row.description,
            comments: row.comments,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ClaimRow {
    claim_number: String,
    case_number: String,
    base_rate: i64,
    units: i64,
    discount: i64,
    calculated_amount: i64,
    expected_amount: i64,
    created_at: String,
}

impl From<ClaimRow> for ClaimRecord {
    fn from(row: ClaimRow) -> Self {
        use chrono::DateTime;

        Self {
            claim_number: row.claim_number,
            case_number: row.case_number,
            base_rate: row.base_rate,
            units: row.units,
            discount: row.discount,
            calculated_amount: row.calculated_amount,
            expected_amount: row.expected_amount,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
        }
    }
}
