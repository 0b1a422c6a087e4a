use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::database::manager::DatabaseError;
use crate::database::models::issue::{CREATE_ISSUES_DATE_INDEX, CREATE_ISSUES_TABLE};
use crate::database::models::{Issue, NewIssue};

/// Result of a round-trip probe against the backing store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connectivity {
    pub reachable: bool,
    pub message: String,
}

impl Connectivity {
    pub fn ok() -> Self {
        Self {
            reachable: true,
            message: "Database connection successful".to_string(),
        }
    }

    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self {
            reachable: false,
            message: format!("Database connection failed: {}", reason),
        }
    }
}

/// Persistence operations for the `issues` table
#[async_trait]
pub trait IssueStore: Send + Sync {
    async fn insert(&self, issue: NewIssue) -> Result<Issue, DatabaseError>;

    async fn count(&self) -> Result<i64, DatabaseError>;

    /// Ascending by `date_created`, then `id`
    async fn list_sorted_by_creation(&self) -> Result<Vec<Issue>, DatabaseError>;

    /// Never fails; problems are reported in the returned message.
    async fn check_connectivity(&self) -> Connectivity;
}

const ISSUE_COLUMNS: &str = r#"id, "user", description, date_created, molfile, inchi, auxinfo, inchikey, logs, options, inchi_version, source"#;

/// `IssueStore` backed by PostgreSQL. Every call checks one connection out of
/// the pool and returns it when the call ends.
#[derive(Clone)]
pub struct PgIssueStore {
    pool: PgPool,
}

impl PgIssueStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the table and its date index if they do not exist yet
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(CREATE_ISSUES_TABLE).execute(&mut *conn).await?;
        sqlx::query(CREATE_ISSUES_DATE_INDEX).execute(&mut *conn).await?;
        info!("Ensured issues table exists");
        Ok(())
    }
}

#[async_trait]
impl IssueStore for PgIssueStore {
    async fn insert(&self, issue: NewIssue) -> Result<Issue, DatabaseError> {
        let sql = format!(
            r#"INSERT INTO issues ("user", description, molfile, inchi, auxinfo, inchikey, logs, options, inchi_version, source)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING {}"#,
            ISSUE_COLUMNS
        );

        let mut conn = self.pool.acquire().await?;
        let created = sqlx::query_as::<_, Issue>(&sql)
            .bind(issue.user)
            .bind(issue.description)
            .bind(issue.molfile)
            .bind(issue.inchi)
            .bind(issue.auxinfo)
            .bind(issue.inchikey)
            .bind(issue.logs)
            .bind(issue.options)
            .bind(issue.inchi_version)
            .bind(issue.source)
            .fetch_one(&mut *conn)
            .await?;

        debug!("Inserted issue {}", created.id);
        Ok(created)
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM issues")
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }

    async fn list_sorted_by_creation(&self) -> Result<Vec<Issue>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM issues ORDER BY date_created ASC, id ASC",
            ISSUE_COLUMNS
        );

        let mut conn = self.pool.acquire().await?;
        let issues = sqlx::query_as::<_, Issue>(&sql)
            .fetch_all(&mut *conn)
            .await?;
        Ok(issues)
    }

    async fn check_connectivity(&self) -> Connectivity {
        let mut conn = match self.pool.acquire().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Database connectivity check failed: {}", e);
                return Connectivity::failed(e);
            }
        };

        match sqlx::query("SELECT 1").execute(&mut *conn).await {
            Ok(_) => Connectivity::ok(),
            Err(e) => {
                warn!("Database connectivity check failed: {}", e);
                Connectivity::failed(e)
            }
        }
    }
}
