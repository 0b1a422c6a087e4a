use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored issue report. Rows are write-once: there is no update or delete path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Issue {
    pub id: i64,
    pub user: Option<String>,
    pub description: Option<String>,
    pub date_created: DateTime<Utc>,
    /// Base64 text of the submitted molfile
    pub molfile: Option<Vec<u8>>,
    pub inchi: Option<String>,
    pub auxinfo: Option<String>,
    pub inchikey: Option<String>,
    pub logs: Option<String>,
    pub options: Option<String>,
    pub inchi_version: Option<String>,
    pub source: Option<String>,
}

/// Column values for an insert; `id` and `date_created` are assigned by the database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewIssue {
    pub user: Option<String>,
    pub description: Option<String>,
    pub molfile: Option<Vec<u8>>,
    pub inchi: Option<String>,
    pub auxinfo: Option<String>,
    pub inchikey: Option<String>,
    pub logs: Option<String>,
    pub options: Option<String>,
    pub inchi_version: Option<String>,
    pub source: Option<String>,
}

/// Column width limits of the `issues` table
pub mod limits {
    pub const USER: usize = 50;
    pub const DESCRIPTION: usize = 2000;
    pub const INCHI: usize = 1000;
    pub const AUXINFO: usize = 2000;
    pub const INCHIKEY: usize = 27;
    pub const LOGS: usize = 2000;
    pub const OPTIONS: usize = 2000;
    pub const INCHI_VERSION: usize = 255;
    pub const SOURCE: usize = 255;
}

pub const CREATE_ISSUES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS issues (
        id BIGSERIAL PRIMARY KEY,
        "user" VARCHAR(50),
        description VARCHAR(2000),
        date_created TIMESTAMPTZ NOT NULL DEFAULT now(),
        molfile BYTEA,
        inchi VARCHAR(1000),
        auxinfo VARCHAR(2000),
        inchikey VARCHAR(27),
        logs VARCHAR(2000),
        options VARCHAR(2000),
        inchi_version VARCHAR(255),
        source VARCHAR(255)
    )
"#;

pub const CREATE_ISSUES_DATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS issues_date_created_idx ON issues (date_created)";
