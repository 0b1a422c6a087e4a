use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

/// Permission entry that grants every operation
pub const ALL_OPERATIONS: &str = "all";

/// Operations a token can be granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    DbCheck,
    IngestIssue,
    GetNofIssues,
    GetAllIssues,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::DbCheck => "db_check",
            Operation::IngestIssue => "ingest_issue",
            Operation::GetNofIssues => "get_nof_issues",
            Operation::GetAllIssues => "get_all_issues",
        }
    }

    /// Operation guarded by a route path such as `/ingest_issue`
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "/db_check" => Some(Operation::DbCheck),
            "/ingest_issue" => Some(Operation::IngestIssue),
            "/get_nof_issues" => Some(Operation::GetNofIssues),
            "/get_all_issues" => Some(Operation::GetAllIssues),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a single token may do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    All,
    Only(HashSet<String>),
}

impl Grant {
    fn from_names<I: IntoIterator<Item = String>>(names: I) -> Self {
        let names: HashSet<String> = names.into_iter().map(|n| n.trim().to_string()).collect();
        if names.contains(ALL_OPERATIONS) {
            Grant::All
        } else {
            Grant::Only(names)
        }
    }

    pub fn permits(&self, operation: Operation) -> bool {
        match self {
            Grant::All => true,
            Grant::Only(names) => names.contains(operation.as_str()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GrantEntry {
    One(String),
    Many(Vec<String>),
}

/// Parsed token file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenAllowList {
    grants: HashMap<String, Grant>,
}

impl TokenAllowList {
    /// Parse either a JSON object (`token -> [operation, ...]`) or a flat
    /// newline-separated token list where every token is granted everything.
    pub fn parse(content: &str) -> Self {
        let trimmed = content.trim_start();
        if trimmed.starts_with('{') {
            return match serde_json::from_str::<HashMap<String, GrantEntry>>(trimmed) {
                Ok(entries) => Self::from_entries(entries),
                Err(e) => {
                    warn!("Token file is not a valid permission map: {}", e);
                    Self::default()
                }
            };
        }

        let grants = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|token| (token.to_string(), Grant::All))
            .collect();
        Self { grants }
    }

    fn from_entries(entries: HashMap<String, GrantEntry>) -> Self {
        let grants = entries
            .into_iter()
            .map(|(token, entry)| {
                let grant = match entry {
                    GrantEntry::One(name) => Grant::from_names([name]),
                    GrantEntry::Many(names) => Grant::from_names(names),
                };
                (token.trim().to_string(), grant)
            })
            .filter(|(token, _)| !token.is_empty())
            .collect();
        Self { grants }
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn permits(&self, token: &str, operation: Operation) -> bool {
        self.grants
            .get(token)
            .map(|grant| grant.permits(operation))
            .unwrap_or(false)
    }
}

/// File-backed allow-list. The file is read again on every check, so edits
/// take effect on the next request.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable file yields an empty allow-list
    pub async fn load(&self) -> TokenAllowList {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => TokenAllowList::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Token file {} not found", self.path.display());
                TokenAllowList::default()
            }
            Err(e) => {
                warn!("Failed to read token file {}: {}", self.path.display(), e);
                TokenAllowList::default()
            }
        }
    }

    pub async fn is_authorized(&self, token: &str, operation: Operation) -> bool {
        if token.is_empty() {
            return false;
        }
        self.load().await.permits(token, operation)
    }
}
