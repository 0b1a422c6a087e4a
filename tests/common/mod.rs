#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use inchi_issues::auth::TokenStore;
use inchi_issues::database::{Connectivity, DatabaseError, Issue, IssueStore, NewIssue};
use inchi_issues::AppState;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// `IssueStore` kept in memory, counting every call so tests can assert that
/// rejected requests never reach it.
#[derive(Default)]
pub struct MemoryIssueStore {
    issues: Mutex<Vec<Issue>>,
    calls: AtomicUsize,
    unreachable: AtomicBool,
}

impl MemoryIssueStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn stored(&self) -> Vec<Issue> {
        self.issues.lock().unwrap().clone()
    }

    fn touch(&self) -> Result<(), DatabaseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl IssueStore for MemoryIssueStore {
    async fn insert(&self, issue: NewIssue) -> Result<Issue, DatabaseError> {
        self.touch()?;
        let mut issues = self.issues.lock().unwrap();
        let created = Issue {
            id: issues.len() as i64 + 1,
            user: issue.user,
            description: issue.description,
            date_created: Utc::now(),
            molfile: issue.molfile,
            inchi: issue.inchi,
            auxinfo: issue.auxinfo,
            inchikey: issue.inchikey,
            logs: issue.logs,
            options: issue.options,
            inchi_version: issue.inchi_version,
            source: issue.source,
        };
        issues.push(created.clone());
        Ok(created)
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        self.touch()?;
        Ok(self.issues.lock().unwrap().len() as i64)
    }

    async fn list_sorted_by_creation(&self) -> Result<Vec<Issue>, DatabaseError> {
        self.touch()?;
        let mut issues = self.stored();
        issues.sort_by(|a, b| a.date_created.cmp(&b.date_created).then(a.id.cmp(&b.id)));
        Ok(issues)
    }

    async fn check_connectivity(&self) -> Connectivity {
        match self.touch() {
            Ok(()) => Connectivity::ok(),
            Err(e) => Connectivity::failed(e),
        }
    }
}

pub const TOKEN: &str = "validtoken";

/// Router wired to an in-memory store and a token file in a temp directory
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryIssueStore>,
    pub tokens_dir: TempDir,
}

impl TestApp {
    /// Token file with a single all-access token
    pub fn new() -> Result<Self> {
        Self::with_token_file(&format!("{}\n", TOKEN))
    }

    pub fn with_token_file(content: &str) -> Result<Self> {
        let tokens_dir = tempfile::tempdir()?;
        let path = tokens_dir.path().join("tokens.txt");
        std::fs::write(&path, content)?;
        Ok(Self::build(tokens_dir, path))
    }

    /// No token file at all
    pub fn without_token_file() -> Result<Self> {
        let tokens_dir = tempfile::tempdir()?;
        let path = tokens_dir.path().join("missing.txt");
        Ok(Self::build(tokens_dir, path))
    }

    fn build(tokens_dir: TempDir, path: std::path::PathBuf) -> Self {
        let store = MemoryIssueStore::new();
        let state = AppState::new(store.clone(), TokenStore::new(path));
        Self {
            router: inchi_issues::app(state),
            store,
            tokens_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, body))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", token);
        }
        self.send(builder.body(Body::empty())?).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: &Value) -> Result<(StatusCode, Value)> {
        self.post_raw(uri, token, body.to_string()).await
    }

    pub async fn post_raw(&self, uri: &str, token: Option<&str>, body: String) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", token);
        }
        self.send(builder.body(Body::from(body))?).await
    }
}
