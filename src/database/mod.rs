pub mod manager;
pub mod models;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use models::{Issue, NewIssue};
pub use repository::{Connectivity, IssueStore, PgIssueStore};
