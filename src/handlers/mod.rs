// handlers/mod.rs
//
// Public routes (`/`, `/health`) need no token; every other handler sits
// behind `middleware::token_auth_middleware`.
pub mod health;
pub mod ingest_issue;
pub mod issues;
pub mod root;

pub use health::{db_check, health};
pub use ingest_issue::ingest_issue;
pub use issues::{get_all_issues, get_nof_issues};
pub use root::root;
