// handlers/issues.rs - GET /get_nof_issues and GET /get_all_issues handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::format::{issues_to_api_value, FormatOptions};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub decode_molfile: Option<String>,
}

impl ListQuery {
    pub fn format_options(&self) -> Result<FormatOptions, ApiError> {
        let decode_molfile = match self.decode_molfile.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(flag) => parse_flag(flag).ok_or_else(|| {
                ApiError::bad_request(format!(
                    "Invalid decode_molfile value '{}'; expected true or false",
                    flag
                ))
            })?,
        };
        Ok(FormatOptions { decode_molfile })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// GET /get_nof_issues - total number of stored issues
pub async fn get_nof_issues(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let count = state.store.count().await?;
    Ok(Json(json!({ "nof_issues": count })))
}

/// GET /get_all_issues - every issue, oldest first
pub async fn get_all_issues(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let options = query.format_options()?;
    let issues = state.store.list_sorted_by_creation().await?;
    tracing::debug!("Listing {} issues (decode_molfile: {})", issues.len(), options.decode_molfile);

    Ok(Json(json!({ "issues": issues_to_api_value(&issues, &options) })))
}
