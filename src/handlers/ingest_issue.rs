// handlers/ingest_issue.rs - POST /ingest_issue handler

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::molfile;
use crate::database::models::issue::limits;
use crate::database::models::NewIssue;
use crate::error::ApiError;
use crate::state::AppState;

/// Appended to malformed-body errors so clients can see the expected shape
pub const EXAMPLE_PAYLOAD: &str = r#"{"user": "alice", "description": "InChI differs from expected", "molfile": "<molfile text or base64>", "inchi": "InChI=1S/CH4/h1H4", "auxinfo": "AuxInfo=1/0/N:1/rA:1C/rB:/rC:;", "inchikey": "VNWKTOKETHGBQD-UHFFFAOYSA-N", "logs": "", "options": "-SNon", "inchi_version": "1.07", "source": "inchi-web"}"#;

/// Body of an ingest request. Every field is optional; `id` and
/// `date_created` are assigned by the server and rejected here.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestIssueRequest {
    pub user: Option<String>,
    pub description: Option<String>,
    pub molfile: Option<String>,
    pub inchi: Option<String>,
    pub auxinfo: Option<String>,
    pub inchikey: Option<String>,
    pub logs: Option<String>,
    pub options: Option<String>,
    pub inchi_version: Option<String>,
    pub source: Option<String>,
}

impl IngestIssueRequest {
    /// Check every text column against its width and reject NUL characters,
    /// which PostgreSQL text columns cannot hold.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut field_errors = BTreeMap::new();

        let columns: [(&str, &Option<String>, usize); 9] = [
            ("user", &self.user, limits::USER),
            ("description", &self.description, limits::DESCRIPTION),
            ("inchi", &self.inchi, limits::INCHI),
            ("auxinfo", &self.auxinfo, limits::AUXINFO),
            ("inchikey", &self.inchikey, limits::INCHIKEY),
            ("logs", &self.logs, limits::LOGS),
            ("options", &self.options, limits::OPTIONS),
            ("inchi_version", &self.inchi_version, limits::INCHI_VERSION),
            ("source", &self.source, limits::SOURCE),
        ];

        for (name, value, max) in columns {
            let Some(value) = value else { continue };
            if value.contains('\0') {
                field_errors.insert(name.to_string(), "must not contain NUL characters".to_string());
            } else if value.chars().count() > max {
                field_errors.insert(name.to_string(), format!("must be at most {} characters", max));
            }
        }

        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid issue fields", field_errors))
        }
    }

    /// Column values for the store; a plain-text molfile is base64-encoded
    pub fn into_new_issue(self) -> NewIssue {
        NewIssue {
            user: self.user,
            description: self.description,
            molfile: self.molfile.as_deref().map(molfile::encode_for_storage),
            inchi: self.inchi,
            auxinfo: self.auxinfo,
            inchikey: self.inchikey,
            logs: self.logs,
            options: self.options,
            inchi_version: self.inchi_version,
            source: self.source,
        }
    }
}

/// POST /ingest_issue - store one issue report and return its id
pub async fn ingest_issue(
    State(state): State<AppState>,
    payload: Result<Json<IngestIssueRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!("Malformed ingest body: {}", rejection.body_text());
        ApiError::invalid_json(format!(
            "Invalid request body: {}. Example payload: {}",
            rejection.body_text(),
            EXAMPLE_PAYLOAD
        ))
    })?;

    request.validate()?;

    let issue = state.store.insert(request.into_new_issue()).await?;
    tracing::info!("Ingested issue {} (user: {:?})", issue.id, issue.user);

    Ok(Json(json!({ "status": "success", "issue_id": issue.id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_minimal_body() {
        let request: IngestIssueRequest =
            serde_json::from_str(r#"{"user": "alice", "description": "test issue"}"#).unwrap();
        assert!(request.validate().is_ok());

        let new_issue = request.into_new_issue();
        assert_eq!(new_issue.user.as_deref(), Some("alice"));
        assert_eq!(new_issue.molfile, None);
    }

    #[test]
    fn rejects_server_assigned_fields() {
        let parsed = serde_json::from_str::<IngestIssueRequest>(r#"{"id": 5, "user": "alice"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn example_payload_is_valid() {
        let request: IngestIssueRequest = serde_json::from_str(EXAMPLE_PAYLOAD).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn reports_every_overlong_field() {
        let request = IngestIssueRequest {
            user: Some("u".repeat(51)),
            inchikey: Some("K".repeat(28)),
            description: Some("fine".to_string()),
            ..Default::default()
        };

        match request.validate() {
            Err(ApiError::ValidationError { field_errors, .. }) => {
                assert_eq!(field_errors.len(), 2);
                assert!(field_errors.contains_key("user"));
                assert!(field_errors.contains_key("inchikey"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn length_is_counted_in_characters() {
        let request = IngestIssueRequest {
            user: Some("é".repeat(50)),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn rejects_nul_characters() {
        let request = IngestIssueRequest {
            logs: Some("line\0".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn encodes_plain_molfile() {
        let request = IngestIssueRequest {
            molfile: Some("C1CC1\nM  END\n".to_string()),
            ..Default::default()
        };
        let new_issue = request.into_new_issue();
        assert_eq!(new_issue.molfile.as_deref(), Some(&b"QzFDQzEKTSAgRU5ECg=="[..]));
    }
}
