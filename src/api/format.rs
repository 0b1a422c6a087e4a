use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::molfile;
use crate::database::models::Issue;

/// Options that control how stored issues are rendered
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Return the molfile as plain text instead of the stored base64
    pub decode_molfile: bool,
}

/// Convert an Issue into the flat wire map returned by `/get_all_issues`
pub fn issue_to_api_value(issue: &Issue, options: &FormatOptions) -> Value {
    let molfile = issue.molfile.as_deref().map(|bytes| {
        if options.decode_molfile {
            molfile::decode_from_storage(bytes)
        } else {
            molfile::stored_text(bytes)
        }
    });

    json!({
        "id": issue.id,
        "user": issue.user,
        "description": issue.description,
        "date_created": issue.date_created.to_rfc3339(),
        "molfile": molfile,
        "inchi": issue.inchi,
        "auxinfo": issue.auxinfo,
        "inchikey": issue.inchikey,
        "logs": issue.logs,
        "options": issue.options,
        "inchi_version": issue.inchi_version,
        "source": issue.source,
    })
}

pub fn issues_to_api_value(issues: &[Issue], options: &FormatOptions) -> Value {
    Value::Array(issues.iter().map(|issue| issue_to_api_value(issue, options)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample() -> Issue {
        Issue {
            id: 7,
            user: Some("alice".to_string()),
            description: None,
            date_created: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            molfile: Some(molfile::encode_for_storage("C1CC1\nM  END\n")),
            inchi: Some("InChI=1S/C3H6/c1-2-3-1/h1-3H2".to_string()),
            auxinfo: None,
            inchikey: Some("LVZWSLJZHVFIQJ-UHFFFAOYSA-N".to_string()),
            logs: None,
            options: Some("-SNon".to_string()),
            inchi_version: Some("1.07".to_string()),
            source: None,
        }
    }

    #[test]
    fn renders_flat_map() {
        let value = issue_to_api_value(&sample(), &FormatOptions::default());
        assert_eq!(value["id"], 7);
        assert_eq!(value["user"], "alice");
        assert_eq!(value["description"], Value::Null);
        assert_eq!(value["date_created"], "2025-03-01T12:00:00+00:00");
        assert_eq!(value["molfile"], "QzFDQzEKTSAgRU5ECg==");
    }

    #[test]
    fn decodes_molfile_on_request() {
        let options = FormatOptions { decode_molfile: true };
        let value = issue_to_api_value(&sample(), &options);
        assert_eq!(value["molfile"], "C1CC1\nM  END\n");
    }
}
