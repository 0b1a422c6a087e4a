// handlers/root.rs - GET / handler

use axum::response::Json;
use serde_json::{json, Value};

pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "InChI issue service",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "GET /health (public)",
            "db_check": "GET /db_check (token)",
            "ingest_issue": "POST /ingest_issue (token)",
            "get_nof_issues": "GET /get_nof_issues (token)",
            "get_all_issues": "GET /get_all_issues[?decode_molfile=true] (token)",
        }
    }))
}
