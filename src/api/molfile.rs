//! Molfile payload coercion.
//!
//! Clients may send a molfile either as plain text or already base64-encoded.
//! The store always holds the base64 text.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;

static BASE64_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9+/]*={0,2}$").expect("static base64 pattern")
});

/// True when `s` (ignoring surrounding whitespace) is strict padded base64
pub fn is_base64_encoded(s: &str) -> bool {
    let s = s.trim();
    if s.len() % 4 != 0 {
        return false;
    }
    if !BASE64_SHAPE.is_match(s) {
        return false;
    }
    STANDARD.decode(s).is_ok()
}

/// Bytes to persist for a submitted molfile
pub fn encode_for_storage(molfile: &str) -> Vec<u8> {
    if is_base64_encoded(molfile) {
        molfile.trim().as_bytes().to_vec()
    } else {
        STANDARD.encode(molfile.as_bytes()).into_bytes()
    }
}

/// Stored bytes as the base64 text they hold
pub fn stored_text(stored: &[u8]) -> String {
    String::from_utf8_lossy(stored).into_owned()
}

/// Plain molfile text for stored bytes. Rows whose bytes are not valid base64
/// are returned as stored.
pub fn decode_from_storage(stored: &[u8]) -> String {
    let text = stored_text(stored);
    match STANDARD.decode(text.trim()) {
        Ok(decoded) => String::from_utf8_lossy(&decoded).into_owned(),
        Err(_) => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ETHANOL: &str = "\n  RDKit          2D\n\n  3  2  0  0  0  0  0  0  0  0999 V2000\n    0.0000    0.0000    0.0000 C   0  0\nM  END\n";

    #[test]
    fn detects_base64() {
        assert!(is_base64_encoded("SGVsbG8="));
        assert!(is_base64_encoded("  SGVsbG8=\n"));
        assert!(!is_base64_encoded("SGVsbG8"));
        assert!(!is_base64_encoded("M  END"));
        assert!(!is_base64_encoded("abc=def="));
    }

    #[test]
    fn plain_text_is_encoded() {
        let stored = encode_for_storage(ETHANOL);
        assert_ne!(stored, ETHANOL.as_bytes());
        assert!(is_base64_encoded(&stored_text(&stored)));
    }

    #[test]
    fn base64_is_kept() {
        let encoded = STANDARD.encode(ETHANOL);
        assert_eq!(encode_for_storage(&encoded), encoded.as_bytes());
    }

    #[test]
    fn plain_text_round_trips() {
        let stored = encode_for_storage(ETHANOL);
        assert_eq!(decode_from_storage(&stored), ETHANOL);
    }

    #[test]
    fn undecodable_rows_pass_through() {
        assert_eq!(decode_from_storage(b"not base64!"), "not base64!");
    }
}
