//! Source match documents: reading, decoding and typed deserialization.
//!
//! A document is one JSON object with an `info` section and a list of
//! `innings`, each holding `overs` of `deliveries`. Files are read as bytes and
//! their encoding is detected before parsing, so Latin-1 exports load the same
//! way UTF-8 ones do. No cricket rules live here.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{SourceError, SourceResult};

// =============================================================================
// Document Shape
// =============================================================================

/// A whole match as it appears on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchDocument {
    pub info: RawInfo,
    pub innings: Vec<RawInnings>,
}

/// The `info` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RawInfo {
    pub dates: Vec<String>,
    pub match_type: String,
    pub venue: String,
    pub city: String,
    pub teams: Vec<String>,
    #[serde(default)]
    pub outcome: Option<RawOutcome>,
    #[serde(default)]
    pub toss: Option<RawToss>,
    #[serde(default)]
    pub balls_per_over: Option<u32>,
    #[serde(default)]
    pub event: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOutcome {
    #[serde(default)]
    pub winner: Option<String>,
    /// Margin keyed by unit, e.g. `{"runs": 35}` or `{"wickets": 4}`.
    #[serde(default)]
    pub by: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawToss {
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub decision: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInnings {
    pub team: String,
    pub overs: Vec<RawOver>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOver {
    pub over: u32,
    pub deliveries: Vec<RawDelivery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDelivery {
    pub batter: String,
    pub non_striker: String,
    pub bowler: String,
    pub runs: RawRuns,
    /// Extras keyed by category (`wides`, `noballs`, `legbyes`, ...).
    #[serde(default)]
    pub extras: Option<Map<String, Value>>,
    #[serde(default)]
    pub wickets: Option<Vec<RawWicket>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawRuns {
    pub batter: u32,
    pub extras: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawWicket {
    pub kind: String,
    pub player_out: String,
    #[serde(default)]
    pub fielders: Option<Vec<RawFielder>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFielder {
    pub name: String,
}

// =============================================================================
// Encoding
// =============================================================================

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding.
///
/// UTF-8 is decoded lossily; any other single-byte guess is read as
/// Windows-1252, which maps every byte.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        _ => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Parse a match document from raw bytes, detecting their encoding first.
pub fn parse_document_bytes(bytes: &[u8]) -> SourceResult<MatchDocument> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return parse_document_str(text);
    }

    // Not UTF-8, so a "utf-8" guess from the detector is wrong too.
    let encoding = match detect_encoding(bytes).as_str() {
        "utf-8" => "windows-1252".to_string(),
        other => other.to_string(),
    };
    parse_document_str(&decode_content(bytes, &encoding))
}

/// Parse a match document from JSON text.
pub fn parse_document_str(content: &str) -> SourceResult<MatchDocument> {
    Ok(serde_json::from_str(content)?)
}

/// Parse a match document from an already-decoded JSON value.
pub fn parse_document_value(value: Value) -> SourceResult<MatchDocument> {
    Ok(serde_json::from_value(value)?)
}

/// Read and parse a match document from disk.
pub fn read_document<P: AsRef<Path>>(path: P) -> SourceResult<MatchDocument> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "info": {
                "dates": ["2024-01-01"],
                "match_type": "ODI",
                "venue": "Eden Gardens",
                "city": "Kolkata",
                "teams": ["India", "England"]
            },
            "innings": [{
                "team": "India",
                "overs": [{
                    "over": 0,
                    "deliveries": [{
                        "batter": "A", "non_striker": "B", "bowler": "C",
                        "runs": {"batter": 1, "extras": 0, "total": 1}
                    }]
                }]
            }]
        })
    }

    #[test]
    fn test_optional_sections_default() {
        let doc = parse_document_value(minimal()).unwrap();
        assert!(doc.info.outcome.is_none());
        assert!(doc.info.toss.is_none());
        assert!(doc.info.balls_per_over.is_none());
        assert!(doc.info.event.is_none());
        assert!(doc.innings[0].overs[0].deliveries[0].extras.is_none());
    }

    #[test]
    fn test_missing_required_key_is_error() {
        let mut value = minimal();
        value["info"].as_object_mut().unwrap().remove("venue");
        let err = parse_document_value(value).unwrap_err();
        assert!(err.to_string().contains("venue"));
    }

    #[test]
    fn test_missing_runs_component_is_error() {
        let mut value = minimal();
        value["innings"][0]["overs"][0]["deliveries"][0]["runs"]
            .as_object_mut()
            .unwrap()
            .remove("total");
        let err = parse_document_value(value).unwrap_err();
        assert!(err.to_string().contains("total"));
    }

    #[test]
    fn test_extras_keep_source_order() {
        let text = r#"{"info": {"dates": ["2024-01-01"], "match_type": "T20", "venue": "V",
            "city": "C", "teams": ["X", "Y"]},
            "innings": [{"team": "X", "overs": [{"over": 0, "deliveries": [{
                "batter": "A", "non_striker": "B", "bowler": "C",
                "runs": {"batter": 0, "extras": 2, "total": 2},
                "extras": {"noballs": 1, "legbyes": 1}}]}]}]}"#;
        let doc = parse_document_str(text).unwrap();
        let extras = doc.innings[0].overs[0].deliveries[0].extras.as_ref().unwrap();
        let keys: Vec<&String> = extras.keys().collect();
        assert_eq!(keys, vec!["noballs", "legbyes"]);
    }

    #[test]
    fn test_latin1_document() {
        let text = serde_json::to_string(&minimal()).unwrap().replace("Kolkata", "Z\u{fc}rich");
        let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(&text);
        let doc = parse_document_bytes(&bytes).unwrap();
        assert_eq!(doc.info.city, "Z\u{fc}rich");
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_document("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}
