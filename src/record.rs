//! Raw post records and the `{"records": [...]}` input document.

use crate::json_utils::{object_field, str_field, timestamp_field};
use crate::util::open_with_backoff;
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::io::{BufReader, Read};
use std::path::Path;

/// Structured place attached by the platform (when the post was geotagged).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Place {
    pub country_code: Option<String>,
    pub country: Option<String>,
}

/// The three fields resolution looks at. Wrong-typed fields read as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub created_at: Option<String>,
    pub place: Option<Place>,
    pub user_location: Option<String>,
}

impl RawRecord {
    pub fn from_value(v: &Value) -> Self {
        let place = object_field(v, "place").map(|p| Place {
            country_code: str_field(p, "country_code").map(str::to_string),
            country: str_field(p, "country").map(str::to_string),
        });
        let user_location = object_field(v, "user")
            .and_then(|u| str_field(u, "location"))
            .map(str::to_string);
        Self { created_at: timestamp_field(v, "created_at"), place, user_location }
    }
}

/// Parse an input document and return its records. The document must be a JSON
/// object with a `records` array; anything else is an error for the whole file.
pub fn parse_records(json: impl AsRef<[u8]>) -> Result<Vec<RawRecord>> {
    let doc: Value = serde_json::from_slice(json.as_ref()).context("invalid JSON")?;
    records_from_document(&doc)
}

fn records_from_document(doc: &Value) -> Result<Vec<RawRecord>> {
    let records = doc
        .get("records")
        .ok_or_else(|| anyhow!("missing top-level \"records\" key"))?
        .as_array()
        .ok_or_else(|| anyhow!("\"records\" is not an array"))?;
    Ok(records.iter().map(RawRecord::from_value).collect())
}

/// Read one input file into memory. I/O failures here are not "malformed input".
pub fn read_input_bytes(path: &Path, read_buf_bytes: usize) -> Result<Vec<u8>> {
    let f = open_with_backoff(path, 16, 50).with_context(|| format!("open {}", path.display()))?;
    let mut r = BufReader::with_capacity(read_buf_bytes.max(8 * 1024), f);
    let mut buf = Vec::new();
    r.read_to_end(&mut buf).with_context(|| format!("read {}", path.display()))?;
    Ok(buf)
}
