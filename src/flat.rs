//! Flat listing mode: one `date,place,original place` row per resolved record,
//! appended to a single CSV across runs.

use crate::resolve::Observation;
use crate::util::append_with_backoff;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const FLAT_HEADER: [&str; 3] = ["date", "place", "original place"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FlatRow {
    pub date: String,
    pub place: String,
    pub original: String,
}

impl From<&Observation> for FlatRow {
    fn from(obs: &Observation) -> Self {
        Self { date: obs.day.iso(), place: obs.country.clone(), original: obs.original.clone() }
    }
}

/// Append `rows` to `path`. The header is written only when the file is new or empty.
pub fn append_rows(path: &Path, rows: &[FlatRow], write_buf_bytes: usize) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let needs_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let f = append_with_backoff(path, 16, 50).with_context(|| format!("open {} for append", path.display()))?;
    let mut w = BufWriter::with_capacity(write_buf_bytes.max(8 * 1024), f);
    {
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(&mut w);
        if needs_header {
            wtr.write_record(FLAT_HEADER)?;
        }
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
    }
    w.flush().with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}
