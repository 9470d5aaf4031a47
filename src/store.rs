//! Per-day country count tables on disk: one `DD-MM-YYYY.csv` per day with
//! columns `country,tweets`.

use crate::counting::CountryCounts;
use crate::date::Day;
use crate::util::{create_with_backoff, open_with_backoff, remove_with_backoff, replace_file_atomic_backoff};
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const COUNTRY_COLUMN: &str = "country";
pub const COUNT_COLUMN: &str = "tweets";

pub trait DayTableStore {
    /// `Ok(None)` when no table exists yet for `day`.
    fn read_day(&self, day: Day) -> Result<Option<CountryCounts>>;
    /// Replace the table for `day` as a whole.
    fn write_day(&mut self, day: Day, table: &CountryCounts) -> Result<()>;
    /// Days that currently have a table, ascending.
    fn list_days(&self) -> Result<Vec<Day>>;
}

fn day_file_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{2}-\d{2}-\d{4})\.csv$").expect("static regex"))
}

/// Directory of CSV day files. The directory is created on first write.
#[derive(Clone, Debug)]
pub struct CsvDayStore {
    dir: PathBuf,
    write_buf_bytes: usize,
}

impl CsvDayStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf(), write_buf_bytes: 64 * 1024 }
    }

    pub fn with_write_buffer(mut self, bytes: usize) -> Self {
        self.write_buf_bytes = bytes.max(8 * 1024);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, day: Day) -> PathBuf {
        self.dir.join(format!("{day}.csv"))
    }

    fn staging_path_for(&self, day: Day) -> PathBuf {
        self.dir.join(format!(".{day}.csv.inprogress"))
    }
}

/// Parse a count cell. Integers are expected; float renderings of whole numbers
/// (`"3.0"`) are accepted since dataframe tools sometimes write them.
fn parse_count(cell: &str) -> Option<u64> {
    let cell = cell.trim();
    if let Ok(n) = cell.parse::<u64>() {
        return Some(n);
    }
    let f: f64 = cell.parse().ok()?;
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0).then_some(f as u64)
}

/// Read a `country,tweets` table. Columns are located by header name, so extra
/// columns (e.g. an unnamed leading index) are ignored. Duplicate country rows are summed.
pub fn read_day_table(path: &Path) -> Result<CountryCounts> {
    let f = open_with_backoff(path, 16, 50).with_context(|| format!("open {}", path.display()))?;
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).flexible(true).from_reader(BufReader::new(f));

    let headers = rdr.headers().with_context(|| format!("read header of {}", path.display()))?.clone();
    let col = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
    let ci = col(COUNTRY_COLUMN).ok_or_else(|| anyhow!("{}: no '{}' column", path.display(), COUNTRY_COLUMN))?;
    let ni = col(COUNT_COLUMN).ok_or_else(|| anyhow!("{}: no '{}' column", path.display(), COUNT_COLUMN))?;

    let mut table = CountryCounts::new();
    for (row, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("{}: row {}", path.display(), row + 1))?;
        let country = rec.get(ci).map(str::trim).unwrap_or("");
        if country.is_empty() {
            continue;
        }
        let cell = rec.get(ni).unwrap_or("");
        let n = parse_count(cell)
            .ok_or_else(|| anyhow!("{}: row {}: bad count '{}'", path.display(), row + 1, cell))?;
        *table.entry(country.to_lowercase()).or_insert(0) += n;
    }
    Ok(table)
}

/// Write a table sorted by country, with a `country,tweets` header.
pub fn write_day_table<W: Write>(w: W, table: &CountryCounts) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(w);
    wtr.write_record([COUNTRY_COLUMN, COUNT_COLUMN])?;
    for (country, n) in table {
        wtr.serialize((country, n))?;
    }
    wtr.flush()?;
    Ok(())
}

impl DayTableStore for CsvDayStore {
    fn read_day(&self, day: Day) -> Result<Option<CountryCounts>> {
        let path = self.path_for(day);
        if !path.exists() {
            return Ok(None);
        }
        read_day_table(&path).map(Some)
    }

    /// Stage to a hidden file in the same directory, then promote over the old file,
    /// so a failed write leaves the previous table intact.
    fn write_day(&mut self, day: Day, table: &CountryCounts) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| format!("create {}", self.dir.display()))?;
        let staging = self.staging_path_for(day);
        let dest = self.path_for(day);

        let staged = (|| -> Result<()> {
            let f = create_with_backoff(&staging, 16, 50).with_context(|| format!("create {}", staging.display()))?;
            let mut w = BufWriter::with_capacity(self.write_buf_bytes, f);
            write_day_table(&mut w, table)?;
            w.flush().with_context(|| format!("flush {}", staging.display()))?;
            Ok(())
        })();
        if let Err(e) = staged {
            let _ = remove_with_backoff(&staging, 4, 25);
            return Err(e);
        }
        replace_file_atomic_backoff(&staging, &dest)
    }

    fn list_days(&self) -> Result<Vec<Day>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut days = Vec::new();
        for entry in fs::read_dir(&self.dir).with_context(|| format!("list {}", self.dir.display()))? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(caps) = day_file_re().captures(name) {
                if let Ok(day) = caps[1].parse::<Day>() {
                    days.push(day);
                }
            }
        }
        days.sort();
        Ok(days)
    }
}
