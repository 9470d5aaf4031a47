#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tetl::{read_day_table, BundledCatalog, CountryCounts, Day};

/// Five countries, chosen so that:
///   - "niger" is a substring of "nigeria" (match-order tests),
///   - DE lists a language with no locale data ("xx") and one whose locale lacks DE ("fr"),
///   - the US canonical name is "united states of america" and its English name is "united states".
pub const TINY_COUNTRIES: &str = r#"[
  {"alpha_2": "US", "name": "United States of America", "official_name": "United States of America", "languages": ["en", "es"]},
  {"alpha_2": "DE", "name": "Germany", "official_name": "Federal Republic of Germany", "languages": ["de", "en", "fr", "xx"]},
  {"alpha_2": "FR", "name": "France", "official_name": "French Republic", "languages": ["fr", "en"]},
  {"alpha_2": "NE", "name": "Niger", "official_name": "Republic of the Niger", "languages": ["fr", "ha"]},
  {"alpha_2": "NG", "name": "Nigeria", "official_name": "Federal Republic of Nigeria", "languages": ["en", "ha"]}
]"#;

pub const TINY_TERRITORY_NAMES: &str = r#"{
  "en": {"US": "United States", "DE": "Germany", "FR": "France", "NE": "Niger", "NG": "Nigeria"},
  "de": {"DE": "Deutschland"},
  "es": {"US": "Estados Unidos"},
  "fr": {"FR": "France", "NE": "Niger"},
  "ha": {"NE": "Nijar", "NG": "Najeriya"}
}"#;

pub const TINY_CANONICAL: [&str; 5] = ["united states of america", "germany", "france", "niger", "nigeria"];

pub fn tiny_catalog() -> BundledCatalog {
    BundledCatalog::from_json(TINY_COUNTRIES, TINY_TERRITORY_NAMES).unwrap()
}

pub fn day(y: i32, m: u8, d: u8) -> Day {
    Day::new(y, m, d).unwrap()
}

/// A record with a structured place.
pub fn place_record(created_at: &str, code: &str, country: &str) -> Value {
    json!({
        "created_at": created_at,
        "place": {"country_code": code, "country": country},
        "user": {"location": null}
    })
}

/// A record with only a free-text user location.
pub fn location_record(created_at: &str, location: &str) -> Value {
    json!({
        "created_at": created_at,
        "place": null,
        "user": {"location": location}
    })
}

/// Write `{"records": [...]}` to `dir/name`.
pub fn write_records(dir: &Path, name: &str, records: &[Value]) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    let doc = json!({ "records": records });
    fs::write(&path, serde_json::to_vec_pretty(&doc).unwrap()).unwrap();
    path
}

/// Read a day file back as country -> count.
pub fn read_counts(path: &Path) -> CountryCounts {
    read_day_table(path).unwrap()
}

/// Read a text file line-by-line into strings (skips empty lines).
pub fn read_lines(path: &Path) -> Vec<String> {
    let f = File::open(path).unwrap();
    let r = BufReader::new(f);
    r.lines().map(|l| l.unwrap()).filter(|s| !s.is_empty()).collect()
}
