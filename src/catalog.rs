//! Country reference catalog: ISO-3166 countries plus per-language territory names.
//!
//! The core only talks to `CountryCatalog`. `BundledCatalog` ships an embedded
//! dataset (ISO names, official names, spoken languages and a CLDR excerpt of
//! localized territory names); tests build small catalogs from JSON strings.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

const BUNDLED_COUNTRIES: &str = include_str!("../data/countries.json");
const BUNDLED_TERRITORY_NAMES: &str = include_str!("../data/territory_names.json");

/// One catalog entry. `name` is the display form; `canonical()` is the aggregation key.
#[derive(Clone, Debug, Deserialize)]
pub struct Country {
    pub alpha_2: String,
    pub name: String,
    #[serde(default)]
    pub official_name: Option<String>,
    /// Languages spoken in the territory, most widespread first.
    #[serde(default)]
    pub languages: Vec<String>,
}

impl Country {
    #[inline]
    pub fn canonical(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

/// Why a (language, territory) display name could not be produced.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LocaleError {
    #[error("no locale data for language '{language}'")]
    UnknownLocale { language: String },
    #[error("locale '{language}' has no display name for territory {territory}")]
    MissingTerritoryName { language: String, territory: String },
}

pub trait CountryCatalog {
    /// All countries, in catalog order.
    fn countries(&self) -> &[Country];

    /// Look up a country by its two-letter code (case-insensitive).
    fn by_alpha2(&self, code: &str) -> Option<&Country>;

    /// Display name of `territory` in `language`.
    fn territory_name(&self, language: &str, territory: &str) -> Result<&str, LocaleError>;

    /// Canonical (lowercase) names of every country, in catalog order.
    fn canonical_names(&self) -> Vec<String> {
        self.countries().iter().map(Country::canonical).collect()
    }
}

/// Catalog backed by JSON data: a country list and a `{language: {alpha_2: name}}` map.
#[derive(Clone, Debug)]
pub struct BundledCatalog {
    countries: Vec<Country>,
    by_code: HashMap<String, usize>,
    territory_names: HashMap<String, HashMap<String, String>>,
}

impl BundledCatalog {
    /// The dataset embedded in the binary.
    pub fn load() -> Result<Self> {
        Self::from_json(BUNDLED_COUNTRIES, BUNDLED_TERRITORY_NAMES).context("load bundled country catalog")
    }

    pub fn from_json(countries_json: &str, territory_names_json: &str) -> Result<Self> {
        let countries: Vec<Country> = serde_json::from_str(countries_json).context("parse country list")?;
        let territory_names: HashMap<String, HashMap<String, String>> =
            serde_json::from_str(territory_names_json).context("parse territory names")?;

        let mut by_code = HashMap::with_capacity(countries.len());
        for (i, c) in countries.iter().enumerate() {
            by_code.insert(c.alpha_2.to_ascii_uppercase(), i);
        }
        let territory_names = territory_names
            .into_iter()
            .map(|(lang, names)| {
                let names: HashMap<String, String> = names.into_iter().map(|(code, n)| (code.to_ascii_uppercase(), n)).collect();
                (lang.to_lowercase(), names)
            })
            .collect();

        Ok(Self { countries, by_code, territory_names })
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

impl CountryCatalog for BundledCatalog {
    fn countries(&self) -> &[Country] {
        &self.countries
    }

    fn by_alpha2(&self, code: &str) -> Option<&Country> {
        let code = code.trim();
        if code.len() != 2 {
            return None;
        }
        self.by_code.get(&code.to_ascii_uppercase()).map(|&i| &self.countries[i])
    }

    fn territory_name(&self, language: &str, territory: &str) -> Result<&str, LocaleError> {
        let names = self
            .territory_names
            .get(&language.to_lowercase())
            .ok_or_else(|| LocaleError::UnknownLocale { language: language.to_string() })?;
        names
            .get(&territory.to_ascii_uppercase())
            .map(String::as_str)
            .ok_or_else(|| LocaleError::MissingTerritoryName {
                language: language.to_string(),
                territory: territory.to_string(),
            })
    }
}
