//! Record resolution: raw record -> (day, canonical country) or a rejection.

use crate::alias::AliasTable;
use crate::catalog::CountryCatalog;
use crate::date::{parse_created_at, Day};
use crate::record::RawRecord;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocationSource {
    /// `place.country_code` known to the catalog.
    Place,
    /// Alias found in `user.location`.
    FreeText,
}

/// A record that resolved to a day and a country.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Observation {
    pub day: Day,
    pub country: String,
    /// Text the country was derived from (`place.country` or the raw user location).
    pub original: String,
    pub source: LocationSource,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("record has no created_at")]
    MissingDate,
    #[error("created_at \"{input}\" could not be parsed")]
    UnparsableDate { input: String },
    #[error("no known country in place or user location")]
    UnresolvableLocation,
}

pub struct Resolver<'a, C: CountryCatalog + ?Sized> {
    catalog: &'a C,
    aliases: &'a AliasTable,
}

impl<'a, C: CountryCatalog + ?Sized> Resolver<'a, C> {
    pub fn new(catalog: &'a C, aliases: &'a AliasTable) -> Self {
        Self { catalog, aliases }
    }

    /// Date first, then location; either failing rejects the whole record.
    pub fn resolve(&self, record: &RawRecord) -> Result<Observation, Rejection> {
        let day = self.resolve_day(record)?;
        let (country, original, source) = self.resolve_location(record).ok_or(Rejection::UnresolvableLocation)?;
        Ok(Observation { day, country, original, source })
    }

    pub fn resolve_day(&self, record: &RawRecord) -> Result<Day, Rejection> {
        let raw = record.created_at.as_deref().ok_or(Rejection::MissingDate)?;
        parse_created_at(raw).map_err(|_| Rejection::UnparsableDate { input: raw.to_string() })
    }

    /// Structured place wins over free text, even when both would match.
    pub fn resolve_location(&self, record: &RawRecord) -> Option<(String, String, LocationSource)> {
        if let Some(place) = &record.place {
            if let Some(country) = place.country_code.as_deref().and_then(|cc| self.catalog.by_alpha2(cc)) {
                let original = place
                    .country
                    .clone()
                    .or_else(|| place.country_code.clone())
                    .unwrap_or_default();
                return Some((country.canonical(), original, LocationSource::Place));
            }
        }

        let location = record.user_location.as_deref()?;
        let hit = self.aliases.find_in(location)?;
        Some((hit.canonical.to_string(), location.to_string(), LocationSource::FreeText))
    }
}
