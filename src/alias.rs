//! Country alias index: lowercase name variants -> canonical country name.
//!
//! Built once from a `CountryCatalog` and immutable afterwards. Every insert attempt
//! is accounted for in an `AliasBuildReport` so locale gaps are visible instead of
//! silently dropped.

use crate::catalog::{CountryCatalog, LocaleError};
use ahash::AHashMap;

/// Fallback canonical name for the fixed "usa" alias when the catalog has no `US` entry.
pub const US_CANONICAL_FALLBACK: &str = "united states of america";

/// Order in which alias keys are tried against free text. First containment wins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Longest key first (by characters), ties broken lexicographically.
    #[default]
    LongestFirst,
    /// Keys in first-insertion order. A key that is overwritten keeps its slot.
    InsertionOrder,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    EmptyName,
    Locale(LocaleError),
}

/// Outcome of a single insert attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AliasAttempt {
    Inserted,
    /// Key already mapped to the same canonical name.
    Unchanged,
    /// Key already mapped elsewhere; the later insert wins.
    Overwrote { previous: String },
    Skipped(SkipReason),
}

#[derive(Clone, Debug, Default)]
pub struct AliasBuildReport {
    pub inserted: usize,
    pub unchanged: usize,
    pub overwritten: usize,
    pub skipped_empty: usize,
    pub skipped_unknown_locale: usize,
    pub skipped_missing_name: usize,
    /// (key, previous canonical, new canonical) for every overwrite.
    pub collisions: Vec<(String, String, String)>,
}

impl AliasBuildReport {
    fn note(&mut self, key: &str, canonical: &str, attempt: &AliasAttempt) {
        match attempt {
            AliasAttempt::Inserted => self.inserted += 1,
            AliasAttempt::Unchanged => self.unchanged += 1,
            AliasAttempt::Overwrote { previous } => {
                self.overwritten += 1;
                self.collisions.push((key.to_string(), previous.clone(), canonical.to_string()));
            }
            AliasAttempt::Skipped(SkipReason::EmptyName) => self.skipped_empty += 1,
            AliasAttempt::Skipped(SkipReason::Locale(LocaleError::UnknownLocale { .. })) => {
                self.skipped_unknown_locale += 1
            }
            AliasAttempt::Skipped(SkipReason::Locale(LocaleError::MissingTerritoryName { .. })) => {
                self.skipped_missing_name += 1
            }
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped_empty + self.skipped_unknown_locale + self.skipped_missing_name
    }
}

/// Mutable staging area for an `AliasTable`.
#[derive(Default)]
pub struct AliasTableBuilder {
    entries: Vec<(String, String)>,
    index: AHashMap<String, usize>,
}

impl AliasTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `variant -> canonical`, both normalized to trimmed lowercase.
    pub fn insert(&mut self, variant: &str, canonical: &str) -> AliasAttempt {
        let key = variant.trim().to_lowercase();
        if key.is_empty() {
            return AliasAttempt::Skipped(SkipReason::EmptyName);
        }
        let canonical = canonical.trim().to_lowercase();
        match self.index.get(&key) {
            Some(&i) if self.entries[i].1 == canonical => AliasAttempt::Unchanged,
            Some(&i) => {
                let previous = std::mem::replace(&mut self.entries[i].1, canonical);
                AliasAttempt::Overwrote { previous }
            }
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, canonical));
                AliasAttempt::Inserted
            }
        }
    }

    pub fn finish(self, strategy: MatchStrategy) -> AliasTable {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        if strategy == MatchStrategy::LongestFirst {
            let entries = &self.entries;
            order.sort_by(|&a, &b| {
                let (ka, kb) = (&entries[a].0, &entries[b].0);
                kb.chars().count().cmp(&ka.chars().count()).then_with(|| ka.cmp(kb))
            });
        }
        AliasTable { entries: self.entries, index: self.index, order, strategy }
    }
}

/// A successful free-text match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AliasHit<'a> {
    pub key: &'a str,
    pub canonical: &'a str,
}

#[derive(Clone, Debug)]
pub struct AliasTable {
    entries: Vec<(String, String)>,
    index: AHashMap<String, usize>,
    order: Vec<usize>,
    strategy: MatchStrategy,
}

impl AliasTable {
    /// Build with the default match strategy, discarding the report.
    pub fn build<C: CountryCatalog + ?Sized>(catalog: &C) -> Self {
        Self::build_with_report(catalog, MatchStrategy::default()).0
    }

    /// For every country insert: canonical name, official name, and the territory's
    /// display name in each language spoken there. Then the fixed "usa" alias.
    pub fn build_with_report<C: CountryCatalog + ?Sized>(
        catalog: &C,
        strategy: MatchStrategy,
    ) -> (Self, AliasBuildReport) {
        let mut builder = AliasTableBuilder::new();
        let mut report = AliasBuildReport::default();

        for country in catalog.countries() {
            let canonical = country.canonical();

            let attempt = builder.insert(&canonical, &canonical);
            report.note(&canonical, &canonical, &attempt);

            if let Some(official) = country.official_name.as_deref() {
                let attempt = builder.insert(official, &canonical);
                report.note(official, &canonical, &attempt);
            }

            for lang in &country.languages {
                let attempt = match catalog.territory_name(lang, &country.alpha_2) {
                    Ok(local) => {
                        let a = builder.insert(local, &canonical);
                        report.note(local, &canonical, &a);
                        a
                    }
                    Err(e) => {
                        let a = AliasAttempt::Skipped(SkipReason::Locale(e));
                        report.note("", &canonical, &a);
                        a
                    }
                };
                tracing::trace!(lang = %lang, territory = %country.alpha_2, ?attempt, "alias attempt");
            }
        }

        let us = catalog
            .by_alpha2("US")
            .map(|c| c.canonical())
            .unwrap_or_else(|| US_CANONICAL_FALLBACK.to_string());
        let attempt = builder.insert("usa", &us);
        report.note("usa", &us, &attempt);

        let table = builder.finish(strategy);
        tracing::debug!(
            aliases = table.len(),
            inserted = report.inserted,
            overwritten = report.overwritten,
            skipped_unknown_locale = report.skipped_unknown_locale,
            skipped_missing_name = report.skipped_missing_name,
            "alias table built"
        );
        for (key, prev, new) in &report.collisions {
            tracing::debug!("alias '{}' remapped: {} -> {}", key, prev, new);
        }
        (table, report)
    }

    /// Build a table from explicit pairs (inserted in iteration order).
    pub fn from_pairs<I, K, V>(pairs: I, strategy: MatchStrategy) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut builder = AliasTableBuilder::new();
        for (k, v) in pairs {
            builder.insert(k.as_ref(), v.as_ref());
        }
        builder.finish(strategy)
    }

    pub fn get(&self, variant: &str) -> Option<&str> {
        let key = variant.trim().to_lowercase();
        self.index.get(&key).map(|&i| self.entries[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    /// Keys in the order `find_in` tries them.
    pub fn keys_in_match_order(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(move |&i| self.entries[i].0.as_str())
    }

    /// First key (in match order) contained in the lowercased `text`.
    pub fn find_in(&self, text: &str) -> Option<AliasHit<'_>> {
        let hay = text.to_lowercase();
        self.order.iter().find_map(|&i| {
            let (key, canonical) = &self.entries[i];
            if hay.contains(key.as_str()) {
                Some(AliasHit { key: key.as_str(), canonical: canonical.as_str() })
            } else {
                None
            }
        })
    }
}
