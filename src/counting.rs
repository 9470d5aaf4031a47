//! In-memory reducers: the day -> country -> count accumulator and rejection tallies,
//! each with a merge helper for combining per-file partials.

use crate::catalog::CountryCatalog;
use crate::date::Day;
use crate::resolve::{Observation, Rejection};
use std::collections::btree_map;
use std::collections::BTreeMap;

pub type CountryCounts = BTreeMap<String, u64>;

/// Day-country count table. Each day is created with every template country at zero.
#[derive(Clone, Debug, Default)]
pub struct DayCounts {
    zero: CountryCounts,
    days: BTreeMap<Day, CountryCounts>,
}

impl DayCounts {
    pub fn new<I, S>(countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let zero = countries.into_iter().map(|c| (c.as_ref().to_lowercase(), 0)).collect();
        Self { zero, days: BTreeMap::new() }
    }

    pub fn for_catalog<C: CountryCatalog + ?Sized>(catalog: &C) -> Self {
        Self::new(catalog.canonical_names())
    }

    /// Same country template, no days.
    pub fn empty_like(&self) -> Self {
        Self { zero: self.zero.clone(), days: BTreeMap::new() }
    }

    pub fn record(&mut self, day: Day, country: &str) {
        let zero = &self.zero;
        let table = self.days.entry(day).or_insert_with(|| zero.clone());
        match table.get_mut(country) {
            Some(n) => *n += 1,
            None => {
                table.insert(country.to_string(), 1);
            }
        }
    }

    #[inline]
    pub fn record_observation(&mut self, obs: &Observation) {
        self.record(obs.day, &obs.country);
    }

    pub fn get(&self, day: Day) -> Option<&CountryCounts> {
        self.days.get(&day)
    }

    pub fn count(&self, day: Day, country: &str) -> u64 {
        self.days.get(&day).and_then(|t| t.get(country)).copied().unwrap_or(0)
    }

    pub fn days(&self) -> impl Iterator<Item = Day> + '_ {
        self.days.keys().copied()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Day, CountryCounts> {
        self.days.iter()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.days.values().flat_map(|t| t.values()).sum()
    }

    /// Sum `other` into `self`, day by day and country by country.
    pub fn merge(&mut self, other: DayCounts) {
        for (day, table) in other.days {
            match self.days.entry(day) {
                btree_map::Entry::Vacant(e) => {
                    e.insert(table);
                }
                btree_map::Entry::Occupied(mut e) => merge_counts(e.get_mut(), table),
            }
        }
    }
}

pub fn merge_counts(total: &mut CountryCounts, part: CountryCounts) {
    for (k, v) in part {
        *total.entry(k).or_insert(0) += v;
    }
}

/// Per-reason rejection counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RejectTally {
    pub missing_date: u64,
    pub unparsable_date: u64,
    pub unresolvable_location: u64,
}

impl RejectTally {
    pub fn note(&mut self, r: &Rejection) {
        match r {
            Rejection::MissingDate => self.missing_date += 1,
            Rejection::UnparsableDate { .. } => self.unparsable_date += 1,
            Rejection::UnresolvableLocation => self.unresolvable_location += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.missing_date + self.unparsable_date + self.unresolvable_location
    }

    pub fn merge(&mut self, other: RejectTally) {
        self.missing_date += other.missing_date;
        self.unparsable_date += other.unparsable_date;
        self.unresolvable_location += other.unresolvable_location;
    }
}
