//! Flush the accumulator into a `DayTableStore`, merging with what is already there.

use crate::counting::{merge_counts, CountryCounts, DayCounts};
use crate::date::Day;
use crate::error::EtlError;
use crate::store::DayTableStore;
use anyhow::Result;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Days that had no table before this flush.
    pub created: Vec<Day>,
    /// Days whose existing table was merged into.
    pub merged: Vec<Day>,
}

impl FlushReport {
    pub fn days_written(&self) -> usize {
        self.created.len() + self.merged.len()
    }
}

/// Union by country: counts present on both sides are summed, rows unique to
/// either side are kept.
pub fn merge_tables(mut base: CountryCounts, other: &CountryCounts) -> CountryCounts {
    merge_counts(&mut base, other.clone());
    base
}

/// Write every day of `counts` to `store`. Each day is read-merged-written on its
/// own; the first failing day aborts the flush with `EtlError::Persistence`, and
/// days already written stay written.
pub fn flush<S: DayTableStore + ?Sized>(counts: &DayCounts, store: &mut S) -> Result<FlushReport> {
    let mut report = FlushReport::default();
    for (&day, fresh) in counts.iter() {
        let persist_err = |e: anyhow::Error| EtlError::Persistence { day: day.to_string(), source: e.into() };

        let (table, existed) = match store.read_day(day).map_err(persist_err)? {
            Some(existing) => (merge_tables(existing, fresh), true),
            None => (fresh.clone(), false),
        };
        store.write_day(day, &table).map_err(persist_err)?;

        if existed {
            tracing::info!(day = %day, rows = table.len(), "merged into existing day file");
            report.merged.push(day);
        } else {
            tracing::info!(day = %day, rows = table.len(), "wrote new day file");
            report.created.push(day);
        }
    }
    Ok(report)
}
