mod config;
mod date;
mod error;
mod paths;
mod record;
mod json_utils;

mod catalog;
mod alias;
mod resolve;

mod counting;
mod store;
mod merge;
mod flat;

mod progress;
mod concurrency;
mod util;
mod pipeline;

pub use crate::config::{DatePolicy, ETLOptions, MalformedPolicy, OutputMode};
pub use crate::date::{parse_created_at, DateError, Day};
pub use crate::error::EtlError;
pub use crate::pipeline::{Summary, TweetETL};

// Country reference catalog and the alias index built from it.
pub use crate::catalog::{BundledCatalog, Country, CountryCatalog, LocaleError};
pub use crate::alias::{
    AliasAttempt, AliasBuildReport, AliasHit, AliasTable, AliasTableBuilder, MatchStrategy, SkipReason,
    US_CANONICAL_FALLBACK,
};

// Record source and per-record resolution.
pub use crate::record::{parse_records, Place, RawRecord};
pub use crate::resolve::{LocationSource, Observation, Rejection, Resolver};

// Accumulator, day-table store and the merging flush.
pub use crate::counting::{merge_counts, CountryCounts, DayCounts, RejectTally};
pub use crate::store::{read_day_table, write_day_table, CsvDayStore, DayTableStore, COUNTRY_COLUMN, COUNT_COLUMN};
pub use crate::merge::{flush, merge_tables, FlushReport};
pub use crate::flat::{append_rows, FlatRow, FLAT_HEADER};

//export paths discovery so binaries can preview a run.
pub use crate::paths::{discover_inputs, FileJob};
pub use crate::util::init_tracing_once;
