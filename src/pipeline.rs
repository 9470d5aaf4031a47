use crate::alias::{AliasTable, MatchStrategy};
use crate::catalog::{BundledCatalog, CountryCatalog};
use crate::concurrency::process_files_limited;
use crate::config::{DatePolicy, ETLOptions, MalformedPolicy, OutputMode};
use crate::counting::{DayCounts, RejectTally};
use crate::error::EtlError;
use crate::flat::{append_rows, FlatRow};
use crate::merge::flush;
use crate::paths::{discover_inputs, FileJob};
use crate::progress::maybe_count_progress;
use crate::record::{parse_records, read_input_bytes};
use crate::resolve::{Rejection, Resolver};
use crate::store::CsvDayStore;
use crate::util::init_tracing_once;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

#[derive(Clone)]
pub struct TweetETL {
    pub(crate) opts: ETLOptions,
}

impl Default for TweetETL {
    fn default() -> Self {
        Self::new()
    }
}

/// End-of-run statistics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Summary {
    pub files_processed: usize,
    /// Input files skipped because they were not `{"records": [...]}` documents.
    pub malformed_files: Vec<PathBuf>,
    pub recognized: u64,
    pub rejected: u64,
    pub rejections: RejectTally,
    /// Aggregated mode: day files created or merged into.
    pub days_written: usize,
    /// Flat mode: rows appended.
    pub rows_appended: u64,
}

impl Summary {
    pub fn total_records(&self) -> u64 {
        self.recognized + self.rejected
    }

    /// recognized / (recognized + rejected); `None` when there were no records.
    pub fn recognized_fraction(&self) -> Option<f64> {
        match self.total_records() {
            0 => None,
            total => Some(self.recognized as f64 / total as f64),
        }
    }
}

/// Per-file accumulation target; shape depends on the output mode.
enum Sink {
    Daily(DayCounts),
    Flat(Vec<FlatRow>),
}

impl Sink {
    fn empty_like(&self) -> Self {
        match self {
            Sink::Daily(c) => Sink::Daily(c.empty_like()),
            Sink::Flat(_) => Sink::Flat(Vec::new()),
        }
    }

    fn merge(&mut self, other: Sink) {
        match (self, other) {
            (Sink::Daily(a), Sink::Daily(b)) => a.merge(b),
            (Sink::Flat(a), Sink::Flat(b)) => a.extend(b),
            _ => unreachable!("sinks of one run share a mode"),
        }
    }
}

/// Result of resolving every record of one file.
struct FilePart {
    sink: Sink,
    recognized: u64,
    rejections: RejectTally,
}

enum FileOutcome {
    Parsed(FilePart),
    Malformed { reason: String },
}

/// Running state threaded through the fold over input files.
struct Tally {
    sink: Sink,
    files_processed: usize,
    malformed_files: Vec<PathBuf>,
    recognized: u64,
    rejections: RejectTally,
}

impl TweetETL {
    pub fn new() -> Self {
        Self { opts: ETLOptions::default() }
    }

    // -------- Builder methods --------
    pub fn input_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_input_dir(dir); self }
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_daily_output(dir); self }
    pub fn flat_output(mut self, file: impl AsRef<Path>) -> Self { self.opts = self.opts.with_flat_output(file); self }
    pub fn match_strategy(mut self, s: MatchStrategy) -> Self { self.opts = self.opts.with_match_strategy(s); self }
    pub fn date_policy(mut self, p: DatePolicy) -> Self { self.opts = self.opts.with_date_policy(p); self }
    pub fn malformed_policy(mut self, p: MalformedPolicy) -> Self { self.opts = self.opts.with_malformed_policy(p); self }
    pub fn file_concurrency(mut self, n: usize) -> Self { self.opts = self.opts.with_file_concurrency(n); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn io_read_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_read_buffer(bytes); self }
    pub fn io_write_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_write_buffer(bytes); self }

    pub fn options(&self) -> &ETLOptions {
        &self.opts
    }

    /// Run against the bundled country catalog.
    pub fn run(self) -> Result<Summary> {
        let catalog = BundledCatalog::load()?;
        self.run_with_catalog(&catalog)
    }

    /// Resolve every record of every input file, then write the output once.
    pub fn run_with_catalog<C>(&self, catalog: &C) -> Result<Summary>
    where
        C: CountryCatalog + Sync + ?Sized,
    {
        init_tracing_once();
        if self.opts.file_concurrency > 1 {
            rayon::ThreadPoolBuilder::new().num_threads(self.opts.file_concurrency).build_global().ok();
        }

        let (aliases, report) = AliasTable::build_with_report(catalog, self.opts.match_strategy);
        tracing::info!(
            aliases = aliases.len(),
            skipped = report.skipped(),
            collisions = report.overwritten,
            "country alias table ready"
        );
        let resolver = Resolver::new(catalog, &aliases);

        let files = discover_inputs(&self.opts.input_dir)?;
        if files.is_empty() {
            tracing::warn!("No .json files found in {}.", self.opts.input_dir.display());
        } else {
            tracing::info!("Planned {} files for processing.", files.len());
        }

        let empty = match &self.opts.output {
            OutputMode::Daily { .. } => Sink::Daily(DayCounts::for_catalog(catalog)),
            OutputMode::Flat { .. } => Sink::Flat(Vec::new()),
        };
        let mut tally = Tally {
            sink: empty.empty_like(),
            files_processed: 0,
            malformed_files: Vec::new(),
            recognized: 0,
            rejections: RejectTally::default(),
        };

        let pb = maybe_count_progress(self.opts.progress, files.len() as u64, self.opts.progress_label.as_deref());

        process_files_limited(
            &files,
            self.opts.file_concurrency,
            |job| self.process_file(job, &resolver, &empty),
            |job, outcome| {
                self.absorb(&mut tally, job, outcome)?;
                if let Some(pb) = &pb {
                    pb.inc(1);
                }
                Ok(())
            },
        )?;

        if let Some(pb) = pb {
            pb.finish_with_message("done");
        }

        let mut summary = Summary {
            files_processed: tally.files_processed,
            malformed_files: tally.malformed_files,
            recognized: tally.recognized,
            rejected: tally.rejections.total(),
            rejections: tally.rejections,
            ..Summary::default()
        };

        match (&self.opts.output, tally.sink) {
            (OutputMode::Daily { dir }, Sink::Daily(counts)) => {
                let mut store = CsvDayStore::new(dir).with_write_buffer(self.opts.write_buffer_bytes);
                let flushed = flush(&counts, &mut store)?;
                summary.days_written = flushed.days_written();
            }
            (OutputMode::Flat { file }, Sink::Flat(rows)) => {
                append_rows(file, &rows, self.opts.write_buffer_bytes)
                    .with_context(|| format!("write flat listing {}", file.display()))?;
                summary.rows_appended = rows.len() as u64;
            }
            _ => unreachable!("sink shape follows output mode"),
        }

        tracing::info!(
            recognized = summary.recognized,
            rejected = summary.rejected,
            malformed_files = summary.malformed_files.len(),
            "run complete"
        );
        Ok(summary)
    }

    fn process_file<C>(&self, job: &FileJob, resolver: &Resolver<'_, C>, empty: &Sink) -> Result<FileOutcome>
    where
        C: CountryCatalog + ?Sized,
    {
        let bytes = read_input_bytes(&job.path, self.opts.read_buffer_bytes)?;
        let records = match parse_records(&bytes) {
            Ok(r) => r,
            Err(e) => return Ok(FileOutcome::Malformed { reason: format!("{e:#}") }),
        };

        let start = FilePart { sink: empty.empty_like(), recognized: 0, rejections: RejectTally::default() };
        let part = records.iter().try_fold(start, |mut part, rec| -> Result<FilePart> {
            match resolver.resolve(rec) {
                Ok(obs) => {
                    match &mut part.sink {
                        Sink::Daily(c) => c.record_observation(&obs),
                        Sink::Flat(rows) => rows.push(FlatRow::from(&obs)),
                    }
                    part.recognized += 1;
                }
                Err(Rejection::UnparsableDate { input }) if self.opts.date_policy == DatePolicy::Strict => {
                    return Err(EtlError::UnparsableDate { path: job.path.clone(), input }.into());
                }
                Err(r) => {
                    tracing::trace!(file = %job.name, reason = %r, "record rejected");
                    part.rejections.note(&r);
                }
            }
            Ok(part)
        })?;
        Ok(FileOutcome::Parsed(part))
    }

    fn absorb(&self, tally: &mut Tally, job: &FileJob, outcome: FileOutcome) -> Result<()> {
        match outcome {
            FileOutcome::Parsed(part) => {
                tracing::info!(
                    file = %job.name,
                    recognized = part.recognized,
                    rejected = part.rejections.total(),
                    "File {} preprocessed successfully!",
                    job.name
                );
                tally.sink.merge(part.sink);
                tally.recognized += part.recognized;
                tally.rejections.merge(part.rejections);
                tally.files_processed += 1;
            }
            FileOutcome::Malformed { reason } => {
                if self.opts.malformed_policy == MalformedPolicy::Abort {
                    return Err(EtlError::MalformedInputFile { path: job.path.clone(), reason }.into());
                }
                tracing::warn!(path = %job.path.display(), %reason, "Skipping malformed input file");
                tally.malformed_files.push(job.path.clone());
            }
        }
        Ok(())
    }
}
