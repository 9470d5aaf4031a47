use crate::alias::MatchStrategy;
use std::path::{Path, PathBuf};

/// Where resolved records go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// One `DD-MM-YYYY.csv` per day under `dir`, merged with existing files.
    Daily { dir: PathBuf },
    /// A single `date,place,original place` CSV, appended to across runs.
    Flat { file: PathBuf },
}

/// What an unparseable `created_at` does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DatePolicy {
    /// Reject that record and keep going.
    #[default]
    Reject,
    /// Abort the run.
    Strict,
}

/// What an input file that is not a `{"records": [...]}` document does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Log it, count it in the summary and continue with the next file.
    #[default]
    Skip,
    /// Abort the run.
    Abort,
}

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct ETLOptions {
    pub input_dir: PathBuf,
    pub output: OutputMode,
    pub match_strategy: MatchStrategy,
    pub date_policy: DatePolicy,
    pub malformed_policy: MalformedPolicy,
    pub file_concurrency: usize,        // input files processed at once; 1 = sequential
    pub progress: bool,                 // show progress bar
    pub progress_label: Option<String>, // optional label for progress bar

    // IO tuning
    pub read_buffer_bytes: usize,  // BufReader capacity
    pub write_buffer_bytes: usize, // BufWriter capacity
}

impl Default for ETLOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./data"),
            output: OutputMode::Daily { dir: PathBuf::from("./output") },
            match_strategy: MatchStrategy::LongestFirst,
            date_policy: DatePolicy::Reject,
            malformed_policy: MalformedPolicy::Skip,
            file_concurrency: 1,
            progress: true,
            progress_label: None,
            read_buffer_bytes: 256 * 1024,
            write_buffer_bytes: 64 * 1024,
        }
    }
}

impl ETLOptions {
    pub fn with_input_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.input_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_daily_output(mut self, dir: impl AsRef<Path>) -> Self {
        self.output = OutputMode::Daily { dir: dir.as_ref().to_path_buf() };
        self
    }
    pub fn with_flat_output(mut self, file: impl AsRef<Path>) -> Self {
        self.output = OutputMode::Flat { file: file.as_ref().to_path_buf() };
        self
    }
    pub fn with_match_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.match_strategy = strategy;
        self
    }
    pub fn with_date_policy(mut self, policy: DatePolicy) -> Self {
        self.date_policy = policy;
        self
    }
    pub fn with_malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.malformed_policy = policy;
        self
    }
    pub fn with_file_concurrency(mut self, n: usize) -> Self {
        self.file_concurrency = n.max(1);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }

    // IO buffers tuning
    pub fn with_io_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_io_write_buffer(mut self, bytes: usize) -> Self {
        self.write_buffer_bytes = bytes.max(8 * 1024);
        self
    }
}
