use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tetl::{DatePolicy, MalformedPolicy, MatchStrategy, Summary, TweetETL};

const USAGE: &str = "2 arguments must be passed:\n\
    1st - the directory in which the tweet JSON files are stored;\n\
    2nd - the output location (a directory of per-day CSV files, or a CSV file with --flat).\n";

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Strategy {
    Longest,
    Insertion,
}

#[derive(Debug, Parser)]
#[command(name = "tetl", about = "Count posts per day and country from JSON record batches")]
struct Cli {
    /// Directory containing `*.json` input files.
    input_dir: PathBuf,
    /// Output directory for `DD-MM-YYYY.csv` day files (or a CSV file with --flat).
    output: PathBuf,
    /// Append one row per post to a single CSV instead of per-day counts.
    #[arg(long)]
    flat: bool,
    /// Alias match order for free-text locations.
    #[arg(long, value_enum, default_value = "longest")]
    strategy: Strategy,
    /// Abort on an unparseable created_at instead of rejecting the record.
    #[arg(long)]
    strict_dates: bool,
    /// Abort on an input file that is not a {"records": [...]} document.
    #[arg(long)]
    abort_on_malformed: bool,
    /// Number of input files processed at once.
    #[arg(long, default_value_t = 1)]
    jobs: usize,
    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,
}

fn report(summary: &Summary) {
    println!("Count of tweets with unrecognizable date or location: {}", summary.rejected);
    println!("Count of properly processed tweets: {}", summary.recognized);
    match summary.recognized_fraction() {
        Some(f) => println!("Fraction of recognized tweets: {:.4}", f),
        None => println!("Fraction of recognized tweets: n/a (no records)"),
    }
    if !summary.malformed_files.is_empty() {
        println!("Skipped {} malformed input file(s):", summary.malformed_files.len());
        for p in &summary.malformed_files {
            println!("  {}", p.display());
        }
    }
    if summary.days_written > 0 {
        println!("Day files written: {}", summary.days_written);
    }
    if summary.rows_appended > 0 {
        println!("Rows appended: {}", summary.rows_appended);
    }
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                e.print()?;
            } else {
                print!("{USAGE}");
            }
            return Ok(());
        }
    };

    let mut etl = TweetETL::new()
        .input_dir(&cli.input_dir)
        .match_strategy(match cli.strategy {
            Strategy::Longest => MatchStrategy::LongestFirst,
            Strategy::Insertion => MatchStrategy::InsertionOrder,
        })
        .file_concurrency(cli.jobs)
        .progress(!cli.no_progress)
        .progress_label("Processing files");
    etl = if cli.flat { etl.flat_output(&cli.output) } else { etl.output_dir(&cli.output) };
    if cli.strict_dates {
        etl = etl.date_policy(DatePolicy::Strict);
    }
    if cli.abort_on_malformed {
        etl = etl.malformed_policy(MalformedPolicy::Abort);
    }

    let summary = etl.run()?;
    report(&summary);
    Ok(())
}
