#[path = "common/mod.rs"]
mod common;

use common::*;
use serde_json::json;
use std::fs;
use tempfile::tempdir;
use tetl::{DatePolicy, EtlError, MalformedPolicy, MatchStrategy, RejectTally, TweetETL};

/// Two files, one geotagged US record and one free-text German record, against the
/// bundled catalog.
/// Outcome: a single 01-05-2021.csv with usa=1, germany=1, every other country at 0.
#[test]
fn two_files_one_day() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_records(
        input.path(),
        "a.json",
        &[place_record("2021-05-01T10:00:00Z", "US", "United States")],
    );
    write_records(
        input.path(),
        "b.json",
        &[location_record("2021-05-01T11:00:00Z", "somewhere in Germany")],
    );

    let summary = TweetETL::new()
        .input_dir(input.path())
        .output_dir(output.path())
        .progress(false)
        .run()
        .unwrap();

    assert_eq!(summary.files_processed, 2);
    assert_eq!(summary.recognized, 2);
    assert_eq!(summary.rejected, 0);
    assert_eq!(summary.recognized_fraction(), Some(1.0));
    assert_eq!(summary.days_written, 1);

    let names: Vec<String> = fs::read_dir(output.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["01-05-2021.csv".to_string()]);

    let table = read_counts(&output.path().join("01-05-2021.csv"));
    assert_eq!(table.len(), 249);
    assert_eq!(table["united states of america"], 1);
    assert_eq!(table["germany"], 1);
    assert_eq!(table.values().sum::<u64>(), 2);
}

/// Running the same batch twice into the same output doubles every count.
#[test]
fn rerun_accumulates() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_records(
        input.path(),
        "batch.json",
        &[
            place_record("2021-05-01T10:00:00Z", "FR", "France"),
            location_record("2021-05-02", "Kano, Nigeria"),
        ],
    );

    let etl = TweetETL::new().input_dir(input.path()).output_dir(output.path()).progress(false);
    etl.clone().run().unwrap();
    let second = etl.run().unwrap();
    assert_eq!(second.days_written, 2);

    assert_eq!(read_counts(&output.path().join("01-05-2021.csv"))["france"], 2);
    assert_eq!(read_counts(&output.path().join("02-05-2021.csv"))["nigeria"], 2);
    assert_eq!(read_counts(&output.path().join("02-05-2021.csv"))["niger"], 0);
}

/// An empty input directory is not an error; the fraction is undefined and no files appear.
#[test]
fn zero_records() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_records(input.path(), "empty.json", &[]);

    let summary = TweetETL::new()
        .input_dir(input.path())
        .output_dir(output.path())
        .progress(false)
        .run_with_catalog(&tiny_catalog())
        .unwrap();

    assert_eq!(summary.files_processed, 1);
    assert_eq!(summary.total_records(), 0);
    assert_eq!(summary.recognized_fraction(), None);
    assert_eq!(summary.days_written, 0);
    assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
}

/// Rejections are counted per reason and never stop the run.
#[test]
fn rejections_are_tallied() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_records(
        input.path(),
        "mixed.json",
        &[
            place_record("2021-05-01", "DE", "Germany"),
            json!({"place": {"country_code": "DE"}}),
            place_record("someday", "DE", "Germany"),
            location_record("2021-05-01", "The Moon"),
            location_record("2021-05-01", "Paris, France"),
        ],
    );

    let summary = TweetETL::new()
        .input_dir(input.path())
        .output_dir(output.path())
        .progress(false)
        .run_with_catalog(&tiny_catalog())
        .unwrap();

    assert_eq!(summary.recognized, 2);
    assert_eq!(summary.rejected, 3);
    assert_eq!(
        summary.rejections,
        RejectTally { missing_date: 1, unparsable_date: 1, unresolvable_location: 1 }
    );
    assert_eq!(summary.recognized_fraction(), Some(0.4));

    let table = read_counts(&output.path().join("01-05-2021.csv"));
    assert_eq!(table["germany"], 1);
    assert_eq!(table["france"], 1);
}

/// Strict date handling turns the first unparsable date into a run error.
#[test]
fn strict_dates_abort() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_records(input.path(), "bad_date.json", &[place_record("someday", "DE", "Germany")]);

    let err = TweetETL::new()
        .input_dir(input.path())
        .output_dir(output.path())
        .date_policy(DatePolicy::Strict)
        .progress(false)
        .run_with_catalog(&tiny_catalog())
        .unwrap_err();

    match err.downcast_ref::<EtlError>() {
        Some(EtlError::UnparsableDate { input, .. }) => assert_eq!(input, "someday"),
        other => panic!("expected unparsable date, got {other:?}"),
    }
    assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
}

/// Malformed files are skipped and listed by default, and abort the run when asked.
#[test]
fn malformed_files_skip_or_abort() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_records(input.path(), "good.json", &[place_record("2021-05-01", "NE", "Niger")]);
    fs::write(input.path().join("broken.json"), "{\"records\": [").unwrap();
    fs::write(input.path().join("wrong_shape.json"), "{\"tweets\": []}").unwrap();

    let summary = TweetETL::new()
        .input_dir(input.path())
        .output_dir(output.path())
        .progress(false)
        .run_with_catalog(&tiny_catalog())
        .unwrap();
    assert_eq!(summary.files_processed, 1);
    assert_eq!(summary.malformed_files.len(), 2);
    assert!(summary.malformed_files.contains(&input.path().join("broken.json")));
    assert_eq!(summary.recognized, 1);

    let err = TweetETL::new()
        .input_dir(input.path())
        .output_dir(output.path())
        .malformed_policy(MalformedPolicy::Abort)
        .progress(false)
        .run_with_catalog(&tiny_catalog())
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<EtlError>(), Some(EtlError::MalformedInputFile { .. })));

    // the aborted run wrote nothing, so the first run's count stands
    assert_eq!(read_counts(&output.path().join("01-05-2021.csv"))["niger"], 1);
}

/// Only `*.json` regular files directly inside the input directory are read.
#[test]
fn only_top_level_json_files() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_records(input.path(), "top.json", &[place_record("2021-05-01", "FR", "France")]);
    write_records(&input.path().join("nested"), "inner.json", &[place_record("2021-05-01", "FR", "France")]);
    fs::write(input.path().join("notes.txt"), "not json at all").unwrap();
    fs::create_dir(input.path().join("dir.json")).unwrap();

    let summary = TweetETL::new()
        .input_dir(input.path())
        .output_dir(output.path())
        .progress(false)
        .run_with_catalog(&tiny_catalog())
        .unwrap();
    assert_eq!(summary.files_processed, 1);
    assert!(summary.malformed_files.is_empty());
    assert_eq!(read_counts(&output.path().join("01-05-2021.csv"))["france"], 1);
}

/// A missing input directory is a run error.
#[test]
fn missing_input_dir() {
    let root = tempdir().unwrap();
    let err = TweetETL::new()
        .input_dir(root.path().join("absent"))
        .output_dir(root.path().join("out"))
        .progress(false)
        .run_with_catalog(&tiny_catalog())
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<EtlError>(), Some(EtlError::InputDir { .. })));
}

/// Processing files concurrently yields the same tables as a sequential run.
#[test]
fn concurrent_matches_sequential() {
    let input = tempdir().unwrap();
    for i in 0..7u8 {
        let records = vec![
            place_record(&format!("2021-05-0{}", 1 + i % 3), "DE", "Germany"),
            location_record(&format!("2021-05-0{}", 1 + i % 2), "Lagos, Nigeria"),
            location_record("2021-05-01", "nowhere"),
        ];
        write_records(input.path(), &format!("part_{i}.json"), &records);
    }

    let run = |jobs: usize, out: &std::path::Path| {
        TweetETL::new()
            .input_dir(input.path())
            .output_dir(out)
            .file_concurrency(jobs)
            .match_strategy(MatchStrategy::LongestFirst)
            .progress(false)
            .run_with_catalog(&tiny_catalog())
            .unwrap()
    };

    let seq_out = tempdir().unwrap();
    let par_out = tempdir().unwrap();
    let seq = run(1, seq_out.path());
    let par = run(3, par_out.path());

    assert_eq!(seq.recognized, 14);
    assert_eq!(seq.rejected, 7);
    assert_eq!(seq.recognized, par.recognized);
    assert_eq!(seq.rejections, par.rejections);
    for name in ["01-05-2021.csv", "02-05-2021.csv", "03-05-2021.csv"] {
        assert_eq!(read_counts(&seq_out.path().join(name)), read_counts(&par_out.path().join(name)), "{name}");
    }
    assert_eq!(read_counts(&seq_out.path().join("01-05-2021.csv"))["nigeria"], 4);
}
