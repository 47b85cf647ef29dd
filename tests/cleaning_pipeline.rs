//! End-to-end runs: config file + dataset on disk → cleaned tables on disk.

use std::fs;
use std::path::{Path, PathBuf};

use construct_sieve::config::Config;
use construct_sieve::data::filter::TargetPair;
use construct_sieve::error::FilterError;
use construct_sieve::session::Session;
use tempfile::TempDir;

const CONFIG: &str = r#"{
    "constructs": {
        "C1": "a, b, c",
        "C2": ["d", "e"]
    }
}"#;

// C1 means: 3, 4, 4, 3, 5 ; C2 means: 3, 6, 4, 3.5, 5
const DATA: &str = "\
id,a,b,c,d,e
r1,1,1,7,3,3
r2,3,4,5,6,6
r3,4,4,4,4,4
r4,7,1,1,3,4
r5,5,5,5,5,5
";

struct Fixture {
    _dir: TempDir,
    config: PathBuf,
    input: PathBuf,
    output: PathBuf,
}

fn fixture(config: &str, data: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    let input = dir.path().join("wave1.csv");
    fs::write(&config_path, config).unwrap();
    fs::write(&input, data).unwrap();
    let output = dir.path().join("cleaned_data");
    Fixture {
        config: config_path,
        input,
        output,
        _dir: dir,
    }
}

fn open(f: &Fixture) -> anyhow::Result<Session> {
    let config = Config::load(&f.config)?;
    Session::open(&config, &f.input, &f.output)
}

fn ids(path: &Path) -> Vec<String> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader
        .records()
        .map(|r| r.unwrap().get(0).unwrap().to_string())
        .collect()
}

#[test]
fn mean_threshold_run_writes_kept_rows() {
    let f = fixture(CONFIG, DATA);
    let session = open(&f).unwrap();

    let run = session.run_mean_threshold(1.0, false).unwrap();
    assert_eq!(run.outcome.discarded, vec![1, 4]);
    assert_eq!(run.destination, f.output.join("wave1_1.0_cleaned.csv"));
    assert_eq!(ids(&run.destination), vec!["r2", "r3", "r5"]);

    let header = fs::read_to_string(&run.destination).unwrap();
    assert!(header.starts_with("id,a,b,c,d,e\n"));
}

#[test]
fn overlap_run_writes_kept_rows() {
    let f = fixture(CONFIG, DATA);
    let session = open(&f).unwrap();
    let pair = TargetPair::parse("C1, C2").unwrap();

    let run = session.run_overlap(&pair, 0.5, false).unwrap();
    // differences: 0, 2, 0, 0.5, 0
    assert_eq!(run.outcome.discarded, vec![1, 3, 5]);
    assert_eq!(
        run.destination,
        f.output.join("wave1_C1, C2_0.5_overlap_cleaned.csv")
    );
    assert_eq!(ids(&run.destination), vec!["r2", "r4"]);
}

#[test]
fn runs_are_independent() {
    let f = fixture(CONFIG, DATA);
    let session = open(&f).unwrap();
    let pair = TargetPair::parse("C1,C2").unwrap();

    let mean_run = session.run_mean_threshold(1.0, false).unwrap();
    let overlap_run = session.run_overlap(&pair, 0.5, false).unwrap();
    assert_ne!(mean_run.destination, overlap_run.destination);
    assert_eq!(session.survey().len(), 5);
    assert_eq!(ids(&mean_run.destination).len(), 3);
    assert_eq!(ids(&overlap_run.destination).len(), 2);
}

#[test]
fn cleaned_output_is_stable_under_rerun() {
    let f = fixture(CONFIG, DATA);
    let first = open(&f).unwrap().run_mean_threshold(1.0, false).unwrap();

    let config = Config::load(&f.config).unwrap();
    let rerun_dir = f.output.join("rerun");
    let session = Session::open(&config, &first.destination, &rerun_dir).unwrap();
    let second = session.run_mean_threshold(1.0, false).unwrap();
    assert!(second.outcome.discarded.is_empty());
    assert_eq!(ids(&second.destination), ids(&first.destination));
}

#[test]
fn out_of_range_value_aborts_before_output() {
    let data = "a,b,c,d,e\n1,2,3,4,5\n1,2,9,4,5\n";
    let f = fixture(CONFIG, data);

    let err = open(&f).err().unwrap();
    match err.downcast_ref::<FilterError>() {
        Some(FilterError::RangeViolation {
            row, column, value, ..
        }) => {
            assert_eq!(*row, 2);
            assert_eq!(column, "c");
            assert_eq!(value, "9");
        }
        other => panic!("expected range violation, got {other:?}"),
    }
    assert!(!f.output.exists());
}

#[test]
fn missing_construct_column_is_reported() {
    let f = fixture(CONFIG, "a,b,c,d\n1,2,3,4\n");
    let err = open(&f).err().unwrap();
    assert!(matches!(
        err.downcast_ref::<FilterError>(),
        Some(FilterError::MissingColumn { column, .. }) if column == "e"
    ));
}

#[test]
fn unknown_target_construct_writes_nothing() {
    let f = fixture(CONFIG, DATA);
    let session = open(&f).unwrap();
    let pair = TargetPair::parse("C1, Nope").unwrap();

    let err = session.run_overlap(&pair, 0.5, false).unwrap_err();
    assert!(matches!(err, FilterError::UnknownConstruct(ref name) if name == "Nope"));
    assert!(!f.output.exists());
}

#[test]
fn empty_construct_mapping_is_fatal() {
    let f = fixture(r#"{ "constructs": {} }"#, DATA);
    let err = open(&f).err().unwrap();
    assert!(matches!(
        err.downcast_ref::<FilterError>(),
        Some(FilterError::Schema(_))
    ));
}

#[test]
fn verbose_run_carries_a_trace() {
    let f = fixture(CONFIG, DATA);
    let session = open(&f).unwrap();
    let run = session.run_mean_threshold(1.0, true).unwrap();
    let lines = construct_sieve::report::render_trace(run.outcome.trace.as_deref().unwrap());
    assert_eq!(
        lines[0],
        "Checking construct 'C1' with values: [1, 1, 7], mean: 3.000, threshold: 3.000"
    );
    assert_eq!(lines[1], "Row #1: Value 7 exceeds threshold. Marking for discard.");
}
