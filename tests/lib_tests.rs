use clap::Parser;
use log::{Level, Log, Metadata};
use ctgpipe::PayloadReader;
use ctgpipe::ctg::{
    Classification, CtgTrace, DictReader, FisherClassifier, draw_trace, parse_trace,
    python_literal_to_json, render_trace,
};
use ctgpipe::engine::arg_parser::{Cli, RunArgs};
use ctgpipe::engine::{compare, compare_results, load_expected};
use ctgpipe::pipeline::{chart_index, chart_path};
use ctgpipe::utils::settings_toml::parse_settings_toml;
use ctgpipe::utils::{apply_file_to_opts, list_input_files, log_builder};
use ctgpipe::{PipelineOpts, ResultMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

// --- chart_index / chart_path ---

#[test]
fn test_chart_index_numeric_stem() {
    assert_eq!(chart_index("42.txt").unwrap(), 42);
    assert_eq!(chart_index("0007.txt").unwrap(), 7);
}

#[test]
fn test_chart_index_rejects_non_numeric() {
    assert!(chart_index("abc").is_err());
    assert!(chart_index("abc.txt").is_err());
    assert!(chart_index("42.csv").is_err());
    assert!(chart_index(".txt").is_err());
}

#[test]
fn test_chart_path_encodes_index() {
    let path = chart_path(Path::new("graphs"), "42.txt").unwrap();
    assert_eq!(path, PathBuf::from("graphs/42.png"));
}

// --- python literal parsing ---

#[test]
fn test_python_literal_to_json_quotes_and_keywords() {
    assert_eq!(
        python_literal_to_json("[{'Key': 1, 'Value': None, 'ok': True}]").unwrap(),
        r#"[{"Key": 1, "Value": null, "ok": true}]"#
    );
}

#[test]
fn test_python_literal_to_json_trailing_commas() {
    assert_eq!(
        python_literal_to_json("[{'Key': 1,}, ]").unwrap(),
        r#"[{"Key": 1} ]"#
    );
}

#[test]
fn test_python_literal_to_json_keeps_string_content() {
    assert_eq!(
        python_literal_to_json(r#"['None "x" it\'s']"#).unwrap(),
        r#"["None \"x\" it's"]"#
    );
}

#[test]
fn test_python_literal_to_json_numeric_forms() {
    assert_eq!(
        python_literal_to_json("[1_000, 0x1F, 0o17, 0b101, .5, 5., 1e-3, -2, 007]").unwrap(),
        "[1000, 31, 15, 5, 0.5, 5.0, 0.001, -2, 7]"
    );
    assert_eq!(
        python_literal_to_json("{'1.txt': 12}").unwrap(),
        r#"{"1.txt": 12}"#
    );
}

#[test]
fn test_python_literal_to_json_rejects_bad_numbers() {
    for bad in ["[0xZZ]", "[1.2.3]", "[5j]", "[1e999]"] {
        let err = python_literal_to_json(bad).unwrap_err();
        assert!(
            err.to_string().contains("unsupported numeric literal"),
            "{bad}: {err}"
        );
    }
}

#[test]
fn test_parse_trace_accepts_python_numbers() {
    let trace = parse_trace("[{'Key': 1_200, 'Value': .5e2}]").unwrap();
    assert_eq!(trace.x, vec![1200.0]);
    assert_eq!(trace.y, vec![Some(50.0)]);
}

#[test]
fn test_parse_trace_points() {
    let trace =
        parse_trace("[{'Key': 0, 'Value': 140.5}, {'Key': 1.5, 'Value': None}, {'Value': 3}]")
            .unwrap();
    assert_eq!(trace.x, vec![0.0, 1.5]);
    assert_eq!(trace.y, vec![Some(140.5), None]);
}

#[test]
fn test_parse_trace_invalid() {
    assert!(parse_trace("not a literal").is_err());
}

#[test]
fn test_dict_reader_reads_file_and_drops_garbage() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("1.txt");
    let bad = dir.path().join("2.txt");
    fs::write(&good, "[{'Key': 0, 'Value': 120}, {'Key': 1, 'Value': 121}]").unwrap();
    fs::write(&bad, "{{{").unwrap();

    let mut reader = DictReader::new();
    let trace = reader.read(&good).unwrap();
    assert_eq!(trace.len(), 2);
    assert!(reader.read(&bad).is_none());
    assert!(reader.read(&dir.path().join("missing.txt")).is_none());
}

#[cfg(target_os = "linux")]
#[test]
fn test_list_input_files_leaves_out_non_utf8_names() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("1.txt"), "x").unwrap();
    fs::write(dir.path().join(OsStr::from_bytes(b"bad\xff.txt")), "x").unwrap();

    let names = list_input_files(dir.path()).unwrap();
    assert_eq!(names, vec!["1.txt".to_string()]);
}

// --- classification ---

#[test]
fn test_classification_from_score() {
    assert_eq!(Classification::from_score(10), Classification::Good);
    assert_eq!(Classification::from_score(8), Classification::Good);
    assert_eq!(Classification::from_score(7), Classification::Doubtful);
    assert_eq!(Classification::from_score(5), Classification::Doubtful);
    assert_eq!(Classification::from_score(4), Classification::Bad);
    assert_eq!(Classification::from_score(0), Classification::Bad);
}

#[test]
fn test_fisher_classifier_stub_is_constant() {
    let classifier = FisherClassifier::new();
    assert_eq!(classifier.classify(&CtgTrace::default()), "good");
}

// --- rendering ---

#[test]
fn test_draw_trace_canvas_and_series() {
    let trace = CtgTrace {
        x: vec![0.0, 10.0],
        y: vec![Some(200.0), Some(200.0)],
    };
    let img = draw_trace(&trace);
    assert_eq!(img.width(), 2500);
    assert_eq!(img.height(), 600);
    assert_eq!(img.get_pixel(0, 0).0, [31, 119, 180]);
    assert_eq!(img.get_pixel(2000, 300).0, [255, 255, 255]);
}

#[test]
fn test_render_trace_writes_png() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("3.png");
    let trace = parse_trace("[{'Key': 0, 'Value': 130}, {'Key': 30, 'Value': 150}]").unwrap();
    render_trace(&trace, &path).unwrap();
    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}

// --- compare ---

fn map(pairs: &[(&str, &str)]) -> ResultMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_compare_counts_matches_and_missing() {
    let expected = map(&[("1.txt", "good"), ("2.txt", "bad"), ("3.txt", "good")]);
    let calculated = map(&[("1.txt", "good"), ("2.txt", "good"), ("4.txt", "good")]);
    let report = compare(&expected, &calculated);
    assert_eq!(report.total, 3);
    assert_eq!(report.matches, 1);
    assert_eq!(report.records["3.txt"].calculated, None);
    assert!(!report.records.contains_key("4.txt"));
    assert!((report.match_percentage() - 100.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_compare_empty_expected() {
    let report = compare(&ResultMap::new(), &map(&[("1.txt", "good")]));
    assert_eq!(report.match_percentage(), 0.0);
}

#[test]
fn test_compare_results_writes_report() {
    let dir = TempDir::new().unwrap();
    let expected_path = dir.path().join("expected.json");
    fs::write(&expected_path, r#"{"1.txt": "хорошее", "2.txt": "good"}"#).unwrap();
    let expected = load_expected(&expected_path).unwrap();

    let out = dir.path().join("comparison.json");
    let report = compare_results(&expected, &map(&[("2.txt", "good")]), &out).unwrap();
    assert_eq!(report.matches, 1);

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("хорошее"));
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["1.txt"]["calculated"], serde_json::Value::Null);
    assert_eq!(value["2.txt"]["expected"], "good");
}

// --- settings and CLI ---

#[test]
fn test_settings_file_applied_to_opts() {
    let file = parse_settings_toml(
        r#"
[settings]
dir = "traces"
threads = 3
graphs_dir = "charts"
poll_timeout_ms = 250
strict = true
"#,
    )
    .unwrap();
    let mut args = RunArgs::default();
    let mut opts = PipelineOpts::default();
    apply_file_to_opts(&file, &mut args, &mut opts);

    assert_eq!(args.dir, PathBuf::from("traces"));
    assert_eq!(opts.num_threads, 3);
    assert_eq!(opts.output_dir, PathBuf::from("charts"));
    assert_eq!(opts.poll_timeout, Duration::from_millis(250));
    assert!(opts.strict);
    assert!(!opts.verbose);
}

#[test]
fn test_settings_file_empty_keeps_defaults() {
    let file = parse_settings_toml("").unwrap();
    let mut args = RunArgs::default();
    let mut opts = PipelineOpts::default();
    let threads = opts.num_threads;
    apply_file_to_opts(&file, &mut args, &mut opts);
    assert_eq!(args.dir, PathBuf::from("./ctg_files"));
    assert_eq!(opts.num_threads, threads);
}

#[test]
fn test_cli_parses_flags() {
    let cli = Cli::try_parse_from(["ctgpipe", "-d", "traces", "-t", "3", "--visualize", "-v"])
        .unwrap();
    assert_eq!(cli.dir, Some(PathBuf::from("traces")));
    assert_eq!(cli.threads, Some(3));
    assert!(cli.visualize);
    assert_eq!(cli.verbose, Some(true));
    assert_eq!(cli.strict, None);
}

// --- logging ---

fn enabled(logger: &impl Log, target: &str, level: Level) -> bool {
    logger.enabled(&Metadata::builder().target(target).level(level).build())
}

#[test]
fn test_log_builder_default_levels() {
    let logger = log_builder(false, None).build();
    assert!(enabled(&logger, "ctgpipe", Level::Info));
    assert!(!enabled(&logger, "ctgpipe", Level::Debug));
    assert!(enabled(&logger, "walkdir", Level::Warn));
    assert!(!enabled(&logger, "walkdir", Level::Info));

    let verbose = log_builder(true, None).build();
    assert!(enabled(&verbose, "ctgpipe", Level::Debug));
}

#[test]
fn test_log_builder_env_filters_override_defaults() {
    let logger = log_builder(false, Some("ctgpipe=trace,walkdir=debug")).build();
    assert!(enabled(&logger, "ctgpipe", Level::Trace));
    assert!(enabled(&logger, "walkdir", Level::Debug));

    let quiet = log_builder(true, Some("ctgpipe=error")).build();
    assert!(!enabled(&quiet, "ctgpipe", Level::Warn));
}
