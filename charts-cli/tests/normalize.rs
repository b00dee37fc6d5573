//! End-to-end runs of the `normalize` subcommand against files on disk.

use charts_cli::{run, CliArgs};
use clap::Parser;
use serde_json::{json, Value};

fn write_spec(dir: &tempfile::TempDir, json: &str) -> String {
    let path = dir.path().join("chart.json");
    std::fs::write(&path, json).expect("write spec");
    path.display().to_string()
}

fn normalize(args: &[&str]) -> Value {
    let mut argv = vec!["chart-normalize", "normalize"];
    argv.extend_from_slice(args);
    let args = CliArgs::try_parse_from(argv).expect("parse args");
    serde_json::from_str(&run(&args).expect("run")).expect("json output")
}

#[test]
fn area_document_resolves_to_filled_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    let spec = write_spec(
        &dir,
        r#"{
            "type": "area",
            "labels": ["Mon", "Tue"],
            "titleText": "Visitors",
            "theme": "light",
            "datasets": [{"label": "web", "data": [10, 20], "fill": false}]
        }"#,
    );

    let value = normalize(&["--spec", &spec]);

    assert_eq!(value["type"], json!("line"));
    assert_eq!(value["data"]["labels"], json!(["Mon", "Tue"]));
    assert_eq!(value["data"]["datasets"][0]["fill"], json!(true));
    assert_eq!(value["options"]["plugins"]["title"]["text"], json!("Visitors"));
}

#[test]
fn extensions_flag_enables_controllers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let spec = write_spec(
        &dir,
        r#"{"type": "ohlc", "datasets": [{"label": "ACME", "data": [{"x": 1, "o": 1, "h": 3, "l": 0, "c": 2}]}]}"#,
    );

    let fallback = normalize(&["--spec", &spec]);
    assert_eq!(fallback["type"], json!("bar"));

    let native = normalize(&["--spec", &spec, "--extensions", "matrix,financial"]);
    assert_eq!(native["type"], json!("candlestick"));
}

#[test]
fn pretty_output_is_indented() {
    let dir = tempfile::tempdir().expect("tempdir");
    let spec = write_spec(&dir, r#"{"type": "bar"}"#);
    let args = CliArgs::try_parse_from([
        "chart-normalize",
        "--pretty",
        "normalize",
        "--spec",
        &spec,
    ])
    .expect("parse args");
    let output = run(&args).expect("run");
    assert!(output.contains("\n  \"data\""));
}

#[test]
fn missing_file_is_reported() {
    let args = CliArgs::try_parse_from([
        "chart-normalize",
        "normalize",
        "--spec",
        "/nonexistent/chart.json",
    ])
    .expect("parse args");
    let err = run(&args).expect_err("missing file");
    assert!(err.to_string().contains("Failed to read chart document"));
}
