// tests/result_sink.rs

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use agentdag::fs::mock::MockFileSystem;
use agentdag::fs::{FileSystem, RealFileSystem};
use agentdag::sink::{render_payload, FileSink, RenderOptions, ResultSink};
use agentdag::types::OutputFormat;

fn options(format: OutputFormat, field: Option<&str>) -> RenderOptions {
    RenderOptions {
        format,
        field: field.map(str::to_string),
    }
}

#[test]
fn text_format_writes_strings_verbatim() {
    let payload = json!({"report": "# Report\n\nbody"});
    let rendered = render_payload(&payload, &options(OutputFormat::Text, Some("report"))).unwrap();
    assert_eq!(rendered, "# Report\n\nbody");
}

#[test]
fn text_format_falls_back_to_pretty_json_for_structures() {
    let payload = json!({"report": "x", "count": 2});
    let rendered = render_payload(&payload, &options(OutputFormat::Text, None)).unwrap();
    assert_eq!(rendered, serde_json::to_string_pretty(&payload).unwrap());
}

#[test]
fn json_format_always_encodes() {
    let payload = json!({"report": "plain"});
    let rendered = render_payload(&payload, &options(OutputFormat::Json, Some("report"))).unwrap();
    assert_eq!(rendered, "\"plain\"");
}

#[test]
fn missing_field_is_an_error() {
    let payload = json!({"summary": "s"});
    let err = render_payload(&payload, &options(OutputFormat::Text, Some("report"))).unwrap_err();
    assert!(err.to_string().contains("report"));
}

#[test]
fn file_sink_writes_selected_field_through_filesystem() {
    let fs = MockFileSystem::new();
    let sink = FileSink::new(
        Arc::new(fs.clone()),
        "data/final_report.md",
        options(OutputFormat::Text, Some("report")),
    );

    sink.persist(&json!({"report": "## doc1\n\nsection"})).unwrap();

    assert_eq!(
        fs.contents("data/final_report.md").as_deref(),
        Some("## doc1\n\nsection")
    );
    assert!(fs.is_dir(Path::new("data")));
}

#[test]
fn file_sink_reports_write_failures() {
    let fs = MockFileSystem::new();
    fs.deny_writes("out/report.md");
    let sink = FileSink::new(Arc::new(fs.clone()), "out/report.md", RenderOptions::default());

    let err = sink.persist(&json!("text")).unwrap_err();
    assert!(format!("{err:#}").contains("out/report.md"));
    assert!(fs.contents("out/report.md").is_none());
}

#[test]
fn real_filesystem_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/deeper/report.md");
    let sink = FileSink::new(Arc::new(RealFileSystem), &path, RenderOptions::default());

    sink.persist(&json!("hello")).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
}
