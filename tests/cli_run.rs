// tests/cli_run.rs

mod common;
use crate::common::{definition_file, init_tracing, CHAIN_YAML};

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use agentdag::cli::CliArgs;
use agentdag::config::load_and_validate;
use agentdag::errors::AgentDagError;
use agentdag::types::OutputFormat;
use agentdag::{run, RunSettings};

const CONFIGURED_YAML: &str = r#"
config:
  output: data/final_report.md
  output_field: report
  output_format: json
  task_timeout: 2m
tasks:
  - {id: A, agent: Echo, name: A, dependencies: [], description: a}
"#;

fn args(extra: &[&str]) -> CliArgs {
    let mut argv = vec!["agentdag"];
    argv.extend_from_slice(extra);
    CliArgs::try_parse_from(argv).unwrap()
}

#[test]
fn config_section_applies_without_flags() {
    let file = definition_file(".yml", CONFIGURED_YAML);
    let def = load_and_validate(file.path()).unwrap();

    let settings = RunSettings::resolve(&def.config, &args(&[])).unwrap();

    assert_eq!(settings.output, Some(PathBuf::from("data/final_report.md")));
    assert_eq!(settings.render.format, OutputFormat::Json);
    assert_eq!(settings.render.field.as_deref(), Some("report"));
    assert_eq!(settings.task_timeout, Some(Duration::from_secs(120)));
    assert!(!settings.strict);
}

#[test]
fn cli_flags_override_config_section() {
    let file = definition_file(".yml", CONFIGURED_YAML);
    let def = load_and_validate(file.path()).unwrap();

    let cli = args(&[
        "--output",
        "elsewhere.txt",
        "--output-field",
        "summary",
        "--format",
        "text",
        "--task-timeout",
        "500ms",
        "--strict",
    ]);
    let settings = RunSettings::resolve(&def.config, &cli).unwrap();

    assert_eq!(settings.output, Some(PathBuf::from("elsewhere.txt")));
    assert_eq!(settings.render.format, OutputFormat::Text);
    assert_eq!(settings.render.field.as_deref(), Some("summary"));
    assert_eq!(settings.task_timeout, Some(Duration::from_millis(500)));
    assert!(settings.strict);
}

#[test]
fn oversized_task_timeout_flag_is_rejected_by_the_parser() {
    let err = CliArgs::try_parse_from(["agentdag", "--task-timeout", "307445734561825861m"])
        .unwrap_err();
    assert!(err.to_string().contains("too large"), "{err}");
}

#[tokio::test]
async fn dry_run_validates_without_running() {
    init_tracing();

    let file = definition_file(".yml", CHAIN_YAML);
    let path = file.path().to_string_lossy().into_owned();

    run(args(&["--graph", &path, "--dry-run"])).await.unwrap();
}

#[tokio::test]
async fn strict_run_rejects_unregistered_agent_kinds_up_front() {
    init_tracing();

    let file = definition_file(".yml", CHAIN_YAML);
    let path = file.path().to_string_lossy().into_owned();

    let err = run(args(&["--graph", &path, "--strict"])).await.unwrap_err();
    match err.downcast_ref::<AgentDagError>() {
        Some(AgentDagError::UnknownAgentKind { task, kind }) => {
            assert_eq!(task, "A");
            assert_eq!(kind, "Echo");
        }
        other => panic!("Expected UnknownAgentKind, got: {:?}", other),
    }
}

#[tokio::test]
async fn invalid_definition_fails_the_run() {
    init_tracing();

    let file = definition_file(".yml", "tasks: []\n");
    let path = file.path().to_string_lossy().into_owned();

    let err = run(args(&["--graph", &path])).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AgentDagError>(),
        Some(AgentDagError::GraphDefinition(_))
    ));
}
