// tests/graph_definition.rs

mod common;
use crate::common::{definition_file, CHAIN_YAML};

use agentdag::config::{load_and_validate, parse_definition, DefinitionFormat, GraphDefinition};
use agentdag::dag::TaskGraph;
use agentdag::errors::AgentDagError;
use agentdag::types::OutputFormat;
use agentdag_test_utils::builders::{GraphBuilder, TaskRecordBuilder};

fn expect_definition_error<T: std::fmt::Debug>(result: Result<T, AgentDagError>) -> String {
    match result {
        Err(AgentDagError::GraphDefinition(msg)) => msg,
        Err(e) => panic!("Expected GraphDefinition error, got: {:?}", e),
        Ok(v) => panic!("Expected error, got Ok({:?})", v),
    }
}

#[test]
fn yaml_chain_loads_in_definition_order() {
    let file = definition_file(".yml", CHAIN_YAML);
    let def = load_and_validate(file.path()).unwrap();
    let graph = TaskGraph::from_definition(&def);

    assert_eq!(graph.all_ids().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    assert_eq!(graph.get("B").unwrap().display_name, "Second");
    assert_eq!(graph.get("B").unwrap().agent_kind, "Echo");
    assert_eq!(graph.dependencies_of("C"), ["B".to_string()]);
    assert_eq!(graph.dependents_of("A"), ["B".to_string()]);
    assert_eq!(graph.roots(), vec!["A"]);
    assert_eq!(graph.sinks(), vec!["C"]);
    assert_eq!(graph.terminal_task().unwrap(), "C");
}

#[test]
fn toml_and_json_definitions_are_supported() {
    let toml = r#"
[config]
output = "out/report.md"
output_format = "json"
task_timeout = "30s"
strict = true

[[tasks]]
id = "collect"
agent_kind = "CollectAgent"
display_name = "Collector"
dependencies = []
description = "collect"

[[tasks]]
id = "compile"
agent = "CompileAgent"
name = "Compiler"
dependencies = ["collect"]
description = "compile"
"#;
    let file = definition_file(".toml", toml);
    let def = load_and_validate(file.path()).unwrap();
    assert_eq!(def.tasks.len(), 2);
    assert_eq!(def.tasks[1].agent_kind, "CompileAgent");
    assert_eq!(def.config.output_format, OutputFormat::Json);
    assert_eq!(def.config.task_timeout.as_deref(), Some("30s"));
    assert!(def.config.strict);

    let json = r#"{"tasks": [
        {"id": "only", "agent": "Echo", "name": "Solo", "dependencies": [], "description": "one"}
    ]}"#;
    let file = definition_file(".json", json);
    let def = load_and_validate(file.path()).unwrap();
    assert_eq!(def.tasks[0].display_name, "Solo");
    assert_eq!(def.model.model, "gpt-4o-mini");
    assert_eq!(def.documents.pattern, "*.txt");
}

#[test]
fn format_is_picked_by_extension() {
    use std::path::Path;
    assert_eq!(DefinitionFormat::from_path(Path::new("g.TOML")), DefinitionFormat::Toml);
    assert_eq!(DefinitionFormat::from_path(Path::new("g.json")), DefinitionFormat::Json);
    assert_eq!(DefinitionFormat::from_path(Path::new("g.yaml")), DefinitionFormat::Yaml);
    assert_eq!(DefinitionFormat::from_path(Path::new("graph")), DefinitionFormat::Yaml);
}

#[test]
fn missing_required_field_is_a_definition_error() {
    let yaml = r#"
tasks:
  - id: A
    agent: Echo
    name: First
    description: no dependencies field
"#;
    let msg = expect_definition_error(parse_definition(yaml, DefinitionFormat::Yaml));
    assert!(msg.contains("dependencies"), "{msg}");
}

#[test]
fn duplicate_ids_are_rejected() {
    let raw = GraphBuilder::new()
        .task("A", "Echo", &[])
        .task("A", "Echo", &[])
        .raw();
    let msg = expect_definition_error(GraphDefinition::try_from(raw));
    assert!(msg.contains("duplicate task id 'A'"), "{msg}");
}

#[test]
fn unknown_dependency_is_rejected() {
    let raw = GraphBuilder::new()
        .task("A", "Echo", &["NonExistent"])
        .raw();
    let msg = expect_definition_error(GraphDefinition::try_from(raw));
    assert!(msg.contains("unknown dependency"), "{msg}");
    assert!(msg.contains("NonExistent"), "{msg}");
}

#[test]
fn self_dependency_is_rejected() {
    let raw = GraphBuilder::new().task("A", "Echo", &["A"]).raw();
    let msg = expect_definition_error(GraphDefinition::try_from(raw));
    assert!(msg.contains("cannot depend on itself"), "{msg}");
}

#[test]
fn repeated_dependency_is_rejected() {
    let raw = GraphBuilder::new()
        .task("A", "Echo", &[])
        .with_task(TaskRecordBuilder::new("B", "Echo").after("A").after("A").build())
        .raw();
    let msg = expect_definition_error(GraphDefinition::try_from(raw));
    assert!(msg.contains("more than once"), "{msg}");
}

#[test]
fn cycle_is_rejected_at_load() {
    let yaml = r#"
tasks:
  - {id: A, agent: Echo, name: A, dependencies: [B], description: a}
  - {id: B, agent: Echo, name: B, dependencies: [A], description: b}
"#;
    let file = definition_file(".yml", yaml);
    let msg = expect_definition_error(load_and_validate(file.path()));
    assert!(msg.contains("cycle detected"), "{msg}");
    assert!(msg.contains('A') || msg.contains('B'), "{msg}");
}

#[test]
fn empty_graph_is_rejected() {
    let msg = expect_definition_error(TaskGraph::load(Vec::new()));
    assert!(msg.contains("at least one task"), "{msg}");
}

#[test]
fn invalid_run_section_is_rejected() {
    let yaml = r#"
config:
  task_timeout: soon
tasks:
  - {id: A, agent: Echo, name: A, dependencies: [], description: a}
"#;
    let msg = expect_definition_error(load_and_validate(definition_file(".yml", yaml).path()));
    assert!(msg.contains("task_timeout"), "{msg}");

    let yaml = r#"
documents:
  pattern: "[unclosed"
tasks:
  - {id: A, agent: Echo, name: A, dependencies: [], description: a}
"#;
    let msg = expect_definition_error(load_and_validate(definition_file(".yml", yaml).path()));
    assert!(msg.contains("documents.pattern"), "{msg}");
}

#[test]
fn oversized_task_timeout_is_a_definition_error() {
    let yaml = r#"
config:
  task_timeout: 307445734561825861m
tasks:
  - {id: A, agent: Echo, name: A, dependencies: [], description: a}
"#;
    let msg = expect_definition_error(load_and_validate(definition_file(".yml", yaml).path()));
    assert!(msg.contains("config.task_timeout"), "{msg}");
    assert!(msg.contains("too large"), "{msg}");
}

#[test]
fn missing_file_is_an_io_error() {
    let result = load_and_validate("does/not/exist.yml");
    assert!(matches!(result, Err(AgentDagError::IoError(_))));
}

#[test]
fn several_sinks_have_no_terminal_task() {
    let graph = GraphBuilder::new()
        .task("A", "Echo", &[])
        .task("B", "Echo", &["A"])
        .task("C", "Echo", &["A"])
        .build();

    match graph.terminal_task() {
        Err(AgentDagError::NoTerminalTask(msg)) => {
            assert!(msg.contains('B') && msg.contains('C'), "{msg}");
        }
        other => panic!("Expected NoTerminalTask, got: {:?}", other),
    }
}

#[test]
fn planned_waves_follow_dependency_depth() {
    let graph = GraphBuilder::new()
        .task("task1", "CollectAgent", &[])
        .task("task2", "PreprocessAgent", &["task1"])
        .task("task3", "ExtractAgent", &["task2"])
        .task("task4", "SummarizeAgent", &["task2"])
        .task("task5", "CompileAgent", &["task3", "task4"])
        .build();

    assert_eq!(
        graph.planned_waves(),
        vec![
            vec!["task1"],
            vec!["task2"],
            vec!["task3", "task4"],
            vec!["task5"],
        ]
    );
}

#[test]
fn bundled_demo_definition_is_valid() {
    let def = load_and_validate("demos/document_report.yml").unwrap();
    let graph = TaskGraph::from_definition(&def);

    assert_eq!(graph.len(), 5);
    assert_eq!(graph.terminal_task().unwrap(), "task5");
    assert_eq!(def.config.output_field.as_deref(), Some("report"));
}
