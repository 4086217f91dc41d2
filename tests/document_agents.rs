// tests/document_agents.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;

use agentdag::agents::documents::{
    register_document_agents, CompileAgent, DocumentAgentDeps, PreprocessAgent,
};
use agentdag::agents::{AgentRegistry, Envelope, Worker};
use agentdag::config::{load_and_validate, DocumentsSection};
use agentdag::dag::TaskGraph;
use agentdag::engine::{Coordinator, FailureKind, RunOptions};
use agentdag::errors::AgentDagError;
use agentdag::exec::AgentBackend;
use agentdag::fs::mock::MockFileSystem;
use agentdag::sink::{FileSink, RenderOptions, ResultSink};
use agentdag::types::OutputFormat;
use agentdag_test_utils::FakeChatModel;

const KEY_INFO_REPLY: &str = "```json\n{\"characters\": [\"Ann\", \"Bo\"], \"themes\": [\"loss\"], \"plot_points\": [\"Ann leaves\", \"Bo waits\"]}\n```";

fn docs_fs() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("docs/b.txt", "second story");
    fs.add_file("docs/a.txt", "first story");
    fs.add_file("docs/notes.md", "not a document");
    fs
}

fn pipeline_model() -> FakeChatModel {
    FakeChatModel::new()
        .on("descriptive title", "\"A Title\"")
        .on("Clean up and normalise", "cleaned text")
        .on("Analyse the document below", KEY_INFO_REPLY)
        .on("concise summary", "{\"summary\": \"Short summary.\"}")
        .on("Document id: doc1\nSummary", "## doc1\nsection one")
        .on("Document id: doc2\nSummary", "## doc2\nsection two")
}

fn registry(model: FakeChatModel, fs: MockFileSystem) -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    register_document_agents(
        &mut registry,
        DocumentAgentDeps {
            model: Arc::new(model),
            fs: Arc::new(fs),
            documents: DocumentsSection {
                dir: PathBuf::from("docs"),
                pattern: "*.txt".to_string(),
            },
        },
    );
    registry
}

#[tokio::test]
async fn demo_pipeline_compiles_report() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let def = load_and_validate("demos/document_report.yml")?;
    let graph = Arc::new(TaskGraph::from_definition(&def));
    let model = pipeline_model();
    let registry = registry(model.clone(), docs_fs());

    assert!(registry.unknown_kinds(&graph).is_empty());

    let executor = AgentBackend::new(Arc::new(registry), "Coordinator");
    let mut coordinator = Coordinator::new("Coordinator", graph, executor, RunOptions::default());
    let output = with_timeout(coordinator.run()).await?;

    assert_eq!(output.terminal, "task5");
    assert_eq!(output.report.waves, 4);
    assert_eq!(
        output.payload,
        json!({"report": "## doc1\nsection one\n\n## doc2\nsection two"})
    );

    // Collector output: sorted *.txt files, model titles.
    let collected = coordinator.scheduler().result_of("task1").unwrap();
    assert_eq!(collected["docs"].as_array().unwrap().len(), 2);
    assert_eq!(collected["docs"][0]["id"], "doc1");
    assert_eq!(collected["docs"][0]["title"], "A Title");
    assert_eq!(collected["docs"][0]["content"], "first story");
    assert_eq!(collected["docs"][0]["filepath"], "docs/a.txt");

    let extracted = coordinator.scheduler().result_of("task3").unwrap();
    assert_eq!(
        extracted["extracted_items"][1],
        json!({"id": "doc2", "key_info": [{
            "characters": ["Ann", "Bo"],
            "themes": ["loss"],
            "plot_points": ["Ann leaves", "Bo waits"]
        }]})
    );

    let compile_prompt = model
        .requests()
        .into_iter()
        .find(|r| r.prompt.contains("Document id: doc1\nSummary"))
        .unwrap()
        .prompt;
    assert!(compile_prompt.contains("Short summary."));
    assert!(compile_prompt.contains("Ann, Bo"));
    assert!(compile_prompt.contains("- Ann leaves Bo waits"));

    // The sink persists only the report field.
    let out_fs = MockFileSystem::new();
    let sink = FileSink::new(
        Arc::new(out_fs.clone()),
        "data/final_report.md",
        RenderOptions {
            format: OutputFormat::Text,
            field: Some("report".to_string()),
        },
    );
    sink.persist(&output.payload)?;
    assert_eq!(
        out_fs.contents("data/final_report.md").as_deref(),
        Some("## doc1\nsection one\n\n## doc2\nsection two")
    );
    Ok(())
}

#[tokio::test]
async fn collector_falls_back_to_file_stem_without_title() -> Result<(), Box<dyn std::error::Error>>
{
    init_tracing();

    let model = FakeChatModel::new().fail_on("descriptive title", "rate limited");
    let registry = registry(model, docs_fs());
    let worker = registry.create("task1", "CollectAgent", "DocumentCollector")?;

    let reply = worker
        .process(Envelope::new(json!({}), "Coordinator", "DocumentCollector"))
        .await?;

    assert_eq!(reply.sender, "DocumentCollector");
    assert_eq!(reply.recipient, "Coordinator");
    assert_eq!(reply.content["docs"][0]["title"], "a");
    assert_eq!(reply.content["docs"][1]["title"], "b");
    Ok(())
}

#[tokio::test]
async fn collector_with_missing_folder_yields_no_docs() -> Result<(), Box<dyn std::error::Error>> {
    let registry = registry(FakeChatModel::replying("unused"), MockFileSystem::new());
    let worker = registry.create("task1", "CollectAgent", "DocumentCollector")?;

    let reply = worker
        .process(Envelope::new(json!({}), "Coordinator", "DocumentCollector"))
        .await?;
    assert_eq!(reply.content, json!({"docs": []}));
    Ok(())
}

#[tokio::test]
async fn preprocess_keeps_raw_content_when_model_fails() -> anyhow::Result<()> {
    let model = FakeChatModel::new().fail_on("Clean up", "timeout");
    let agent = PreprocessAgent::new("DocumentPreprocessor", Arc::new(model));

    let input = json!({"docs": [
        {"id": "doc1", "title": "T", "content": "raw  text", "filepath": "docs/a.txt"}
    ]});
    let reply = agent
        .process(Envelope::new(input, "Coordinator", "DocumentPreprocessor"))
        .await?;

    assert_eq!(
        reply.content,
        json!({"preprocessed_docs": [{"id": "doc1", "title": "T", "content": "raw  text"}]})
    );
    Ok(())
}

#[tokio::test]
async fn compile_requires_a_summary_for_every_document() {
    let agent = CompileAgent::new("ReportCompiler", Arc::new(FakeChatModel::replying("section")));

    let input = json!({
        "task3": {"extracted_items": [
            {"id": "doc1", "key_info": [{"characters": [], "themes": [], "plot_points": []}]}
        ]},
        "task4": {"summaries": [{"doc_name": "doc2", "summary": "other"}]}
    });
    let err = agent
        .process(Envelope::new(input, "Coordinator", "ReportCompiler"))
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("no summary found for document 'doc1'"));
}

#[tokio::test]
async fn compile_needs_extracted_items_in_its_input() {
    let agent = CompileAgent::new("ReportCompiler", Arc::new(FakeChatModel::replying("section")));

    let err = agent
        .process(Envelope::new(
            json!({"summaries": []}),
            "Coordinator",
            "ReportCompiler",
        ))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("extracted_items"));
}

#[tokio::test]
async fn unparseable_summary_fails_only_that_branch() {
    init_tracing();

    let model = FakeChatModel::new()
        .fail_on("concise summary", "model returned prose")
        .on("descriptive title", "A Title")
        .on("Clean up and normalise", "cleaned text")
        .on("Analyse the document below", KEY_INFO_REPLY);
    let registry = registry(model, docs_fs());

    let def = load_and_validate("demos/document_report.yml").unwrap();
    let graph = Arc::new(TaskGraph::from_definition(&def));
    let mut coordinator =
        Coordinator::with_registry("Coordinator", graph, Arc::new(registry), RunOptions::default());

    match with_timeout(coordinator.run()).await {
        Err(AgentDagError::IncompleteRun { terminal, report }) => {
            assert_eq!(terminal, "task5");
            assert_eq!(report.completed, vec!["task1", "task2", "task3"]);
            assert_eq!(report.failed_ids(), vec!["task4"]);
            assert_eq!(report.failed[0].kind, FailureKind::Worker);
            assert_eq!(report.pending, vec!["task5"]);
        }
        other => panic!("Expected IncompleteRun, got: {:?}", other),
    }
}
