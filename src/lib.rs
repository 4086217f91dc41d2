// src/lib.rs

pub mod agents;
pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod llm;
pub mod logging;
pub mod sink;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, error, info, warn};

use crate::agents::documents::{register_document_agents, DocumentAgentDeps};
use crate::agents::AgentRegistry;
use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::config::model::{GraphDefinition, RunSection};
use crate::dag::TaskGraph;
use crate::engine::{Coordinator, RunOptions, RunReport};
use crate::errors::AgentDagError;
use crate::exec::AgentBackend;
use crate::fs::{FileSystem, RealFileSystem};
use crate::llm::OpenAiCompatibleModel;
use crate::sink::{FileSink, RenderOptions, ResultSink, StdoutSink};
use crate::types::parse_duration;

/// Name the coordinator uses as envelope sender.
pub const COORDINATOR_NAME: &str = "Coordinator";

/// Run settings after applying CLI overrides to the `config:` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSettings {
    pub output: Option<PathBuf>,
    pub render: RenderOptions,
    pub task_timeout: Option<Duration>,
    pub strict: bool,
}

impl RunSettings {
    /// Merge the definition's `config:` section with CLI flags; flags win.
    pub fn resolve(section: &RunSection, args: &CliArgs) -> Result<Self> {
        let task_timeout = match (args.task_timeout, section.task_timeout.as_deref()) {
            (Some(t), _) => Some(t),
            (None, Some(s)) => Some(parse_duration(s).map_err(|e| anyhow!(e))?),
            (None, None) => None,
        };

        Ok(Self {
            output: args.output.clone().or_else(|| section.output.clone()),
            render: RenderOptions {
                format: args.format.unwrap_or(section.output_format),
                field: args
                    .output_field
                    .clone()
                    .or_else(|| section.output_field.clone()),
            },
            task_timeout,
            strict: args.strict || section.strict,
        })
    }
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - definition loading and validation
/// - the built-in agents and their language model client
/// - the coordinator and its executor backend
/// - the result sink and the optional report file
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let def = load_and_validate(&args.graph)?;
    let settings = RunSettings::resolve(&def.config, &args)?;
    let graph = Arc::new(TaskGraph::from_definition(&def));

    if args.dry_run {
        print_dry_run(&def, &graph, &settings);
        return Ok(());
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let registry = Arc::new(build_registry(&def, Arc::clone(&fs))?);

    let unknown = registry.unknown_kinds(&graph);
    if let Some((task, kind)) = unknown.first() {
        if settings.strict {
            return Err(AgentDagError::UnknownAgentKind {
                task: task.to_string(),
                kind: kind.to_string(),
            }
            .into());
        }
        for (task, kind) in unknown.iter() {
            warn!(task = %task, kind = %kind, "agent kind not registered; task will fail");
        }
    }

    let executor =
        AgentBackend::new(registry, COORDINATOR_NAME).with_task_timeout(settings.task_timeout);
    let options = RunOptions {
        strict: settings.strict,
    };
    let mut coordinator = Coordinator::new(COORDINATOR_NAME, graph, executor, options);

    let outcome = tokio::select! {
        res = coordinator.run() => res,
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for Ctrl+C")?;
            warn!("interrupted; abandoning run");
            return Err(anyhow!("run interrupted"));
        }
    };

    let report = match &outcome {
        Ok(output) => Some(&output.report),
        Err(AgentDagError::IncompleteRun { report, .. }) => {
            for failed in report.failed.iter() {
                error!("{}", failed.to_error());
            }
            Some(report.as_ref())
        }
        Err(_) => None,
    };
    if let (Some(path), Some(report)) = (args.report.as_ref(), report) {
        if let Err(err) = write_report(fs.as_ref(), path, report) {
            error!(path = ?path, error = %format!("{err:#}"), "failed to write run report");
        }
    }

    let output = outcome?;
    info!(terminal = %output.terminal, report = %output.report, "run succeeded");

    let sink: Box<dyn ResultSink> = match settings.output {
        Some(path) => Box::new(FileSink::new(Arc::clone(&fs), path, settings.render)),
        None => Box::new(StdoutSink::new(settings.render)),
    };
    if let Err(err) = sink.persist(&output.payload) {
        error!(error = %format!("{err:#}"), "failed to persist final output");
    }

    Ok(())
}

/// Registry with the built-in document agents, wired to the configured
/// model and document folder.
fn build_registry(def: &GraphDefinition, fs: Arc<dyn FileSystem>) -> Result<AgentRegistry> {
    let model = OpenAiCompatibleModel::from_section(&def.model)?;
    let mut registry = AgentRegistry::new();
    register_document_agents(
        &mut registry,
        DocumentAgentDeps {
            model: Arc::new(model),
            fs,
            documents: def.documents.clone(),
        },
    );
    debug!(kinds = ?registry.kinds().collect::<Vec<_>>(), "agent registry ready");
    Ok(registry)
}

fn write_report(fs: &dyn FileSystem, path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("encoding run report")?;
    fs.write(path, json.as_bytes())?;
    info!(path = ?path, "run report written");
    Ok(())
}

/// Dry-run output: tasks, dependencies and the planned waves.
fn print_dry_run(def: &GraphDefinition, graph: &TaskGraph, settings: &RunSettings) {
    println!("agentdag dry-run");
    println!("  strict = {}", settings.strict);
    if let Some(ref t) = settings.task_timeout {
        println!("  task_timeout = {t:?}");
    }
    match settings.output {
        Some(ref path) => println!("  output = {}", path.display()),
        None => println!("  output = <stdout>"),
    }
    println!("  model = {} @ {}", def.model.model, def.model.base_url);
    println!();

    println!("tasks ({}):", graph.len());
    for node in graph.nodes() {
        println!("  - {} [{} as {}]", node.id, node.agent_kind, node.display_name);
        if !node.dependencies.is_empty() {
            println!("      dependencies: {:?}", node.dependencies);
        }
        if !node.description.is_empty() {
            println!("      description: {}", node.description);
        }
    }
    println!();

    println!("planned waves:");
    for (idx, wave) in graph.planned_waves().iter().enumerate() {
        println!("  {}: {}", idx + 1, wave.join(", "));
    }

    match graph.terminal_task() {
        Ok(terminal) => println!("terminal task: {terminal}"),
        Err(err) => println!("terminal task: {err}"),
    }

    debug!("dry-run complete (no execution)");
}
