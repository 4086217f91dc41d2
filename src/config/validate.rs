// src/config/validate.rs

use std::collections::HashSet;

use globset::Glob;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{GraphDefinition, RawGraphDefinition};
use crate::errors::{AgentDagError, Result};
use crate::types::parse_duration;

impl TryFrom<RawGraphDefinition> for GraphDefinition {
    type Error = AgentDagError;

    fn try_from(raw: RawGraphDefinition) -> std::result::Result<Self, Self::Error> {
        validate_raw_definition(&raw)?;
        Ok(GraphDefinition::new_unchecked(raw))
    }
}

fn validate_raw_definition(def: &RawGraphDefinition) -> Result<()> {
    ensure_has_tasks(def)?;
    validate_run_section(def)?;
    validate_task_ids(def)?;
    validate_task_dependencies(def)?;
    validate_dag(def)?;
    Ok(())
}

fn definition_error(msg: impl Into<String>) -> AgentDagError {
    AgentDagError::GraphDefinition(msg.into())
}

fn ensure_has_tasks(def: &RawGraphDefinition) -> Result<()> {
    if def.tasks.is_empty() {
        return Err(definition_error(
            "graph definition must contain at least one task in `tasks`",
        ));
    }
    Ok(())
}

fn validate_run_section(def: &RawGraphDefinition) -> Result<()> {
    if let Some(ref timeout) = def.config.task_timeout {
        parse_duration(timeout)
            .map_err(|e| definition_error(format!("config.task_timeout: {e}")))?;
    }

    if let Some(ref field) = def.config.output_field {
        if field.trim().is_empty() {
            return Err(definition_error("config.output_field must not be empty"));
        }
    }

    Glob::new(&def.documents.pattern).map_err(|e| {
        definition_error(format!(
            "documents.pattern '{}' is not a valid glob: {e}",
            def.documents.pattern
        ))
    })?;

    Ok(())
}

fn validate_task_ids(def: &RawGraphDefinition) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();

    for task in def.tasks.iter() {
        if task.id.trim().is_empty() {
            return Err(definition_error("task with an empty `id`"));
        }
        if task.agent_kind.trim().is_empty() {
            return Err(definition_error(format!(
                "task '{}' has an empty agent kind",
                task.id
            )));
        }
        if !seen.insert(task.id.as_str()) {
            return Err(definition_error(format!(
                "duplicate task id '{}'",
                task.id
            )));
        }
    }

    Ok(())
}

fn validate_task_dependencies(def: &RawGraphDefinition) -> Result<()> {
    let ids: HashSet<&str> = def.tasks.iter().map(|t| t.id.as_str()).collect();

    for task in def.tasks.iter() {
        let mut seen: HashSet<&str> = HashSet::new();
        for dep in task.dependencies.iter() {
            if dep == &task.id {
                return Err(definition_error(format!(
                    "task '{}' cannot depend on itself",
                    task.id
                )));
            }
            if !ids.contains(dep.as_str()) {
                return Err(definition_error(format!(
                    "task '{}' has unknown dependency '{}'",
                    task.id, dep
                )));
            }
            if !seen.insert(dep.as_str()) {
                return Err(definition_error(format!(
                    "task '{}' lists dependency '{}' more than once",
                    task.id, dep
                )));
            }
        }
    }

    Ok(())
}

fn validate_dag(def: &RawGraphDefinition) -> Result<()> {
    // Edge direction: dep -> task, so `B` with `dependencies: [A]` adds A -> B.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for task in def.tasks.iter() {
        graph.add_node(task.id.as_str());
    }

    for task in def.tasks.iter() {
        for dep in task.dependencies.iter() {
            graph.add_edge(dep.as_str(), task.id.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(definition_error(format!(
            "cycle detected in task graph involving task '{}'",
            cycle.node_id()
        ))),
    }
}
