#![allow(dead_code)]

use std::sync::Arc;

use agentdag::config::{GraphDefinition, RawGraphDefinition, TaskRecord};
use agentdag::dag::TaskGraph;

/// Builder for `GraphDefinition` / `TaskGraph` to simplify test setup.
pub struct GraphBuilder {
    def: RawGraphDefinition,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            def: RawGraphDefinition {
                config: Default::default(),
                model: Default::default(),
                documents: Default::default(),
                tasks: Vec::new(),
            },
        }
    }

    pub fn with_task(mut self, task: TaskRecord) -> Self {
        self.def.tasks.push(task);
        self
    }

    /// Shorthand: task `id` of kind `kind`, depending on `deps`.
    pub fn task(self, id: &str, kind: &str, deps: &[&str]) -> Self {
        let mut builder = TaskRecordBuilder::new(id, kind);
        for dep in deps {
            builder = builder.after(dep);
        }
        self.with_task(builder.build())
    }

    pub fn strict(mut self) -> Self {
        self.def.config.strict = true;
        self
    }

    pub fn raw(self) -> RawGraphDefinition {
        self.def
    }

    pub fn build_definition(self) -> GraphDefinition {
        GraphDefinition::try_from(self.def).expect("Failed to build valid definition from builder")
    }

    pub fn build(self) -> Arc<TaskGraph> {
        Arc::new(TaskGraph::from_definition(&self.build_definition()))
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskRecord`.
pub struct TaskRecordBuilder {
    task: TaskRecord,
}

impl TaskRecordBuilder {
    /// Display name defaults to `<id>Agent`, description to `task <id>`.
    pub fn new(id: &str, kind: &str) -> Self {
        Self {
            task: TaskRecord {
                id: id.to_string(),
                agent_kind: kind.to_string(),
                display_name: format!("{id}Agent"),
                dependencies: vec![],
                description: format!("task {id}"),
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.dependencies.push(dep.to_string());
        self
    }

    pub fn named(mut self, display_name: &str) -> Self {
        self.task.display_name = display_name.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.task.description = description.to_string();
        self
    }

    pub fn build(self) -> TaskRecord {
        self.task
    }
}
