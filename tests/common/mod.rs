#![allow(dead_code)]

pub use agentdag_test_utils::{init_tracing, with_timeout};

use std::io::Write;

use tempfile::NamedTempFile;

/// Write `contents` to a temporary file with the given extension
/// (`".yml"`, `".toml"`, `".json"`).
pub fn definition_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("agentdag-")
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Linear chain A -> B -> C as YAML.
pub const CHAIN_YAML: &str = r#"
tasks:
  - id: A
    agent: Echo
    name: First
    dependencies: []
    description: first step
  - id: B
    agent: Echo
    name: Second
    dependencies: [A]
    description: second step
  - id: C
    agent: Echo
    name: Third
    dependencies: [B]
    description: third step
"#;
