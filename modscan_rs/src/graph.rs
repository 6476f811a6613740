//! Dependency graph structure and its serialized payload.

use serde::{Deserialize, Serialize};

use crate::cache::ModuleKind;

/// Schema version stamped into every payload.
pub const GRAPH_SCHEMA_VERSION: &str = "1.0";

/// Payload metadata, for consumers that archive scan results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMetadata {
    #[serde(default)]
    pub schema_version: String,
    /// Timestamp when the payload was generated (ISO 8601).
    #[serde(default)]
    pub generated_at: String,
    #[serde(default)]
    pub module_count: usize,
}

/// One module in a discovered graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleNode {
    pub name: String,
    pub kind: ModuleKind,
    /// Defining file, when one was resolved.
    #[serde(default)]
    pub path: Option<String>,
    /// Direct dependency names, in discovery order.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Which modules a scanned module transitively imports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub metadata: GraphMetadata,
    /// The module the scan was asked about.
    pub main_module: String,
    #[serde(default)]
    pub modules: Vec<ModuleNode>,
}

impl DependencyGraph {
    pub fn new(main_module: impl Into<String>) -> Self {
        let now = time::OffsetDateTime::now_utc();
        let generated_at = now
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .unwrap_or_else(|_| "unknown".to_string());

        Self {
            metadata: GraphMetadata {
                schema_version: GRAPH_SCHEMA_VERSION.to_string(),
                generated_at,
                module_count: 0,
            },
            main_module: main_module.into(),
            modules: Vec::new(),
        }
    }

    pub fn add_module(&mut self, node: ModuleNode) {
        self.modules.push(node);
    }

    /// Fix the payload order: main module first, the rest sorted by name.
    pub fn finalize(&mut self) {
        let main = self.main_module.clone();
        self.modules.sort_by(|a, b| {
            (a.name != main)
                .cmp(&(b.name != main))
                .then_with(|| a.name.cmp(&b.name))
        });
        self.metadata.module_count = self.modules.len();
    }

    pub fn module(&self, name: &str) -> Option<&ModuleNode> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Serialize to the textual payload returned by single-query scans.
    pub fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a payload back. Everything [`to_text`](Self::to_text) produces
    /// round-trips through this.
    pub fn from_text(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, deps: &[&str]) -> ModuleNode {
        ModuleNode {
            name: name.to_string(),
            kind: ModuleKind::Interface,
            path: None,
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn finalize_puts_the_main_module_first() {
        let mut graph = DependencyGraph::new("Zeta");
        graph.add_module(node("Alpha", &[]));
        graph.add_module(node("Zeta", &["Alpha", "Beta"]));
        graph.add_module(node("Beta", &[]));
        graph.finalize();

        let names: Vec<&str> = graph.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Zeta", "Alpha", "Beta"]);
        assert_eq!(graph.metadata.module_count, 3);
    }

    #[test]
    fn payload_round_trips() {
        let mut graph = DependencyGraph::new("App");
        graph.add_module(node("App", &["Core"]));
        graph.add_module(node("Core", &[]));
        graph.finalize();

        let payload = graph.to_text().expect("serialize");
        let parsed = DependencyGraph::from_text(&payload).expect("parse back");
        assert_eq!(parsed, graph);
        assert_eq!(parsed.metadata.schema_version, GRAPH_SCHEMA_VERSION);
    }

    #[test]
    fn module_lookup_by_name() {
        let mut graph = DependencyGraph::new("App");
        graph.add_module(node("App", &["Core"]));
        graph.finalize();
        assert!(graph.module("App").is_some());
        assert!(graph.module("Ghost").is_none());
    }
}
