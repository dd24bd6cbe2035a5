//! Common types for the compile pipeline.

use std::path::PathBuf;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Resolved pipeline metadata (name, experiment, image, volumes, ...).
pub type PipelineMetadata = serde_json::Map<String, serde_json::Value>;

/// Metadata key naming the pipeline.
pub const PIPELINE_NAME_KEY: &str = "pipeline_name";

/// A request to compile a notebook into a pipeline package.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileRequest {
    /// Notebook to compile.
    pub notebook_path: PathBuf,

    /// Metadata entries overriding those stored in the notebook.
    #[serde(default)]
    pub metadata_overrides: PipelineMetadata,

    /// Generate a pipeline with debugging enabled.
    #[serde(default)]
    pub debug: bool,

    /// Snapshot volumes between steps.
    #[serde(default)]
    pub auto_snapshot: bool,
}

/// A compiled pipeline package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileOutput {
    /// Path of the deployable package.
    pub pipeline_package_path: PathBuf,

    /// Metadata the package was compiled with.
    pub pipeline_metadata: PipelineMetadata,
}

/// One step as exchanged with a backend: its name and upstream steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    pub name: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Directed acyclic graph of pipeline steps; edges point downstream.
#[derive(Debug, Clone, Default)]
pub struct PipelineGraph {
    graph: DiGraph<String, ()>,
    index: FxHashMap<String, NodeIndex>,
}

impl PipelineGraph {
    /// Build a graph from step specs.
    ///
    /// # Errors
    ///
    /// Fails on duplicate step names, unknown dependencies and cycles.
    pub fn from_steps(steps: &[StepSpec]) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut index = FxHashMap::default();

        for step in steps {
            if index.contains_key(&step.name) {
                return Err(Error::Backend(format!("duplicate step name `{}`", step.name)));
            }
            let node = graph.add_node(step.name.clone());
            index.insert(step.name.clone(), node);
        }

        for step in steps {
            let to = index[&step.name];
            for dep in &step.dependencies {
                let Some(&from) = index.get(dep) else {
                    return Err(Error::Backend(format!(
                        "step `{}` depends on unknown step `{}`",
                        step.name, dep
                    )));
                };
                graph.add_edge(from, to, ());
            }
        }

        let pipeline = Self { graph, index };
        pipeline.sorted_nodes()?;
        Ok(pipeline)
    }

    /// Number of steps.
    pub fn step_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether a step exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn sorted_nodes(&self) -> Result<Vec<NodeIndex>> {
        toposort(&self.graph, None).map_err(|cycle| {
            Error::Backend(format!(
                "cyclic dependency involving step `{}`",
                self.graph[cycle.node_id()]
            ))
        })
    }

    /// Step names in dependency order.
    pub fn execution_order(&self) -> Result<Vec<&str>> {
        let order = self.sorted_nodes()?;
        Ok(order.into_iter().map(|n| self.graph[n].as_str()).collect())
    }

    /// Convert back into step specs, in dependency order.
    pub fn to_steps(&self) -> Result<Vec<StepSpec>> {
        let order = self.sorted_nodes()?;
        Ok(order
            .into_iter()
            .map(|node| {
                let mut dependencies: Vec<String> = self
                    .graph
                    .neighbors_directed(node, petgraph::Direction::Incoming)
                    .map(|dep| self.graph[dep].clone())
                    .collect();
                dependencies.sort();
                StepSpec {
                    name: self.graph[node].clone(),
                    dependencies,
                }
            })
            .collect())
    }
}
