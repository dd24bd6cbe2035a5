//! Notebook → graph → script → package sequencing.

use std::sync::Arc;

use super::backend::{CompilerBackend, PipelinePackager};
use super::types::{CompileOutput, CompileRequest, PIPELINE_NAME_KEY};
use crate::error::{Error, Result};

/// Runs the compile stages in order.
///
/// Stage failures propagate unchanged. There are no retries and no partial
/// results: either a package path is produced or the call fails.
#[derive(Clone)]
pub struct CompileOrchestrator {
    backend: Arc<dyn CompilerBackend>,
    packager: Arc<dyn PipelinePackager>,
}

impl CompileOrchestrator {
    pub fn new(backend: Arc<dyn CompilerBackend>, packager: Arc<dyn PipelinePackager>) -> Self {
        Self { backend, packager }
    }

    /// Compile a notebook into a pipeline package.
    pub fn compile(&self, request: &CompileRequest) -> Result<CompileOutput> {
        let mut compiler = self.backend.instantiate(request)?;

        let (graph, parameters) = compiler.notebook_to_graph()?;
        tracing::info!(
            "Built pipeline graph for {}: {} steps, {} parameters",
            request.notebook_path.display(),
            graph.step_count(),
            parameters.len()
        );

        let script_path = compiler.generate_executable(&graph, &parameters)?;
        tracing::debug!("Rendered pipeline script {}", script_path.display());

        let pipeline_metadata = compiler.pipeline_metadata().clone();
        let pipeline_name = pipeline_metadata
            .get(PIPELINE_NAME_KEY)
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| {
                Error::Backend(format!("resolved pipeline metadata has no `{PIPELINE_NAME_KEY}`"))
            })?;

        let pipeline_package_path = self.packager.compile_pipeline(&script_path, pipeline_name)?;
        tracing::info!(
            "Compiled pipeline `{}` to {}",
            pipeline_name,
            pipeline_package_path.display()
        );

        Ok(CompileOutput {
            pipeline_package_path,
            pipeline_metadata,
        })
    }
}
