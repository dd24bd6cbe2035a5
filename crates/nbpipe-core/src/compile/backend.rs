//! Seams to the external graph compiler and packaging toolchain.

use std::path::{Path, PathBuf};

use super::types::{CompileRequest, PipelineGraph, PipelineMetadata};
use crate::analysis::PipelineParameters;
use crate::error::Result;

/// Creates a compiler instance for one notebook.
pub trait CompilerBackend: Send + Sync {
    fn instantiate(&self, request: &CompileRequest) -> Result<Box<dyn PipelineCompiler>>;
}

/// A compiler bound to a single notebook and its resolved metadata.
pub trait PipelineCompiler {
    /// Split the notebook into steps and collect its pipeline parameters.
    fn notebook_to_graph(&mut self) -> Result<(PipelineGraph, PipelineParameters)>;

    /// Render an executable pipeline definition, returning the script path.
    fn generate_executable(
        &mut self,
        graph: &PipelineGraph,
        parameters: &PipelineParameters,
    ) -> Result<PathBuf>;

    /// Metadata after merging notebook settings and overrides.
    fn pipeline_metadata(&self) -> &PipelineMetadata;
}

/// Turns a rendered pipeline script into a deployable package.
pub trait PipelinePackager: Send + Sync {
    fn compile_pipeline(&self, script_path: &Path, pipeline_name: &str) -> Result<PathBuf>;
}
