//! Process-based adapters for the external compiler and packager.
//!
//! The converter program is driven with two subcommands:
//!
//! ```text
//! <converter> graph  --nb <notebook> --metadata <json> [--debug] [--auto-snapshot]
//!     stdout: {"steps": [{"name": .., "dependencies": [..]}], "parameters": {..}}
//! <converter> render --nb <notebook> --metadata <json> [--debug] [--auto-snapshot]
//!     stdin:  {"steps": [..], "parameters": {..}}
//!     stdout: path of the rendered pipeline script
//! ```
//!
//! The packager is invoked as `<packager> --py <script> --output <package>`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use super::backend::{CompilerBackend, PipelineCompiler, PipelinePackager};
use super::types::{CompileRequest, PipelineGraph, PipelineMetadata, StepSpec};
use crate::analysis::PipelineParameters;
use crate::error::{Error, Result};
use crate::notebook::Notebook;

/// Packaging program looked up in `PATH` by default.
pub const DEFAULT_PACKAGER: &str = "dsl-compile";

/// Graph and parameters as exchanged with the converter.
#[derive(Debug, Serialize, Deserialize)]
struct GraphDocument {
    steps: Vec<StepSpec>,
    #[serde(default)]
    parameters: PipelineParameters,
}

/// Merge notebook pipeline settings with request overrides (overrides win).
pub fn resolve_metadata(notebook: &Notebook, overrides: &PipelineMetadata) -> PipelineMetadata {
    let mut metadata = notebook.pipeline_metadata().cloned().unwrap_or_default();
    for (key, value) in overrides {
        metadata.insert(key.clone(), value.clone());
    }
    metadata
}

/// Compiler backend that runs an external converter program.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: PathBuf,
}

impl CommandBackend {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl CompilerBackend for CommandBackend {
    fn instantiate(&self, request: &CompileRequest) -> Result<Box<dyn PipelineCompiler>> {
        let notebook = Notebook::read_from_file(&request.notebook_path)?;
        let metadata = resolve_metadata(&notebook, &request.metadata_overrides);
        Ok(Box::new(CommandCompiler {
            program: self.program.clone(),
            request: request.clone(),
            metadata,
        }))
    }
}

struct CommandCompiler {
    program: PathBuf,
    request: CompileRequest,
    metadata: PipelineMetadata,
}

impl CommandCompiler {
    fn command(&self, subcommand: &str) -> Result<Command> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(subcommand)
            .arg("--nb")
            .arg(&self.request.notebook_path)
            .arg("--metadata")
            .arg(serde_json::to_string(&self.metadata)?);
        if self.request.debug {
            cmd.arg("--debug");
        }
        if self.request.auto_snapshot {
            cmd.arg("--auto-snapshot");
        }
        Ok(cmd)
    }

    fn run(&self, subcommand: &str, input: Option<Vec<u8>>) -> Result<Vec<u8>> {
        let mut cmd = self.command(subcommand)?;
        cmd.stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            Error::Backend(format!("failed to run {}: {}", self.program.display(), e))
        })?;

        if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
            stdin.write_all(&input)?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(Error::Backend(format!(
                "`{} {}` failed ({}): {}",
                self.program.display(),
                subcommand,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(output.stdout)
    }
}

impl PipelineCompiler for CommandCompiler {
    fn notebook_to_graph(&mut self) -> Result<(PipelineGraph, PipelineParameters)> {
        let stdout = self.run("graph", None)?;
        let document: GraphDocument = serde_json::from_slice(&stdout)
            .map_err(|e| Error::Backend(format!("invalid graph document: {e}")))?;
        let graph = PipelineGraph::from_steps(&document.steps)?;
        Ok((graph, document.parameters))
    }

    fn generate_executable(
        &mut self,
        graph: &PipelineGraph,
        parameters: &PipelineParameters,
    ) -> Result<PathBuf> {
        let document = GraphDocument {
            steps: graph.to_steps()?,
            parameters: parameters.clone(),
        };
        let stdout = self.run("render", Some(serde_json::to_vec(&document)?))?;
        let script = String::from_utf8_lossy(&stdout).trim().to_string();
        if script.is_empty() {
            return Err(Error::Backend("converter did not report a script path".to_string()));
        }
        Ok(PathBuf::from(script))
    }

    fn pipeline_metadata(&self) -> &PipelineMetadata {
        &self.metadata
    }
}

/// Packager that runs an external pipeline compiler.
#[derive(Debug, Clone)]
pub struct CommandPackager {
    program: PathBuf,
}

impl CommandPackager {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Find `name` in `PATH`.
    pub fn locate(name: &str) -> Result<Self> {
        which::which(name)
            .map(Self::new)
            .map_err(|_| Error::Package(format!("{name} not found in PATH")))
    }

    /// Where the package for `pipeline_name` is written: next to the script.
    pub fn package_path(script_path: &Path, pipeline_name: &str) -> PathBuf {
        let file_name = format!("{}.pipeline.yaml", pipeline_name.replace(['/', '\\'], "-"));
        script_path.with_file_name(file_name)
    }
}

impl PipelinePackager for CommandPackager {
    fn compile_pipeline(&self, script_path: &Path, pipeline_name: &str) -> Result<PathBuf> {
        let package_path = Self::package_path(script_path, pipeline_name);

        let output = Command::new(&self.program)
            .arg("--py")
            .arg(script_path)
            .arg("--output")
            .arg(&package_path)
            .output()
            .map_err(|e| {
                Error::Package(format!("failed to run {}: {}", self.program.display(), e))
            })?;

        if !output.status.success() {
            return Err(Error::Package(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if !package_path.exists() {
            return Err(Error::Package(format!(
                "{} did not produce {}",
                self.program.display(),
                package_path.display()
            )));
        }

        Ok(package_path)
    }
}
