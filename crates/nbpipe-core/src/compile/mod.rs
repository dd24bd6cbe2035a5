//! Compilation of notebooks into pipeline packages.
//!
//! # Architecture
//!
//! ```text
//! Notebook (.ipynb)
//!     │
//!     ├── CompilerBackend::instantiate ──► PipelineCompiler (metadata resolved)
//!     │                                        │
//!     │                                        ├── notebook_to_graph ──► PipelineGraph + parameters
//!     │                                        └── generate_executable ──► pipeline script
//!     │
//!     └── PipelinePackager::compile_pipeline(script, pipeline_name) ──► package
//! ```
//!
//! The graph compiler and the packager are external; [`CommandBackend`] and
//! [`CommandPackager`] reach them over a process boundary.

mod backend;
mod command;
mod orchestrator;
mod types;

pub use backend::{CompilerBackend, PipelineCompiler, PipelinePackager};
pub use command::{CommandBackend, CommandPackager, DEFAULT_PACKAGER, resolve_metadata};
pub use orchestrator::CompileOrchestrator;
pub use types::{
    CompileOutput, CompileRequest, PIPELINE_NAME_KEY, PipelineGraph, PipelineMetadata, StepSpec,
};
