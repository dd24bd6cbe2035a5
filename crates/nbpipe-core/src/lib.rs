//! Core engine for nbpipe, the notebook-to-pipeline toolkit.
//!
//! This crate provides:
//! - Notebook document model and tagged-cell lookup
//! - Static parsing of `pipeline-parameters` and `pipeline-metrics` cells
//! - The marshal directory shared between pipeline steps
//! - Exploration detection for resumed step sessions
//! - Compile orchestration over pluggable compiler and packager backends

pub mod analysis;
pub mod cells;
pub mod compile;
pub mod config;
pub mod error;
pub mod explore;
pub mod marshal;
pub mod notebook;

pub use analysis::{
    LiteralKind, ParameterValue, PipelineMetrics, PipelineParameters, parameter_rows,
    parse_assignments, parse_metrics, sanitize_metric_name,
};
pub use cells::{
    PIPELINE_METRICS_TAG, PIPELINE_PARAMETERS_TAG, extract_metrics, extract_parameters,
    tagged_source,
};
pub use compile::{
    CommandBackend, CommandPackager, CompileOrchestrator, CompileOutput, CompileRequest,
    CompilerBackend, PipelineCompiler, PipelineGraph, PipelineMetadata, PipelinePackager,
};
pub use config::EnvConfig;
pub use error::{Error, ParseError, Result};
pub use explore::{Exploration, ExplorationDetector};
pub use marshal::{ExtensionLoader, MarshalStore, MarshalValue, ResourceLoader, marshal_dir};
pub use notebook::{Cell, Notebook};
