//! The `nb.*` RPC methods.
//!
//! Handlers are synchronous; the router runs them on the blocking pool.

use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use nbpipe_core::compile::{CompileRequest, PipelineMetadata};
use nbpipe_core::marshal::MarshalValue;
use nbpipe_core::{ExplorationDetector, Notebook, cells, parameter_rows};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::RpcError;
use crate::protocol::RpcRequest;
use crate::routes::AppState;
use crate::table;

/// Every method served under the `nb.` namespace.
pub const METHODS: &[&str] = &[
    "get_pipeline_parameters",
    "get_pipeline_metrics",
    "compile_notebook",
    "explore_notebook",
    "unmarshal_data",
    "remove_marshal_dir",
    "resume_notebook_path",
];

#[derive(Debug, Deserialize)]
struct NotebookArgs {
    source_notebook_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CompileArgs {
    source_notebook_path: PathBuf,
    #[serde(default)]
    notebook_metadata_overrides: Option<PipelineMetadata>,
    #[serde(default)]
    debug: bool,
    #[serde(default)]
    auto_snapshot: bool,
}

fn args<T: DeserializeOwned>(kwargs: &Map<String, Value>) -> Result<T, RpcError> {
    serde_json::from_value(Value::Object(kwargs.clone()))
        .map_err(|e| RpcError::InvalidArguments(e.to_string()))
}

/// Serialize a handler result; paths that are not UTF-8 cannot travel as JSON.
fn encode<T: Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::Encoding(e.to_string()))
}

/// Route a request to its handler.
pub fn dispatch(state: &AppState, request: &RpcRequest) -> Result<Value, RpcError> {
    let kwargs = &request.kwargs;
    match request.handler_name()? {
        "get_pipeline_parameters" => get_pipeline_parameters(args(kwargs)?),
        "get_pipeline_metrics" => get_pipeline_metrics(args(kwargs)?),
        "compile_notebook" => compile_notebook(state, args(kwargs)?),
        "explore_notebook" => explore_notebook(state, args(kwargs)?),
        "unmarshal_data" => unmarshal_data(state, args(kwargs)?),
        "remove_marshal_dir" => remove_marshal_dir(state, args(kwargs)?),
        "resume_notebook_path" => resume_notebook_path(state),
        _ => Err(RpcError::MethodNotFound(request.method.clone())),
    }
}

fn get_pipeline_parameters(args: NotebookArgs) -> Result<Value, RpcError> {
    let notebook = Notebook::read_from_file(&args.source_notebook_path)?;
    let parameters = cells::extract_parameters(&notebook).inspect_err(|e| {
        if e.is_annotation_error() {
            tracing::error!("Failed to parse pipeline parameters: {}", e);
        }
    })?;

    let rows = parameter_rows(&parameters);
    tracing::info!("Pipeline parameters:");
    for line in table::render(&["name", "type", "value"], &rows).lines() {
        tracing::info!("{}", line);
    }
    Ok(json!(rows))
}

fn get_pipeline_metrics(args: NotebookArgs) -> Result<Value, RpcError> {
    let notebook = Notebook::read_from_file(&args.source_notebook_path)?;
    let metrics = cells::extract_metrics(&notebook).inspect_err(|e| {
        if e.is_annotation_error() {
            tracing::error!("Failed to parse pipeline metrics: {}", e);
        }
    })?;

    tracing::info!("Pipeline metrics: {:?}", metrics);
    Ok(json!(metrics))
}

fn compile_notebook(state: &AppState, args: CompileArgs) -> Result<Value, RpcError> {
    let orchestrator = state
        .compiler
        .as_ref()
        .ok_or(RpcError::CompilerUnavailable)?;

    let request = CompileRequest {
        notebook_path: args.source_notebook_path,
        metadata_overrides: args.notebook_metadata_overrides.unwrap_or_default(),
        debug: args.debug,
        auto_snapshot: args.auto_snapshot,
    };
    let output = orchestrator.compile(&request)?;
    encode(&output)
}

fn explore_notebook(state: &AppState, args: NotebookArgs) -> Result<Value, RpcError> {
    let detector = ExplorationDetector::new(state.env.pipeline_step.clone(), state.store.clone());
    let exploration = detector.detect(&args.source_notebook_path)?;
    encode(&exploration)
}

fn unmarshal_data(state: &AppState, args: NotebookArgs) -> Result<Value, RpcError> {
    let values = state.store.unmarshal(&args.source_notebook_path)?;
    let wire: Map<String, Value> = values
        .into_iter()
        .map(|(name, value)| (name, marshal_value_to_wire(value)))
        .collect();
    Ok(Value::Object(wire))
}

/// Tag each value with its encoding; bytes travel as base64.
pub fn marshal_value_to_wire(value: MarshalValue) -> Value {
    match value {
        MarshalValue::Json(json) => json!({ "json": json }),
        MarshalValue::Text(text) => json!({ "text": text }),
        MarshalValue::Bytes(bytes) => json!({ "bytes": BASE64.encode(bytes) }),
    }
}

fn remove_marshal_dir(state: &AppState, args: NotebookArgs) -> Result<Value, RpcError> {
    state.store.purge(&args.source_notebook_path)?;
    Ok(Value::Null)
}

fn resume_notebook_path(state: &AppState) -> Result<Value, RpcError> {
    let path = state.env.resume_notebook_path()?;
    encode(&path)
}
