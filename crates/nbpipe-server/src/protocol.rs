//! RPC envelopes exchanged with editor extensions.
//!
//! ```text
//! request   {"method": "nb.<name>", "trans_id": "...", "kwargs": {...}}
//! success   {"code": 0, "result": ..., "trans_id": "..."}
//! failure   {"code": n, "err_message": "...", "err_details": "...", "err_cls": "...", "trans_id": "..."}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RpcCode, RpcError};

/// Namespace of the notebook methods.
pub const METHOD_NAMESPACE: &str = "nb";

/// An RPC call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Fully qualified method name, e.g. `nb.get_pipeline_parameters`.
    pub method: String,

    /// Correlation id echoed in the response; generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trans_id: Option<String>,

    /// Keyword arguments of the method.
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, kwargs: Map<String, Value>) -> Self {
        Self {
            method: method.into(),
            trans_id: None,
            kwargs,
        }
    }

    /// Method name with the `nb.` namespace removed.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::MethodNotFound`] for other namespaces.
    pub fn handler_name(&self) -> Result<&str, RpcError> {
        self.method
            .split_once('.')
            .filter(|(ns, name)| *ns == METHOD_NAMESPACE && !name.is_empty())
            .map(|(_, name)| name)
            .ok_or_else(|| RpcError::MethodNotFound(self.method.clone()))
    }
}

/// Generate a fresh correlation id.
pub fn new_trans_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Reply to an RPC call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcResponse {
    Failure {
        code: RpcCode,
        err_message: String,
        err_details: String,
        err_cls: String,
        trans_id: String,
    },
    Success {
        code: RpcCode,
        result: Value,
        trans_id: String,
    },
}

impl RpcResponse {
    pub fn success(result: Value, trans_id: impl Into<String>) -> Self {
        Self::Success {
            code: RpcCode::Ok,
            result,
            trans_id: trans_id.into(),
        }
    }

    pub fn failure(error: &RpcError, trans_id: impl Into<String>) -> Self {
        let code = error.code();
        Self::Failure {
            code,
            err_message: code.message().to_string(),
            err_details: error.to_string(),
            err_cls: error.class_name().to_string(),
            trans_id: trans_id.into(),
        }
    }

    pub fn code(&self) -> RpcCode {
        match self {
            Self::Success { code, .. } | Self::Failure { code, .. } => *code,
        }
    }

    pub fn trans_id(&self) -> &str {
        match self {
            Self::Success { trans_id, .. } | Self::Failure { trans_id, .. } => trans_id,
        }
    }
}
