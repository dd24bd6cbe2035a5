//! Error types for the nbpipe server.

use std::path::PathBuf;

use nbpipe_core::Error as CoreError;
use serde::{Deserialize, Serialize};

/// Numeric status carried in every RPC response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcCode {
    Ok = 0,
    ImportError = 1,
    EncodingError = 2,
    NotFound = 3,
    InternalError = 4,
    ServiceUnavailable = 5,
    UnhandledError = 6,
}

impl RpcCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Short description used as the response `err_message`.
    pub fn message(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::ImportError => "Import error",
            Self::EncodingError => "Encoding error",
            Self::NotFound => "Method not found",
            Self::InternalError => "Internal error",
            Self::ServiceUnavailable => "Service unavailable",
            Self::UnhandledError => "Unhandled error",
        }
    }
}

impl TryFrom<i32> for RpcCode {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, i32> {
        Ok(match code {
            0 => Self::Ok,
            1 => Self::ImportError,
            2 => Self::EncodingError,
            3 => Self::NotFound,
            4 => Self::InternalError,
            5 => Self::ServiceUnavailable,
            6 => Self::UnhandledError,
            other => return Err(other),
        })
    }
}

impl Serialize for RpcCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_i32())
    }
}

impl<'de> Deserialize<'de> for RpcCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i32::deserialize(deserializer)?;
        Self::try_from(code)
            .map_err(|c| serde::de::Error::custom(format!("unknown RPC code {c}")))
    }
}

/// Failure of a single RPC call.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// No handler is registered under this method name.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// The request or its kwargs could not be decoded.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// A handler result could not be represented as JSON.
    #[error("Result encoding failed: {0}")]
    Encoding(String),

    /// The server was started without a compiler backend.
    #[error("Notebook compilation is not configured on this server")]
    CompilerUnavailable,

    /// The blocking worker running the handler died.
    #[error("Handler task failed: {0}")]
    TaskFailed(String),

    /// Error raised by a notebook operation.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl RpcError {
    /// Response code for this error.
    ///
    /// Annotation problems in the notebook are reported as internal errors;
    /// configuration and external-stage failures pass through as unhandled.
    pub fn code(&self) -> RpcCode {
        match self {
            Self::MethodNotFound(_) => RpcCode::NotFound,
            Self::InvalidArguments(_) | Self::Encoding(_) => RpcCode::EncodingError,
            Self::CompilerUnavailable => RpcCode::ServiceUnavailable,
            Self::TaskFailed(_) => RpcCode::UnhandledError,
            Self::Core(e) if e.is_annotation_error() => RpcCode::InternalError,
            Self::Core(_) => RpcCode::UnhandledError,
        }
    }

    /// Error class reported as `err_cls`.
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::MethodNotFound(_) => "MethodNotFound",
            Self::InvalidArguments(_) => "InvalidArguments",
            Self::Encoding(_) => "EncodingError",
            Self::CompilerUnavailable => "CompilerUnavailable",
            Self::TaskFailed(_) => "TaskFailed",
            Self::Core(e) => match e {
                CoreError::Config(_) => "ConfigError",
                CoreError::MissingAnnotation { .. } => "MissingAnnotation",
                CoreError::Parse(_) => "ParseError",
                CoreError::Notebook { .. } => "NotebookError",
                CoreError::Marshal { .. } => "MarshalError",
                CoreError::Backend(_) => "CompilerError",
                CoreError::Package(_) => "PackageError",
                CoreError::Io(_) => "IoError",
                CoreError::Json(_) => "JsonError",
            },
        }
    }
}

/// Server startup error.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// IO error.
    #[error("IO error at {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// Host and port do not form a socket address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl From<std::io::Error> for ServerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            message: e.to_string(),
        }
    }
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use nbpipe_core::ParseError;

    #[test]
    fn test_codes() {
        assert_eq!(RpcCode::Ok.as_i32(), 0);
        assert_eq!(RpcCode::UnhandledError.as_i32(), 6);
        assert_eq!(RpcCode::try_from(4), Ok(RpcCode::InternalError));
        assert_eq!(RpcCode::try_from(9), Err(9));
    }

    #[test]
    fn test_annotation_errors_are_internal() {
        let missing = RpcError::from(CoreError::MissingAnnotation {
            kind: "pipeline metrics",
            tag: "pipeline-metrics",
        });
        assert_eq!(missing.code(), RpcCode::InternalError);
        assert_eq!(missing.class_name(), "MissingAnnotation");

        let parse = RpcError::from(CoreError::Parse(ParseError {
            line: 1,
            column: 5,
            message: "expected a literal".to_string(),
        }));
        assert_eq!(parse.code(), RpcCode::InternalError);
        assert_eq!(
            parse.to_string(),
            "parse error at line 1, column 5: expected a literal"
        );
    }

    #[test]
    fn test_other_core_errors_pass_through() {
        let config = RpcError::from(CoreError::Config("env path X=/y is not a file".to_string()));
        assert_eq!(config.code(), RpcCode::UnhandledError);
        assert_eq!(config.to_string(), "env path X=/y is not a file");
        assert_eq!(config.class_name(), "ConfigError");

        let package = RpcError::from(CoreError::Package("boom".to_string()));
        assert_eq!(package.code(), RpcCode::UnhandledError);
        assert_eq!(package.class_name(), "PackageError");
    }

    #[test]
    fn test_request_errors() {
        assert_eq!(RpcError::MethodNotFound("nb.x".into()).code(), RpcCode::NotFound);
        assert_eq!(RpcError::InvalidArguments("x".into()).code(), RpcCode::EncodingError);
        assert_eq!(RpcError::Encoding("x".into()).code(), RpcCode::EncodingError);
        assert_eq!(RpcError::CompilerUnavailable.code(), RpcCode::ServiceUnavailable);
    }
}
