//! JSON-RPC and codec error types.
//!
//! Every error that can reach a peer over the wire is a [`Error`] carrying a
//! [`ErrorCode`]. Errors that never reach the wire (builder misuse, transport
//! setup failures) are reported as `anyhow::Error` elsewhere in the crate,
//! matching how the rest of this workspace draws the line between protocol
//! errors and host errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC error codes, including the ACP-specific extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    AuthRequired,
    ResourceNotFound,
    Other(i32),
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::InternalError => -32603,
            ErrorCode::AuthRequired => -32000,
            ErrorCode::ResourceNotFound => -32002,
            ErrorCode::Other(c) => c,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            -32700 => ErrorCode::ParseError,
            -32600 => ErrorCode::InvalidRequest,
            -32601 => ErrorCode::MethodNotFound,
            -32602 => ErrorCode::InvalidParams,
            -32603 => ErrorCode::InternalError,
            -32000 => ErrorCode::AuthRequired,
            -32002 => ErrorCode::ResourceNotFound,
            other => ErrorCode::Other(other),
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::MethodNotFound => "Method not found",
            ErrorCode::InvalidParams => "Invalid params",
            ErrorCode::InternalError => "Internal error",
            ErrorCode::AuthRequired => "Authentication required",
            ErrorCode::ResourceNotFound => "Resource not found",
            ErrorCode::Other(_) => "",
        }
    }
}

/// A JSON-RPC error object, `{code, message, data?}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct Error {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Error {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(code: ErrorCode, message: impl Into<String>, data: Value) -> Self {
        Error {
            code: code.code(),
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn parse_error() -> Self {
        Self::new(ErrorCode::ParseError, ErrorCode::ParseError.default_message())
    }

    pub fn invalid_request() -> Self {
        Self::new(ErrorCode::InvalidRequest, ErrorCode::InvalidRequest.default_message())
    }

    pub fn method_not_found() -> Self {
        Self::new(ErrorCode::MethodNotFound, ErrorCode::MethodNotFound.default_message())
    }

    pub fn invalid_params(field: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidParams,
            format!("{}: {field}", ErrorCode::InvalidParams.default_message()),
        )
    }

    pub fn internal_error() -> Self {
        Self::new(ErrorCode::InternalError, ErrorCode::InternalError.default_message())
    }

    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, ErrorCode::AuthRequired.default_message())
    }

    pub fn resource_not_found(uri: impl Into<String>) -> Self {
        Self::with_data(
            ErrorCode::ResourceNotFound,
            ErrorCode::ResourceNotFound.default_message(),
            serde_json::json!({ "uri": uri.into() }),
        )
    }

    pub fn connection_closed() -> Self {
        Self::new(ErrorCode::Other(-1), "Connection closed")
    }

    pub fn timed_out() -> Self {
        Self::new(ErrorCode::Other(-2), "Request timed out")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_not_found_wire_shape() {
        let e = Error::method_not_found();
        assert_eq!(
            serde_json::to_string(&e).unwrap(),
            r#"{"code":-32601,"message":"Method not found"}"#
        );
    }

    #[test]
    fn resource_not_found_carries_uri() {
        let e = Error::resource_not_found("file:///tmp/x");
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["data"]["uri"], "file:///tmp/x");
        assert_eq!(v["code"], -32002);
    }
}
