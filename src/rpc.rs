//! The wire envelope: request ids, the `jsonrpc` version tag, and the three
//! message shapes (request / response / notification).
//!
//! `RequestId` covers the full `{null, integer, string}` id space a
//! bidirectional peer needs, rather than a single numeric id type, since
//! either side may originate requests the other must correlate responses
//! against.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{Error as RpcError, ErrorCode};

/// A JSON-RPC request id: absent on notifications, otherwise null,
/// integer, or string. Only ever compared for equality; never interpreted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    Null,
    Number(i64),
    String(String),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Null => write!(f, "null"),
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

/// Always `"2.0"`. Inbound, an absent `jsonrpc` key is tolerated by the
/// containing struct's `#[serde(default)]`; a present value other than
/// `"2.0"` fails to deserialize into this type, which the framing layer
/// turns into an `invalid_request`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum JsonRpcVersion {
    #[default]
    #[serde(rename = "2.0")]
    V2,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Request {
    #[serde(default)]
    pub jsonrpc: JsonRpcVersion,
    pub id: RequestId,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    #[serde(default)]
    pub jsonrpc: JsonRpcVersion,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// `result` xor `error`, never both, never neither. Untagged with named
/// fields so each variant serializes as its own wire key (`result` or
/// `error`) once flattened into the containing [`Response`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ResponseResult {
    Result { result: Value },
    Error { error: RpcError },
}

impl ResponseResult {
    pub fn ok(value: Value) -> Self {
        ResponseResult::Result { result: value }
    }

    pub fn err(error: RpcError) -> Self {
        ResponseResult::Error { error }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    #[serde(default)]
    pub jsonrpc: JsonRpcVersion,
    pub id: RequestId,
    #[serde(flatten)]
    pub result: ResponseResult,
}

impl Response {
    pub fn ok(id: RequestId, value: Value) -> Self {
        Response {
            jsonrpc: JsonRpcVersion::V2,
            id,
            result: ResponseResult::ok(value),
        }
    }

    pub fn err(id: RequestId, error: RpcError) -> Self {
        Response {
            jsonrpc: JsonRpcVersion::V2,
            id,
            result: ResponseResult::err(error),
        }
    }

    pub fn into_result(self) -> Result<Value, RpcError> {
        match self.result {
            ResponseResult::Result { result } => Ok(result),
            ResponseResult::Error { error } => Err(error),
        }
    }
}

/// The three wire shapes, classified structurally (§4.2): `id` + `method` is
/// a request, `id` + (`result` xor `error`) without `method` is a response,
/// `method` without `id` is a notification. This enum is never serialized
/// directly on the encode path (each shape is encoded from its own type);
/// it exists purely to classify a parsed [`Value`] on the decode path.
#[derive(Debug, Clone)]
pub enum Message {
    Request(Request),
    Response(Response),
    Notification(Notification),
}

impl Message {
    /// Classifies a raw JSON line into one of the three shapes. Returns
    /// `invalid_request` for anything else (missing both/neither of the
    /// discriminating keys, or a response whose `id` itself doesn't decode).
    ///
    /// A response-shaped message whose `id` decodes but whose `result`/
    /// `error` body doesn't is still returned as a [`Message::Response`]
    /// carrying a decode-error payload (§7): the id is known, so the
    /// caller can still look up and resolve the matching waiter instead of
    /// leaving it to hang until its timeout.
    pub fn classify(value: Value) -> Result<Message, RpcError> {
        let obj = value.as_object().ok_or_else(RpcError::invalid_request)?;
        let has_id = obj.contains_key("id");
        let has_method = obj.contains_key("method");
        if has_id && has_method {
            let req: Request =
                serde_json::from_value(value).map_err(|_| RpcError::invalid_request())?;
            Ok(Message::Request(req))
        } else if has_method {
            let notif: Notification =
                serde_json::from_value(value).map_err(|_| RpcError::invalid_request())?;
            Ok(Message::Notification(notif))
        } else if has_id && (obj.contains_key("result") ^ obj.contains_key("error")) {
            Ok(Message::Response(Self::decode_response(value)?))
        } else {
            Err(RpcError::invalid_request())
        }
    }

    /// Decodes a response-shaped object, isolating `id` decoding from
    /// `result`/`error` decoding so a malformed payload doesn't discard a
    /// well-formed id.
    fn decode_response(value: Value) -> Result<Response, RpcError> {
        let id: RequestId = value
            .get("id")
            .cloned()
            .ok_or_else(RpcError::invalid_request)
            .and_then(|v| serde_json::from_value(v).map_err(|_| RpcError::invalid_request()))?;
        match serde_json::from_value::<Response>(value) {
            Ok(response) => Ok(response),
            Err(e) => Ok(Response::err(
                id,
                RpcError::new(ErrorCode::ParseError, format!("malformed response: {e}")),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_serialization() {
        assert_eq!(serde_json::to_string(&RequestId::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&RequestId::Number(7)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&RequestId::String("a".into())).unwrap(),
            r#""a""#
        );
    }

    #[test]
    fn id_deserialization() {
        assert_eq!(
            serde_json::from_str::<RequestId>("null").unwrap(),
            RequestId::Null
        );
        assert_eq!(
            serde_json::from_str::<RequestId>("42").unwrap(),
            RequestId::Number(42)
        );
        assert_eq!(
            serde_json::from_str::<RequestId>(r#""x""#).unwrap(),
            RequestId::String("x".into())
        );
    }

    #[test]
    fn id_display() {
        assert_eq!(RequestId::Number(3).to_string(), "3");
        assert_eq!(RequestId::String("foo".into()).to_string(), "foo");
        assert_eq!(RequestId::Null.to_string(), "null");
    }

    #[test]
    fn initialize_request_wire_shape() {
        let v: Value = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":0,"method":"initialize","params":{"protocolVersion":1}}"#,
        )
        .unwrap();
        match Message::classify(v).unwrap() {
            Message::Request(req) => {
                assert_eq!(req.id, RequestId::Number(0));
                assert_eq!(req.method, "initialize");
            }
            _ => panic!("expected request"),
        }
    }

    #[test]
    fn response_ok_omits_method() {
        let r = Response::ok(RequestId::Number(0), serde_json::json!({"protocolVersion":1}));
        let s = serde_json::to_string(&r).unwrap();
        assert_eq!(s, r#"{"jsonrpc":"2.0","id":0,"result":{"protocolVersion":1}}"#);
    }

    #[test]
    fn notification_has_no_id() {
        let n = Notification {
            jsonrpc: JsonRpcVersion::V2,
            method: "session/cancel".into(),
            params: Some(serde_json::json!({"sessionId":"s1"})),
        };
        let s = serde_json::to_string(&n).unwrap();
        assert_eq!(
            s,
            r#"{"jsonrpc":"2.0","method":"session/cancel","params":{"sessionId":"s1"}}"#
        );
    }

    #[test]
    fn malformed_shape_is_invalid_request() {
        let v = serde_json::json!({"foo": "bar"});
        assert!(Message::classify(v).is_err());
    }

    #[test]
    fn malformed_error_body_still_resolves_id() {
        let v = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 7,
            "error": {"code": "not-a-number", "message": "oops"},
        });
        match Message::classify(v).unwrap() {
            Message::Response(resp) => {
                assert_eq!(resp.id, RequestId::Number(7));
                let err = resp.into_result().unwrap_err();
                assert_eq!(err.code, ErrorCode::ParseError.code());
            }
            other => panic!("expected a response, got {other:?}"),
        }
    }

    #[test]
    fn response_with_undecodable_id_is_invalid_request() {
        let v = serde_json::json!({
            "jsonrpc": "2.0",
            "id": {"not": "a valid id"},
            "result": {},
        });
        assert!(Message::classify(v).is_err());
    }
}
