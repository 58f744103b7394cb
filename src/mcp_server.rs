//! MCP server transport descriptors reachable from a session (§3.4 rule 1):
//! `http` and `sse` are tagged by `type`; the default `stdio` shape has no
//! tag and is recognized structurally by the presence of `command`.
//!
//! Mirrors the stdio-vs-HTTP transport split this codebase already draws
//! at the byte-stream level (see [`crate::transport`]); here the same
//! split is encoded as a schema type instead of runtime plumbing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvVariable {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StdioServer {
    pub name: String,
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVariable>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpServer {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HttpHeader>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SseServer {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HttpHeader>,
}

/// Internally tagged on `type`; the two networked transports flatten their
/// fields alongside the tag the way serde's internal tagging does for free.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TaggedMcpServer {
    Http(HttpServer),
    Sse(SseServer),
}

/// Structural + tagged union: `Stdio` is untagged (identified by the
/// `command` key, absent on the other two); `Http`/`Sse` carry `type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum McpServer {
    Stdio(StdioServer),
    Tagged(TaggedMcpServer),
}

impl McpServer {
    pub fn http(server: HttpServer) -> Self {
        McpServer::Tagged(TaggedMcpServer::Http(server))
    }

    pub fn sse(server: SseServer) -> Self {
        McpServer::Tagged(TaggedMcpServer::Sse(server))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdio_round_trip_no_type_field() {
        let server = McpServer::Stdio(StdioServer {
            name: "srv".into(),
            command: "/bin/s".into(),
            args: vec!["-p".into(), "3".into()],
            env: vec![EnvVariable {
                name: "K".into(),
                value: "v".into(),
            }],
        });
        let v = serde_json::to_value(&server).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "name": "srv",
                "command": "/bin/s",
                "args": ["-p", "3"],
                "env": [{"name": "K", "value": "v"}],
            })
        );
        let back: McpServer = serde_json::from_value(v).unwrap();
        assert_eq!(back, server);
    }

    #[test]
    fn http_server_carries_type_tag() {
        let server = McpServer::http(HttpServer {
            name: "h".into(),
            url: "https://example.com".into(),
            headers: vec![],
        });
        let v = serde_json::to_value(&server).unwrap();
        assert_eq!(v["type"], "http");
    }
}
