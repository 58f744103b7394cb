//! Payload types and the method table for what a **client** receives from
//! an agent (§4.3 "Client side", §6 a→c methods).
//!
//! `ClientCapabilities` follows the nested-capability-struct convention
//! used elsewhere in this codebase for negotiation payloads (`Default`,
//! camelCase, bools defaulting to omitted-when-false); the request/response
//! pairs below are modeled on the method table in §6.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::SessionId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FileSystemCapability {
    #[serde(default, skip_serializing_if = "crate::is_false")]
    pub read_text_file: bool,
    #[serde(default, skip_serializing_if = "crate::is_false")]
    pub write_text_file: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClientCapabilities {
    #[serde(default)]
    pub fs: FileSystemCapability,
    #[serde(default, skip_serializing_if = "crate::is_false")]
    pub terminal: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display, From)]
#[serde(transparent)]
pub struct PermissionOptionId(pub String);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PermissionOptionKind {
    AllowOnce,
    AllowAlways,
    RejectOnce,
    RejectAlways,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PermissionOption {
    #[serde(rename = "optionId")]
    pub id: PermissionOptionId,
    pub name: String,
    pub kind: PermissionOptionKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestPermissionRequest {
    pub session_id: SessionId,
    pub tool_call: crate::tool_call::ToolCallUpdate,
    pub options: Vec<PermissionOption>,
}

/// Tag field `outcome` (§3.4 rule 3, §8 scenario 4): `cancelled` carries no
/// payload; `selected` flattens its `optionId`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RequestPermissionOutcome {
    Cancelled,
    Selected { option_id: PermissionOptionId },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestPermissionResponse {
    pub outcome: RequestPermissionOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WriteTextFileRequest {
    pub session_id: SessionId,
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WriteTextFileResponse {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadTextFileRequest {
    pub session_id: SessionId,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadTextFileResponse {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display, From)]
#[serde(transparent)]
pub struct TerminalId(pub String);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTerminalRequest {
    pub session_id: SessionId,
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_byte_limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTerminalResponse {
    pub terminal_id: TerminalId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TerminalOutputRequest {
    pub session_id: SessionId,
    pub terminal_id: TerminalId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TerminalExitStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TerminalOutputResponse {
    pub output: String,
    pub truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none", flatten)]
    pub exit_status: Option<TerminalExitStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseTerminalRequest {
    pub session_id: SessionId,
    pub terminal_id: TerminalId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseTerminalResponse {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KillTerminalCommandRequest {
    pub session_id: SessionId,
    pub terminal_id: TerminalId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct KillTerminalCommandResponse {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WaitForTerminalExitRequest {
    pub session_id: SessionId,
    pub terminal_id: TerminalId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WaitForTerminalExitResponse {
    #[serde(flatten)]
    pub exit_status: TerminalExitStatus,
}

/// Method-name constants for the client side (§4.3, §6).
pub struct ClientMethodNames;

impl ClientMethodNames {
    pub const SESSION_REQUEST_PERMISSION: &'static str = "session/request_permission";
    pub const FS_WRITE_TEXT_FILE: &'static str = "fs/write_text_file";
    pub const FS_READ_TEXT_FILE: &'static str = "fs/read_text_file";
    pub const TERMINAL_CREATE: &'static str = "terminal/create";
    pub const TERMINAL_OUTPUT: &'static str = "terminal/output";
    pub const TERMINAL_RELEASE: &'static str = "terminal/release";
    pub const TERMINAL_WAIT_FOR_EXIT: &'static str = "terminal/wait_for_exit";
    pub const TERMINAL_KILL: &'static str = "terminal/kill";
    pub const SESSION_UPDATE: &'static str = "session/update";
}

#[derive(Debug, Clone)]
pub enum AgentRequest {
    RequestPermission(RequestPermissionRequest),
    WriteTextFile(WriteTextFileRequest),
    ReadTextFile(ReadTextFileRequest),
    CreateTerminal(CreateTerminalRequest),
    TerminalOutput(TerminalOutputRequest),
    ReleaseTerminal(ReleaseTerminalRequest),
    WaitForTerminalExit(WaitForTerminalExitRequest),
    KillTerminalCommand(KillTerminalCommandRequest),
    ExtMethod { method: String, params: Value },
}

#[derive(Debug, Clone)]
pub enum ClientResponse {
    RequestPermission(RequestPermissionResponse),
    WriteTextFile(WriteTextFileResponse),
    ReadTextFile(ReadTextFileResponse),
    CreateTerminal(CreateTerminalResponse),
    TerminalOutput(TerminalOutputResponse),
    ReleaseTerminal(ReleaseTerminalResponse),
    WaitForTerminalExit(WaitForTerminalExitResponse),
    KillTerminalCommand(KillTerminalCommandResponse),
    ExtMethod(Value),
}

impl ClientResponse {
    pub fn into_value(self) -> Result<Value, serde_json::Error> {
        match self {
            ClientResponse::RequestPermission(r) => serde_json::to_value(r),
            ClientResponse::WriteTextFile(r) => serde_json::to_value(r),
            ClientResponse::ReadTextFile(r) => serde_json::to_value(r),
            ClientResponse::CreateTerminal(r) => serde_json::to_value(r),
            ClientResponse::TerminalOutput(r) => serde_json::to_value(r),
            ClientResponse::ReleaseTerminal(r) => serde_json::to_value(r),
            ClientResponse::WaitForTerminalExit(r) => serde_json::to_value(r),
            ClientResponse::KillTerminalCommand(r) => serde_json::to_value(r),
            ClientResponse::ExtMethod(v) => Ok(v),
        }
    }
}

#[derive(Debug, Clone)]
pub enum AgentNotification {
    SessionUpdate(crate::session::SessionNotification),
    ExtNotification { method: String, params: Value },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_outcome_cancelled() {
        let o = RequestPermissionOutcome::Cancelled;
        assert_eq!(
            serde_json::to_string(&o).unwrap(),
            r#"{"outcome":"cancelled"}"#
        );
    }

    #[test]
    fn permission_outcome_selected() {
        let o = RequestPermissionOutcome::Selected {
            option_id: PermissionOptionId("opt-1".into()),
        };
        assert_eq!(
            serde_json::to_string(&o).unwrap(),
            r#"{"outcome":"selected","optionId":"opt-1"}"#
        );
        let back: RequestPermissionOutcome =
            serde_json::from_str(r#"{"outcome":"selected","optionId":"opt-1"}"#).unwrap();
        assert_eq!(back, o);
    }
}
