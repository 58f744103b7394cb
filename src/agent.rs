//! Payload types and the method table for what an **agent** receives from a
//! client (§4.3 "Agent side", §6 c→a methods).

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::ClientCapabilities;
use crate::mcp_server::McpServer;
use crate::session::{SessionId, SessionModeId, SessionModeState};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Implementation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PromptCapabilities {
    #[serde(default, skip_serializing_if = "crate::is_false")]
    pub image: bool,
    #[serde(default, skip_serializing_if = "crate::is_false")]
    pub audio: bool,
    #[serde(default, skip_serializing_if = "crate::is_false")]
    pub embedded_context: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct McpCapabilities {
    #[serde(default, skip_serializing_if = "crate::is_false")]
    pub http: bool,
    #[serde(default, skip_serializing_if = "crate::is_false")]
    pub sse: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    #[serde(default, skip_serializing_if = "crate::is_false")]
    pub load_session: bool,
    #[serde(default)]
    pub prompt_capabilities: PromptCapabilities,
    #[serde(default)]
    pub mcp_capabilities: McpCapabilities,
}

/// Protocol version: non-negative integer (§3.5). An incoming JSON string
/// decodes as legacy version 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProtocolVersion(pub u32);

pub const PROTOCOL_VERSION_LEGACY: ProtocolVersion = ProtocolVersion(0);
pub const PROTOCOL_VERSION_LATEST: ProtocolVersion = ProtocolVersion(1);

impl Serialize for ProtocolVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for ProtocolVersion {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(deserializer)?;
        match v {
            Value::Number(n) => Ok(ProtocolVersion(n.as_u64().unwrap_or(0) as u32)),
            Value::String(_) => Ok(PROTOCOL_VERSION_LEGACY),
            _ => Err(serde::de::Error::custom("invalid protocolVersion")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InitializeRequest {
    pub protocol_version: ProtocolVersion,
    #[serde(default)]
    pub client_capabilities: ClientCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResponse {
    pub protocol_version: ProtocolVersion,
    #[serde(default)]
    pub agent_capabilities: AgentCapabilities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_methods: Option<Vec<AuthMethod>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display, From)]
#[serde(transparent)]
pub struct AuthMethodId(pub String);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthMethod {
    pub id: AuthMethodId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateRequest {
    pub method_id: AuthMethodId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateResponse {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionRequest {
    pub cwd: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mcp_servers: Vec<McpServer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionResponse {
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modes: Option<SessionModeState>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoadSessionRequest {
    pub session_id: SessionId,
    pub cwd: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mcp_servers: Vec<McpServer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoadSessionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modes: Option<SessionModeState>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetSessionModeRequest {
    pub session_id: SessionId,
    pub mode_id: SessionModeId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SetSessionModeResponse {}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    MaxTurnRequests,
    Refusal,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequest {
    pub session_id: SessionId,
    pub prompt: Vec<crate::content::ContentBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptResponse {
    pub stop_reason: StopReason,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CancelNotification {
    pub session_id: SessionId,
}

#[cfg(feature = "unstable")]
pub mod unstable {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display, From)]
    #[serde(transparent)]
    pub struct ModelId(pub String);

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct ModelInfo {
        pub id: ModelId,
        pub name: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct SessionModelState {
        pub current_model_id: ModelId,
        pub available_models: Vec<ModelInfo>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct SetSessionModelRequest {
        pub session_id: SessionId,
        pub model_id: ModelId,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct SetSessionModelResponse {}

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct ListSessionsRequest {}

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct ListSessionsResponse {
        pub sessions: Vec<SessionId>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct ForkSessionRequest {
        pub session_id: SessionId,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct ForkSessionResponse {
        pub session_id: SessionId,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct ResumeSessionRequest {
        pub session_id: SessionId,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct ResumeSessionResponse {}

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct SetSessionConfigOptionRequest {
        pub session_id: SessionId,
        pub option_id: String,
        pub value: Value,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct SetSessionConfigOptionResponse {}
}

/// Method-name constants for the agent side (§4.3, §6).
pub struct AgentMethodNames;

impl AgentMethodNames {
    pub const INITIALIZE: &'static str = "initialize";
    pub const AUTHENTICATE: &'static str = "authenticate";
    pub const SESSION_NEW: &'static str = "session/new";
    pub const SESSION_LOAD: &'static str = "session/load";
    pub const SESSION_SET_MODE: &'static str = "session/set_mode";
    pub const SESSION_PROMPT: &'static str = "session/prompt";
    pub const SESSION_CANCEL: &'static str = "session/cancel";
    #[cfg(feature = "unstable")]
    pub const SESSION_LIST: &'static str = "session/list";
    #[cfg(feature = "unstable")]
    pub const SESSION_FORK: &'static str = "session/fork";
    #[cfg(feature = "unstable")]
    pub const SESSION_RESUME: &'static str = "session/resume";
    #[cfg(feature = "unstable")]
    pub const SESSION_SET_CONFIG_OPTION: &'static str = "session/set_config_option";
    #[cfg(feature = "unstable")]
    pub const SESSION_SET_MODEL: &'static str = "session/set_model";
}

#[derive(Debug, Clone)]
pub enum ClientRequest {
    Initialize(InitializeRequest),
    Authenticate(AuthenticateRequest),
    NewSession(NewSessionRequest),
    LoadSession(LoadSessionRequest),
    SetSessionMode(SetSessionModeRequest),
    Prompt(PromptRequest),
    #[cfg(feature = "unstable")]
    ListSessions(unstable::ListSessionsRequest),
    #[cfg(feature = "unstable")]
    ForkSession(unstable::ForkSessionRequest),
    #[cfg(feature = "unstable")]
    ResumeSession(unstable::ResumeSessionRequest),
    #[cfg(feature = "unstable")]
    SetSessionConfigOption(unstable::SetSessionConfigOptionRequest),
    #[cfg(feature = "unstable")]
    SetSessionModel(unstable::SetSessionModelRequest),
    ExtMethod { method: String, params: Value },
}

#[derive(Debug, Clone)]
pub enum AgentResponse {
    Initialize(InitializeResponse),
    Authenticate(AuthenticateResponse),
    NewSession(NewSessionResponse),
    LoadSession(LoadSessionResponse),
    SetSessionMode(SetSessionModeResponse),
    Prompt(PromptResponse),
    #[cfg(feature = "unstable")]
    ListSessions(unstable::ListSessionsResponse),
    #[cfg(feature = "unstable")]
    ForkSession(unstable::ForkSessionResponse),
    #[cfg(feature = "unstable")]
    ResumeSession(unstable::ResumeSessionResponse),
    #[cfg(feature = "unstable")]
    SetSessionConfigOption(unstable::SetSessionConfigOptionResponse),
    #[cfg(feature = "unstable")]
    SetSessionModel(unstable::SetSessionModelResponse),
    ExtMethod(Value),
}

impl AgentResponse {
    pub fn into_value(self) -> Result<Value, serde_json::Error> {
        match self {
            AgentResponse::Initialize(r) => serde_json::to_value(r),
            AgentResponse::Authenticate(r) => serde_json::to_value(r),
            AgentResponse::NewSession(r) => serde_json::to_value(r),
            AgentResponse::LoadSession(r) => serde_json::to_value(r),
            AgentResponse::SetSessionMode(r) => serde_json::to_value(r),
            AgentResponse::Prompt(r) => serde_json::to_value(r),
            #[cfg(feature = "unstable")]
            AgentResponse::ListSessions(r) => serde_json::to_value(r),
            #[cfg(feature = "unstable")]
            AgentResponse::ForkSession(r) => serde_json::to_value(r),
            #[cfg(feature = "unstable")]
            AgentResponse::ResumeSession(r) => serde_json::to_value(r),
            #[cfg(feature = "unstable")]
            AgentResponse::SetSessionConfigOption(r) => serde_json::to_value(r),
            #[cfg(feature = "unstable")]
            AgentResponse::SetSessionModel(r) => serde_json::to_value(r),
            AgentResponse::ExtMethod(v) => Ok(v),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ClientNotification {
    Cancel(CancelNotification),
    ExtNotification { method: String, params: Value },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_version_string_is_legacy() {
        let v: ProtocolVersion = serde_json::from_str(r#""2024-01-01""#).unwrap();
        assert_eq!(v, PROTOCOL_VERSION_LEGACY);
        let v: ProtocolVersion = serde_json::from_str("1").unwrap();
        assert_eq!(v, PROTOCOL_VERSION_LATEST);
    }

    #[test]
    fn initialize_round_trip() {
        let req = InitializeRequest {
            protocol_version: PROTOCOL_VERSION_LATEST,
            client_capabilities: ClientCapabilities::default(),
        };
        let v = serde_json::to_value(&req).unwrap();
        let back: InitializeRequest = serde_json::from_value(v).unwrap();
        assert_eq!(req, back);
    }
}
