//! Session identity, modes, and the `session/update` notification payload.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::ContentBlock;
use crate::plan::Plan;
use crate::three_state::{self, ThreeState};
use crate::tool_call::{ToolCall, ToolCallUpdate};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display, From)]
#[serde(transparent)]
pub struct SessionId(pub String);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display, From)]
#[serde(transparent)]
pub struct SessionModeId(pub String);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionMode {
    pub id: SessionModeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionModeState {
    pub current_mode_id: SessionModeId,
    pub available_modes: Vec<SessionMode>,
}

/// Untagged structural union (§3.4 rule 5): a single `Unstructured` shape
/// identified by the presence of `hint`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AvailableCommandInput {
    Unstructured { hint: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailableCommand {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<AvailableCommandInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailableCommandsUpdate {
    pub available_commands: Vec<AvailableCommand>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentModeUpdate {
    pub current_mode_id: SessionModeId,
}

/// Partial update of a session's display metadata. Both fields use the
/// three-state optional (§3.2, §8 scenario 3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfoUpdate {
    #[serde(
        default,
        skip_serializing_if = "three_state::is_undefined",
        serialize_with = "three_state::serialize",
        deserialize_with = "three_state::deserialize"
    )]
    pub title: ThreeState<String>,
    #[serde(
        default,
        skip_serializing_if = "three_state::is_undefined",
        serialize_with = "three_state::serialize",
        deserialize_with = "three_state::deserialize",
        rename = "updatedAt"
    )]
    pub updated_at: ThreeState<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentChunk {
    pub content: ContentBlock,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "_meta")]
    pub meta: Option<Value>,
}

#[cfg(feature = "unstable")]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionModelUpdate {
    pub model_id: String,
}

#[cfg(feature = "unstable")]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfigOptionUpdate {
    pub option_id: String,
    pub value: Value,
}

/// Tag field `sessionUpdate` (§3.4 rule 2): ten variants with the payload
/// flattened into the outer object. Eight are stable; two
/// (`SessionModelUpdate`, `SessionConfigOptionUpdate`) are gated behind the
/// `unstable` feature — see DESIGN.md for why the count is ten.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "sessionUpdate", rename_all = "snake_case")]
pub enum SessionUpdate {
    UserMessageChunk(ContentChunk),
    AgentMessageChunk(ContentChunk),
    AgentThoughtChunk(ContentChunk),
    ToolCall(ToolCall),
    ToolCallUpdate(ToolCallUpdate),
    Plan(Plan),
    AvailableCommandsUpdate(AvailableCommandsUpdate),
    CurrentModeUpdate(CurrentModeUpdate),
    #[cfg(feature = "unstable")]
    SessionModelUpdate(SessionModelUpdate),
    #[cfg(feature = "unstable")]
    SessionConfigOptionUpdate(SessionConfigOptionUpdate),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionNotification {
    pub session_id: SessionId,
    pub update: SessionUpdate,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "_meta")]
    pub meta: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_info_update_scenarios() {
        let p = SessionInfoUpdate {
            title: ThreeState::Value("Test".to_string()),
            updated_at: ThreeState::Undefined,
        };
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"{"title":"Test"}"#);

        let p: SessionInfoUpdate = serde_json::from_str(r#"{"title":null}"#).unwrap();
        assert_eq!(p.title, ThreeState::Null);
        assert_eq!(p.updated_at, ThreeState::Undefined);

        let p: SessionInfoUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(p, SessionInfoUpdate::default());
    }

    #[test]
    fn session_update_nests_under_update_field() {
        let n = SessionNotification {
            session_id: SessionId("s1".into()),
            update: SessionUpdate::AgentMessageChunk(ContentChunk {
                content: ContentBlock::text("hi"),
                meta: None,
            }),
            meta: None,
        };
        let v = serde_json::to_value(&n).unwrap();
        assert_eq!(v["sessionId"], "s1");
        assert_eq!(v["update"]["sessionUpdate"], "agent_message_chunk");
        assert_eq!(v["update"]["content"]["text"], "hi");
        assert!(v.get("sessionUpdate").is_none());
        assert!(v.get("content").is_none());
    }
}
