//! Tool calls and their partial-update counterpart.
//!
//! Applies the default-elision rule from §3.5: `kind` and `status` carry
//! documented defaults that are omitted from encoded output, the same way
//! `None` optionals elsewhere in this crate are dropped via
//! `skip_serializing_if`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::ContentBlock;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Read,
    Edit,
    Delete,
    Move,
    Search,
    Execute,
    Think,
    Fetch,
    SwitchMode,
    #[default]
    Other,
}

impl ToolKind {
    pub fn is_default(&self) -> bool {
        matches!(self, ToolKind::Other)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl ToolCallStatus {
    pub fn is_default(&self) -> bool {
        matches!(self, ToolCallStatus::Pending)
    }
}

fn is_default_kind(k: &ToolKind) -> bool {
    k.is_default()
}

fn is_default_status(s: &ToolCallStatus) -> bool {
    s.is_default()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallLocation {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Either inline content or a reference to a live terminal (§3.5
/// "tool-call update").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged, rename_all = "camelCase")]
pub enum ToolCallContent {
    Content { content: ContentBlock },
    Terminal { terminal_id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    pub tool_call_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "is_default_kind")]
    pub kind: ToolKind,
    #[serde(default, skip_serializing_if = "is_default_status")]
    pub status: ToolCallStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<ToolCallContent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<ToolCallLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "_meta")]
    pub meta: Option<Value>,
}

/// Same fields as [`ToolCall`], all optional: a partial mutation keyed by
/// `tool_call_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallUpdate {
    pub tool_call_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ToolKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ToolCallStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<ToolCallContent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<ToolCallLocation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "_meta")]
    pub meta: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_omitted() {
        let call = ToolCall {
            tool_call_id: "t1".into(),
            title: "Edit file".into(),
            kind: ToolKind::default(),
            status: ToolCallStatus::default(),
            content: vec![],
            locations: vec![],
            raw_input: None,
            raw_output: None,
            meta: None,
        };
        assert_eq!(
            serde_json::to_string(&call).unwrap(),
            r#"{"toolCallId":"t1","title":"Edit file"}"#
        );
    }

    #[test]
    fn non_default_kind_and_status_are_emitted() {
        let call = ToolCall {
            tool_call_id: "t1".into(),
            title: "Run".into(),
            kind: ToolKind::Execute,
            status: ToolCallStatus::InProgress,
            content: vec![],
            locations: vec![],
            raw_input: None,
            raw_output: None,
            meta: None,
        };
        let v = serde_json::to_value(&call).unwrap();
        assert_eq!(v["kind"], "execute");
        assert_eq!(v["status"], "in_progress");
    }
}
