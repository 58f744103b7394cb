//! The side dispatcher (§4.3): method-name-to-payload decoding that differs
//! by peer role. `AgentSide` decodes what an agent receives from a client;
//! `ClientSide` decodes what a client receives from an agent.
//!
//! A static match over a closed method set rather than a dynamic
//! string-keyed registry, since ACP's methods are fixed by protocol
//! version rather than user-registered.

use serde_json::Value;

use crate::agent::{
    AgentMethodNames, AuthenticateRequest, CancelNotification, ClientNotification, ClientRequest,
    InitializeRequest, LoadSessionRequest, NewSessionRequest, PromptRequest,
    SetSessionModeRequest,
};
use crate::client::{
    AgentNotification, AgentRequest, ClientMethodNames, CreateTerminalRequest,
    KillTerminalCommandRequest, ReadTextFileRequest, ReleaseTerminalRequest,
    RequestPermissionRequest, TerminalOutputRequest, WaitForTerminalExitRequest,
    WriteTextFileRequest,
};
use crate::error::Error;
use crate::session::SessionNotification;

fn require_params(params: Option<Value>) -> Result<Value, Error> {
    params.ok_or_else(|| Error::invalid_params("params"))
}

fn decode<T: serde::de::DeserializeOwned>(params: Value) -> Result<T, Error> {
    serde_json::from_value(params).map_err(|e| Error::invalid_params(e))
}

/// A peer role's method table: decodes inbound requests/notifications into
/// tagged payloads, or reports `method_not_found`/`invalid_params`.
pub trait Side {
    type InRequest;
    type InNotification;

    fn decode_request(method: &str, params: Option<Value>) -> Result<Self::InRequest, Error>;
    fn decode_notification(
        method: &str,
        params: Option<Value>,
    ) -> Result<Self::InNotification, Error>;
}

/// Strips a leading `_` and reports whether `method` was an extension
/// method (§4.3 "Common rules").
fn strip_ext(method: &str) -> Option<&str> {
    method.strip_prefix('_')
}

pub struct AgentSide;

impl Side for AgentSide {
    type InRequest = ClientRequest;
    type InNotification = ClientNotification;

    fn decode_request(method: &str, params: Option<Value>) -> Result<ClientRequest, Error> {
        match method {
            AgentMethodNames::INITIALIZE => {
                Ok(ClientRequest::Initialize(decode::<InitializeRequest>(
                    require_params(params)?,
                )?))
            }
            AgentMethodNames::AUTHENTICATE => Ok(ClientRequest::Authenticate(decode::<
                AuthenticateRequest,
            >(require_params(
                params,
            )?)?)),
            AgentMethodNames::SESSION_NEW => {
                Ok(ClientRequest::NewSession(decode::<NewSessionRequest>(
                    require_params(params)?,
                )?))
            }
            AgentMethodNames::SESSION_LOAD => {
                Ok(ClientRequest::LoadSession(decode::<LoadSessionRequest>(
                    require_params(params)?,
                )?))
            }
            AgentMethodNames::SESSION_SET_MODE => Ok(ClientRequest::SetSessionMode(decode::<
                SetSessionModeRequest,
            >(require_params(
                params,
            )?)?)),
            AgentMethodNames::SESSION_PROMPT => {
                Ok(ClientRequest::Prompt(decode::<PromptRequest>(
                    require_params(params)?,
                )?))
            }
            #[cfg(feature = "unstable")]
            AgentMethodNames::SESSION_LIST => Ok(ClientRequest::ListSessions(decode(
                require_params(params)?,
            )?)),
            #[cfg(feature = "unstable")]
            AgentMethodNames::SESSION_FORK => Ok(ClientRequest::ForkSession(decode(
                require_params(params)?,
            )?)),
            #[cfg(feature = "unstable")]
            AgentMethodNames::SESSION_RESUME => Ok(ClientRequest::ResumeSession(decode(
                require_params(params)?,
            )?)),
            #[cfg(feature = "unstable")]
            AgentMethodNames::SESSION_SET_CONFIG_OPTION => Ok(
                ClientRequest::SetSessionConfigOption(decode(require_params(params)?)?),
            ),
            #[cfg(feature = "unstable")]
            AgentMethodNames::SESSION_SET_MODEL => Ok(ClientRequest::SetSessionModel(decode(
                require_params(params)?,
            )?)),
            other => match strip_ext(other) {
                Some(stripped) => Ok(ClientRequest::ExtMethod {
                    method: stripped.to_string(),
                    params: params.unwrap_or(Value::Null),
                }),
                None => Err(Error::method_not_found()),
            },
        }
    }

    fn decode_notification(
        method: &str,
        params: Option<Value>,
    ) -> Result<ClientNotification, Error> {
        match method {
            AgentMethodNames::SESSION_CANCEL => Ok(ClientNotification::Cancel(decode::<
                CancelNotification,
            >(require_params(
                params,
            )?)?)),
            other => match strip_ext(other) {
                Some(stripped) => Ok(ClientNotification::ExtNotification {
                    method: stripped.to_string(),
                    params: params.unwrap_or(Value::Null),
                }),
                None => Err(Error::method_not_found()),
            },
        }
    }
}

pub struct ClientSide;

impl Side for ClientSide {
    type InRequest = AgentRequest;
    type InNotification = AgentNotification;

    fn decode_request(method: &str, params: Option<Value>) -> Result<AgentRequest, Error> {
        match method {
            ClientMethodNames::SESSION_REQUEST_PERMISSION => Ok(AgentRequest::RequestPermission(
                decode::<RequestPermissionRequest>(require_params(params)?)?,
            )),
            ClientMethodNames::FS_WRITE_TEXT_FILE => Ok(AgentRequest::WriteTextFile(decode::<
                WriteTextFileRequest,
            >(require_params(
                params,
            )?)?)),
            ClientMethodNames::FS_READ_TEXT_FILE => Ok(AgentRequest::ReadTextFile(decode::<
                ReadTextFileRequest,
            >(require_params(
                params,
            )?)?)),
            ClientMethodNames::TERMINAL_CREATE => Ok(AgentRequest::CreateTerminal(decode::<
                CreateTerminalRequest,
            >(require_params(
                params,
            )?)?)),
            ClientMethodNames::TERMINAL_OUTPUT => Ok(AgentRequest::TerminalOutput(decode::<
                TerminalOutputRequest,
            >(require_params(
                params,
            )?)?)),
            ClientMethodNames::TERMINAL_RELEASE => Ok(AgentRequest::ReleaseTerminal(decode::<
                ReleaseTerminalRequest,
            >(require_params(
                params,
            )?)?)),
            ClientMethodNames::TERMINAL_WAIT_FOR_EXIT => Ok(AgentRequest::WaitForTerminalExit(
                decode::<WaitForTerminalExitRequest>(require_params(params)?)?,
            )),
            ClientMethodNames::TERMINAL_KILL => Ok(AgentRequest::KillTerminalCommand(decode::<
                KillTerminalCommandRequest,
            >(
                require_params(params)?,
            )?)),
            other => match strip_ext(other) {
                Some(stripped) => Ok(AgentRequest::ExtMethod {
                    method: stripped.to_string(),
                    params: params.unwrap_or(Value::Null),
                }),
                None => Err(Error::method_not_found()),
            },
        }
    }

    fn decode_notification(
        method: &str,
        params: Option<Value>,
    ) -> Result<AgentNotification, Error> {
        match method {
            ClientMethodNames::SESSION_UPDATE => Ok(AgentNotification::SessionUpdate(decode::<
                SessionNotification,
            >(require_params(
                params,
            )?)?)),
            other => match strip_ext(other) {
                Some(stripped) => Ok(AgentNotification::ExtNotification {
                    method: stripped.to_string(),
                    params: params.unwrap_or(Value::Null),
                }),
                None => Err(Error::method_not_found()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_method_is_method_not_found() {
        let err = AgentSide::decode_request("nope", Some(serde_json::json!({}))).unwrap_err();
        assert_eq!(err.code, -32601);
    }

    #[test]
    fn extension_method_strips_prefix() {
        let req =
            AgentSide::decode_request("_my.op", Some(serde_json::json!({"x": 1}))).unwrap();
        match req {
            ClientRequest::ExtMethod { method, params } => {
                assert_eq!(method, "my.op");
                assert_eq!(params, serde_json::json!({"x": 1}));
            }
            _ => panic!("expected ext method"),
        }
    }

    #[test]
    fn missing_params_on_recognized_method_is_invalid_params() {
        let err = AgentSide::decode_request("initialize", None).unwrap_err();
        assert_eq!(err.code, -32602);
    }

    #[test]
    fn session_update_dispatches_on_client_side() {
        let params = serde_json::json!({
            "sessionId": "s1",
            "update": {
                "sessionUpdate": "agent_message_chunk",
                "content": {"type": "text", "text": "hi"},
            },
        });
        let notif = ClientSide::decode_notification("session/update", Some(params)).unwrap();
        assert!(matches!(notif, AgentNotification::SessionUpdate(_)));
    }
}
