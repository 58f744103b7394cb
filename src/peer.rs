//! The peer-role interface (§6): the callback sets a hosting program
//! implements, and the typed outbound calls available on each side's
//! connection handle.
//!
//! The inbound handler side is a static trait (`Agent`/`Client`) rather
//! than a string-keyed registry, since ACP's method set is closed per
//! protocol version. The outbound side keeps the typed-wrapper-over-
//! untyped-request shape used by [`crate::protocol::Connection::request`]
//! throughout this crate.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::agent::{
    AuthenticateRequest, AuthenticateResponse, CancelNotification, ClientNotification,
    ClientRequest, InitializeRequest, InitializeResponse, LoadSessionRequest,
    LoadSessionResponse, NewSessionRequest, NewSessionResponse, PromptRequest, PromptResponse,
    SetSessionModeRequest, SetSessionModeResponse,
};
use crate::client::{
    AgentNotification, AgentRequest, ClientMethodNames, CreateTerminalRequest,
    CreateTerminalResponse, KillTerminalCommandRequest, KillTerminalCommandResponse,
    ReadTextFileRequest, ReadTextFileResponse, ReleaseTerminalRequest, ReleaseTerminalResponse,
    RequestPermissionRequest, RequestPermissionResponse, TerminalOutputRequest,
    TerminalOutputResponse, WaitForTerminalExitRequest, WaitForTerminalExitResponse,
    WriteTextFileRequest, WriteTextFileResponse,
};
use crate::error::Error;
use crate::protocol::{Connection, DEFAULT_REQUEST_TIMEOUT};
use crate::side::{AgentSide, ClientSide};

fn to_value<T: serde::Serialize>(v: T) -> Result<Value, Error> {
    serde_json::to_value(v).map_err(|_| Error::internal_error())
}

fn from_value<T: serde::de::DeserializeOwned>(v: Value) -> Result<T, Error> {
    serde_json::from_value(v).map_err(|e| Error::invalid_params(e))
}

/// The callback set an agent implementation supplies (§6 "Agent callback
/// set"). Required operations have no default; optional ones default to
/// `method_not_found`.
#[async_trait]
pub trait Agent: Send + Sync + 'static {
    async fn initialize(&self, req: InitializeRequest) -> Result<InitializeResponse, Error>;
    async fn authenticate(&self, req: AuthenticateRequest) -> Result<AuthenticateResponse, Error>;
    async fn new_session(&self, req: NewSessionRequest) -> Result<NewSessionResponse, Error>;
    async fn prompt(&self, req: PromptRequest) -> Result<PromptResponse, Error>;
    async fn cancel(&self, notif: CancelNotification);

    async fn load_session(&self, _req: LoadSessionRequest) -> Result<LoadSessionResponse, Error> {
        Err(Error::method_not_found())
    }

    async fn set_session_mode(
        &self,
        _req: SetSessionModeRequest,
    ) -> Result<SetSessionModeResponse, Error> {
        Err(Error::method_not_found())
    }

    async fn ext_method(&self, _method: String, _params: Value) -> Result<Value, Error> {
        Err(Error::method_not_found())
    }

    async fn ext_notification(&self, _method: String, _params: Value) {}
}

/// The callback set a client implementation supplies (§6 "Client callback
/// set").
#[async_trait]
pub trait Client: Send + Sync + 'static {
    async fn request_permission(
        &self,
        req: RequestPermissionRequest,
    ) -> Result<RequestPermissionResponse, Error>;

    async fn session_notification(&self, notif: crate::session::SessionNotification);

    async fn write_text_file(
        &self,
        _req: WriteTextFileRequest,
    ) -> Result<WriteTextFileResponse, Error> {
        Err(Error::method_not_found())
    }

    async fn read_text_file(
        &self,
        _req: ReadTextFileRequest,
    ) -> Result<ReadTextFileResponse, Error> {
        Err(Error::method_not_found())
    }

    async fn create_terminal(
        &self,
        _req: CreateTerminalRequest,
    ) -> Result<CreateTerminalResponse, Error> {
        Err(Error::method_not_found())
    }

    async fn terminal_output(
        &self,
        _req: TerminalOutputRequest,
    ) -> Result<TerminalOutputResponse, Error> {
        Err(Error::method_not_found())
    }

    async fn release_terminal(
        &self,
        _req: ReleaseTerminalRequest,
    ) -> Result<ReleaseTerminalResponse, Error> {
        Err(Error::method_not_found())
    }

    async fn wait_for_terminal_exit(
        &self,
        _req: WaitForTerminalExitRequest,
    ) -> Result<WaitForTerminalExitResponse, Error> {
        Err(Error::method_not_found())
    }

    async fn kill_terminal_command(
        &self,
        _req: KillTerminalCommandRequest,
    ) -> Result<KillTerminalCommandResponse, Error> {
        Err(Error::method_not_found())
    }

    async fn ext_method(&self, _method: String, _params: Value) -> Result<Value, Error> {
        Err(Error::method_not_found())
    }

    async fn ext_notification(&self, _method: String, _params: Value) {}
}

async fn dispatch_client_request(
    agent: Arc<dyn Agent>,
    req: ClientRequest,
) -> Result<Value, Error> {
    match req {
        ClientRequest::Initialize(r) => to_value(agent.initialize(r).await?),
        ClientRequest::Authenticate(r) => to_value(agent.authenticate(r).await?),
        ClientRequest::NewSession(r) => to_value(agent.new_session(r).await?),
        ClientRequest::LoadSession(r) => to_value(agent.load_session(r).await?),
        ClientRequest::SetSessionMode(r) => to_value(agent.set_session_mode(r).await?),
        ClientRequest::Prompt(r) => to_value(agent.prompt(r).await?),
        #[cfg(feature = "unstable")]
        ClientRequest::ListSessions(_)
        | ClientRequest::ForkSession(_)
        | ClientRequest::ResumeSession(_)
        | ClientRequest::SetSessionConfigOption(_)
        | ClientRequest::SetSessionModel(_) => Err(Error::method_not_found()),
        ClientRequest::ExtMethod { method, params } => agent.ext_method(method, params).await,
    }
}

async fn dispatch_client_notification(agent: Arc<dyn Agent>, notif: ClientNotification) {
    match notif {
        ClientNotification::Cancel(n) => agent.cancel(n).await,
        ClientNotification::ExtNotification { method, params } => {
            agent.ext_notification(method, params).await
        }
    }
}

/// Spawns an agent-side connection over `reader`/`writer`, dispatching
/// decoded client requests/notifications to `agent`.
pub fn serve_agent<R, W>(reader: R, writer: W, agent: Arc<dyn Agent>) -> Connection<AgentSide>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
    W: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    let req_agent = agent.clone();
    let notif_agent = agent;
    Connection::<AgentSide>::spawn(
        reader,
        writer,
        move |req| {
            let agent = req_agent.clone();
            async move { dispatch_client_request(agent, req).await }
        },
        move |notif| {
            let agent = notif_agent.clone();
            async move { dispatch_client_notification(agent, notif).await }
        },
    )
}

/// Typed outbound calls an agent issues to the client (a→c, §6).
impl Connection<AgentSide> {
    pub async fn request_permission(
        &self,
        req: RequestPermissionRequest,
    ) -> Result<RequestPermissionResponse, Error> {
        let value = self
            .request(
                ClientMethodNames::SESSION_REQUEST_PERMISSION,
                Some(to_value(req)?),
                DEFAULT_REQUEST_TIMEOUT,
            )
            .await?;
        from_value(value)
    }

    pub async fn write_text_file(
        &self,
        req: WriteTextFileRequest,
    ) -> Result<WriteTextFileResponse, Error> {
        let value = self
            .request(
                ClientMethodNames::FS_WRITE_TEXT_FILE,
                Some(to_value(req)?),
                DEFAULT_REQUEST_TIMEOUT,
            )
            .await?;
        from_value(value)
    }

    pub async fn read_text_file(
        &self,
        req: ReadTextFileRequest,
    ) -> Result<ReadTextFileResponse, Error> {
        let value = self
            .request(
                ClientMethodNames::FS_READ_TEXT_FILE,
                Some(to_value(req)?),
                DEFAULT_REQUEST_TIMEOUT,
            )
            .await?;
        from_value(value)
    }

    pub async fn create_terminal(
        &self,
        req: CreateTerminalRequest,
    ) -> Result<CreateTerminalResponse, Error> {
        let value = self
            .request(
                ClientMethodNames::TERMINAL_CREATE,
                Some(to_value(req)?),
                DEFAULT_REQUEST_TIMEOUT,
            )
            .await?;
        from_value(value)
    }

    pub async fn terminal_output(
        &self,
        req: TerminalOutputRequest,
    ) -> Result<TerminalOutputResponse, Error> {
        let value = self
            .request(
                ClientMethodNames::TERMINAL_OUTPUT,
                Some(to_value(req)?),
                DEFAULT_REQUEST_TIMEOUT,
            )
            .await?;
        from_value(value)
    }

    pub async fn release_terminal(
        &self,
        req: ReleaseTerminalRequest,
    ) -> Result<ReleaseTerminalResponse, Error> {
        let value = self
            .request(
                ClientMethodNames::TERMINAL_RELEASE,
                Some(to_value(req)?),
                DEFAULT_REQUEST_TIMEOUT,
            )
            .await?;
        from_value(value)
    }

    pub async fn wait_for_terminal_exit(
        &self,
        req: WaitForTerminalExitRequest,
    ) -> Result<WaitForTerminalExitResponse, Error> {
        let value = self
            .request(
                ClientMethodNames::TERMINAL_WAIT_FOR_EXIT,
                Some(to_value(req)?),
                DEFAULT_REQUEST_TIMEOUT,
            )
            .await?;
        from_value(value)
    }

    pub async fn kill_terminal_command(
        &self,
        req: KillTerminalCommandRequest,
    ) -> Result<KillTerminalCommandResponse, Error> {
        let value = self
            .request(
                ClientMethodNames::TERMINAL_KILL,
                Some(to_value(req)?),
                DEFAULT_REQUEST_TIMEOUT,
            )
            .await?;
        from_value(value)
    }

    pub async fn session_update(&self, notif: crate::session::SessionNotification) {
        self.notify(ClientMethodNames::SESSION_UPDATE, to_value(notif).ok())
            .await;
    }
}

async fn dispatch_agent_request(client: Arc<dyn Client>, req: AgentRequest) -> Result<Value, Error> {
    match req {
        AgentRequest::RequestPermission(r) => to_value(client.request_permission(r).await?),
        AgentRequest::WriteTextFile(r) => to_value(client.write_text_file(r).await?),
        AgentRequest::ReadTextFile(r) => to_value(client.read_text_file(r).await?),
        AgentRequest::CreateTerminal(r) => to_value(client.create_terminal(r).await?),
        AgentRequest::TerminalOutput(r) => to_value(client.terminal_output(r).await?),
        AgentRequest::ReleaseTerminal(r) => to_value(client.release_terminal(r).await?),
        AgentRequest::WaitForTerminalExit(r) => {
            to_value(client.wait_for_terminal_exit(r).await?)
        }
        AgentRequest::KillTerminalCommand(r) => {
            to_value(client.kill_terminal_command(r).await?)
        }
        AgentRequest::ExtMethod { method, params } => client.ext_method(method, params).await,
    }
}

async fn dispatch_agent_notification(client: Arc<dyn Client>, notif: AgentNotification) {
    match notif {
        AgentNotification::SessionUpdate(n) => client.session_notification(n).await,
        AgentNotification::ExtNotification { method, params } => {
            client.ext_notification(method, params).await
        }
    }
}

/// Spawns a client-side connection over `reader`/`writer`, dispatching
/// decoded agent requests/notifications to `client`.
pub fn serve_client<R, W>(reader: R, writer: W, client: Arc<dyn Client>) -> Connection<ClientSide>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
    W: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    let req_client = client.clone();
    let notif_client = client;
    Connection::<ClientSide>::spawn(
        reader,
        writer,
        move |req| {
            let client = req_client.clone();
            async move { dispatch_agent_request(client, req).await }
        },
        move |notif| {
            let client = notif_client.clone();
            async move { dispatch_agent_notification(client, notif).await }
        },
    )
}

/// Typed outbound calls a client issues to the agent (c→a, §6).
impl Connection<ClientSide> {
    pub async fn initialize(&self, req: InitializeRequest) -> Result<InitializeResponse, Error> {
        let value = self
            .request("initialize", Some(to_value(req)?), DEFAULT_REQUEST_TIMEOUT)
            .await?;
        from_value(value)
    }

    pub async fn authenticate(
        &self,
        req: AuthenticateRequest,
    ) -> Result<AuthenticateResponse, Error> {
        let value = self
            .request(
                "authenticate",
                Some(to_value(req)?),
                DEFAULT_REQUEST_TIMEOUT,
            )
            .await?;
        from_value(value)
    }

    pub async fn new_session(&self, req: NewSessionRequest) -> Result<NewSessionResponse, Error> {
        let value = self
            .request(
                "session/new",
                Some(to_value(req)?),
                DEFAULT_REQUEST_TIMEOUT,
            )
            .await?;
        from_value(value)
    }

    pub async fn prompt(
        &self,
        req: PromptRequest,
        timeout: Duration,
    ) -> Result<PromptResponse, Error> {
        let value = self
            .request("session/prompt", Some(to_value(req)?), timeout)
            .await?;
        from_value(value)
    }

    pub async fn cancel(&self, notif: CancelNotification) {
        self.notify("session/cancel", to_value(notif).ok()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{PROTOCOL_VERSION_LATEST, StopReason};
    use crate::content::ContentBlock;
    use crate::session::SessionId;

    struct EchoAgent;

    #[async_trait]
    impl Agent for EchoAgent {
        async fn initialize(
            &self,
            req: InitializeRequest,
        ) -> Result<InitializeResponse, Error> {
            Ok(InitializeResponse {
                protocol_version: req.protocol_version,
                agent_capabilities: Default::default(),
                auth_methods: None,
            })
        }

        async fn authenticate(
            &self,
            _req: AuthenticateRequest,
        ) -> Result<AuthenticateResponse, Error> {
            Ok(AuthenticateResponse::default())
        }

        async fn new_session(
            &self,
            _req: NewSessionRequest,
        ) -> Result<NewSessionResponse, Error> {
            Ok(NewSessionResponse {
                session_id: SessionId("s1".into()),
                modes: None,
            })
        }

        async fn prompt(&self, _req: PromptRequest) -> Result<PromptResponse, Error> {
            Ok(PromptResponse {
                stop_reason: StopReason::EndTurn,
            })
        }

        async fn cancel(&self, _notif: CancelNotification) {}
    }

    struct NoopClient;

    #[async_trait]
    impl Client for NoopClient {
        async fn request_permission(
            &self,
            _req: RequestPermissionRequest,
        ) -> Result<RequestPermissionResponse, Error> {
            Err(Error::method_not_found())
        }

        async fn session_notification(&self, _notif: crate::session::SessionNotification) {}
    }

    #[tokio::test]
    async fn initialize_handshake_round_trip() {
        let (client_read, agent_write) = tokio::io::duplex(8192);
        let (agent_read, client_write) = tokio::io::duplex(8192);

        let _agent = serve_agent(agent_read, agent_write, Arc::new(EchoAgent));
        let client = serve_client(client_read, client_write, Arc::new(NoopClient));

        let resp = client
            .initialize(InitializeRequest {
                protocol_version: PROTOCOL_VERSION_LATEST,
                client_capabilities: Default::default(),
            })
            .await
            .unwrap();
        assert_eq!(resp.protocol_version, PROTOCOL_VERSION_LATEST);
    }

    #[tokio::test]
    async fn prompt_round_trip() {
        let (client_read, agent_write) = tokio::io::duplex(8192);
        let (agent_read, client_write) = tokio::io::duplex(8192);

        let _agent = serve_agent(agent_read, agent_write, Arc::new(EchoAgent));
        let client = serve_client(client_read, client_write, Arc::new(NoopClient));

        let resp = client
            .prompt(
                PromptRequest {
                    session_id: SessionId("s1".into()),
                    prompt: vec![ContentBlock::text("hello")],
                },
                Duration::from_secs(5),
            )
            .await
            .unwrap();
        assert_eq!(resp.stop_reason, StopReason::EndTurn);
    }
}
