//! The connection runtime (§4.4): a framed, line-delimited JSON-RPC
//! transport multiplexing concurrent outbound requests over a request-id
//! correlation table, classifying inbound messages into decoded requests,
//! responses, and notifications, dispatching them to a user handler, and
//! broadcasting every message to subscribed observers.
//!
//! Request and notification dispatch each run on an independently spawned
//! task (§4.4/§5) so a slow handler never stalls the reader loop — the
//! reader only decodes and hands off, it never awaits a handler directly.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, oneshot, Mutex, Notify};
use tokio::time::timeout;
use tracing::{debug, error};

use crate::error::Error as RpcError;
use crate::rpc::{JsonRpcVersion, Message, Notification, Request, RequestId, Response};
use crate::side::Side;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Direction an observation travels, for the observer broadcast (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObservationKind {
    Request { method: String, params: Option<Value> },
    Response { result: Result<Value, RpcError> },
    Notification { method: String, params: Option<Value> },
}

#[derive(Debug, Clone)]
pub struct Observation {
    pub direction: Direction,
    pub id: Option<RequestId>,
    pub kind: ObservationKind,
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A user handler for inbound requests: decodes a [`Side::InRequest`] and
/// returns either an encoded success value or a structured error.
pub trait RequestDispatch<Req>: Send + Sync + 'static {
    fn call(&self, req: Req) -> BoxFuture<'static, Result<Value, RpcError>>;
}

impl<Req, F, Fut> RequestDispatch<Req> for F
where
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, RpcError>> + Send + 'static,
{
    fn call(&self, req: Req) -> BoxFuture<'static, Result<Value, RpcError>> {
        Box::pin(self(req))
    }
}

pub trait NotificationDispatch<N>: Send + Sync + 'static {
    fn call(&self, notif: N) -> BoxFuture<'static, ()>;
}

impl<N, F, Fut> NotificationDispatch<N> for F
where
    F: Fn(N) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn call(&self, notif: N) -> BoxFuture<'static, ()> {
        Box::pin(self(notif))
    }
}

struct Pending {
    next_id: AtomicI64,
    waiters: Mutex<HashMap<RequestId, oneshot::Sender<Response>>>,
}

/// The transport-agnostic connection. `S` picks the side dispatcher
/// (`AgentSide` or `ClientSide`); the request/notification handlers are
/// supplied at construction as trait objects so callers aren't forced into
/// a single concrete handler type, collapsed into one closure per side
/// since ACP's per-peer method set is closed rather than open-ended.
pub struct Connection<S: Side> {
    pending: Arc<Pending>,
    writer: Arc<Mutex<Box<dyn tokio::io::AsyncWrite + Unpin + Send>>>,
    observers: broadcast::Sender<Observation>,
    request_handler: Arc<dyn RequestDispatch<S::InRequest>>,
    notification_handler: Arc<dyn NotificationDispatch<S::InNotification>>,
    stopped: Arc<Mutex<bool>>,
    cancel: Arc<Notify>,
}

impl<S: Side + Send + Sync + 'static> Clone for Connection<S> {
    fn clone(&self) -> Self {
        Connection {
            pending: self.pending.clone(),
            writer: self.writer.clone(),
            observers: self.observers.clone(),
            request_handler: self.request_handler.clone(),
            notification_handler: self.notification_handler.clone(),
            stopped: self.stopped.clone(),
            cancel: self.cancel.clone(),
        }
    }
}

impl<S: Side + Send + Sync + 'static> Connection<S> {
    /// Spawns the inbound reader loop over `reader`/`writer` and returns a
    /// handle usable to issue outbound requests/notifications. The reader
    /// loop runs until EOF or `stop()`.
    pub fn spawn<R, W>(
        reader: R,
        writer: W,
        request_handler: impl RequestDispatch<S::InRequest>,
        notification_handler: impl NotificationDispatch<S::InNotification>,
    ) -> Self
    where
        R: tokio::io::AsyncRead + Unpin + Send + 'static,
        W: tokio::io::AsyncWrite + Unpin + Send + 'static,
    {
        let (observers, _) = broadcast::channel(1024);
        let conn = Connection {
            pending: Arc::new(Pending {
                next_id: AtomicI64::new(0),
                waiters: Mutex::new(HashMap::new()),
            }),
            writer: Arc::new(Mutex::new(Box::new(writer))),
            observers,
            request_handler: Arc::new(request_handler),
            notification_handler: Arc::new(notification_handler),
            stopped: Arc::new(Mutex::new(false)),
            cancel: Arc::new(Notify::new()),
        };

        let loop_conn = conn.clone();
        tokio::spawn(async move {
            loop_conn.inbound_loop(reader).await;
        });

        conn
    }

    async fn inbound_loop<R>(&self, reader: R)
    where
        R: tokio::io::AsyncRead + Unpin,
    {
        let mut lines = BufReader::new(reader).lines();
        loop {
            let line = tokio::select! {
                biased;
                _ = self.cancel.notified() => break,
                result = lines.next_line() => match result {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        error!("connection: read error: {e}");
                        break;
                    }
                },
            };
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = match serde_json::from_str(&line) {
                Ok(v) => v,
                Err(e) => {
                    debug!("connection: parse error: {e}");
                    continue;
                }
            };
            if let Some(v) = value.get("jsonrpc") {
                if v != "2.0" {
                    debug!("connection: unsupported jsonrpc version: {v}");
                    continue;
                }
            }
            let message = match Message::classify(value) {
                Ok(m) => m,
                Err(_) => {
                    debug!("connection: unrecognized message shape");
                    continue;
                }
            };
            match message {
                Message::Request(request) => self.handle_inbound_request(request).await,
                Message::Response(response) => self.handle_inbound_response(response).await,
                Message::Notification(notification) => {
                    self.handle_inbound_notification(notification).await
                }
            }
        }
        self.shutdown().await;
    }

    async fn handle_inbound_request(&self, request: Request) {
        let _ = self.observers.send(Observation {
            direction: Direction::Inbound,
            id: Some(request.id.clone()),
            kind: ObservationKind::Request {
                method: request.method.clone(),
                params: request.params.clone(),
            },
        });
        match S::decode_request(&request.method, request.params) {
            Ok(decoded) => {
                let handler = self.request_handler.clone();
                let conn = self.clone();
                let id = request.id;
                tokio::spawn(async move {
                    let result = handler.call(decoded).await;
                    conn.emit_response(id, result).await;
                });
            }
            Err(err) => {
                self.emit_response(request.id, Err(err)).await;
            }
        }
    }

    async fn emit_response(&self, id: RequestId, result: Result<Value, RpcError>) {
        let response = match &result {
            Ok(v) => Response::ok(id.clone(), v.clone()),
            Err(e) => Response::err(id.clone(), e.clone()),
        };
        let _ = self.observers.send(Observation {
            direction: Direction::Outbound,
            id: Some(id),
            kind: ObservationKind::Response { result },
        });
        self.write_line(&response).await;
    }

    async fn handle_inbound_notification(&self, notification: Notification) {
        let _ = self.observers.send(Observation {
            direction: Direction::Inbound,
            id: None,
            kind: ObservationKind::Notification {
                method: notification.method.clone(),
                params: notification.params.clone(),
            },
        });
        match S::decode_notification(&notification.method, notification.params) {
            Ok(decoded) => {
                let handler = self.notification_handler.clone();
                tokio::spawn(async move {
                    handler.call(decoded).await;
                });
            }
            Err(e) => {
                debug!("connection: dropping undecodable notification: {e}");
            }
        }
    }

    async fn handle_inbound_response(&self, response: Response) {
        let _ = self.observers.send(Observation {
            direction: Direction::Inbound,
            id: Some(response.id.clone()),
            kind: ObservationKind::Response {
                result: response.clone().into_result(),
            },
        });
        let mut waiters = self.pending.waiters.lock().await;
        if let Some(tx) = waiters.remove(&response.id) {
            let _ = tx.send(response);
        } else {
            debug!("connection: response for unknown id {}", response.id);
        }
    }

    async fn shutdown(&self) {
        let mut stopped = self.stopped.lock().await;
        if *stopped {
            return;
        }
        *stopped = true;
        let mut waiters = self.pending.waiters.lock().await;
        for (_, tx) in waiters.drain() {
            let id = RequestId::Null;
            let _ = tx.send(Response::err(id, RpcError::connection_closed()));
        }
    }

    fn allocate_id(&self) -> RequestId {
        RequestId::Number(self.pending.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn write_line<T: serde::Serialize>(&self, value: &T) {
        let mut serialized = match serde_json::to_vec(value) {
            Ok(v) => v,
            Err(e) => {
                error!("connection: failed to encode outgoing message: {e}");
                return;
            }
        };
        serialized.push(b'\n');
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.write_all(&serialized).await {
            error!("connection: write failed: {e}");
        }
    }

    /// Allocates an id, emits the request, and suspends until the matching
    /// response arrives or `timeout_duration` elapses.
    pub async fn request(
        &self,
        method: impl Into<String>,
        params: Option<Value>,
        timeout_duration: Duration,
    ) -> Result<Value, RpcError> {
        let id = self.allocate_id();
        let (tx, rx) = oneshot::channel();
        {
            let mut waiters = self.pending.waiters.lock().await;
            waiters.insert(id.clone(), tx);
        }
        let method = method.into();
        let request = Request {
            jsonrpc: JsonRpcVersion::V2,
            id: id.clone(),
            method: method.clone(),
            params: params.clone(),
        };
        let _ = self.observers.send(Observation {
            direction: Direction::Outbound,
            id: Some(id.clone()),
            kind: ObservationKind::Request { method, params },
        });
        self.write_line(&request).await;

        match timeout(timeout_duration, rx).await {
            Ok(Ok(response)) => response.into_result(),
            Ok(Err(_)) => Err(RpcError::connection_closed()),
            Err(_) => {
                self.pending.waiters.lock().await.remove(&id);
                Err(RpcError::timed_out())
            }
        }
    }

    /// Fire-and-forget emit; no response channel.
    pub async fn notify(&self, method: impl Into<String>, params: Option<Value>) {
        let method = method.into();
        let notification = Notification {
            jsonrpc: JsonRpcVersion::V2,
            method: method.clone(),
            params: params.clone(),
        };
        let _ = self.observers.send(Observation {
            direction: Direction::Outbound,
            id: None,
            kind: ObservationKind::Notification { method, params },
        });
        self.write_line(&notification).await;
    }

    /// Registers an observer. The returned receiver is lagged/dropped
    /// independently of the connection; a subscriber that stops polling
    /// simply stops receiving (§4.4 "best-effort, never blocks").
    pub fn subscribe(&self) -> broadcast::Receiver<Observation> {
        self.observers.subscribe()
    }

    /// Orderly shutdown (§4.4): wakes the reader task out of its next
    /// `next_line()`/`notified()` select so it exits without needing an
    /// EOF from the transport, then rejects pending waiters with a
    /// connection-closed error.
    ///
    /// Uses `notify_one` rather than `notify_waiters`: there is exactly one
    /// reader task per connection, and `notify_one` stores a permit when
    /// called before the reader reaches its `notified()` branch, so a
    /// `stop()` racing the reader between loop iterations is never lost.
    pub async fn stop(&self) {
        self.cancel.notify_one();
        self.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::side::AgentSide;

    #[tokio::test]
    async fn correlator_fairness_reversed_responses() {
        let (client_r, agent_w) = tokio::io::duplex(4096);
        let (agent_r, client_w) = tokio::io::duplex(4096);

        let agent_conn = Connection::<AgentSide>::spawn(
            agent_r,
            agent_w,
            |_req| async { Ok(Value::Null) },
            |_n| async {},
        );
        let _keep_agent_alive = agent_conn;

        let conn = Connection::<AgentSide>::spawn(
            client_r,
            client_w,
            |_req| async { Ok(Value::Null) },
            |_n| async {},
        );

        // Drive two concurrent requests and make sure each completes,
        // regardless of response arrival order.
        let params = Some(serde_json::json!({"protocolVersion": 1}));
        let a = conn.request("initialize", params.clone(), Duration::from_secs(5));
        let b = conn.request("initialize", params, Duration::from_secs(5));
        let (ra, rb) = tokio::join!(a, b);
        assert!(ra.is_ok(), "{ra:?}");
        assert!(rb.is_ok(), "{rb:?}");
    }
}
