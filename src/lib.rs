//! # Agent Client Protocol
//!
//! A Rust implementation of the Agent Client Protocol (ACP), a bidirectional
//! JSON-RPC 2.0 protocol between a code editor (the client) and an
//! AI-coding-assistant process (the agent).
//!
//! This crate is transport-agnostic: it frames and dispatches messages over
//! any `AsyncRead`/`AsyncWrite` pair, and leaves the hosting program to
//! implement the [`Agent`](peer::Agent) or [`Client`](peer::Client) callback
//! set for its role.
//!
//! ## Architecture
//!
//! - **rpc**: JSON-RPC envelope types and message classification
//! - **error**: the wire error type and its codes
//! - **side**: per-role method tables (which payload a method name decodes to)
//! - **protocol**: the connection runtime — framing, id correlation, dispatch
//! - **peer**: the `Agent`/`Client` trait pair and typed outbound calls
//! - **transport**: stdio convenience constructors
//! - **content**, **tool_call**, **plan**, **session**, **mcp_server**: wire
//!   entity types shared across the agent and client method tables
//! - **agent**, **client**: the request/response/notification payloads each
//!   role receives
//! - **three_state**: the `Undefined | Null | Value(T)` optional encoding

pub mod agent;
pub mod client;
pub mod content;
pub mod error;
pub mod mcp_server;
pub mod peer;
pub mod plan;
pub mod protocol;
pub mod rpc;
pub mod session;
pub mod side;
pub mod tool_call;
pub mod transport;
pub mod three_state;

pub(crate) fn is_false(b: &bool) -> bool {
    !*b
}
