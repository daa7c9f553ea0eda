//! One request/response exchange over a fresh session.
//!
//! # States
//! ```text
//! Idle ──▶ Connecting ──▶ AwaitingResponse ──▶ Resolved
//!   │           │                                  ▲
//!   └───────────┴──────────────────────────────────┘
//! ```
//!
//! # Design Decisions
//! - `Resolved` is entered exactly once, by `resolve`, which consumes the exchange
//! - Teardown happens inside `resolve`, so every outcome closes the session
//! - Connect and response budgets are separate timers; the response budget
//!   covers the send and every frame read until a terminal message
//! - Dropping an unresolved exchange drops the socket

use std::time::Duration;

use tokio::time::{timeout, timeout_at, Instant};

use crate::bridge::error::{BridgeError, BridgeResult};
use crate::bridge::protocol::{interpret, BridgeReply, Inbound, OutboundMessage};
use crate::bridge::request::BridgeRequest;
use crate::bridge::transport::{Connector, Frame, Session};

/// Lifecycle of a single exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Connecting,
    AwaitingResponse,
    Resolved,
}

impl Phase {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Idle, Phase::Connecting)
                | (Phase::Connecting, Phase::AwaitingResponse)
                | (Phase::Idle | Phase::Connecting | Phase::AwaitingResponse, Phase::Resolved)
        )
    }
}

/// Where and how long an exchange may run.
#[derive(Debug, Clone)]
pub struct ExchangeSettings {
    pub url: String,
    pub connect_timeout: Duration,
    pub response_timeout: Duration,
    pub close_grace: Duration,
}

pub struct Exchange<'a> {
    connector: &'a dyn Connector,
    settings: &'a ExchangeSettings,
    phase: Phase,
    session: Option<Box<dyn Session>>,
}

impl<'a> Exchange<'a> {
    pub fn new(connector: &'a dyn Connector, settings: &'a ExchangeSettings) -> Self {
        Self {
            connector,
            settings,
            phase: Phase::Idle,
            session: None,
        }
    }

    /// Run the exchange to its first terminal outcome.
    pub async fn run(mut self, request: &BridgeRequest) -> BridgeResult<BridgeReply> {
        let outcome = self.drive(request).await;
        self.resolve(outcome).await
    }

    async fn drive(&mut self, request: &BridgeRequest) -> BridgeResult<BridgeReply> {
        let settings = self.settings;
        let connector = self.connector;

        let outbound = OutboundMessage::request(request)
            .to_json()
            .map_err(|e| BridgeError::Internal(e.to_string()))?;

        self.enter(Phase::Connecting);
        let session = match timeout(settings.connect_timeout, connector.connect(&settings.url)).await {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => return Err(BridgeError::Unavailable(e.to_string())),
            Err(_) => return Err(BridgeError::ConnectTimeout(settings.connect_timeout)),
        };

        self.enter(Phase::AwaitingResponse);
        let deadline = Instant::now() + settings.response_timeout;
        let session = self.session.insert(session);

        match timeout_at(deadline, session.send_text(outbound)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(BridgeError::Transport(e.to_string())),
            Err(_) => return Err(BridgeError::ResponseTimeout(settings.response_timeout)),
        }

        loop {
            let frame = match timeout_at(deadline, session.next_frame()).await {
                Ok(Some(Ok(frame))) => frame,
                Ok(Some(Err(e))) => return Err(BridgeError::Transport(e.to_string())),
                Ok(None) => {
                    return Err(BridgeError::Transport(
                        "connection ended before a reply arrived".to_string(),
                    ))
                }
                Err(_) => return Err(BridgeError::ResponseTimeout(settings.response_timeout)),
            };

            let text = match frame {
                Frame::Text(text) => text,
                Frame::Closed { code, reason } => {
                    return Err(BridgeError::Transport(describe_close(code, &reason)))
                }
            };

            match interpret(&text) {
                Inbound::Response(fields) => {
                    return fields
                        .into_reply(request.persona.clone())
                        .map_err(BridgeError::InvalidResponse)
                }
                Inbound::Error(message) => {
                    return Err(BridgeError::Protocol(
                        message.unwrap_or_else(|| "upstream reported an error".to_string()),
                    ))
                }
                Inbound::Malformed(reason) => return Err(BridgeError::Protocol(reason)),
                Inbound::Other(kind) => {
                    tracing::debug!(message_type = %kind, "Ignoring non-terminal message");
                }
            }
        }
    }

    async fn resolve(mut self, outcome: BridgeResult<BridgeReply>) -> BridgeResult<BridgeReply> {
        self.enter(Phase::Resolved);

        if let Some(mut session) = self.session.take() {
            if timeout(self.settings.close_grace, session.close()).await.is_err() {
                tracing::warn!(
                    grace_ms = self.settings.close_grace.as_millis() as u64,
                    "Session close did not finish in time; dropping connection"
                );
            }
        }

        outcome
    }

    fn enter(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal transition {:?} -> {:?}",
            self.phase,
            next
        );
        tracing::trace!(from = ?self.phase, to = ?next, "Exchange transition");
        self.phase = next;
    }
}

fn describe_close(code: Option<u16>, reason: &str) -> String {
    match (code, reason.is_empty()) {
        (Some(code), false) => format!("closed by voice service (code {}: {})", code, reason),
        (Some(code), true) => format!("closed by voice service (code {})", code),
        (None, _) => "closed by voice service".to_string(),
    }
}
