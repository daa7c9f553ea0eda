//! Request/response bridge to the voice service.
//!
//! # Data Flow
//! ```text
//! ask(persona, message)
//!     → request.rs (validate; no session on failure)
//!     → exchange.rs (open session, send one request, await one reply)
//!         → transport.rs (WebSocket frames)
//!         → protocol.rs (classify frames, normalize reply fields)
//!     → BridgeReply | BridgeError
//! ```
//!
//! # Design Decisions
//! - One inbound call owns one outbound session; calls share only config
//! - No retries: the caller decides whether to ask again
//! - Every failure carries a `FailureKind` and a readable message

pub mod error;
pub mod exchange;
pub mod protocol;
pub mod request;
pub mod transport;

use std::sync::Arc;
use std::time::Instant;

pub use error::{BridgeError, BridgeResult, FailureKind};
pub use exchange::{Exchange, ExchangeSettings, Phase};
pub use protocol::BridgeReply;
pub use request::{BridgeRequest, InputError, Persona, PersonaRoster, RequestRules};
pub use transport::{Connector, Frame, Session, TransportError, WsConnector};

use crate::config::ServiceConfig;
use crate::observability::metrics;

/// Entry point for bridge calls.
pub struct Bridge {
    rules: RequestRules,
    settings: ExchangeSettings,
    connector: Arc<dyn Connector>,
}

impl Bridge {
    pub fn new(rules: RequestRules, settings: ExchangeSettings, connector: Arc<dyn Connector>) -> Self {
        Self {
            rules,
            settings,
            connector,
        }
    }

    /// Build a bridge from validated configuration.
    pub fn from_config(
        config: &ServiceConfig,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, url::ParseError> {
        let rules = RequestRules {
            roster: PersonaRoster::new(config.bridge.personas.clone()),
            max_message_chars: config.bridge.max_message_chars,
        };
        let settings = ExchangeSettings {
            url: config.upstream.websocket_url()?.to_string(),
            connect_timeout: config.timeouts.connect(),
            response_timeout: config.timeouts.response(),
            close_grace: config.timeouts.close_grace(),
        };
        Ok(Self::new(rules, settings, connector))
    }

    pub fn rules(&self) -> &RequestRules {
        &self.rules
    }

    pub fn settings(&self) -> &ExchangeSettings {
        &self.settings
    }

    /// Validate, then run one exchange with the voice service.
    pub async fn ask(&self, persona: &str, message: &str) -> BridgeResult<BridgeReply> {
        let start = Instant::now();

        let result = match self.rules.validate(persona, message) {
            Ok(request) => {
                Exchange::new(self.connector.as_ref(), &self.settings)
                    .run(&request)
                    .await
            }
            Err(e) => Err(BridgeError::from(e)),
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(reply) => {
                tracing::info!(persona = %reply.persona, elapsed_ms, "Bridge reply received");
                metrics::record_bridge_outcome("success", start);
            }
            Err(e) if e.kind() == FailureKind::Validation => {
                tracing::info!(persona = %persona, error = %e, "Bridge request rejected");
                metrics::record_bridge_outcome(e.kind().as_str(), start);
            }
            Err(e) => {
                tracing::warn!(
                    persona = %persona,
                    kind = %e.kind(),
                    error = %e,
                    elapsed_ms,
                    "Bridge call failed"
                );
                metrics::record_bridge_outcome(e.kind().as_str(), start);
            }
        }

        result
    }
}
