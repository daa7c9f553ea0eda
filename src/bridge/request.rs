//! Inbound request validation.
//!
//! # Responsibilities
//! - Check the persona against the configured allow-list
//! - Trim the message and enforce the length bounds
//! - Produce a `BridgeRequest` only when every rule holds

use serde::Serialize;
use thiserror::Error;

/// Reasons an inbound request is rejected before any session is opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Invalid request body: {0}")]
    MalformedBody(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid persona '{persona}'. Must be one of: {}", .allowed.join(", "))]
    UnknownPersona { persona: String, allowed: Vec<String> },

    #[error("Message must not be empty")]
    EmptyMessage,

    #[error("Message too long: {length} characters (max {max})")]
    MessageTooLong { length: usize, max: usize },
}

/// A persona that passed the allow-list check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Persona(String);

impl Persona {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fixed set of personas a request may address.
#[derive(Debug, Clone)]
pub struct PersonaRoster {
    allowed: Vec<String>,
}

impl PersonaRoster {
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    /// Exact, case-sensitive lookup.
    pub fn resolve(&self, candidate: &str) -> Result<Persona, InputError> {
        if self.allowed.iter().any(|p| p == candidate) {
            Ok(Persona(candidate.to_string()))
        } else {
            Err(InputError::UnknownPersona {
                persona: candidate.to_string(),
                allowed: self.allowed.clone(),
            })
        }
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }
}

/// A validated bridge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeRequest {
    pub persona: Persona,
    /// Trimmed message text.
    pub message: String,
}

/// Validation rules applied to every inbound call.
#[derive(Debug, Clone)]
pub struct RequestRules {
    pub roster: PersonaRoster,
    pub max_message_chars: usize,
}

impl RequestRules {
    pub fn validate(&self, persona: &str, message: &str) -> Result<BridgeRequest, InputError> {
        let persona = self.roster.resolve(persona)?;

        let message = message.trim();
        if message.is_empty() {
            return Err(InputError::EmptyMessage);
        }

        let length = message.chars().count();
        if length > self.max_message_chars {
            return Err(InputError::MessageTooLong {
                length,
                max: self.max_message_chars,
            });
        }

        Ok(BridgeRequest {
            persona,
            message: message.to_string(),
        })
    }
}
