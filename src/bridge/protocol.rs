//! JSON message vocabulary spoken with the voice service.
//!
//! # Messages
//! ```text
//! outbound  {"type":"request","persona":"CEO","message":"..."}
//! inbound   {"type":"response", <reply text>, <reply audio url>, ...}
//!           {"type":"error","message":"..."}
//!           {"type":<anything else>, ...}   (ignored)
//! ```
//!
//! The voice service has shipped several spellings of the reply fields.
//! [`normalize_reply`] is the only place that knows about them; everything
//! past it works with [`ReplyFields`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::bridge::request::{BridgeRequest, Persona};

/// Accepted spellings of the reply text, in priority order.
pub const REPLY_TEXT_ALIASES: &[&str] = &[
    "reply_text",
    "replyText",
    "response_text",
    "responseText",
    "text",
];

/// Accepted spellings of the reply audio locator, in priority order.
pub const REPLY_AUDIO_ALIASES: &[&str] = &[
    "reply_audio_url",
    "replyAudioUrl",
    "audio_url",
    "audioUrl",
    "audio",
];

/// The single request frame sent per session.
#[derive(Debug, Serialize)]
pub struct OutboundMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    persona: &'a str,
    message: &'a str,
}

impl<'a> OutboundMessage<'a> {
    pub fn request(request: &'a BridgeRequest) -> Self {
        Self {
            kind: "request",
            persona: request.persona.as_str(),
            message: &request.message,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Classification of one inbound text frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// `type == "response"`, with normalized fields.
    Response(ReplyFields),
    /// `type == "error"`, with the remote message if one was supplied.
    Error(Option<String>),
    /// Any other `type`; carries the type name.
    Other(String),
    /// Not JSON, or JSON without a string `type`.
    Malformed(String),
}

/// Canonical reply fields; either may be missing or blank.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReplyFields {
    pub text: Option<String>,
    pub audio_url: Option<String>,
}

impl ReplyFields {
    /// Checks completeness and stamps the reply.
    ///
    /// Returns the name of the first missing field on failure.
    pub fn into_reply(self, persona: Persona) -> Result<BridgeReply, &'static str> {
        let text = non_blank(self.text).ok_or("reply text")?;
        let audio_url = non_blank(self.audio_url).ok_or("reply audio URL")?;

        Ok(BridgeReply {
            reply_text: text,
            reply_audio_url: audio_url,
            persona,
            timestamp: Utc::now(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A successful bridge outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeReply {
    pub reply_text: String,
    pub reply_audio_url: String,
    pub persona: Persona,
    pub timestamp: DateTime<Utc>,
}

/// Parse and classify one inbound text frame.
pub fn interpret(frame: &str) -> Inbound {
    let value: Value = match serde_json::from_str(frame) {
        Ok(v) => v,
        Err(e) => return Inbound::Malformed(format!("unparseable message: {}", e)),
    };

    let Some(object) = value.as_object() else {
        return Inbound::Malformed("message is not a JSON object".to_string());
    };

    match object.get("type").and_then(Value::as_str) {
        Some("response") => Inbound::Response(normalize_reply(object)),
        Some("error") => Inbound::Error(
            first_string(object, &["message", "error"]).filter(|m| !m.trim().is_empty()),
        ),
        Some(other) => Inbound::Other(other.to_string()),
        None => Inbound::Malformed("message has no type".to_string()),
    }
}

/// Map whichever alias the remote used onto the canonical fields.
pub fn normalize_reply(object: &Map<String, Value>) -> ReplyFields {
    ReplyFields {
        text: first_string(object, REPLY_TEXT_ALIASES),
        audio_url: first_string(object, REPLY_AUDIO_ALIASES),
    }
}

// First alias holding a non-blank string; blank values fall through to the next alias.
fn first_string(object: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    let mut blank = None;
    for alias in aliases {
        if let Some(value) = object.get(*alias).and_then(Value::as_str) {
            if !value.trim().is_empty() {
                return Some(value.to_string());
            }
            blank.get_or_insert_with(|| value.to_string());
        }
    }
    blank
}
