//! Outbound session transport.
//!
//! # Responsibilities
//! - Open one WebSocket session per bridge call
//! - Surface inbound frames as text or close events
//! - Close the session on request
//!
//! # Design Decisions
//! - `Connector` and `Session` are object-safe; the bridge and the health
//!   probe hold an `Arc<dyn Connector>`
//! - Ping/pong is handled by tungstenite while reading; callers never see it
//! - No pooling: every `connect` creates a fresh connection

use futures_util::future::BoxFuture;
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Transport-level failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("send failed: {0}")]
    Send(String),

    #[error("receive failed: {0}")]
    Receive(String),
}

/// One inbound event on an open session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Closed { code: Option<u16>, reason: String },
}

/// Opens outbound sessions.
pub trait Connector: Send + Sync {
    fn connect<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Box<dyn Session>, TransportError>>;
}

/// An open bidirectional message session.
pub trait Session: Send {
    fn send_text(&mut self, text: String) -> BoxFuture<'_, Result<(), TransportError>>;

    /// Next meaningful frame; `None` once the stream has ended.
    fn next_frame(&mut self) -> BoxFuture<'_, Option<Result<Frame, TransportError>>>;

    /// Close the session. Calling it again is a no-op.
    fn close(&mut self) -> BoxFuture<'_, ()>;
}

/// Production connector backed by tokio-tungstenite.
#[derive(Debug, Clone, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn connect<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Box<dyn Session>, TransportError>> {
        Box::pin(async move {
            let (stream, response) = connect_async(url)
                .await
                .map_err(|e| TransportError::Connect(e.to_string()))?;

            tracing::debug!(url = %url, status = %response.status(), "WebSocket session opened");
            Ok(Box::new(WsSession { stream: Some(stream) }) as Box<dyn Session>)
        })
    }
}

struct WsSession {
    stream: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
}

impl Session for WsSession {
    fn send_text(&mut self, text: String) -> BoxFuture<'_, Result<(), TransportError>> {
        Box::pin(async move {
            let stream = self
                .stream
                .as_mut()
                .ok_or_else(|| TransportError::Send("session already closed".to_string()))?;
            stream
                .send(Message::text(text))
                .await
                .map_err(|e| TransportError::Send(e.to_string()))
        })
    }

    fn next_frame(&mut self) -> BoxFuture<'_, Option<Result<Frame, TransportError>>> {
        Box::pin(async move {
            let stream = self.stream.as_mut()?;
            loop {
                match stream.next().await? {
                    Ok(Message::Text(text)) => return Some(Ok(Frame::Text(text.as_str().to_owned()))),
                    Ok(Message::Binary(bytes)) => {
                        return Some(Ok(Frame::Text(String::from_utf8_lossy(&bytes).into_owned())))
                    }
                    Ok(Message::Close(frame)) => {
                        let (code, reason) = match frame {
                            Some(f) => (Some(u16::from(f.code)), f.reason.as_str().to_owned()),
                            None => (None, String::new()),
                        };
                        return Some(Ok(Frame::Closed { code, reason }));
                    }
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => continue,
                    Err(e) => return Some(Err(TransportError::Receive(e.to_string()))),
                }
            }
        })
    }

    fn close(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if let Some(mut stream) = self.stream.take() {
                if let Err(e) = stream.close(None).await {
                    tracing::trace!(error = %e, "WebSocket close handshake did not complete");
                }
            }
        })
    }
}
