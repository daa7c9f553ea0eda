//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use futures_util::future::BoxFuture;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use voice_bridge::bridge::{Connector, Frame, Session, TransportError};
use voice_bridge::ServiceConfig;

// ---------------------------------------------------------------------------
// Scripted in-memory transport
// ---------------------------------------------------------------------------

/// Counters shared by a scripted connector and every session it opens.
#[derive(Default)]
pub struct Stats {
    connects: AtomicUsize,
    closes: AtomicUsize,
    sent: Mutex<Vec<String>>,
}

impl Stats {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Number of `close` calls, including repeated ones.
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

/// How the scripted remote answers a connect attempt.
#[derive(Debug, Clone)]
pub enum Connect {
    Accept { after: Duration },
    Refuse(String),
    Hang,
}

/// One scripted inbound event, delivered `after` the previous one.
#[derive(Debug, Clone)]
pub enum Step {
    Frame { after: Duration, frame: Frame },
    End { after: Duration },
}

pub fn text_after(secs: u64, json: Value) -> Step {
    Step::Frame {
        after: Duration::from_secs(secs),
        frame: Frame::Text(json.to_string()),
    }
}

pub fn raw_after(secs: u64, text: &str) -> Step {
    Step::Frame {
        after: Duration::from_secs(secs),
        frame: Frame::Text(text.to_string()),
    }
}

pub struct ScriptedConnector {
    connect: Connect,
    steps: Vec<Step>,
    pub stats: Arc<Stats>,
}

impl ScriptedConnector {
    pub fn accepting(steps: Vec<Step>) -> Self {
        Self::new(Connect::Accept { after: Duration::ZERO }, steps)
    }

    pub fn new(connect: Connect, steps: Vec<Step>) -> Self {
        Self {
            connect,
            steps,
            stats: Arc::new(Stats::default()),
        }
    }
}

impl Connector for ScriptedConnector {
    fn connect<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<Box<dyn Session>, TransportError>> {
        Box::pin(async move {
            self.stats.connects.fetch_add(1, Ordering::SeqCst);
            match &self.connect {
                Connect::Accept { after } => {
                    tokio::time::sleep(*after).await;
                    Ok(Box::new(ScriptedSession {
                        steps: self.steps.clone().into(),
                        stats: self.stats.clone(),
                    }) as Box<dyn Session>)
                }
                Connect::Refuse(reason) => Err(TransportError::Connect(reason.clone())),
                Connect::Hang => std::future::pending().await,
            }
        })
    }
}

struct ScriptedSession {
    steps: VecDeque<Step>,
    stats: Arc<Stats>,
}

impl Session for ScriptedSession {
    fn send_text(&mut self, text: String) -> BoxFuture<'_, Result<(), TransportError>> {
        Box::pin(async move {
            self.stats.sent.lock().unwrap().push(text);
            Ok(())
        })
    }

    fn next_frame(&mut self) -> BoxFuture<'_, Option<Result<Frame, TransportError>>> {
        Box::pin(async move {
            match self.steps.pop_front() {
                Some(Step::Frame { after, frame }) => {
                    tokio::time::sleep(after).await;
                    Some(Ok(frame))
                }
                Some(Step::End { after }) => {
                    tokio::time::sleep(after).await;
                    None
                }
                None => std::future::pending().await,
            }
        })
    }

    fn close(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.stats.closes.fetch_add(1, Ordering::SeqCst);
        })
    }
}

// ---------------------------------------------------------------------------
// Mock voice service over real sockets
// ---------------------------------------------------------------------------

/// Start a voice service exposing `/status` and `/ws` on an ephemeral port.
pub async fn start_mock_voice_service<F, Fut>(status: (u16, Value), on_socket: F) -> SocketAddr
where
    F: Fn(WebSocket) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let app = status_router(status).route(
        "/ws",
        get(move |ws: WebSocketUpgrade| {
            let on_socket = on_socket.clone();
            async move { ws.on_upgrade(on_socket) }
        }),
    );
    serve(app).await
}

/// Start a service that answers `/status` but cannot upgrade to WebSocket.
pub async fn start_status_only_service(status: (u16, Value)) -> SocketAddr {
    serve(status_router(status)).await
}

/// Start a service whose `/status` answers only after `delay`.
pub async fn start_slow_status_service(delay: Duration, status: (u16, Value)) -> SocketAddr {
    let app = Router::new().route(
        "/status",
        get(move || {
            let (code, body) = status.clone();
            async move {
                tokio::time::sleep(delay).await;
                (StatusCode::from_u16(code).unwrap(), Json(body))
            }
        }),
    );
    serve(app).await
}

fn status_router(status: (u16, Value)) -> Router {
    Router::new().route(
        "/status",
        get(move || {
            let (code, body) = status.clone();
            async move { (StatusCode::from_u16(code).unwrap(), Json(body)) }
        }),
    )
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// An address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Socket behaviour: record the request, answer with `reply`, then drain until closed.
pub fn replying(
    reply: Value,
    requests: mpsc::UnboundedSender<String>,
) -> impl Fn(WebSocket) -> BoxFuture<'static, ()> + Clone + Send + Sync + 'static {
    move |mut socket: WebSocket| {
        let reply = reply.clone();
        let requests = requests.clone();
        Box::pin(async move {
            if let Some(Ok(Message::Text(text))) = socket.recv().await {
                let _ = requests.send(text.as_str().to_owned());
                let _ = socket.send(Message::Text(reply.to_string().into())).await;
            }
            while let Some(Ok(_)) = socket.recv().await {}
        })
    }
}

/// Socket behaviour: read the request and never answer.
pub async fn silent(mut socket: WebSocket) {
    while let Some(Ok(_)) = socket.recv().await {}
}

/// Default configuration pointed at `addr` with short test timeouts.
pub fn config_for(addr: SocketAddr) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.upstream.base_url = format!("http://{}", addr);
    config.timeouts.connect_ms = 2_000;
    config.timeouts.response_ms = 2_000;
    config.timeouts.health_ms = 2_000;
    config.timeouts.upgrade_probe_ms = 2_000;
    config.timeouts.close_grace_ms = 500;
    config
}
