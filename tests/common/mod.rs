#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
    routing::{get, post},
};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};
use tdt_client::{Session, SessionEvent};
use tokio::{net::TcpListener, sync::mpsc, time::timeout};
use url::Url;

const WAIT: Duration = Duration::from_secs(5);
const QUIET: Duration = Duration::from_millis(200);

pub const CREATED_GAME_ID: &str = "abc123";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    Text(String),
    Binary(Vec<u8>),
}

enum Push {
    Text(String),
    Close,
}

/// Server side of one client websocket.
pub struct ClientConn {
    from_client: mpsc::UnboundedReceiver<Received>,
    to_client: mpsc::UnboundedSender<Push>,
}

impl ClientConn {
    pub fn push(&self, snapshot: &str) {
        self.to_client.send(Push::Text(snapshot.to_string())).unwrap();
    }

    pub fn close(&self) {
        self.to_client.send(Push::Close).unwrap();
    }

    /// Next frame from the client, or `None` once the client has hung up.
    pub async fn recv(&mut self) -> Option<Received> {
        timeout(WAIT, self.from_client.recv())
            .await
            .expect("timed out waiting for client frame")
    }

    pub async fn recv_json(&mut self) -> Value {
        match self.recv().await {
            Some(Received::Text(text)) => serde_json::from_str(&text).unwrap(),
            other => panic!("expected a text frame, got {:?}", other),
        }
    }

    pub async fn assert_quiet(&mut self) {
        if let Ok(frame) = timeout(QUIET, self.from_client.recv()).await {
            panic!("unexpected frame from client: {:?}", frame);
        }
    }
}

#[derive(Clone)]
struct Shared {
    conns: mpsc::UnboundedSender<ClientConn>,
    created: Arc<Mutex<Vec<Value>>>,
}

pub struct FakeServer {
    addr: SocketAddr,
    conns: mpsc::UnboundedReceiver<ClientConn>,
    created: Arc<Mutex<Vec<Value>>>,
}

impl FakeServer {
    pub fn websocket_url(&self) -> Url {
        Url::parse(&format!("ws://{}/api/websocket", self.addr)).unwrap()
    }

    pub fn create_url(&self) -> Url {
        Url::parse(&format!("http://{}/api/create", self.addr)).unwrap()
    }

    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    pub async fn accept(&mut self) -> ClientConn {
        timeout(WAIT, self.conns.recv())
            .await
            .expect("timed out waiting for a client")
            .expect("server stopped")
    }

    pub fn created_requests(&self) -> Vec<Value> {
        self.created.lock().unwrap().clone()
    }
}

pub async fn spawn_fake_server() -> FakeServer {
    let (conns_tx, conns_rx) = mpsc::unbounded_channel();
    let created = Arc::new(Mutex::new(Vec::new()));
    let shared = Shared {
        conns: conns_tx,
        created: created.clone(),
    };

    let app = Router::new()
        .route("/api/websocket", get(ws_handler))
        .route("/api/create", post(create_handler))
        .with_state(shared);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeServer {
        addr,
        conns: conns_rx,
        created,
    }
}

/// A websocket URL nobody listens on.
pub async fn refused_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("ws://{}/api/websocket", addr)).unwrap()
}

async fn create_handler(State(shared): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    shared.created.lock().unwrap().push(body);
    Json(json!({ "gameId": CREATED_GAME_ID }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(shared): State<Shared>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, shared))
}

async fn handle_socket(socket: WebSocket, shared: Shared) {
    let (mut ws_write, mut ws_read) = socket.split();
    let (from_client_tx, from_client_rx) = mpsc::unbounded_channel();
    let (to_client_tx, mut to_client_rx) = mpsc::unbounded_channel();

    let _ = shared.conns.send(ClientConn {
        from_client: from_client_rx,
        to_client: to_client_tx,
    });

    let writer = tokio::spawn(async move {
        while let Some(push) = to_client_rx.recv().await {
            let msg = match push {
                Push::Text(text) => Message::Text(text.into()),
                Push::Close => Message::Close(None),
            };
            let closing = matches!(msg, Message::Close(_));
            if ws_write.send(msg).await.is_err() || closing {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = ws_read.next().await {
        let received = match msg {
            Message::Text(text) => Received::Text(text.to_string()),
            Message::Binary(bytes) => Received::Binary(bytes.to_vec()),
            Message::Close(_) => break,
            _ => continue,
        };
        if from_client_tx.send(received).is_err() {
            break;
        }
    }

    writer.abort();
}

/// Next session event, failing the test if none arrives in time.
pub async fn next_event(session: &mut Session) -> Option<SessionEvent> {
    timeout(WAIT, session.next_update())
        .await
        .expect("timed out waiting for session event")
}

/// Activate-side half of the handshake: the session reports the open socket
/// and the server sees the access action.
pub async fn open_session(session: &mut Session, conn: &mut ClientConn) -> Value {
    assert_eq!(next_event(session).await, Some(SessionEvent::Connected));
    conn.recv_json().await
}
