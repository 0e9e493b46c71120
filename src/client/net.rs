use super::encode::WireFrame;
use futures_util::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
    Errored,
}

impl ConnectionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Errored)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Opened,
    Text(String),
    /// Carries the close reason when the server gave one.
    Closed(Option<String>),
    Errored(String),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("connection is not open (state: {0:?})")]
    NotOpen(ConnectionState),
    #[error("connection task has stopped")]
    TaskGone,
}

/// One websocket connection, owned by exactly one session. Dropping the
/// handle closes the socket.
#[derive(Debug)]
pub struct ConnectionHandle {
    state: ConnectionState,
    outbound: mpsc::UnboundedSender<WireFrame>,
    inbound: mpsc::UnboundedReceiver<ConnectionEvent>,
    task: JoinHandle<()>,
}

impl ConnectionHandle {
    /// Start connecting to `url`. Must be called from within a tokio runtime.
    pub fn open(url: &Url) -> Self {
        let (to_net_tx, to_net_rx) = mpsc::unbounded_channel::<WireFrame>();
        let (to_owner_tx, to_owner_rx) = mpsc::unbounded_channel::<ConnectionEvent>();

        log::info!("connecting to websocket {}", url);
        let task = tokio::spawn(network_task(url.to_string(), to_net_rx, to_owner_tx));

        Self {
            state: ConnectionState::Connecting,
            outbound: to_net_tx,
            inbound: to_owner_rx,
            task,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn send(&self, frame: WireFrame) -> Result<(), ConnectionError> {
        if self.state != ConnectionState::Open {
            return Err(ConnectionError::NotOpen(self.state));
        }
        self.outbound
            .send(frame)
            .map_err(|_| ConnectionError::TaskGone)
    }

    /// Wait for the next lifecycle event or inbound frame. Returns `None`
    /// once the connection is finished and every event has been handed out.
    /// Cancel-safe.
    pub async fn next_event(&mut self) -> Option<ConnectionEvent> {
        if self.state.is_terminal() {
            return None;
        }

        let event = match self.inbound.recv().await {
            Some(event) => event,
            None => {
                // Task ended without reporting, which only happens on abort.
                self.state = ConnectionState::Closed;
                return Some(ConnectionEvent::Closed(None));
            }
        };

        match &event {
            ConnectionEvent::Opened => self.state = ConnectionState::Open,
            ConnectionEvent::Closed(_) => self.state = ConnectionState::Closed,
            ConnectionEvent::Errored(_) => self.state = ConnectionState::Errored,
            ConnectionEvent::Text(_) => {}
        }
        Some(event)
    }

    /// Close the connection and drop anything not yet delivered.
    pub fn close(mut self) {
        log::info!("closing websocket connection");
        if self.state == ConnectionState::Connecting {
            self.task.abort();
        }
        self.state = ConnectionState::Closed;
        self.inbound.close();
        while self.inbound.try_recv().is_ok() {}
        // Dropping the outbound sender makes the network task send a close
        // frame and exit.
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        if !self.task.is_finished() && self.state == ConnectionState::Connecting {
            self.task.abort();
        }
    }
}

async fn network_task(
    ws_url: String,
    mut outbound_rx: mpsc::UnboundedReceiver<WireFrame>,
    inbound_tx: mpsc::UnboundedSender<ConnectionEvent>,
) {
    let ws_stream = match connect_async(ws_url.as_str()).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(err) => {
            log::warn!("failed connecting to {}: {}", ws_url, err);
            let _ = inbound_tx.send(ConnectionEvent::Errored(err.to_string()));
            return;
        }
    };
    log::info!("websocket to {} is open", ws_url);
    if inbound_tx.send(ConnectionEvent::Opened).is_err() {
        return;
    }

    let (mut ws_write, mut ws_read) = ws_stream.split();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                let Some(frame) = outbound else {
                    // Owner is gone.
                    let _ = ws_write.send(Message::Close(None)).await;
                    break;
                };
                if let Err(err) = ws_write.send(frame.into_message()).await {
                    log::warn!("websocket send failed: {}", err);
                    let _ = inbound_tx.send(ConnectionEvent::Errored(err.to_string()));
                    break;
                }
            }
            incoming = ws_read.next() => {
                let msg = match incoming {
                    Some(Ok(msg)) => msg,
                    Some(Err(err)) => {
                        log::warn!("websocket read error: {}", err);
                        let _ = inbound_tx.send(ConnectionEvent::Errored(err.to_string()));
                        break;
                    }
                    None => {
                        let _ = inbound_tx.send(ConnectionEvent::Closed(None));
                        break;
                    }
                };

                match msg {
                    Message::Text(text) => {
                        if inbound_tx.send(ConnectionEvent::Text(text)).is_err() {
                            break;
                        }
                    }
                    Message::Close(frame) => {
                        let reason = frame
                            .map(|f| f.reason.to_string())
                            .filter(|r| !r.is_empty());
                        log::info!("websocket closed by server: {:?}", reason);
                        let _ = inbound_tx.send(ConnectionEvent::Closed(reason));
                        break;
                    }
                    other => {
                        log::debug!("ignoring non-text frame ({} bytes)", other.len());
                    }
                }
            }
        }
    }
}
