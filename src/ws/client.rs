//! WebSocket transport to the game authority

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use crate::app::runner::NETWORK_CHANNEL_CAPACITY;
use crate::game::NetworkEvent;
use crate::util::time::Timer;

use super::protocol::{self, ClientMsg};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("WebSocket connect to {url} failed: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
}

/// A live connection split into the session's two channel ends
pub struct Connection {
    /// Inbound frames, ending with exactly one `Closed`
    pub network_rx: mpsc::Receiver<NetworkEvent>,
    /// Messages for the authority
    pub outbound_tx: mpsc::UnboundedSender<ClientMsg>,
    pub tasks: TransportTasks,
}

/// Reader and writer pumps of a connection
pub struct TransportTasks {
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl TransportTasks {
    /// Stop both pumps
    pub fn shutdown(self) {
        self.reader.abort();
        self.writer.abort();
    }
}

/// Connect to `url` and start the reader and writer tasks. Inbound
/// messages are stamped with `timer`.
pub async fn connect(url: &str, timer: Timer) -> Result<Connection, TransportError> {
    let (stream, _) = connect_async(url)
        .await
        .map_err(|source| TransportError::Connect {
            url: url.to_string(),
            source,
        })?;
    info!(url, "Connected to authority");

    let (ws_sink, ws_stream) = stream.split();
    let (network_tx, network_rx) = mpsc::channel(NETWORK_CHANNEL_CAPACITY);
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

    let reader = tokio::spawn(read_loop(ws_stream, network_tx, timer));
    let writer = tokio::spawn(write_loop(ws_sink, outbound_rx));

    Ok(Connection {
        network_rx,
        outbound_tx,
        tasks: TransportTasks { reader, writer },
    })
}

/// WebSocket -> session
async fn read_loop(
    mut ws_stream: SplitStream<WsStream>,
    network_tx: mpsc::Sender<NetworkEvent>,
    timer: Timer,
) {
    let mut close_reason: Option<String> = None;
    let reason = loop {
        match ws_stream.next().await {
            Some(Ok(Message::Text(text))) => {
                let event = NetworkEvent::Message {
                    payload: text,
                    received_at: timer.elapsed_ms(),
                };
                if network_tx.send(event).await.is_err() {
                    debug!("Session loop gone, stopping reader");
                    return;
                }
            }
            Some(Ok(Message::Binary(_))) => {
                warn!("Received binary message, ignoring");
            }
            Some(Ok(Message::Close(frame))) => {
                info!(?frame, "Authority closed the connection");
                // keep polling until the close reply is flushed
                close_reason = Some(
                    frame
                        .map(|f| f.reason.to_string())
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(|| "server closed the connection".to_string()),
                );
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                if let Some(reason) = close_reason.take() {
                    break reason;
                }
                error!(error = %e, "WebSocket error");
                break e.to_string();
            }
            None => {
                break close_reason
                    .take()
                    .unwrap_or_else(|| "connection ended".to_string())
            }
        }
    };

    let _ = network_tx.send(NetworkEvent::Closed { reason }).await;
}

/// Session -> WebSocket
async fn write_loop(
    mut ws_sink: SplitSink<WsStream, Message>,
    mut outbound_rx: mpsc::UnboundedReceiver<ClientMsg>,
) {
    while let Some(msg) = outbound_rx.recv().await {
        let text = match protocol::encode(&msg) {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, ?msg, "Failed to encode message");
                continue;
            }
        };
        if let Err(e) = ws_sink.send(Message::Text(text)).await {
            debug!(error = %e, "WebSocket send failed");
            break;
        }
    }
    let _ = ws_sink.close().await;
}
