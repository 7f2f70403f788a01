use std::collections::HashMap;
use std::sync::Arc;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::{accept_async, WebSocketStream};
use tokio_tungstenite::tungstenite::Message;
use log::{info, warn, error};

use crate::data::{PubSubManager, SubscriptionMessage, SubscriptionResponse, MARKET_TOPIC};
use crate::panel::panel_key;

const OUTBOUND_BUFFER: usize = 100;

/// Maps a client-supplied topic (`market`, a ticker, or a panel key) to a pub/sub topic.
pub fn resolve_topic(requested: &str) -> Option<String> {
    let requested = requested.trim();
    if requested.is_empty() {
        None
    } else if requested.eq_ignore_ascii_case(MARKET_TOPIC) {
        Some(MARKET_TOPIC.to_string())
    } else if requested.starts_with("stock-") {
        Some(requested.to_string())
    } else {
        Some(panel_key(requested))
    }
}

fn response(status: &str, topic: Option<String>, message: impl Into<String>) -> Option<String> {
    let response = SubscriptionResponse {
        status: status.to_string(),
        topic,
        message: message.into(),
    };
    serde_json::to_string(&response).ok()
}

/// Streams panel and market field updates to one WebSocket client.
pub struct WebSocketHandler {
    session_id: String,
    peer_addr: String,
}

impl WebSocketHandler {
    pub fn new(peer_addr: String) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            peer_addr,
        }
    }

    pub async fn handle_connection(self, stream: TcpStream, pubsub: Arc<PubSubManager>) {
        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                error!("WebSocket handshake failed for {}: {:?}", self.peer_addr, e);
                return;
            }
        };

        let (write, read) = ws_stream.split();
        info!("WebSocket connection established - Session: {} from {}", &self.session_id[..8], self.peer_addr);

        let (outbound_tx, outbound_rx) = mpsc::channel::<String>(OUTBOUND_BUFFER);
        let write_task = Self::spawn_write_task(write, outbound_rx);
        let read_task = self.spawn_read_task(read, pubsub.clone(), outbound_tx);

        tokio::select! {
            _ = write_task => {
                info!("Write task completed for session {}", &self.session_id[..8]);
            }
            _ = read_task => {
                info!("Read task completed for session {}", &self.session_id[..8]);
            }
        }

        pubsub.cleanup_session(&self.session_id);
        info!("WebSocket connection closed - Session: {} from {}", &self.session_id[..8], self.peer_addr);
    }

    fn spawn_write_task(
        mut write: futures::stream::SplitSink<WebSocketStream<TcpStream>, Message>,
        mut outbound_rx: mpsc::Receiver<String>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                if let Err(e) = write.send(Message::Text(message)).await {
                    error!("Error sending message: {:?}", e);
                    break;
                }
            }
        })
    }

    /// Copies one topic's updates into the session's outbound queue. A lagging
    /// receiver skips what it missed and keeps going; only a closed channel or a
    /// gone writer ends it.
    fn spawn_forwarder(
        session_id: String,
        topic: String,
        mut rx: broadcast::Receiver<String>,
        tx: mpsc::Sender<String>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(data) => {
                        if tx.send(data).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Session {} lagged on {}, skipped {} updates", &session_id[..8], topic, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Channel for {} closed", topic);
                        break;
                    }
                }
            }
        })
    }

    fn spawn_read_task(
        &self,
        mut read: futures::stream::SplitStream<WebSocketStream<TcpStream>>,
        pubsub: Arc<PubSubManager>,
        outbound_tx: mpsc::Sender<String>,
    ) -> JoinHandle<()> {
        let session_id = self.session_id.clone();

        tokio::spawn(async move {
            let mut forwarders: HashMap<String, JoinHandle<()>> = HashMap::new();

            while let Some(msg_result) = read.next().await {
                let text = match msg_result {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) => {
                        info!("Client sent close frame for session {}", &session_id[..8]);
                        break;
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        error!("WebSocket error for session {}: {:?}", &session_id[..8], e);
                        break;
                    }
                };

                let request = match serde_json::from_str::<SubscriptionMessage>(&text) {
                    Ok(request) => request,
                    Err(_) => {
                        info!("Ignoring non-subscription message from session {}", &session_id[..8]);
                        continue;
                    }
                };

                let topic = request.topic.as_deref().and_then(resolve_topic);
                let reply = match (request.action.as_str(), topic) {
                    ("subscribe", Some(topic)) => {
                        match pubsub.subscribe(session_id.clone(), topic.clone()) {
                            Ok(rx) => {
                                let forwarder = Self::spawn_forwarder(
                                    session_id.clone(),
                                    topic.clone(),
                                    rx,
                                    outbound_tx.clone(),
                                );
                                forwarders.insert(topic.clone(), forwarder);
                                response("success", Some(topic), "Successfully subscribed")
                            }
                            Err(e) => response("error", Some(topic), e.to_string()),
                        }
                    }
                    ("unsubscribe", Some(topic)) => {
                        if let Some(forwarder) = forwarders.remove(&topic) {
                            forwarder.abort();
                        }
                        match pubsub.unsubscribe(&session_id, Some(topic.clone())) {
                            Ok(_) => response("success", Some(topic), "Successfully unsubscribed"),
                            Err(e) => response("error", Some(topic), e.to_string()),
                        }
                    }
                    ("unsubscribe_all", _) => {
                        for (_, forwarder) in forwarders.drain() {
                            forwarder.abort();
                        }
                        match pubsub.unsubscribe(&session_id, None) {
                            Ok(topics) => response(
                                "success",
                                None,
                                format!("Successfully unsubscribed from {} topics", topics.len()),
                            ),
                            Err(e) => response("error", None, e.to_string()),
                        }
                    }
                    ("subscribe", None) | ("unsubscribe", None) => {
                        response("error", None, "Missing topic")
                    }
                    (action, _) => {
                        warn!("Unknown subscription action: {}", action);
                        response("error", None, format!("Unknown action: {}", action))
                    }
                };

                if let Some(reply) = reply {
                    if outbound_tx.send(reply).await.is_err() {
                        break;
                    }
                }
            }

            for (_, forwarder) in forwarders {
                forwarder.abort();
            }
        })
    }
}
