use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use serde::{Deserialize, Serialize};
use log::{info, debug};

use crate::error::PubSubError;

/// Topic carrying exchange volume updates.
pub const MARKET_TOPIC: &str = "market";

#[derive(Debug, Deserialize, Serialize)]
pub struct SubscriptionMessage {
    pub action: String, // "subscribe" | "unsubscribe" | "unsubscribe_all"
    #[serde(default)]
    pub topic: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SubscriptionResponse {
    pub status: String,
    pub topic: Option<String>,
    pub message: String,
}

/// One field write on a panel (or the market board), as pushed to subscribers.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FieldUpdate {
    pub topic: String,
    pub field: String,
    pub value: Option<String>,
    pub timestamp: String,
}

impl FieldUpdate {
    pub fn new(topic: &str, field: String, value: Option<String>) -> Self {
        Self {
            topic: topic.to_string(),
            field,
            value,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

pub struct PubSubManager {
    // Topic -> Broadcast channel for that topic
    topic_channels: Arc<Mutex<HashMap<String, broadcast::Sender<String>>>>,
    // Session ID -> Set of topics they're subscribed to
    session_subscriptions: Arc<Mutex<HashMap<String, HashSet<String>>>>,
    channel_capacity: usize,
}

impl PubSubManager {
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            topic_channels: Arc::new(Mutex::new(HashMap::new())),
            session_subscriptions: Arc::new(Mutex::new(HashMap::new())),
            channel_capacity,
        }
    }

    pub fn subscribe(&self, session_id: String, topic: String) -> Result<broadcast::Receiver<String>, PubSubError> {
        let mut channels = self.topic_channels.lock();
        let mut sessions = self.session_subscriptions.lock();

        if let Some(current_topics) = sessions.get(&session_id) {
            if current_topics.contains(&topic) {
                return Err(PubSubError::AlreadySubscribed { session: session_id, topic });
            }
        }

        let rx = channels.entry(topic.clone())
            .or_insert_with(|| {
                info!("Created new broadcast channel for topic: {}", topic);
                broadcast::channel(self.channel_capacity).0
            })
            .subscribe();

        sessions.entry(session_id.clone())
            .or_insert_with(HashSet::new)
            .insert(topic.clone());

        info!("Session {} subscribed to topic: {}", session_id, topic);
        Ok(rx)
    }

    /// Drops one topic, or with `None` every topic, from the session. A channel
    /// no session lists any more is removed, which closes its receivers.
    pub fn unsubscribe(&self, session_id: &str, topic: Option<String>) -> Result<Vec<String>, PubSubError> {
        let mut channels = self.topic_channels.lock();
        let mut sessions = self.session_subscriptions.lock();

        let removed = if let Some(topic) = topic {
            let current_topics = sessions.get_mut(session_id)
                .ok_or_else(|| PubSubError::NoSubscriptions(session_id.to_string()))?;
            if !current_topics.remove(&topic) {
                return Err(PubSubError::NotSubscribed { session: session_id.to_string(), topic });
            }
            if current_topics.is_empty() {
                sessions.remove(session_id);
            }
            info!("Session {} unsubscribed from topic: {}", session_id, topic);
            vec![topic]
        } else if let Some(topics) = sessions.remove(session_id) {
            let topic_list: Vec<String> = topics.into_iter().collect();
            info!("Session {} unsubscribed from all topics: {:?}", session_id, topic_list);
            topic_list
        } else {
            Vec::new()
        };

        for topic in &removed {
            if !sessions.values().any(|topics| topics.contains(topic)) && channels.remove(topic).is_some() {
                debug!("Removed idle broadcast channel for topic: {}", topic);
            }
        }
        Ok(removed)
    }

    /// Sends to every receiver of `topic` and returns how many there were.
    /// A topic nobody is subscribed to is not an error.
    pub fn publish(&self, topic: &str, data: &str) -> usize {
        let channels = self.topic_channels.lock();
        match channels.get(topic) {
            Some(tx) => tx.send(data.to_string()).unwrap_or_else(|_| {
                debug!("No active receivers for topic: {}", topic);
                0
            }),
            None => 0,
        }
    }

    pub fn cleanup_session(&self, session_id: &str) {
        if let Ok(topics) = self.unsubscribe(session_id, None) {
            debug!("Session {} cleaned up, {} topics released", session_id, topics.len());
        }
    }

    /// `(topics with a live channel, sessions with at least one subscription)`
    pub fn get_stats(&self) -> (usize, usize) {
        let topic_count = self.topic_channels.lock().len();
        let session_count = self.session_subscriptions.lock().len();
        (topic_count, session_count)
    }
}
