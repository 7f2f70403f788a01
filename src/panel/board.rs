use std::collections::BTreeMap;
use std::sync::Arc;
use log::{debug, error};
use parking_lot::Mutex;
use serde::Serialize;

use crate::data::pubsub::{FieldUpdate, PubSubManager, MARKET_TOPIC};
use crate::error::PanelError;
use crate::panel::fields::Field;

/// A written field value; `None` means the upstream had no value.
pub type FieldValue = Option<String>;

#[derive(Debug, Clone, PartialEq)]
pub struct StockPanel {
    pub key: String,
    pub ticker: String,
    pub expanded: bool,
    pub fields: BTreeMap<Field, FieldValue>,
}

impl StockPanel {
    pub fn field(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(&field)
    }
}

/// Latest volume figures for one exchange.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExchangeVolume {
    pub exchange: String,
    pub volume: FieldValue,
    pub updated_at: FieldValue,
}

/// Keyed registry of display surfaces. Writes are fanned out to pub/sub
/// subscribers of the panel's key.
pub struct PanelBoard {
    panels: Mutex<Vec<StockPanel>>,
    market: Mutex<BTreeMap<String, ExchangeVolume>>,
    pubsub: Arc<PubSubManager>,
}

impl PanelBoard {
    pub fn new(pubsub: Arc<PubSubManager>) -> Self {
        Self {
            panels: Mutex::new(Vec::new()),
            market: Mutex::new(BTreeMap::new()),
            pubsub,
        }
    }

    pub fn insert(&self, panel: StockPanel) -> Result<(), PanelError> {
        let mut panels = self.panels.lock();
        if panels.iter().any(|p| p.key == panel.key) {
            return Err(PanelError::AlreadyExists(panel.key));
        }
        panels.push(panel);
        Ok(())
    }

    pub fn remove(&self, key: &str) -> bool {
        let mut panels = self.panels.lock();
        let before = panels.len();
        panels.retain(|p| p.key != key);
        panels.len() != before
    }

    pub fn contains(&self, key: &str) -> bool {
        self.panels.lock().iter().any(|p| p.key == key)
    }

    /// Returns `false` without effect when no panel has `key`.
    pub fn set_field(&self, key: &str, field: Field, value: FieldValue) -> bool {
        {
            let mut panels = self.panels.lock();
            match panels.iter_mut().find(|p| p.key == key) {
                Some(panel) => {
                    panel.fields.insert(field, value.clone());
                }
                None => {
                    debug!("Dropping write of {} for missing panel {}", field, key);
                    return false;
                }
            }
        }
        self.publish(key, field.key(), value);
        true
    }

    pub fn set_expanded(&self, key: &str, expanded: bool) -> bool {
        let mut panels = self.panels.lock();
        match panels.iter_mut().find(|p| p.key == key) {
            Some(panel) => {
                panel.expanded = expanded;
                true
            }
            None => false,
        }
    }

    pub fn expanded(&self, key: &str) -> Option<bool> {
        self.panels.lock().iter().find(|p| p.key == key).map(|p| p.expanded)
    }

    pub fn get(&self, key: &str) -> Option<StockPanel> {
        self.panels.lock().iter().find(|p| p.key == key).cloned()
    }

    /// All panels in insertion order.
    pub fn panels(&self) -> Vec<StockPanel> {
        self.panels.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.panels.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.lock().is_empty()
    }

    pub fn update_market(&self, volume: ExchangeVolume) {
        let exchange = volume.exchange.clone();
        self.market.lock().insert(exchange.clone(), volume.clone());
        self.publish(MARKET_TOPIC, format!("{}.volume", exchange), volume.volume);
        self.publish(MARKET_TOPIC, format!("{}.time", exchange), volume.updated_at);
    }

    pub fn market(&self) -> Vec<ExchangeVolume> {
        self.market.lock().values().cloned().collect()
    }

    fn publish(&self, topic: &str, field: String, value: FieldValue) {
        let update = FieldUpdate::new(topic, field, value);
        match update.to_json() {
            Ok(json) => {
                let receivers = self.pubsub.publish(topic, &json);
                debug!("Update for {} sent to {} receivers", topic, receivers);
            }
            Err(e) => error!("Failed to serialize update for {}: {}", topic, e),
        }
    }
}
