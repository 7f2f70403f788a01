use std::collections::BTreeMap;
use std::sync::Arc;
use log::info;

use crate::error::PanelError;
use crate::panel::board::{PanelBoard, StockPanel};
use crate::panel::fields::Field;

pub fn panel_key(ticker: &str) -> String {
    format!("stock-{}", ticker)
}

/// Creates and destroys per-ticker panels on a [`PanelBoard`].
#[derive(Clone)]
pub struct StockPanelFactory {
    board: Arc<PanelBoard>,
    template: StockPanel,
}

impl StockPanelFactory {
    pub fn new(board: Arc<PanelBoard>) -> Self {
        Self {
            board,
            template: StockPanel {
                key: String::new(),
                ticker: String::new(),
                expanded: false,
                fields: BTreeMap::new(),
            },
        }
    }

    pub fn board(&self) -> &Arc<PanelBoard> {
        &self.board
    }

    /// Clones the collapsed template under key `stock-<ticker>`.
    pub fn create(&self, ticker: &str) -> Result<String, PanelError> {
        let key = panel_key(ticker);
        let mut panel = self.template.clone();
        panel.key = key.clone();
        panel.ticker = ticker.to_string();
        panel.fields.insert(Field::Heading, Some(ticker.to_string()));

        self.board.insert(panel)?;
        info!("Created panel {}", key);
        Ok(key)
    }

    pub fn destroy(&self, ticker: &str) -> bool {
        let key = panel_key(ticker);
        let removed = self.board.remove(&key);
        if removed {
            info!("Destroyed panel {}", key);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::pubsub::PubSubManager;

    fn factory() -> StockPanelFactory {
        StockPanelFactory::new(Arc::new(PanelBoard::new(Arc::new(PubSubManager::new(16)))))
    }

    #[test]
    fn test_create_uses_derived_key() {
        let factory = factory();
        let key = factory.create("MSFT").unwrap();

        assert_eq!(key, "stock-MSFT");
        let panel = factory.board().get("stock-MSFT").unwrap();
        assert!(!panel.expanded);
        assert_eq!(panel.field(Field::Heading), Some(&Some("MSFT".to_string())));
    }

    #[test]
    fn test_create_twice_fails() {
        let factory = factory();
        factory.create("MSFT").unwrap();
        assert!(factory.create("MSFT").is_err());
    }

    #[test]
    fn test_destroy() {
        let factory = factory();
        factory.create("MSFT").unwrap();

        assert!(factory.destroy("MSFT"));
        assert!(!factory.destroy("MSFT"));
        assert!(factory.board().is_empty());
    }
}
