use std::sync::Arc;
use log::{info, warn};
use parking_lot::RwLock;

use crate::data::client::StockApi;
use crate::data::models::SymbolRef;

pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Known symbols backing the add-ticker selector. Loaded once at startup.
#[derive(Default)]
pub struct SymbolDirectory {
    symbols: RwLock<Vec<SymbolRef>>,
}

impl SymbolDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&self, api: Arc<dyn StockApi>) {
        match api.symbols().await {
            Ok(symbols) => {
                info!("Loaded {} symbols", symbols.len());
                *self.symbols.write() = symbols;
            }
            Err(e) => warn!("Failed to load symbol directory: {}", e),
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.read().len()
    }

    /// Case-insensitive prefix match on the symbol, in directory order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SymbolRef> {
        let query = query.trim().to_ascii_uppercase();
        self.symbols
            .read()
            .iter()
            .filter(|s| s.symbol.to_ascii_uppercase().starts_with(&query))
            .take(limit)
            .cloned()
            .collect()
    }
}
