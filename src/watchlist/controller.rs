use log::{error, info, warn};

use crate::data::{FetchHandle, StockDataFetcher};
use crate::error::{StoreError, WatchlistError};
use crate::panel::{panel_key, StockPanelFactory};
use crate::watchlist::store::PersistentList;

/// Owns the ordered watchlist and keeps panels and persisted state in step
/// with it. Every tracked ticker has exactly one panel.
pub struct WatchlistController {
    tickers: Vec<String>,
    storage: PersistentList,
    panels: StockPanelFactory,
    fetcher: StockDataFetcher,
}

impl WatchlistController {
    pub fn new(storage: PersistentList, panels: StockPanelFactory, fetcher: StockDataFetcher) -> Self {
        Self {
            tickers: Vec::new(),
            storage,
            panels,
            fetcher,
        }
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.tickers.iter().any(|t| t == ticker)
    }

    /// Restores the persisted watchlist: one collapsed panel and one fetch per
    /// ticker, in stored order.
    pub fn load_from_persistence(&mut self) -> Result<Vec<FetchHandle>, StoreError> {
        let stored = self.storage.load()?;
        let mut fetches = Vec::with_capacity(stored.len());

        for ticker in stored {
            if ticker.is_empty() || self.contains(&ticker) {
                warn!("Skipping invalid or repeated stored ticker '{}'", ticker);
                continue;
            }
            if let Err(e) = self.panels.create(&ticker) {
                warn!("Skipping stored ticker {}: {}", ticker, e);
                continue;
            }
            fetches.push(self.fetcher.fetch(&ticker));
            self.tickers.push(ticker);
        }

        info!("Restored watchlist with {} tickers", self.tickers.len());
        Ok(fetches)
    }

    pub fn add(&mut self, ticker: &str) -> Result<FetchHandle, WatchlistError> {
        if ticker.trim().is_empty() {
            warn!("Add rejected: no ticker selected");
            return Err(WatchlistError::NoSelection);
        }
        if self.contains(ticker) {
            warn!("Add rejected: {} already tracked", ticker);
            return Err(WatchlistError::AlreadyTracked(ticker.to_string()));
        }

        self.panels
            .create(ticker)
            .map_err(|_| WatchlistError::AlreadyTracked(ticker.to_string()))?;
        self.tickers.push(ticker.to_string());
        let fetch = self.fetcher.fetch(ticker);

        let board = self.panels.board();
        for other in &self.tickers {
            board.set_expanded(&panel_key(other), other == ticker);
        }

        self.persist();
        info!("Added {} to watchlist ({} tracked)", ticker, self.tickers.len());
        Ok(fetch)
    }

    pub fn remove(&mut self, ticker: &str) -> Result<(), WatchlistError> {
        if !self.contains(ticker) {
            return Err(WatchlistError::NotTracked(ticker.to_string()));
        }

        self.panels.destroy(ticker);
        self.tickers.retain(|t| t != ticker);
        self.persist();
        info!("Removed {} from watchlist ({} tracked)", ticker, self.tickers.len());
        Ok(())
    }

    /// Re-fetches without touching membership or expansion. Overlapping
    /// refreshes are allowed; the last write to each field wins.
    pub fn refresh(&self, ticker: &str) -> Result<FetchHandle, WatchlistError> {
        if !self.contains(ticker) {
            return Err(WatchlistError::NotTracked(ticker.to_string()));
        }
        Ok(self.fetcher.fetch(ticker))
    }

    /// Flips the panel between expanded and collapsed; returns the new state.
    pub fn toggle(&self, ticker: &str) -> Result<bool, WatchlistError> {
        let key = panel_key(ticker);
        let board = self.panels.board();
        let expanded = board
            .expanded(&key)
            .filter(|_| self.contains(ticker))
            .ok_or_else(|| WatchlistError::NotTracked(ticker.to_string()))?;

        board.set_expanded(&key, !expanded);
        Ok(!expanded)
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.tickers) {
            error!("Failed to persist watchlist: {}", e);
        }
    }
}
