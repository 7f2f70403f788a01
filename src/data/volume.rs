use std::sync::Arc;
use std::time::Duration;
use log::{info, warn};
use tokio::task::JoinHandle;

use crate::data::client::StockApi;
use crate::data::format::local_datetime;
use crate::data::models::VenueVolume;
use crate::panel::{ExchangeVolume, PanelBoard};

/// Picks the named exchanges out of a market snapshot by venue name.
pub fn select_exchanges(venues: &[VenueVolume], exchanges: &[String]) -> Vec<ExchangeVolume> {
    exchanges
        .iter()
        .filter_map(|exchange| {
            let venue = venues.iter().find(|v| {
                v.venue_name
                    .as_deref()
                    .is_some_and(|name| name.trim().eq_ignore_ascii_case(exchange))
            });
            if venue.is_none() {
                warn!("Exchange {} missing from market snapshot", exchange);
            }
            venue.map(|v| ExchangeVolume {
                exchange: exchange.clone(),
                volume: v.volume.map(|n| n.to_string()),
                updated_at: v.last_updated.and_then(local_datetime),
            })
        })
        .collect()
}

/// Polls aggregate exchange volume. The next request is issued one interval
/// after the previous one completes, so at most one is ever in flight.
pub struct VolumeTicker {
    api: Arc<dyn StockApi>,
    board: Arc<PanelBoard>,
    exchanges: Vec<String>,
    interval: Duration,
}

impl VolumeTicker {
    pub fn new(api: Arc<dyn StockApi>, board: Arc<PanelBoard>, exchanges: Vec<String>, interval: Duration) -> Self {
        Self { api, board, exchanges, interval }
    }

    /// One request; returns how many exchanges were updated.
    pub async fn tick(&self) -> usize {
        match self.api.market().await {
            Ok(venues) => {
                let selected = select_exchanges(&venues, &self.exchanges);
                let updated = selected.len();
                for volume in selected {
                    self.board.update_market(volume);
                }
                updated
            }
            Err(e) => {
                warn!("Market volume request failed: {}", e);
                0
            }
        }
    }

    pub async fn run(self) {
        info!("Volume ticker started for {} (every {}s)", self.exchanges.join(", "), self.interval.as_secs());
        loop {
            self.tick().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
