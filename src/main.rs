mod api;
mod config;
mod data;
mod error;
mod panel;
mod watchlist;
mod websocket;

#[cfg(test)]
mod test_support;

use std::time::Duration;
use std::sync::Arc;
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::time::interval;
use log::{info, error};
use tower_http::cors::CorsLayer;

use crate::config::{Config, BROADCAST_CHANNEL_SIZE, WATCHLIST_SLOT};
use crate::data::{IexClient, NewsApi, NewsClient, PubSubManager, StockApi, StockDataFetcher, SymbolDirectory, VolumeTicker};
use crate::panel::{PanelBoard, StockPanelFactory};
use crate::watchlist::{FileStore, PersistentList, WatchlistController};
use crate::websocket::WebSocketHandler;
use crate::api::{ApiState, create_api_router};

const STATS_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&config.log_level));

    config.log_config();

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return Err(e.into());
    }

    // Upstream clients
    let http = reqwest::Client::builder().build()?;
    let stocks: Arc<dyn StockApi> = Arc::new(IexClient::new(http.clone(), &config.stock_api_url));
    let news: Arc<dyn NewsApi> = Arc::new(NewsClient::new(http, &config.news_api_url, config.news_api_key.clone()));

    // Display sink and live feed
    let pubsub_manager = Arc::new(PubSubManager::new(BROADCAST_CHANNEL_SIZE));
    let board = Arc::new(PanelBoard::new(pubsub_manager.clone()));

    // Watchlist
    let storage = PersistentList::new(Arc::new(FileStore::new(&config.store_file)), WATCHLIST_SLOT);
    let fetcher = StockDataFetcher::new(stocks.clone(), news, board.clone());
    let mut controller = WatchlistController::new(storage, StockPanelFactory::new(board.clone()), fetcher);
    match controller.load_from_persistence() {
        Ok(fetches) => info!("📊 Restored {} tracked tickers", fetches.len()),
        Err(e) => error!("Could not restore watchlist, starting empty: {}", e),
    }
    let controller = Arc::new(Mutex::new(controller));

    // Selector directory, loaded once
    let symbols = Arc::new(SymbolDirectory::new());
    {
        let symbols = symbols.clone();
        let stocks = stocks.clone();
        tokio::spawn(async move { symbols.load(stocks).await });
    }

    VolumeTicker::new(stocks, board.clone(), config.exchanges.clone(), config.volume_interval()).spawn();

    start_background_tasks(controller.clone(), pubsub_manager.clone());

    // Start API server
    let api_state = ApiState {
        controller,
        board,
        symbols,
    };
    let api_router = create_api_router(api_state)
        .layer(CorsLayer::permissive());

    let api_listener = TcpListener::bind(&config.bind_address).await?;
    info!("🌐 HTTP API server running at http://{}", config.bind_address);
    let api_server = axum::serve(api_listener, api_router);

    // Start WebSocket server
    let ws_listener = TcpListener::bind(&config.ws_bind_address).await?;
    info!("🚀 WebSocket feed running at ws://{}", config.ws_bind_address);

    let websocket_server = async move {
        while let Ok((stream, addr)) = ws_listener.accept().await {
            let pubsub = pubsub_manager.clone();
            tokio::spawn(async move {
                WebSocketHandler::new(addr.to_string())
                    .handle_connection(stream, pubsub)
                    .await;
            });
        }
    };

    tokio::select! {
        result = api_server => {
            error!("API server stopped: {:?}", result);
        }
        _ = websocket_server => {
            error!("WebSocket server stopped");
        }
    }

    Ok(())
}

fn start_background_tasks(controller: Arc<Mutex<WatchlistController>>, pubsub: Arc<PubSubManager>) {
    tokio::spawn(async move {
        let mut interval_timer = interval(Duration::from_secs(STATS_INTERVAL_SECS));

        loop {
            interval_timer.tick().await;
            let tracked = controller.lock().tickers().len();
            let (topic_count, session_count) = pubsub.get_stats();

            if tracked > 0 || session_count > 0 {
                info!("Stats - Tracked: {}, Topics: {}, Feed sessions: {}",
                      tracked, topic_count, session_count);
            }
        }
    });

    info!("📈 Started stats monitoring task (every {} seconds)", STATS_INTERVAL_SECS);
}
