pub mod client;
pub mod fetcher;
pub mod format;
pub mod models;
pub mod pubsub;
pub mod symbols;
pub mod volume;

pub use client::{IexClient, NewsApi, NewsClient, StockApi};
pub use fetcher::{FetchHandle, StockDataFetcher};
pub use pubsub::{PubSubManager, SubscriptionMessage, SubscriptionResponse, MARKET_TOPIC};
pub use symbols::{SymbolDirectory, DEFAULT_SEARCH_LIMIT};
pub use volume::VolumeTicker;
