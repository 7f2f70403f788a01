use std::env;
use std::time::Duration;
use log::warn;

// Server Configuration
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_WS_BIND_ADDRESS: &str = "127.0.0.1:8081";

// Upstream APIs
pub const DEFAULT_STOCK_API_URL: &str = "https://api.iextrading.com/1.0";
pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org/v2";

// Persistence
pub const DEFAULT_STORE_FILE: &str = "./data/store.json";
pub const WATCHLIST_SLOT: &str = "stocks";

// Volume ticker
pub const VOLUME_REFRESH_SECS: u64 = 60;
pub const DEFAULT_EXCHANGES: &[&str] = &["NASDAQ", "NYSE"];

// Broadcast Configuration
pub const BROADCAST_CHANNEL_SIZE: usize = 100;

pub struct Config {
    pub bind_address: String,
    pub ws_bind_address: String,
    pub stock_api_url: String,
    pub news_api_url: String,
    pub news_api_key: Option<String>,
    pub store_file: String,
    pub volume_refresh_secs: u64,
    pub exchanges: Vec<String>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string()),
            ws_bind_address: env::var("WS_BIND_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_WS_BIND_ADDRESS.to_string()),
            stock_api_url: env::var("STOCK_API_URL")
                .unwrap_or_else(|_| DEFAULT_STOCK_API_URL.to_string()),
            news_api_url: env::var("NEWS_API_URL")
                .unwrap_or_else(|_| DEFAULT_NEWS_API_URL.to_string()),
            news_api_key: env::var("NEWS_API_KEY").ok().filter(|k| !k.is_empty()),
            store_file: env::var("STORE_FILE")
                .unwrap_or_else(|_| DEFAULT_STORE_FILE.to_string()),
            volume_refresh_secs: env::var("VOLUME_REFRESH_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(VOLUME_REFRESH_SECS),
            exchanges: env::var("EXCHANGES")
                .map(|s| parse_exchanges(&s))
                .unwrap_or_else(|_| DEFAULT_EXCHANGES.iter().map(|e| e.to_string()).collect()),
            log_level: env::var("RUST_LOG")
                .unwrap_or_else(|_| "info".to_string()),
        }
    }

    pub fn volume_interval(&self) -> Duration {
        Duration::from_secs(self.volume_refresh_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.news_api_key.is_none() {
            warn!("NEWS_API_KEY not set - news requests will be sent without a credential");
        }

        if self.volume_refresh_secs == 0 {
            return Err("VOLUME_REFRESH_SECS must be greater than zero".to_string());
        }

        if self.exchanges.is_empty() {
            return Err("EXCHANGES must name at least one exchange".to_string());
        }

        for url in [&self.stock_api_url, &self.news_api_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("Invalid API base URL: {}", url));
            }
        }

        if self.bind_address == self.ws_bind_address {
            return Err("BIND_ADDRESS and WS_BIND_ADDRESS must differ".to_string());
        }

        Ok(())
    }

    pub fn log_config(&self) {
        println!("Server Configuration:");
        println!("  HTTP Bind Address: {}", self.bind_address);
        println!("  WebSocket Bind Address: {}", self.ws_bind_address);
        println!("  Stock API: {}", self.stock_api_url);
        println!("  News API: {}", self.news_api_url);
        println!("  News API Key: {}", if self.news_api_key.is_some() { "set" } else { "not set" });
        println!("  Store File: {}", self.store_file);
        println!("  Volume Refresh: {}s", self.volume_refresh_secs);
        println!("  Exchanges: {}", self.exchanges.join(", "));
        println!("  Log Level: {}", self.log_level);
    }
}

fn parse_exchanges(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        let config = Config::from_env();
        assert!(!config.bind_address.is_empty());
        assert!(!config.store_file.is_empty());
        assert!(config.volume_refresh_secs > 0 || env::var("VOLUME_REFRESH_SECS").is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::from_env();
        config.bind_address = DEFAULT_BIND_ADDRESS.to_string();
        config.ws_bind_address = DEFAULT_WS_BIND_ADDRESS.to_string();
        config.stock_api_url = DEFAULT_STOCK_API_URL.to_string();
        config.news_api_url = DEFAULT_NEWS_API_URL.to_string();
        config.volume_refresh_secs = VOLUME_REFRESH_SECS;
        config.exchanges = vec!["NASDAQ".to_string()];
        assert!(config.validate().is_ok());

        config.volume_refresh_secs = 0;
        assert!(config.validate().is_err());

        config.volume_refresh_secs = 60;
        config.stock_api_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_exchanges() {
        assert_eq!(parse_exchanges(" NASDAQ, NYSE ,,"), vec!["NASDAQ", "NYSE"]);
        assert!(parse_exchanges("").is_empty());
    }
}
