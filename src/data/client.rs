use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;

use crate::data::models::{CompanyProfile, FinancialsReport, NewsResponse, Quote, SymbolRef, VenueVolume};
use crate::error::ApiError;

/// Market data lookups: symbol directory, exchange volumes and per-ticker data.
#[async_trait]
pub trait StockApi: Send + Sync {
    async fn symbols(&self) -> Result<Vec<SymbolRef>, ApiError>;

    /// Aggregate volume snapshot, one entry per trading venue.
    async fn market(&self) -> Result<Vec<VenueVolume>, ApiError>;

    async fn company(&self, ticker: &str) -> Result<CompanyProfile, ApiError>;

    async fn financials(&self, ticker: &str) -> Result<FinancialsReport, ApiError>;

    async fn quote(&self, ticker: &str) -> Result<Quote, ApiError>;
}

/// Full-text article search, most popular first.
#[async_trait]
pub trait NewsApi: Send + Sync {
    async fn everything(&self, query: &str) -> Result<NewsResponse, ApiError>;
}

async fn get_json<T: DeserializeOwned>(http: &reqwest::Client, url: String) -> Result<T, ApiError> {
    debug!("GET {}", url);
    let response = http.get(&url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status { status: status.as_u16(), url });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(format!("{}: {}", url, e)))
}

pub struct IexClient {
    http: reqwest::Client,
    base_url: String,
}

impl IexClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn stock_url(&self, ticker: &str, resource: &str) -> String {
        format!("{}/stock/{}/{}", self.base_url, urlencoding::encode(ticker), resource)
    }
}

#[async_trait]
impl StockApi for IexClient {
    async fn symbols(&self) -> Result<Vec<SymbolRef>, ApiError> {
        get_json(&self.http, format!("{}/ref-data/symbols", self.base_url)).await
    }

    async fn market(&self) -> Result<Vec<VenueVolume>, ApiError> {
        get_json(
            &self.http,
            format!("{}/market?filter=venueName,volume,lastUpdated", self.base_url),
        )
        .await
    }

    async fn company(&self, ticker: &str) -> Result<CompanyProfile, ApiError> {
        get_json(&self.http, self.stock_url(ticker, "company")).await
    }

    async fn financials(&self, ticker: &str) -> Result<FinancialsReport, ApiError> {
        get_json(&self.http, self.stock_url(ticker, "financials")).await
    }

    async fn quote(&self, ticker: &str) -> Result<Quote, ApiError> {
        get_json(&self.http, self.stock_url(ticker, "quote")).await
    }
}

pub struct NewsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn everything_url(&self, query: &str) -> String {
        let mut url = format!(
            "{}/everything?q={}&sortBy=popularity",
            self.base_url,
            urlencoding::encode(query)
        );
        if let Some(key) = &self.api_key {
            url.push_str("&apiKey=");
            url.push_str(&urlencoding::encode(key));
        }
        url
    }
}

#[async_trait]
impl NewsApi for NewsClient {
    async fn everything(&self, query: &str) -> Result<NewsResponse, ApiError> {
        get_json(&self.http, self.everything_url(query)).await
    }
}
