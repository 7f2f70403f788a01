//! In-memory stand-ins for the upstream APIs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::data::client::{NewsApi, StockApi};
use crate::data::models::{CompanyProfile, FinancialsReport, NewsResponse, Quote, SymbolRef, VenueVolume};
use crate::error::ApiError;

fn missing(what: &str, ticker: &str) -> ApiError {
    ApiError::Decode(format!("no {} for {}", what, ticker))
}

#[derive(Default)]
pub struct FakeStockApi {
    symbols: Vec<SymbolRef>,
    companies: HashMap<String, CompanyProfile>,
    financials: HashMap<String, FinancialsReport>,
    quotes: HashMap<String, Quote>,
    market: Option<Vec<VenueVolume>>,
    market_latency: Duration,
    calls: Mutex<Vec<String>>,
    market_in_flight: AtomicUsize,
    /// (start, completion) of every market request.
    market_requests: Mutex<Vec<(Instant, Instant)>>,
}

impl FakeStockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbols(mut self, symbols: &[&str]) -> Self {
        self.symbols = symbols
            .iter()
            .map(|s| SymbolRef { symbol: s.to_string(), name: None })
            .collect();
        self
    }

    pub fn with_company(mut self, ticker: &str, profile: CompanyProfile) -> Self {
        self.companies.insert(ticker.to_string(), profile);
        self
    }

    pub fn with_financials(mut self, ticker: &str, report: FinancialsReport) -> Self {
        self.financials.insert(ticker.to_string(), report);
        self
    }

    pub fn with_quote(mut self, ticker: &str, quote: Quote) -> Self {
        self.quotes.insert(ticker.to_string(), quote);
        self
    }

    pub fn with_market(mut self, venues: Vec<VenueVolume>, latency: Duration) -> Self {
        self.market = Some(venues);
        self.market_latency = latency;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, resource: &str) -> Vec<String> {
        let prefix = format!("{}:", resource);
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix(&prefix).map(|t| t.to_string()))
            .collect()
    }

    pub fn market_requests(&self) -> Vec<(Instant, Instant)> {
        self.market_requests.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl StockApi for FakeStockApi {
    async fn symbols(&self) -> Result<Vec<SymbolRef>, ApiError> {
        self.record("symbols:".to_string());
        Ok(self.symbols.clone())
    }

    async fn market(&self) -> Result<Vec<VenueVolume>, ApiError> {
        let start = Instant::now();
        let concurrent = self.market_in_flight.fetch_add(1, Ordering::SeqCst);
        assert_eq!(concurrent, 0, "market requests overlapped");

        tokio::time::sleep(self.market_latency).await;

        self.market_in_flight.fetch_sub(1, Ordering::SeqCst);
        self.market_requests.lock().push((start, Instant::now()));
        self.market
            .clone()
            .ok_or_else(|| ApiError::Decode("market unavailable".to_string()))
    }

    async fn company(&self, ticker: &str) -> Result<CompanyProfile, ApiError> {
        self.record(format!("company:{}", ticker));
        self.companies.get(ticker).cloned().ok_or_else(|| missing("company", ticker))
    }

    async fn financials(&self, ticker: &str) -> Result<FinancialsReport, ApiError> {
        self.record(format!("financials:{}", ticker));
        self.financials.get(ticker).cloned().ok_or_else(|| missing("financials", ticker))
    }

    async fn quote(&self, ticker: &str) -> Result<Quote, ApiError> {
        self.record(format!("quote:{}", ticker));
        self.quotes.get(ticker).cloned().ok_or_else(|| missing("quote", ticker))
    }
}

pub struct FakeNewsApi {
    response: NewsResponse,
    queries: Mutex<Vec<String>>,
}

impl FakeNewsApi {
    pub fn new(response: NewsResponse) -> Self {
        Self {
            response,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl NewsApi for FakeNewsApi {
    async fn everything(&self, query: &str) -> Result<NewsResponse, ApiError> {
        self.queries.lock().push(query.to_string());
        Ok(self.response.clone())
    }
}
