use std::sync::Arc;
use log::{info, warn};
use tokio::task::JoinHandle;

use crate::data::client::{NewsApi, StockApi};
use crate::data::format::{compact_currency, currency, local_date, now_local, percent};
use crate::data::models::{Article, CompanyProfile, FinancialStatement, Quote};
use crate::panel::{panel_key, Field, FieldValue, PanelBoard, NEWS_SLOTS};

pub const NO_ARTICLES: &str = "No articles found amongst the top sources";

/// Company names with more tokens than this are searched by symbol instead.
const MAX_QUERY_TOKENS: usize = 3;

/// The independent lookups spawned by one fetch. Dropping it detaches them.
pub struct FetchHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl FetchHandle {
    /// Waits for every lookup to finish, successfully or not.
    pub async fn join(self) {
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

/// Term submitted to the news search for a company.
pub fn query_term(company_name: Option<&str>, symbol: &str) -> String {
    let tokens: Vec<&str> = company_name.unwrap_or_default().split_whitespace().collect();
    match tokens.first() {
        Some(first) if tokens.len() <= MAX_QUERY_TOKENS => first.to_string(),
        _ => symbol.to_string(),
    }
}

pub fn profile_fields(profile: &CompanyProfile) -> Vec<(Field, FieldValue)> {
    vec![
        (Field::Symbol, profile.symbol.clone()),
        (Field::CompanyName, profile.company_name.clone()),
        (Field::Industry, profile.industry.clone()),
        (Field::Website, profile.website.clone()),
        (Field::IssueType, profile.issue_type.clone()),
        (Field::Ceo, profile.ceo.clone()),
        (Field::Sector, profile.sector.clone()),
        (Field::Exchange, profile.exchange.clone()),
    ]
}

pub fn financial_fields(statement: &FinancialStatement) -> Vec<(Field, FieldValue)> {
    vec![
        (Field::TotalRevenue, statement.total_revenue.map(compact_currency)),
        (Field::GrossProfit, statement.gross_profit.map(compact_currency)),
        (Field::OperatingIncome, statement.operating_income.map(compact_currency)),
        (Field::NetIncome, statement.net_income.map(compact_currency)),
        (Field::ResearchAndDevelopment, statement.research_and_development.map(compact_currency)),
        (Field::TotalLiabilities, statement.total_liabilities.map(compact_currency)),
        (Field::TotalAssets, statement.total_assets.map(compact_currency)),
        (Field::ReportDate, statement.report_date.clone()),
    ]
}

pub fn quote_fields(quote: &Quote) -> Vec<(Field, FieldValue)> {
    vec![
        (Field::LatestPrice, quote.latest_price.map(currency)),
        (Field::LatestVolume, quote.latest_volume.map(|v| v.to_string())),
        (Field::LatestUpdate, quote.latest_update.and_then(local_date)),
        (Field::PeRatio, quote.pe_ratio.map(|v| v.to_string())),
        (Field::Week52High, quote.week52_high.map(currency)),
        (Field::Week52Low, quote.week52_low.map(currency)),
        (Field::MarketCap, quote.market_cap.map(compact_currency)),
        (Field::YtdChange, quote.ytd_change.map(percent)),
    ]
}

/// Up to [`NEWS_SLOTS`] title/link pairs in response order, or a single
/// placeholder title when nothing came back.
pub fn news_fields(articles: &[Article]) -> Vec<(Field, FieldValue)> {
    if articles.is_empty() {
        return vec![(Field::NewsTitle(0), Some(NO_ARTICLES.to_string()))];
    }

    articles
        .iter()
        .take(NEWS_SLOTS)
        .enumerate()
        .flat_map(|(i, article)| {
            [
                (Field::NewsTitle(i), article.title.clone()),
                (Field::NewsLink(i), article.url.clone()),
            ]
        })
        .collect()
}

/// Populates a ticker's panel from the stock and news APIs.
#[derive(Clone)]
pub struct StockDataFetcher {
    stocks: Arc<dyn StockApi>,
    news: Arc<dyn NewsApi>,
    board: Arc<PanelBoard>,
}

impl StockDataFetcher {
    pub fn new(stocks: Arc<dyn StockApi>, news: Arc<dyn NewsApi>, board: Arc<PanelBoard>) -> Self {
        Self { stocks, news, board }
    }

    /// Stamps the panel and spawns the profile (then news), financials and
    /// quote lookups. Each writes its own fields; none waits on another.
    pub fn fetch(&self, ticker: &str) -> FetchHandle {
        let key = panel_key(ticker);
        self.board.set_field(&key, Field::Heading, Some(ticker.to_string()));
        self.board.set_field(&key, Field::FetchedAt, Some(now_local()));

        info!("Fetching data for {}", ticker);
        let tasks = vec![
            tokio::spawn(self.clone().load_profile(ticker.to_string())),
            tokio::spawn(self.clone().load_financials(ticker.to_string())),
            tokio::spawn(self.clone().load_quote(ticker.to_string())),
        ];
        FetchHandle { tasks }
    }

    fn write(&self, key: &str, fields: Vec<(Field, FieldValue)>) {
        for (field, value) in fields {
            if !self.board.set_field(key, field, value) {
                // Panel was removed while the request was in flight.
                return;
            }
        }
    }

    async fn load_profile(self, ticker: String) {
        let key = panel_key(&ticker);
        let profile = match self.stocks.company(&ticker).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Company lookup failed for {}: {}", ticker, e);
                return;
            }
        };
        self.write(&key, profile_fields(&profile));

        let symbol = profile.symbol.as_deref().unwrap_or(&ticker);
        let term = query_term(profile.company_name.as_deref(), symbol);
        match self.news.everything(&term).await {
            Ok(news) => self.write(&key, news_fields(&news.articles)),
            Err(e) => warn!("News lookup for '{}' ({}) failed: {}", term, ticker, e),
        }
    }

    async fn load_financials(self, ticker: String) {
        match self.stocks.financials(&ticker).await {
            Ok(report) => match report.latest() {
                Some(statement) => self.write(&panel_key(&ticker), financial_fields(statement)),
                None => warn!("No financial statements returned for {}", ticker),
            },
            Err(e) => warn!("Financials lookup failed for {}: {}", ticker, e),
        }
    }

    async fn load_quote(self, ticker: String) {
        match self.stocks.quote(&ticker).await {
            Ok(quote) => self.write(&panel_key(&ticker), quote_fields(&quote)),
            Err(e) => warn!("Quote lookup failed for {}: {}", ticker, e),
        }
    }
}
