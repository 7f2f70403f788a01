use serde::{Deserialize, Serialize};

// Upstream response shapes. Every field is optional: a missing value is
// rendered as absent rather than failing the whole response.

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SymbolRef {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct VenueVolume {
    pub venue_name: Option<String>,
    pub volume: Option<u64>,
    /// Epoch milliseconds.
    pub last_updated: Option<i64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub symbol: Option<String>,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub issue_type: Option<String>,
    #[serde(rename = "CEO")]
    pub ceo: Option<String>,
    pub sector: Option<String>,
    pub exchange: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FinancialsReport {
    pub symbol: Option<String>,
    #[serde(default)]
    pub financials: Vec<FinancialStatement>,
}

impl FinancialsReport {
    /// Most recent reporting period; upstream lists newest first.
    pub fn latest(&self) -> Option<&FinancialStatement> {
        self.financials.first()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FinancialStatement {
    pub report_date: Option<String>,
    pub total_revenue: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_income: Option<f64>,
    pub net_income: Option<f64>,
    pub research_and_development: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub total_assets: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub latest_price: Option<f64>,
    pub latest_volume: Option<u64>,
    /// Epoch milliseconds.
    pub latest_update: Option<i64>,
    pub pe_ratio: Option<f64>,
    pub week52_high: Option<f64>,
    pub week52_low: Option<f64>,
    pub market_cap: Option<f64>,
    pub ytd_change: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct NewsResponse {
    #[serde(default)]
    pub articles: Vec<Article>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Article {
    pub title: Option<String>,
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_profile_from_json() {
        let json = r#"{"symbol":"AAPL","companyName":"Apple Inc.","CEO":"Timothy D. Cook","issueType":"cs"}"#;
        let profile: CompanyProfile = serde_json::from_str(json).unwrap();

        assert_eq!(profile.symbol.as_deref(), Some("AAPL"));
        assert_eq!(profile.company_name.as_deref(), Some("Apple Inc."));
        assert_eq!(profile.ceo.as_deref(), Some("Timothy D. Cook"));
        assert_eq!(profile.issue_type.as_deref(), Some("cs"));
        assert!(profile.industry.is_none());
    }

    #[test]
    fn test_quote_field_names() {
        let json = r#"{"latestPrice":187.5,"week52High":199.62,"week52Low":164.08,"ytdChange":0.0412,"peRatio":null}"#;
        let quote: Quote = serde_json::from_str(json).unwrap();

        assert_eq!(quote.latest_price, Some(187.5));
        assert_eq!(quote.week52_high, Some(199.62));
        assert_eq!(quote.week52_low, Some(164.08));
        assert_eq!(quote.ytd_change, Some(0.0412));
        assert!(quote.pe_ratio.is_none());
    }

    #[test]
    fn test_financials_latest_is_first_period() {
        let json = r#"{"symbol":"AAPL","financials":[
            {"reportDate":"2018-09-30","totalRevenue":62900000000},
            {"reportDate":"2018-06-30","totalRevenue":53265000000}
        ]}"#;
        let report: FinancialsReport = serde_json::from_str(json).unwrap();

        let latest = report.latest().unwrap();
        assert_eq!(latest.report_date.as_deref(), Some("2018-09-30"));
        assert_eq!(latest.total_revenue, Some(62_900_000_000.0));
    }

    #[test]
    fn test_news_without_articles_key() {
        let news: NewsResponse = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert!(news.articles.is_empty());
    }
}
