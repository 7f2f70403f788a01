use std::fmt;

/// Number of news title/link slots on a panel.
pub const NEWS_SLOTS: usize = 8;

/// Named display fields of a stock panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Heading,
    FetchedAt,

    // Profile
    Symbol,
    CompanyName,
    Industry,
    Website,
    IssueType,
    Ceo,
    Sector,
    Exchange,

    // Financials
    TotalRevenue,
    GrossProfit,
    OperatingIncome,
    NetIncome,
    ResearchAndDevelopment,
    TotalLiabilities,
    TotalAssets,
    ReportDate,

    // Quote
    LatestPrice,
    LatestVolume,
    LatestUpdate,
    PeRatio,
    Week52High,
    Week52Low,
    MarketCap,
    YtdChange,

    NewsTitle(usize),
    NewsLink(usize),
}

impl Field {
    pub fn key(&self) -> String {
        let name = match self {
            Field::Heading => "stockHeading",
            Field::FetchedAt => "time",
            Field::Symbol => "symbol",
            Field::CompanyName => "companyName",
            Field::Industry => "industry",
            Field::Website => "website",
            Field::IssueType => "issueType",
            Field::Ceo => "ceo",
            Field::Sector => "sector",
            Field::Exchange => "exchange",
            Field::TotalRevenue => "totalRevenue",
            Field::GrossProfit => "grossProfit",
            Field::OperatingIncome => "operatingIncome",
            Field::NetIncome => "netIncome",
            Field::ResearchAndDevelopment => "rd",
            Field::TotalLiabilities => "liabilities",
            Field::TotalAssets => "assets",
            Field::ReportDate => "report",
            Field::LatestPrice => "latestPrice",
            Field::LatestVolume => "latestVolume",
            Field::LatestUpdate => "latestUpdate",
            Field::PeRatio => "peRatio",
            Field::Week52High => "week52High",
            Field::Week52Low => "week52Low",
            Field::MarketCap => "marketCap",
            Field::YtdChange => "ytdChange",
            Field::NewsTitle(i) => return format!("link-{}", i),
            Field::NewsLink(i) => return format!("link-{}-href", i),
        };
        name.to_string()
    }

    pub fn is_news(&self) -> bool {
        matches!(self, Field::NewsTitle(_) | Field::NewsLink(_))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}
