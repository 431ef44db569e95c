//! Last-traded prices: Yahoo Finance first, Naver Finance scrape as a backup.

use async_trait::async_trait;
use reqwest::header;
use scraper::{Html, Selector};
use serde::Deserialize;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::{HeraldError, Result, TARGET_WEB_REQUEST};

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const NAVER_ITEM_URL: &str = "https://finance.naver.com/item/main.naver";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Naver shows the current price in one of these, depending on page layout.
const NAVER_PRICE_SELECTORS: [&str; 2] = [
    "p.no_today .blind",
    "#chart_area div.rate_info div.today span.blind",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub name: String,
    pub yahoo_ticker: String,
    pub naver_code: Option<String>,
}

#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn price(&self, instrument: &Instrument) -> Result<f64>;
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
}

/// Reads `regularMarketPrice` from a Yahoo chart response. Non-positive prices count as missing.
pub fn parse_yahoo_chart(body: &str) -> Result<Option<f64>> {
    let response: ChartResponse = serde_json::from_str(body)?;
    Ok(response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .and_then(|result| result.meta.regular_market_price)
        .filter(|price| *price > 0.0))
}

/// Reads the current price from a Naver Finance item page.
pub fn parse_naver_price(html: &str) -> Option<f64> {
    let document = Html::parse_document(html);
    NAVER_PRICE_SELECTORS.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        let element = document.select(&selector).next()?;
        let text: String = element.text().collect();
        text.trim().replace(',', "").parse::<f64>().ok()
    })
}

pub struct MarketPriceFeed {
    http: reqwest::Client,
}

impl MarketPriceFeed {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| HeraldError::Fetch(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http })
    }

    async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        let response = self
            .http
            .get(url)
            .query(query)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(HeraldError::Fetch(format!("{} returned {}", url, response.status())));
        }
        Ok(response.text().await?)
    }

    async fn yahoo_price(&self, ticker: &str) -> Result<Option<f64>> {
        let url = format!("{}/{}", YAHOO_CHART_URL, ticker);
        debug!(target: TARGET_WEB_REQUEST, "Fetching Yahoo chart for {}", ticker);
        let body = self
            .get_text(&url, &[("interval", "1m"), ("range", "1d")])
            .await?;
        parse_yahoo_chart(&body)
    }

    async fn naver_price(&self, code: &str) -> Result<Option<f64>> {
        debug!(target: TARGET_WEB_REQUEST, "Scraping Naver Finance for {}", code);
        let body = self.get_text(NAVER_ITEM_URL, &[("code", code)]).await?;
        Ok(parse_naver_price(&body))
    }
}

#[async_trait]
impl PriceFeed for MarketPriceFeed {
    async fn price(&self, instrument: &Instrument) -> Result<f64> {
        match self.yahoo_price(&instrument.yahoo_ticker).await {
            Ok(Some(price)) => {
                info!(target: TARGET_WEB_REQUEST, "{} price from Yahoo Finance: {}", instrument.name, price);
                return Ok(price);
            }
            Ok(None) => warn!(target: TARGET_WEB_REQUEST, "Yahoo Finance had no price for {}", instrument.yahoo_ticker),
            Err(e) => warn!(target: TARGET_WEB_REQUEST, "Yahoo Finance lookup failed for {}: {}", instrument.yahoo_ticker, e),
        }

        let code = instrument.naver_code.as_deref().ok_or_else(|| {
            HeraldError::Fetch(format!("no price available for {}", instrument.name))
        })?;

        match self.naver_price(code).await {
            Ok(Some(price)) if price > 0.0 => {
                info!(target: TARGET_WEB_REQUEST, "{} price from Naver Finance: {}", instrument.name, price);
                Ok(price)
            }
            Ok(_) => Err(HeraldError::Fetch(format!("no price available for {}", instrument.name))),
            Err(e) => Err(HeraldError::Fetch(format!(
                "Naver Finance scrape failed for {}: {}",
                instrument.name, e
            ))),
        }
    }
}
