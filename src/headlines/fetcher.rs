//! Scrapes headlines from the Hacker News front page.

use async_trait::async_trait;
use reqwest::header;
use scraper::{Html, Selector};
use tokio::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::{HeraldError, Result, TARGET_WEB_REQUEST};

const HACKER_NEWS_URL: &str = "https://news.ycombinator.com/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub title: String,
    pub link: Option<String>,
}

#[async_trait]
pub trait HeadlineSource: Send + Sync {
    async fn fetch_headlines(&self) -> Result<Vec<Headline>>;
}

pub struct HackerNewsFetcher {
    http: reqwest::Client,
    url: String,
}

impl HackerNewsFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| HeraldError::Fetch(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            url: HACKER_NEWS_URL.to_string(),
        })
    }
}

#[async_trait]
impl HeadlineSource for HackerNewsFetcher {
    async fn fetch_headlines(&self) -> Result<Vec<Headline>> {
        debug!(target: TARGET_WEB_REQUEST, "Fetching {}", self.url);
        let response = self
            .http
            .get(&self.url)
            .header(header::USER_AGENT, "Mozilla/5.0 (compatible; herald)")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(HeraldError::Fetch(format!(
                "{} returned {}",
                self.url,
                response.status()
            )));
        }

        let body = response.text().await?;
        let headlines = parse_front_page(&body)?;
        info!(target: TARGET_WEB_REQUEST, "Parsed {} headlines", headlines.len());
        Ok(headlines)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| HeraldError::Fetch(format!("Invalid selector {:?}: {}", css, e)))
}

/// Extracts `(title, link)` pairs in page order from front page HTML.
/// Relative links such as `item?id=1` are resolved against the front page URL.
pub fn parse_front_page(html: &str) -> Result<Vec<Headline>> {
    let base = Url::parse(HACKER_NEWS_URL)
        .map_err(|e| HeraldError::Fetch(format!("Invalid base URL: {}", e)))?;
    let document = Html::parse_document(html);
    let row_selector = selector(".athing")?;
    let title_selector = selector(".titleline > a")?;

    let headlines = document
        .select(&row_selector)
        .filter_map(|row| row.select(&title_selector).next())
        .map(|anchor| Headline {
            title: anchor.text().collect::<String>().trim().to_string(),
            link: anchor
                .value()
                .attr("href")
                .and_then(|href| base.join(href).ok())
                .map(String::from),
        })
        .filter(|headline| !headline.title.is_empty())
        .collect();

    Ok(headlines)
}
