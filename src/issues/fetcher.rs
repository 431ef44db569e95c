//! Fetches recent issues from the GitHub REST API.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde_json::Value;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use super::types::{DiscussionItem, RawIssue};
use crate::environment::GithubConfig;
use crate::{HeraldError, Result, TARGET_WEB_REQUEST};

const GITHUB_API_BASE: &str = "https://api.github.com";
const PER_PAGE: usize = 100;

/// Source of issues created or updated since a point in time.
#[async_trait]
pub trait IssueSource: Send + Sync {
    async fn fetch_issues(&self, since: DateTime<Utc>) -> Result<Vec<DiscussionItem>>;
}

pub struct GithubIssueFetcher {
    http: reqwest::Client,
    repo: String,
    token: Option<String>,
}

impl GithubIssueFetcher {
    /// `repo` is `owner/name`.
    pub fn new(repo: &str, config: &GithubConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| HeraldError::Fetch(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            repo: repo.to_string(),
            token: config.token.clone(),
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("herald-issue-digest"));
        if let Some(ref token) = self.token {
            let value = HeaderValue::from_str(&format!("token {}", token))
                .map_err(|e| HeraldError::Fetch(format!("Invalid GitHub token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl IssueSource for GithubIssueFetcher {
    async fn fetch_issues(&self, since: DateTime<Utc>) -> Result<Vec<DiscussionItem>> {
        let url = format!("{}/repos/{}/issues", GITHUB_API_BASE, self.repo);
        let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        let headers = self.headers()?;

        let mut all_issues = Vec::new();
        let mut page = 1usize;

        loop {
            debug!(target: TARGET_WEB_REQUEST, "Fetching {} page {} (since {})", url, page, since);
            let response = self
                .http
                .get(&url)
                .headers(headers.clone())
                .query(&[
                    ("since", since.as_str()),
                    ("state", "all"),
                    ("sort", "created"),
                ])
                .query(&[("per_page", PER_PAGE), ("page", page)])
                .send()
                .await?;

            if !response.status().is_success() {
                warn!(target: TARGET_WEB_REQUEST, "GitHub API request failed: {}", response.status());
                break;
            }

            let values: Vec<Value> = response.json().await?;
            if values.is_empty() {
                break;
            }

            let page_len = values.len();
            all_issues.extend(parse_issue_page(values));

            if page_len < PER_PAGE {
                break;
            }
            page += 1;
        }

        info!(target: TARGET_WEB_REQUEST, "Collected {} issues from {}", all_issues.len(), self.repo);
        Ok(all_issues)
    }
}

/// Converts one page of API results, dropping pull requests and malformed entries.
pub fn parse_issue_page(values: Vec<Value>) -> Vec<DiscussionItem> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawIssue>(value) {
            Ok(raw) if raw.is_pull_request() => None,
            Ok(raw) => match DiscussionItem::try_from(raw) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(target: TARGET_WEB_REQUEST, "Skipping issue: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!(target: TARGET_WEB_REQUEST, "Skipping malformed issue: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issue(number: u64) -> Value {
        json!({
            "number": number,
            "title": format!("Issue {}", number),
            "created_at": "2025-03-04T05:06:07Z",
            "state": "closed",
            "comments": 1,
            "labels": [],
            "html_url": format!("https://github.com/o/r/issues/{}", number),
            "body": null
        })
    }

    #[test]
    fn test_pull_requests_are_dropped() {
        let mut pr = issue(2);
        pr["pull_request"] = json!({"url": "https://api.github.com/repos/o/r/pulls/2"});

        let items = parse_issue_page(vec![issue(1), pr, issue(3)]);
        let numbers: Vec<u64> = items.iter().map(|i| i.number).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let mut bad_date = issue(5);
        bad_date["created_at"] = json!("yesterday");
        let items = parse_issue_page(vec![json!({"title": "no number"}), bad_date, issue(6)]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].number, 6);
    }

    #[test]
    fn test_token_header() {
        let config = GithubConfig {
            token: Some("ghp_secret".to_string()),
        };
        let fetcher = GithubIssueFetcher::new("o/r", &config, Duration::from_secs(5)).unwrap();
        let headers = fetcher.headers().unwrap();
        assert_eq!(headers[AUTHORIZATION], "token ghp_secret");
        assert_eq!(headers[ACCEPT], "application/vnd.github.v3+json");

        let anonymous = GithubIssueFetcher::new("o/r", &GithubConfig::default(), Duration::from_secs(5)).unwrap();
        assert!(anonymous.headers().unwrap().get(AUTHORIZATION).is_none());
    }
}
