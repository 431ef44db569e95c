//! Translated Hacker News headlines plus a handful of model-picked recommendations.

mod fetcher;
mod report;

pub use self::fetcher::{parse_front_page, HackerNewsFetcher, Headline, HeadlineSource};
pub use self::report::format_headline_message;

use anyhow::Result;
use tokio::time::Duration;
use tracing::{info, warn};

use crate::delivery::{notify, ChatTransport, DeliveryResult};
use crate::llm::{complete_or_else, TextTransform};
use crate::{prompts, MAX_TELEGRAM_LEN};

pub const RECOMMENDATION_FAILED: &str = "⚠️ Something went wrong while requesting translations.";

#[derive(Debug, Clone)]
pub struct RecommenderSettings {
    /// Headlines listed verbatim at the top of the message.
    pub top_count: usize,
    /// Articles the model should pick from the rest.
    pub recommend_count: usize,
    pub language: String,
    pub chunk_pause: Option<Duration>,
}

#[derive(Debug)]
pub enum RecommenderOutcome {
    FetchFailed(String),
    Sent {
        message: String,
        delivery: Vec<DeliveryResult>,
    },
}

pub async fn run_recommender(
    source: &dyn HeadlineSource,
    transform: &dyn TextTransform,
    transport: Option<&dyn ChatTransport>,
    settings: &RecommenderSettings,
) -> Result<RecommenderOutcome> {
    let headlines = match source.fetch_headlines().await {
        Ok(headlines) if !headlines.is_empty() => headlines,
        Ok(_) => {
            warn!("Front page contained no headlines");
            let message = "⚠️ Could not find any Hacker News headlines today.";
            notify(transport, message, MAX_TELEGRAM_LEN, settings.chunk_pause).await;
            return Ok(RecommenderOutcome::FetchFailed("no headlines".to_string()));
        }
        Err(e) => {
            warn!("Could not fetch headlines: {}", e);
            let message = format!("⚠️ Could not fetch Hacker News headlines: {}", e);
            notify(transport, &message, MAX_TELEGRAM_LEN, settings.chunk_pause).await;
            return Ok(RecommenderOutcome::FetchFailed(e.to_string()));
        }
    };

    let split = settings.top_count.min(headlines.len());
    let (top, rest) = headlines.split_at(split);
    let top_titles: Vec<&str> = top.iter().map(|h| h.title.as_str()).collect();
    let rest_titles: Vec<&str> = rest.iter().map(|h| h.title.as_str()).collect();

    let system = prompts::headline_system_prompt(&settings.language);
    let prompt = prompts::headline_prompt(&top_titles, &rest_titles, settings.recommend_count, &settings.language);
    let recommendations =
        complete_or_else(transform, &system, &prompt, |_| RECOMMENDATION_FAILED.to_string()).await;

    let message = format_headline_message(top, &recommendations);
    info!("Final message length: {} characters", message.chars().count());
    let delivery = notify(transport, &message, MAX_TELEGRAM_LEN, settings.chunk_pause).await;

    Ok(RecommenderOutcome::Sent { message, delivery })
}
