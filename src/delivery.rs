//! Chunked delivery of long messages to a length-capped chat endpoint.

use async_trait::async_trait;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info};

use crate::{Result, TARGET_TELEGRAM};

/// Anything that can post a single message to a chat.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(String),
}

/// Result of sending one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    pub index: usize,
    /// Length of the chunk in characters.
    pub length: usize,
    pub outcome: DeliveryOutcome,
}

impl DeliveryResult {
    pub fn is_success(&self) -> bool {
        self.outcome == DeliveryOutcome::Delivered
    }
}

pub fn all_delivered(results: &[DeliveryResult]) -> bool {
    !results.is_empty() && results.iter().all(DeliveryResult::is_success)
}

/// Splits `text` into chunks of at most `budget` characters without breaking lines.
///
/// A text that already fits is returned as-is in a single chunk. Otherwise every
/// line is re-emitted with a trailing `\n`, so concatenating the chunks and
/// dropping the final `\n` gives back the original text. A line that cannot fit
/// on its own becomes a single oversized chunk.
pub fn split_message(text: &str, budget: usize) -> Vec<String> {
    if text.chars().count() <= budget {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut chunk = String::new();
    let mut chunk_len = 0;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        // +1 for the newline that will be re-added
        if chunk_len + line_len + 1 > budget && !chunk.is_empty() {
            chunks.push(std::mem::take(&mut chunk));
            chunk_len = 0;
        }
        chunk.push_str(line);
        chunk.push('\n');
        chunk_len += line_len + 1;
    }

    if !chunk.is_empty() {
        chunks.push(chunk);
    }

    chunks
}

/// Sends `text` through `transport`, one chunk at a time.
///
/// Each chunk gets exactly one attempt. A failed chunk is logged and recorded
/// but never stops the chunks after it. `pause` is slept between chunks.
pub async fn deliver<T>(
    transport: &T,
    text: &str,
    budget: usize,
    pause: Option<Duration>,
) -> Vec<DeliveryResult>
where
    T: ChatTransport + ?Sized,
{
    let chunks = split_message(text, budget);
    if chunks.len() > 1 {
        info!(
            target: TARGET_TELEGRAM,
            "Message is long, sending in {} chunks (total length = {})",
            chunks.len(),
            text.chars().count()
        );
    }

    let mut results = Vec::with_capacity(chunks.len());
    for (index, chunk) in chunks.iter().enumerate() {
        if index > 0 {
            if let Some(pause) = pause {
                debug!(target: TARGET_TELEGRAM, "Pausing {:?} before chunk {}", pause, index);
                sleep(pause).await;
            }
        }

        let length = chunk.chars().count();
        let outcome = match transport.send(chunk).await {
            Ok(()) => {
                info!(target: TARGET_TELEGRAM, " ** chunk {} sent (length = {})", index, length);
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                error!(target: TARGET_TELEGRAM, " !! chunk {} failed (length = {}): {}", index, length, e);
                DeliveryOutcome::Failed(e.to_string())
            }
        };
        results.push(DeliveryResult {
            index,
            length,
            outcome,
        });
    }

    results
}

/// Delivers `text` when a transport is configured; otherwise only logs that it was skipped.
pub async fn notify(
    transport: Option<&dyn ChatTransport>,
    text: &str,
    budget: usize,
    pause: Option<Duration>,
) -> Vec<DeliveryResult> {
    match transport {
        Some(transport) => deliver(transport, text, budget, pause).await,
        None => {
            info!(target: TARGET_TELEGRAM, "No chat endpoint configured, not sending notification");
            Vec::new()
        }
    }
}
