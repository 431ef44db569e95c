pub mod arbitrage;
pub mod archive;
pub mod delivery;
pub mod environment;
pub mod error;
pub mod headlines;
pub mod issues;
pub mod llm;
pub mod logging;
pub mod prompts;
pub mod telegram;

#[cfg(test)]
mod testing;

pub use error::{HeraldError, Result};

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_LLM_REQUEST: &str = "llm_request";
pub const TARGET_TELEGRAM: &str = "telegram";

/// Telegram rejects messages over 4096 characters; keep headroom for Markdown.
pub const MAX_TELEGRAM_LEN: usize = 4000;
