//! Reads credentials and settings from the process environment into explicit
//! config structs. Nothing below this module looks at the environment itself.

use std::env;

pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_SMART_MODEL: &str = "anthropic/claude-3.5-sonnet";
pub const DEFAULT_FAST_MODEL: &str = "google/gemini-2.0-flash-001";

/// Retrieves an environment variable, treating an empty or blank value as unset.
pub fn get_env_var(var: &str) -> Option<String> {
    non_blank(env::var(var).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Whether we are running as a scheduled GitHub Actions job.
pub fn running_in_github_actions() -> bool {
    env::var("GITHUB_ACTIONS").map(|v| v == "true").unwrap_or(false)
}

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
}

impl TelegramConfig {
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(get_env_var)
    }

    /// Both `TG_TOKEN` and `TG_CHAT_ID` must be set, otherwise Telegram is disabled.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let token = non_blank(lookup("TG_TOKEN"))?;
        let chat_id = non_blank(lookup("TG_CHAT_ID"))?;
        Some(Self { token, chat_id })
    }
}

#[derive(Clone, Debug)]
pub struct ChatConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
}

impl ChatConfig {
    pub fn from_env(model_var: &str, default_model: &str) -> Option<Self> {
        Self::from_lookup(get_env_var, model_var, default_model)
    }

    /// Requires `CHAT_API_KEY`; the model comes from `model_var` or the default.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        model_var: &str,
        default_model: &str,
    ) -> Option<Self> {
        let api_key = non_blank(lookup("CHAT_API_KEY"))?;
        let model = non_blank(lookup(model_var)).unwrap_or_else(|| default_model.to_string());
        let api_base = non_blank(lookup("CHAT_API_BASE"))
            .unwrap_or_else(|| OPENROUTER_API_BASE.to_string());
        Some(Self {
            api_key,
            api_base,
            model,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct GithubConfig {
    pub token: Option<String>,
}

impl GithubConfig {
    pub fn from_env() -> Self {
        Self {
            token: get_env_var("GITHUB_TOKEN"),
        }
    }
}
