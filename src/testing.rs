//! In-memory stand-ins for the chat endpoint and the language model.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::delivery::ChatTransport;
use crate::llm::TextTransform;
use crate::{HeraldError, Result};

/// Records every message and fails the ones whose index is listed.
pub struct RecordingTransport {
    sent: Mutex<Vec<String>>,
    fail_on: Vec<usize>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::failing_on(Vec::new())
    }

    pub fn failing_on(fail_on: Vec<usize>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_on,
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send(&self, text: &str) -> Result<()> {
        let mut sent = self.sent.lock().unwrap();
        let index = sent.len();
        sent.push(text.to_string());
        if self.fail_on.contains(&index) {
            return Err(HeraldError::Delivery {
                status: 400,
                message: "Bad Request: can't parse entities".to_string(),
            });
        }
        Ok(())
    }
}

/// Returns a fixed reply (or error) and remembers the prompts it was given.
pub struct ScriptedTransform {
    reply: std::result::Result<String, String>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedTransform {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            reply: Err(error.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextTransform for ScriptedTransform {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string()));
        self.reply.clone().map_err(HeraldError::Transform)
    }
}
