//! HTTP client for the recommendation backend
//!
//! One endpoint, one request shape: `{choice, input}` where `choice` selects
//! the general-chat channel ("1") or the structured shopping channel ("2")
//! and `input` is the free-text instruction. The client issues exactly one
//! call per invocation and does not retry; callers decide how to surface a
//! failure.

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Backend channel selector sent as the `choice` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    General,
    Shopping,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::General => "1",
            Channel::Shopping => "2",
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    choice: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    content: Value,
}

#[derive(Debug, Clone)]
pub struct RecommendationClient {
    client: Client,
    endpoint: String,
}

impl RecommendationClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    /// POST one instruction on the given channel and return the raw `content`
    /// payload. Non-2xx statuses and undecodable bodies are errors; the shape
    /// of `content` is the caller's concern.
    pub async fn request(&self, channel: Channel, instruction: &str) -> Result<Value> {
        let request = ChatRequest {
            choice: channel.as_str(),
            input: instruction,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "recommendation request failed with status: {}",
                response.status()
            ));
        }

        let chat_response: ChatResponse = response.json().await?;
        Ok(chat_response.content)
    }

    /// General-chat turn: free text in, free text out
    pub async fn chat(&self, input: &str) -> Result<String> {
        let content = self.request(Channel::General, input).await?;
        content
            .as_str()
            .map(|text| text.to_string())
            .ok_or_else(|| anyhow!("chat response content was not text"))
    }
}
