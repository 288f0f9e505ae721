//! Oracle implementations.
//!
//! `OpenAiOracle` talks to any OpenAI-compatible `/chat/completions`
//! endpoint (OpenAI, OpenRouter, Ollama, vLLM). `ScriptedOracle` replays a
//! fixed list of answers and records what it was asked.

use crate::config::settings::OracleSettings;
use crate::domain::model::ChatMessage;
use crate::domain::ports::Oracle;
use crate::utils::error::{AssignError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

pub struct OpenAiOracle {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    client: Client,
}

impl OpenAiOracle {
    pub fn new(settings: &OracleSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "stream": false,
        });

        tracing::debug!(model = %self.model, "Sending completion request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        match status {
            200 => {}
            429 => return Err(AssignError::oracle("rate limited by provider")),
            401 | 403 => {
                return Err(AssignError::oracle(
                    "invalid API key or insufficient permissions",
                ))
            }
            _ => {
                let error_body = response.text().await.unwrap_or_default();
                tracing::warn!(status, body = %error_body, "Provider returned error");
                return Err(AssignError::oracle(format!(
                    "provider returned status {}",
                    status
                )));
            }
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| AssignError::oracle(format!("failed to parse response: {}", e)))?;

        api_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| AssignError::oracle("no choices in response"))
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    content: Option<String>,
}

/// 依序回放預先設定的回覆；回覆用完後每次呼叫都回傳錯誤
pub struct ScriptedOracle {
    responses: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedOracle {
    pub fn new(responses: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replying<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(responses.into_iter().map(|r| Ok(r.into())).collect())
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(vec![Err(message.into())])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }

        let next = self
            .responses
            .lock()
            .map_err(|_| AssignError::oracle("scripted oracle lock poisoned"))?
            .pop_front();

        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(AssignError::oracle(message)),
            None => Err(AssignError::oracle("no more scripted responses")),
        }
    }
}
