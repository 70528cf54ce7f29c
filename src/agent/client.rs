//! Blocking client for OpenAI-compatible `/v1/chat/completions` endpoints.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};
use ureq::Agent;

use super::ChatBackend;
use crate::config::LlmConfig;
use crate::error::AgentError;

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Value,
}

pub struct ChatClient {
    http: Agent,
    url: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

impl ChatClient {
    pub fn new(config: &LlmConfig) -> Self {
        let http = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            http,
            url: format!("{}/v1/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
        }
    }

    fn request_body(&self, messages: &[Value], tools: &[Value]) -> Value {
        let mut body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": messages,
            "stream": false,
        });
        if !tools.is_empty() {
            body["tools"] = json!(tools);
        }
        body
    }
}

impl ChatBackend for ChatClient {
    fn complete(&self, messages: &[Value], tools: &[Value]) -> Result<Value, AgentError> {
        let body = self.request_body(messages, tools);
        log::debug!(
            target: "agent",
            "POST {} ({} messages, {} tools)",
            self.url,
            messages.len(),
            tools.len()
        );

        let mut request = self.http.post(&self.url);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", &format!("Bearer {key}"));
        }
        let mut response = request.send_json(&body)?;

        let status = response.status().as_u16();
        let text = response.body_mut().read_to_string()?;
        if !(200..300).contains(&status) {
            return Err(AgentError::Status { status, body: text });
        }

        parse_completion(&text)
    }
}

/// Pull the first choice's message out of a completion response body.
fn parse_completion(text: &str) -> Result<Value, AgentError> {
    let response: CompletionResponse =
        serde_json::from_str(text).map_err(|e| AgentError::MalformedResponse(e.to_string()))?;
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| AgentError::MalformedResponse("response has no choices".to_string()))
}
