use serde::{Deserialize, Serialize};

use super::types::{InferenceClient, InferenceRequest, SamplingMode};
use super::InferenceError;
use crate::config::GuardianConfig;

/// Ollama HTTP client for local inference.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
    deterministic_temperature: f32,
    creative_temperature: f32,
}

impl OllamaClient {
    /// Create a client pointing at a local Ollama instance.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, InferenceError> {
        validate_base_url(base_url)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| InferenceError::CapabilityUnavailable(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
            deterministic_temperature: 0.0,
            creative_temperature: 0.7,
        })
    }

    pub fn from_config(config: &GuardianConfig) -> Result<Self, InferenceError> {
        let mut client = Self::new(&config.ollama_url, config.inference_timeout_secs)?;
        client.deterministic_temperature = config.deterministic_temperature;
        client.creative_temperature = config.creative_temperature;
        Ok(client)
    }

    fn temperature(&self, mode: SamplingMode) -> f32 {
        match mode {
            SamplingMode::Deterministic => self.deterministic_temperature,
            SamplingMode::Creative => self.creative_temperature,
        }
    }

    fn build_body<'a>(&self, request: &'a InferenceRequest) -> ChatRequest<'a> {
        let mut messages = vec![ChatMessage {
            role: "system",
            content: &request.instruction,
            images: None,
        }];
        messages.push(ChatMessage {
            role: "user",
            content: &request.payload,
            images: (!request.images.is_empty()).then_some(request.images.as_slice()),
        });

        ChatRequest {
            model: &request.model,
            messages,
            stream: false,
            format: request.expect_json.then_some("json"),
            options: ChatOptions {
                temperature: self.temperature(request.mode),
            },
        }
    }
}

/// Request body for Ollama /api/chat
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<&'a [String]>,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

/// Response body from Ollama /api/chat
#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl InferenceClient for OllamaClient {
    fn invoke(&self, request: &InferenceRequest) -> Result<String, InferenceError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = self.build_body(request);

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                InferenceError::CapabilityUnavailable(format!(
                    "Ollama is not running at {}",
                    self.base_url
                ))
            } else if e.is_timeout() {
                InferenceError::CapabilityUnavailable(format!(
                    "Request timed out after {}s",
                    self.timeout_secs
                ))
            } else {
                InferenceError::CapabilityUnavailable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(InferenceError::CapabilityUnavailable(format!(
                "Ollama returned error (status {}): {body}",
                status.as_u16()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| InferenceError::MalformedOutput(e.to_string()))?;

        Ok(parsed.message.content)
    }
}

/// Validate that a base URL points to localhost only.
///
/// Ingredient photos and health profiles never leave the machine.
/// Accepts: localhost, 127.0.0.1, [::1].
pub fn validate_base_url(url: &str) -> Result<(), InferenceError> {
    let after_scheme = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .ok_or_else(|| InferenceError::CapabilityUnavailable(format!("Invalid URL: {url}")))?;

    let host = if after_scheme.starts_with('[') {
        after_scheme
            .split(']')
            .next()
            .unwrap_or("")
            .trim_start_matches('[')
    } else {
        after_scheme
            .split(':')
            .next()
            .unwrap_or("")
            .split('/')
            .next()
            .unwrap_or("")
    };

    match host {
        "localhost" | "127.0.0.1" | "::1" => Ok(()),
        _ => Err(InferenceError::CapabilityUnavailable(format!(
            "Only localhost inference endpoints are allowed, got {url}"
        ))),
    }
}
