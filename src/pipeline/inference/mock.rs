use std::sync::Mutex;
use std::time::Duration;

use super::types::{InferenceClient, InferenceRequest};
use super::InferenceError;

/// Scripted reply for `MockInferenceClient`.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Fail(InferenceError),
    /// Sleep, then answer. Used to exercise timeouts.
    Slow(Duration, String),
}

/// Mock inference client for testing. Answers by instruction marker and
/// records every request so tests can count calls per stage.
pub struct MockInferenceClient {
    rules: Vec<(String, MockReply)>,
    fallback: MockReply,
    calls: Mutex<Vec<InferenceRequest>>,
}

impl MockInferenceClient {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: MockReply::Fail(InferenceError::CapabilityUnavailable(
                "no scripted reply".into(),
            )),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `text` whenever the instruction contains `marker`.
    /// Earlier rules win.
    pub fn on(self, marker: &str, text: &str) -> Self {
        self.on_reply(marker, MockReply::Text(text.to_string()))
    }

    pub fn on_reply(mut self, marker: &str, reply: MockReply) -> Self {
        self.rules.push((marker.to_string(), reply));
        self
    }

    pub fn otherwise(mut self, reply: MockReply) -> Self {
        self.fallback = reply;
        self
    }

    /// Number of recorded calls whose instruction contains `marker`.
    pub fn calls_matching(&self, marker: &str) -> usize {
        self.calls
            .lock()
            .map(|calls| {
                calls
                    .iter()
                    .filter(|c| c.instruction.contains(marker))
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    /// Requests recorded so far, in call order.
    pub fn recorded(&self) -> Vec<InferenceRequest> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl Default for MockInferenceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceClient for MockInferenceClient {
    fn invoke(&self, request: &InferenceRequest) -> Result<String, InferenceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }

        let reply = self
            .rules
            .iter()
            .find(|(marker, _)| request.instruction.contains(marker.as_str()))
            .map(|(_, reply)| reply)
            .unwrap_or(&self.fallback);

        match reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Fail(err) => Err(err.clone()),
            MockReply::Slow(delay, text) => {
                std::thread::sleep(*delay);
                Ok(text.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_rule_answers() {
        let client = MockInferenceClient::new()
            .on("ROLE: A", "alpha")
            .on("ROLE", "generic");
        let req = InferenceRequest::new("m", "ROLE: A specialist", "x");
        assert_eq!(client.invoke(&req).unwrap(), "alpha");
    }

    #[test]
    fn unmatched_instruction_uses_fallback() {
        let client = MockInferenceClient::new();
        let req = InferenceRequest::new("m", "anything", "x");
        assert!(matches!(
            client.invoke(&req),
            Err(InferenceError::CapabilityUnavailable(_))
        ));
    }

    #[test]
    fn calls_are_counted_per_marker() {
        let client = MockInferenceClient::new().on("B", "b");
        client.invoke(&InferenceRequest::new("m", "B one", "")).unwrap();
        client.invoke(&InferenceRequest::new("m", "B two", "")).unwrap();
        let _ = client.invoke(&InferenceRequest::new("m", "C", ""));
        assert_eq!(client.calls_matching("B"), 2);
        assert_eq!(client.total_calls(), 3);
    }
}
