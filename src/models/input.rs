use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::enums::InputKind;

/// Payload exactly as the caller handed it over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPayload {
    Text(String),
    Bytes(Vec<u8>),
}

/// One request's raw input. Lives only for the duration of `Guardian::evaluate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInput {
    pub payload: RawPayload,
    pub kind_hint: Option<InputKind>,
}

impl RawInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            payload: RawPayload::Text(text.into()),
            kind_hint: None,
        }
    }

    pub fn bytes(bytes: Vec<u8>) -> Self {
        Self {
            payload: RawPayload::Bytes(bytes),
            kind_hint: Some(InputKind::ImagePayload),
        }
    }

    pub fn with_hint(mut self, hint: InputKind) -> Self {
        self.kind_hint = Some(hint);
        self
    }
}

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// Input after classification. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedInput {
    FreeText(String),
    ImagePayload(ImageSource),
    WebLink(String),
}

impl ClassifiedInput {
    pub fn kind(&self) -> InputKind {
        match self {
            Self::FreeText(_) => InputKind::FreeText,
            Self::ImagePayload(_) => InputKind::ImagePayload,
            Self::WebLink(_) => InputKind::WebLink,
        }
    }
}

/// Outcome of the extraction stage.
///
/// `Text` never holds empty or whitespace-only content; the extractor
/// turns that into `Failed` so nothing downstream mistakes it for a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ExtractionResult {
    Text(String),
    Failed(String),
}

impl ExtractionResult {
    /// Build a result from model or user text, failing on blank content.
    pub fn from_text(text: impl Into<String>, empty_reason: &str) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            Self::Failed(empty_reason.to_string())
        } else {
            Self::Text(text)
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}
