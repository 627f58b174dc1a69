use std::sync::Arc;
use std::time::Instant;

use super::fetch::{html_to_text, PageFetcher};
use super::image::{encode_image, load_image};
use super::prompt::{interpret_reading, PAGE_INSTRUCTION, VISION_INSTRUCTION};
use super::ExtractionError;
use crate::models::{ClassifiedInput, ExtractionResult, ImageSource};
use crate::pipeline::inference::{sanitize_for_prompt, InferenceClient, InferenceRequest};

/// Page text beyond this is not sent for ingredient extraction.
const MAX_PAGE_TEXT_CHARS: usize = 20_000;

/// Turns any classified input into flat ingredient text.
///
/// The only stage whose failure ends the request.
pub struct Extractor {
    client: Arc<dyn InferenceClient>,
    fetcher: Arc<dyn PageFetcher>,
    vision_model: String,
    judgment_model: String,
}

impl Extractor {
    pub fn new(
        client: Arc<dyn InferenceClient>,
        fetcher: Arc<dyn PageFetcher>,
        vision_model: &str,
        judgment_model: &str,
    ) -> Self {
        Self {
            client,
            fetcher,
            vision_model: vision_model.to_string(),
            judgment_model: judgment_model.to_string(),
        }
    }

    /// Extract ingredient text. Never returns `Text` with blank content.
    pub fn extract(&self, input: &ClassifiedInput) -> ExtractionResult {
        let _span = tracing::info_span!("extract", kind = %input.kind()).entered();
        let start = Instant::now();

        let outcome = match input {
            ClassifiedInput::FreeText(text) => {
                if text.trim().is_empty() {
                    Err(ExtractionError::EmptyInput)
                } else {
                    Ok(text.clone())
                }
            }
            ClassifiedInput::ImagePayload(source) => self.read_image(source),
            ClassifiedInput::WebLink(uri) => self.read_page(uri),
        };

        match outcome {
            Ok(text) => {
                tracing::info!(
                    elapsed_ms = %start.elapsed().as_millis(),
                    text_len = text.len(),
                    "Ingredient text extracted"
                );
                ExtractionResult::from_text(text, "no ingredient text was found")
            }
            Err(e) => {
                tracing::warn!(
                    elapsed_ms = %start.elapsed().as_millis(),
                    error = %e,
                    "Extraction failed"
                );
                ExtractionResult::Failed(failure_reason(&e))
            }
        }
    }

    fn read_image(&self, source: &ImageSource) -> Result<String, ExtractionError> {
        let bytes = load_image(source)?;
        self.read_image_bytes(&bytes)
    }

    fn read_image_bytes(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let request = InferenceRequest::new(
            &self.vision_model,
            VISION_INSTRUCTION,
            "Extract the ingredient list from this label photo.",
        )
        .deterministic()
        .with_image(encode_image(bytes));

        let reply = self.client.invoke(&request)?;
        interpret_reading(&reply)
    }

    fn read_page(&self, uri: &str) -> Result<String, ExtractionError> {
        let page = self.fetcher.fetch(uri)?;

        if page.is_image() {
            tracing::debug!("Link points at an image, reading it as a label photo");
            return self.read_image(&ImageSource::Bytes(page.body));
        }

        let raw = String::from_utf8_lossy(&page.body);
        let visible = if page.is_html() {
            html_to_text(&raw)
        } else {
            raw.into_owned()
        };
        let visible = sanitize_for_prompt(&visible, MAX_PAGE_TEXT_CHARS);
        if visible.is_empty() {
            return Err(ExtractionError::Unreadable("the page has no readable text".into()));
        }

        let request = InferenceRequest::new(
            &self.judgment_model,
            PAGE_INSTRUCTION,
            format!("PAGE TEXT:\n{visible}"),
        )
        .deterministic();

        let reply = self.client.invoke(&request)?;
        interpret_reading(&reply)
    }
}

/// Short, user-facing reason for a failed extraction.
fn failure_reason(err: &ExtractionError) -> String {
    match err {
        ExtractionError::EmptyInput => "no ingredient text was provided".to_string(),
        ExtractionError::Unreadable(reason) => reason.clone(),
        ExtractionError::ImageTooLarge(_) => "the photo is larger than 20 MB".to_string(),
        ExtractionError::UnsupportedImage => {
            "the file is not a JPEG, PNG, WEBP or HEIC photo".to_string()
        }
        ExtractionError::Io(_) => "the photo could not be opened".to_string(),
        ExtractionError::Fetch(e) => format!("the product page could not be used ({e})"),
        ExtractionError::Inference(_) => "the label reading service is unavailable".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::fetch::{FetchError, FetchedPage};
    use crate::pipeline::inference::{InferenceError, MockInferenceClient, MockReply};

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

    struct StaticFetcher(Result<FetchedPage, FetchError>);

    impl PageFetcher for StaticFetcher {
        fn fetch(&self, _uri: &str) -> Result<FetchedPage, FetchError> {
            self.0.clone()
        }
    }

    fn no_fetch() -> Arc<dyn PageFetcher> {
        Arc::new(StaticFetcher(Err(FetchError::Unreachable("offline".into()))))
    }

    fn extractor(client: MockInferenceClient, fetcher: Arc<dyn PageFetcher>) -> Extractor {
        Extractor::new(Arc::new(client), fetcher, "vision", "judge")
    }

    #[test]
    fn free_text_is_identity() {
        let ex = extractor(MockInferenceClient::new(), no_fetch());
        let out = ex.extract(&ClassifiedInput::FreeText("Sugar, Maida, Salt".into()));
        assert_eq!(out, ExtractionResult::Text("Sugar, Maida, Salt".into()));
    }

    #[test]
    fn blank_free_text_fails() {
        let ex = extractor(MockInferenceClient::new(), no_fetch());
        assert!(ex.extract(&ClassifiedInput::FreeText("  ".into())).is_failed());
    }

    #[test]
    fn image_is_read_by_vision_capability() {
        let client = Arc::new(
            MockInferenceClient::new().on("Food Label OCR", "Rice flour, salt"),
        );
        let ex = Extractor::new(client.clone(), no_fetch(), "vision", "judge");
        let out = ex.extract(&ClassifiedInput::ImagePayload(ImageSource::Bytes(JPEG.to_vec())));
        assert_eq!(out, ExtractionResult::Text("Rice flour, salt".into()));

        let calls = client.recorded();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "vision");
        assert_eq!(calls[0].images.len(), 1);
    }

    #[test]
    fn blurry_image_fails_with_reason() {
        let client =
            MockInferenceClient::new().on("Food Label OCR", "ERROR: Image too blurry");
        let ex = extractor(client, no_fetch());
        let out = ex.extract(&ClassifiedInput::ImagePayload(ImageSource::Bytes(JPEG.to_vec())));
        assert_eq!(out, ExtractionResult::Failed("Image too blurry".into()));
    }

    #[test]
    fn vision_outage_fails_without_leaking_details() {
        let client = MockInferenceClient::new().on_reply(
            "Food Label OCR",
            MockReply::Fail(InferenceError::CapabilityUnavailable("conn refused".into())),
        );
        let ex = extractor(client, no_fetch());
        let out = ex.extract(&ClassifiedInput::ImagePayload(ImageSource::Bytes(JPEG.to_vec())));
        assert_eq!(
            out,
            ExtractionResult::Failed("the label reading service is unavailable".into())
        );
    }

    #[test]
    fn non_image_bytes_fail_before_inference() {
        let client = Arc::new(MockInferenceClient::new());
        let ex = Extractor::new(client.clone(), no_fetch(), "vision", "judge");
        let out = ex.extract(&ClassifiedInput::ImagePayload(ImageSource::Bytes(b"hello".to_vec())));
        assert!(out.is_failed());
        assert_eq!(client.total_calls(), 0);
    }

    #[test]
    fn web_page_text_is_extracted() {
        let page = FetchedPage {
            content_type: "text/html".into(),
            body: b"<html><body><p>Ingredients: Oats, Jaggery</p></body></html>".to_vec(),
        };
        let client = Arc::new(
            MockInferenceClient::new().on("Product Page Ingredient Extractor", "Oats, Jaggery"),
        );
        let ex = Extractor::new(
            client.clone(),
            Arc::new(StaticFetcher(Ok(page))),
            "vision",
            "judge",
        );
        let out = ex.extract(&ClassifiedInput::WebLink("https://shop.test/oats".into()));
        assert_eq!(out, ExtractionResult::Text("Oats, Jaggery".into()));

        let calls = client.recorded();
        assert!(calls[0].payload.contains("Ingredients: Oats, Jaggery"));
        assert!(!calls[0].payload.contains("<p>"));
    }

    #[test]
    fn image_link_goes_through_vision() {
        let page = FetchedPage {
            content_type: "image/jpeg".into(),
            body: JPEG.to_vec(),
        };
        let client = Arc::new(MockInferenceClient::new().on("Food Label OCR", "Corn, salt"));
        let ex = Extractor::new(
            client.clone(),
            Arc::new(StaticFetcher(Ok(page))),
            "vision",
            "judge",
        );
        let out = ex.extract(&ClassifiedInput::WebLink("https://cdn.test/label".into()));
        assert_eq!(out, ExtractionResult::Text("Corn, salt".into()));
        assert_eq!(client.calls_matching("Food Label OCR"), 1);
    }

    #[test]
    fn unreachable_link_fails() {
        let ex = extractor(MockInferenceClient::new(), no_fetch());
        let out = ex.extract(&ClassifiedInput::WebLink("https://shop.test/x".into()));
        match out {
            ExtractionResult::Failed(reason) => assert!(reason.contains("product page")),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
