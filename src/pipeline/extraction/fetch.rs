//! Fetch capability for web-link inputs.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Largest page body accepted from a product link.
const MAX_PAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Page unreachable: {0}")]
    Unreachable(String),

    #[error("Unsupported content: {0}")]
    Unsupported(String),
}

/// Raw body of a fetched page plus its declared media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Lower-cased media type without parameters, e.g. "text/html".
    pub content_type: String,
    pub body: Vec<u8>,
}

impl FetchedPage {
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    pub fn is_html(&self) -> bool {
        self.content_type == "text/html" || self.content_type == "application/xhtml+xml"
    }
}

/// Fetch capability abstraction (allows mocking).
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, uri: &str) -> Result<FetchedPage, FetchError>;
}

/// Blocking HTTP fetcher for product pages.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent(concat!("satya/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, uri: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(uri)
            .send()
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Unreachable(format!(
                "server answered with status {}",
                status.as_u16()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(media_type)
            .unwrap_or_else(|| "text/html".to_string());

        if !is_supported_media_type(&content_type) {
            return Err(FetchError::Unsupported(content_type));
        }

        if let Some(len) = response.content_length() {
            if len as usize > MAX_PAGE_BYTES {
                return Err(FetchError::Unsupported(format!("page too large ({len} bytes)")));
            }
        }

        let body = response
            .bytes()
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;
        if body.len() > MAX_PAGE_BYTES {
            return Err(FetchError::Unsupported(format!(
                "page too large ({} bytes)",
                body.len()
            )));
        }

        tracing::debug!(content_type = %content_type, bytes = body.len(), "Product page fetched");

        Ok(FetchedPage {
            content_type,
            body: body.to_vec(),
        })
    }
}

/// Strip parameters from a Content-Type header value.
fn media_type(header: &str) -> String {
    header
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

fn is_supported_media_type(media: &str) -> bool {
    media.starts_with("text/") || media == "application/xhtml+xml" || media.starts_with("image/")
}

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>").expect("valid regex"));
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b.*?</style\s*>").expect("valid regex"));
static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(p|div|br|li|tr|h[1-6]|section|article|table)\b[^>]*>")
        .expect("valid regex")
});
static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static SPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{00A0}]+").expect("valid regex"));

/// Reduce an HTML page to its visible text, one block per line.
pub fn html_to_text(html: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, " ");
    let text = STYLE_BLOCK.replace_all(&text, " ");
    let text = HTML_COMMENT.replace_all(&text, " ");
    let text = BLOCK_TAG.replace_all(&text, "\n");
    let text = ANY_TAG.replace_all(&text, " ");
    let text = decode_entities(&text);
    let text = SPACE_RUN.replace_all(&text, " ");

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_is_reduced_to_visible_lines() {
        let html = r#"<html><head><style>.x{color:red}</style>
            <script>var ingredients = "fake";</script></head>
            <body><h1>Choco Cookies</h1><!-- promo -->
            <div class="ing"><b>Ingredients:</b> Maida, Sugar &amp; Palm Oil</div>
            </body></html>"#;
        let text = html_to_text(html);
        assert!(text.contains("Choco Cookies"));
        assert!(text.contains("Ingredients: Maida, Sugar & Palm Oil"));
        assert!(!text.contains("fake"));
        assert!(!text.contains("color:red"));
        assert!(!text.contains("promo"));
    }

    #[test]
    fn media_type_drops_parameters() {
        assert_eq!(media_type("Text/HTML; charset=utf-8"), "text/html");
    }

    #[test]
    fn supported_media_types() {
        assert!(is_supported_media_type("text/html"));
        assert!(is_supported_media_type("image/jpeg"));
        assert!(!is_supported_media_type("application/pdf"));
    }

    #[test]
    fn page_kind_helpers() {
        let page = FetchedPage {
            content_type: "image/png".into(),
            body: vec![],
        };
        assert!(page.is_image());
        assert!(!page.is_html());
    }
}
