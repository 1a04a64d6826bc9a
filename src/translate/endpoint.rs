//! Remote machine-translation endpoint (Google Translate `gtx` client)

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::error::{EndpointError, EndpointResult};

pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// A remote service that answers translation and detection queries with the
/// nested-array response shape of the public `gtx` endpoint.
#[async_trait]
pub trait TranslationEndpoint: Send + Sync {
    /// Issue one query and return the decoded response body.
    ///
    /// `source` may be the auto-detect sentinel.
    async fn query(&self, text: &str, source: &str, target: &str) -> EndpointResult<Value>;

    fn name(&self) -> &str;
}

pub struct GoogleEndpoint {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleEndpoint {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('?').to_string(),
        })
    }

    fn request_url(&self, text: &str, source: &str, target: &str) -> String {
        format!(
            "{}?client=gtx&sl={}&tl={}&dt=t&q={}",
            self.base_url,
            urlencoding::encode(source),
            urlencoding::encode(target),
            urlencoding::encode(text)
        )
    }
}

#[async_trait]
impl TranslationEndpoint for GoogleEndpoint {
    async fn query(&self, text: &str, source: &str, target: &str) -> EndpointResult<Value> {
        let url = self.request_url(text, source, target);
        let response = self
            .client
            .get(&url)
            .header("User-Agent", "Mozilla/5.0")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EndpointError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| EndpointError::Malformed(e.to_string()))
    }

    fn name(&self) -> &str {
        "google"
    }
}

/// Concatenate the text of every translated-segment record.
///
/// The first element of the response is a list of records; text-bearing ones
/// start with a string. Records without one (transliterations, spelling
/// hints) are skipped wherever they appear.
pub fn extract_translation(response: &Value) -> EndpointResult<String> {
    let records = response
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| EndpointError::Malformed("missing segment list".to_string()))?;

    let mut text = String::new();
    let mut found = false;
    for record in records {
        if let Some(segment) = record.get(0).and_then(Value::as_str) {
            text.push_str(segment);
            found = true;
        }
    }

    if !found {
        return Err(EndpointError::Malformed(
            "no text-bearing segment records".to_string(),
        ));
    }

    Ok(text)
}

/// Source language reported by an auto-detect query, if any.
pub fn extract_detected_language(response: &Value) -> Option<String> {
    response
        .get(2)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_translation_joins_records() {
        let response = json!([
            [
                ["Bonjour le monde.\n", "Hello world.\n", null, null, 10],
                ["Au revoir.", "Goodbye.", null, null, 10]
            ],
            null,
            "en"
        ]);
        assert_eq!(
            extract_translation(&response).unwrap(),
            "Bonjour le monde.\nAu revoir."
        );
    }

    #[test]
    fn test_extract_translation_skips_non_text_records() {
        let response = json!([
            [
                ["Привет", "Hello", null, null, 3],
                [null, null, "Privet", "Hello"]
            ],
            null,
            "en",
            null,
            null,
            null,
            1.0,
            [],
            [["en"], null, [1.0], ["en"]]
        ]);
        assert_eq!(extract_translation(&response).unwrap(), "Привет");
    }

    #[test]
    fn test_extract_translation_rejects_bad_shapes() {
        assert!(matches!(
            extract_translation(&json!({"error": "nope"})),
            Err(EndpointError::Malformed(_))
        ));
        assert!(matches!(
            extract_translation(&json!([null, null, "en"])),
            Err(EndpointError::Malformed(_))
        ));
        assert!(matches!(
            extract_translation(&json!([[[null, null, "x"]]])),
            Err(EndpointError::Malformed(_))
        ));
    }

    #[test]
    fn test_extract_detected_language() {
        assert_eq!(
            extract_detected_language(&json!([[["Hi", "Salut"]], null, "fr"])),
            Some("fr".to_string())
        );
        assert_eq!(extract_detected_language(&json!([[["Hi", "Hi"]], null, ""])), None);
        assert_eq!(extract_detected_language(&json!([[["Hi", "Hi"]]])), None);
    }

    #[test]
    fn test_request_url_encodes_payload() {
        let endpoint = GoogleEndpoint::new(DEFAULT_ENDPOINT, Duration::from_secs(5)).unwrap();
        let url = endpoint.request_url("One.\nTwo & three", "en", "zh-CN");
        assert_eq!(
            url,
            "https://translate.googleapis.com/translate_a/single?client=gtx&sl=en&tl=zh-CN&dt=t&q=One.%0ATwo%20%26%20three"
        );
    }
}
