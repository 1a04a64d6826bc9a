//! Batch translation with plausibility check, single retry and placeholder fallback

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::endpoint::{TranslationEndpoint, extract_detected_language, extract_translation};
use super::error::{EndpointError, EndpointResult};
use crate::languages::AUTO_DETECT;
use crate::segment::Batch;
use crate::segment::packer::SEPARATOR;
use crate::utils::truncate_display;

/// Outcome of translating one batch into one target language.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationReport {
    /// Translated lines; index-aligned with the batch when the endpoint kept
    /// the line structure intact
    pub lines: Vec<String>,
    /// Every line is the placeholder
    pub failed: bool,
    pub attempts: u32,
}

pub struct TranslationClient {
    endpoint: Arc<dyn TranslationEndpoint>,
    retry_length_ratio: f64,
    placeholder: String,
}

impl TranslationClient {
    pub fn new(
        endpoint: Arc<dyn TranslationEndpoint>,
        retry_length_ratio: f64,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            endpoint,
            retry_length_ratio,
            placeholder: placeholder.into(),
        }
    }

    /// Translate `batch` into `target`, never failing. `lines` holds one
    /// string per sentence, index-aligned with the batch.
    ///
    /// A result shorter than the retry ratio of the payload is fetched a
    /// second time and the second answer is kept whatever its length. Any
    /// failure on either attempt turns every sentence into the placeholder.
    pub async fn translate_with_report(
        &self,
        batch: &Batch,
        source: &str,
        target: &str,
        cancel: &CancellationToken,
    ) -> TranslationReport {
        if batch.is_empty() {
            return TranslationReport {
                lines: Vec::new(),
                failed: false,
                attempts: 0,
            };
        }
        let payload = batch.payload();

        let first = match self.fetch(&payload, source, target, cancel).await {
            Ok(text) => text,
            Err(e) => return self.failure(batch, target, 1, e),
        };

        let (text, attempts) = if self.is_implausibly_short(&first, &payload) {
            warn!(
                "Re-translating batch {} to {} due to length",
                batch.index + 1,
                target
            );
            match self.fetch(&payload, source, target, cancel).await {
                Ok(text) => (text, 2),
                Err(e) => return self.failure(batch, target, 2, e),
            }
        } else {
            (first, 1)
        };

        let lines: Vec<String> = text.split(SEPARATOR).map(str::to_string).collect();
        if lines.len() != batch.len() {
            debug!(
                "Batch {} to {}: {} lines returned for {} sentences",
                batch.index + 1,
                target,
                lines.len(),
                batch.len()
            );
        }

        TranslationReport {
            lines,
            failed: false,
            attempts,
        }
    }

    /// A report whose every line is the placeholder.
    pub fn placeholder_report(&self, batch: &Batch, attempts: u32) -> TranslationReport {
        TranslationReport {
            lines: vec![self.placeholder.clone(); batch.len()],
            failed: true,
            attempts,
        }
    }

    /// Ask the endpoint which language `sample` is written in.
    pub async fn detect_language(&self, sample: &str, cancel: &CancellationToken) -> Option<String> {
        let response = tokio::select! {
            _ = cancel.cancelled() => return None,
            response = self.endpoint.query(sample, AUTO_DETECT, "en") => response,
        };

        match response {
            Ok(response) => {
                let detected = extract_detected_language(&response);
                if detected.is_none() {
                    warn!("Language detection returned no language code");
                }
                detected
            }
            Err(e) => {
                warn!("Language detection failed: {}", e);
                None
            }
        }
    }

    async fn fetch(
        &self,
        payload: &str,
        source: &str,
        target: &str,
        cancel: &CancellationToken,
    ) -> EndpointResult<String> {
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(EndpointError::Cancelled),
            response = self.endpoint.query(payload, source, target) => response?,
        };
        extract_translation(&response)
    }

    fn is_implausibly_short(&self, translated: &str, payload: &str) -> bool {
        let translated_len = translated.chars().count() as f64;
        let payload_len = payload.chars().count() as f64;
        translated_len < self.retry_length_ratio * payload_len
    }

    fn failure(
        &self,
        batch: &Batch,
        target: &str,
        attempts: u32,
        error: EndpointError,
    ) -> TranslationReport {
        match error {
            EndpointError::Cancelled => debug!("Batch {} to {} cancelled", batch.index + 1, target),
            error => warn!(
                "Translation error ({}) for batch {} to {} [{}]: {}",
                self.endpoint.name(),
                batch.index + 1,
                target,
                truncate_display(batch.sentences.first().map_or("", String::as_str), 40),
                error
            ),
        }
        self.placeholder_report(batch, attempts)
    }
}
