//! Ordered, bounded fan-out of batch translations

pub mod progress;

use anyhow::Result;
use futures::future::join_all;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::languages::AUTO_DETECT;
use crate::segment::{self, Batch, SegmentOptions};
use crate::translate::client::{TranslationClient, TranslationReport};
pub use progress::{ProgressState, ProgressUpdate};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub segment: SegmentOptions,
    pub retry_length_ratio: f64,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    /// Upper bound on endpoint calls in flight at once
    pub max_in_flight: usize,
    /// Source language used when detection fails
    pub fallback_language: String,
}

impl PipelineOptions {
    pub fn from_config(pipeline: &PipelineConfig, fallback_language: &str) -> Self {
        Self {
            segment: SegmentOptions {
                batch_char_budget: pipeline.batch_char_budget,
                merge_min_length: pipeline.merge_min_length,
            },
            retry_length_ratio: pipeline.retry_length_ratio,
            delay_min_ms: pipeline.delay_min_ms,
            delay_max_ms: pipeline.delay_max_ms,
            max_in_flight: pipeline.max_in_flight,
            fallback_language: fallback_language.to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.segment.batch_char_budget == 0 {
            anyhow::bail!("Batch character budget must be greater than zero");
        }
        if !(self.retry_length_ratio > 0.0 && self.retry_length_ratio <= 1.0) {
            anyhow::bail!(
                "Retry length ratio must be in (0, 1], got {}",
                self.retry_length_ratio
            );
        }
        if self.delay_min_ms > self.delay_max_ms {
            anyhow::bail!(
                "Inter-batch delay range is inverted: {}..{} ms",
                self.delay_min_ms,
                self.delay_max_ms
            );
        }
        if self.max_in_flight == 0 {
            anyhow::bail!("At least one request must be allowed in flight");
        }
        Ok(())
    }

    fn pacing_delay(&self) -> Duration {
        let ms = rand::rng().random_range(self.delay_min_ms..=self.delay_max_ms);
        Duration::from_millis(ms)
    }
}

/// One target-language column of a delivered batch.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageColumn {
    pub language: String,
    pub lines: Vec<String>,
    pub failed: bool,
    /// The first answer was implausibly short and fetched again
    pub retried: bool,
}

/// A batch with its translations, delivered in submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedBatch {
    pub index: usize,
    pub sentences: Vec<String>,
    pub columns: Vec<LanguageColumn>,
}

impl TranslatedBatch {
    pub fn lines(&self, language: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .find(|c| c.language == language)
            .map(|c| c.lines.as_slice())
    }

    /// Translation of sentence `i`, or `placeholder` when the endpoint
    /// returned fewer lines than the batch had sentences.
    pub fn cell<'a>(&'a self, language: &str, i: usize, placeholder: &'a str) -> &'a str {
        self.lines(language)
            .and_then(|lines| lines.get(i))
            .map_or(placeholder, String::as_str)
    }

    pub fn failed_cells(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| c.failed)
            .map(|_| self.sentences.len())
            .sum()
    }

    fn from_reports(batch: Batch, targets: &[String], reports: Vec<TranslationReport>) -> Self {
        let columns = targets
            .iter()
            .zip(reports)
            .map(|(language, report)| LanguageColumn {
                language: language.clone(),
                retried: report.attempts > 1,
                lines: report.lines,
                failed: report.failed,
            })
            .collect();

        Self {
            index: batch.index,
            sentences: batch.sentences,
            columns,
        }
    }
}

/// Receives the run as it unfolds.
pub trait PipelineObserver {
    fn on_start(&mut self, _source_language: &str, _progress: &ProgressUpdate) {}

    fn on_batch(&mut self, batch: &TranslatedBatch, progress: &ProgressUpdate);
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub source_language: String,
    pub total_batches: usize,
    pub delivered_batches: usize,
    pub total_sentences: usize,
    pub delivered_sentences: usize,
    pub failed_cells: usize,
    pub retried_requests: usize,
    pub elapsed: Duration,
    pub cancelled: bool,
}

pub struct Orchestrator {
    client: Arc<TranslationClient>,
    options: PipelineOptions,
}

impl Orchestrator {
    pub fn new(client: Arc<TranslationClient>, options: PipelineOptions) -> Self {
        Self { client, options }
    }

    /// Translate `text` into every target language.
    ///
    /// All batches start at once, limited by the in-flight bound, but reach
    /// the observer strictly in submission order. After each delivery the run
    /// pauses for a random delay from the configured range.
    pub async fn run<O: PipelineObserver>(
        &self,
        text: &str,
        source_language: &str,
        target_languages: &[String],
        cancel: &CancellationToken,
        observer: &mut O,
    ) -> Result<RunSummary> {
        if target_languages.is_empty() {
            anyhow::bail!("No target languages given");
        }
        self.options.validate()?;
        let started = Instant::now();

        let batches = segment::segment(text, self.options.segment);
        let source_language = self.resolve_source(source_language, &batches, cancel).await;
        let total_sentences: usize = batches.iter().map(Batch::len).sum();

        info!(
            "Translating {} sentence(s) in {} batch(es) from {} into {}",
            total_sentences,
            batches.len(),
            source_language,
            target_languages.join(", ")
        );

        let mut progress = ProgressState::new(total_sentences);
        observer.on_start(&source_language, &progress.snapshot());

        let semaphore = Arc::new(Semaphore::new(self.options.max_in_flight));
        let targets: Arc<[String]> = target_languages.into();
        let total_batches = batches.len();

        let mut pending: VecDeque<(Batch, JoinHandle<TranslatedBatch>)> = batches
            .into_iter()
            .map(|batch| {
                let handle = tokio::spawn(translate_batch(
                    Arc::clone(&self.client),
                    Arc::clone(&semaphore),
                    batch.clone(),
                    source_language.clone(),
                    Arc::clone(&targets),
                    cancel.clone(),
                ));
                (batch, handle)
            })
            .collect();

        let mut summary = RunSummary {
            source_language,
            total_batches,
            delivered_batches: 0,
            total_sentences,
            delivered_sentences: 0,
            failed_cells: 0,
            retried_requests: 0,
            elapsed: Duration::ZERO,
            cancelled: false,
        };

        while let Some((batch, mut handle)) = pending.pop_front() {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    handle.abort();
                    break;
                }
                joined = &mut handle => joined,
            };

            let translated = match joined {
                Ok(translated) => translated,
                Err(e) => {
                    warn!("Batch {} task failed: {}", batch.index + 1, e);
                    let reports = targets
                        .iter()
                        .map(|_| self.client.placeholder_report(&batch, 0))
                        .collect();
                    TranslatedBatch::from_reports(batch, &targets, reports)
                }
            };

            progress.advance(translated.sentences.len());
            summary.delivered_batches += 1;
            summary.delivered_sentences = progress.completed();
            summary.failed_cells += translated.failed_cells();
            summary.retried_requests += translated.columns.iter().filter(|c| c.retried).count();
            observer.on_batch(&translated, &progress.snapshot());
            debug!(
                "Delivered batch {}/{} ({} sentences)",
                translated.index + 1,
                total_batches,
                translated.sentences.len()
            );

            // No pause after the final batch
            if !pending.is_empty() {
                let delay = self.options.pacing_delay();
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        for (_, handle) in pending {
            handle.abort();
        }

        summary.cancelled = cancel.is_cancelled();
        summary.elapsed = started.elapsed();
        Ok(summary)
    }

    async fn resolve_source(
        &self,
        requested: &str,
        batches: &[Batch],
        cancel: &CancellationToken,
    ) -> String {
        if requested != AUTO_DETECT {
            return requested.to_string();
        }

        let sample = batches.first().map(Batch::payload).unwrap_or_default();
        if sample.trim().is_empty() {
            return self.options.fallback_language.clone();
        }

        match self.client.detect_language(&sample, cancel).await {
            Some(code) => {
                info!("Detected source language: {}", code);
                code
            }
            None => {
                warn!(
                    "Could not detect source language, falling back to {}",
                    self.options.fallback_language
                );
                self.options.fallback_language.clone()
            }
        }
    }
}

async fn translate_batch(
    client: Arc<TranslationClient>,
    semaphore: Arc<Semaphore>,
    batch: Batch,
    source: String,
    targets: Arc<[String]>,
    cancel: CancellationToken,
) -> TranslatedBatch {
    let calls = targets.iter().map(|target| {
        let client = &client;
        let semaphore = &semaphore;
        let batch = &batch;
        let source = &source;
        let cancel = &cancel;
        async move {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                permit = semaphore.acquire() => permit.ok(),
            };
            match permit {
                Some(_permit) => {
                    client
                        .translate_with_report(batch, source, target, cancel)
                        .await
                }
                None => client.placeholder_report(batch, 0),
            }
        }
    });

    let reports = join_all(calls).await;
    TranslatedBatch::from_reports(batch, &targets, reports)
}
