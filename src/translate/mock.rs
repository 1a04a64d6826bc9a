//! Scripted endpoint used by the pipeline tests

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::endpoint::TranslationEndpoint;
use super::error::{EndpointError, EndpointResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Echo the input uppercased
    Uppercase,
    /// First call returns a truncated translation, later calls uppercase
    ShortThenFull,
    /// Always short, on every call
    AlwaysShort,
    /// Every call fails at the network level
    Failing,
    /// Returns a body without the segment list
    Malformed,
}

pub struct MockEndpoint {
    behavior: MockBehavior,
    detected: Option<&'static str>,
    latency: Option<fn(&str) -> u64>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    completed: Mutex<Vec<String>>,
}

impl MockEndpoint {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            detected: None,
            latency: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            completed: Mutex::new(Vec::new()),
        }
    }

    pub fn uppercase() -> Self {
        Self::new(MockBehavior::Uppercase)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Report `code` as the detected source language
    pub fn with_detected(mut self, code: &'static str) -> Self {
        self.detected = Some(code);
        self
    }

    /// Delay each call by `latency(text)` milliseconds
    pub fn with_latency(mut self, latency: fn(&str) -> u64) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most calls ever running at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Query texts in the order their calls finished
    pub fn completion_order(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    pub fn response(translated: &str, original: &str, detected: &str) -> Value {
        json!([[[translated, original, null, null, 10]], null, detected])
    }
}

#[async_trait]
impl TranslationEndpoint for MockEndpoint {
    async fn query(&self, text: &str, source: &str, _target: &str) -> EndpointResult<Value> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(Duration::from_millis(latency(text))).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.lock().unwrap().push(text.to_string());

        let detected = match (source, self.detected) {
            ("auto", Some(code)) => code,
            _ => source,
        };

        match self.behavior {
            MockBehavior::Uppercase => Ok(Self::response(&text.to_uppercase(), text, detected)),
            MockBehavior::ShortThenFull if call == 0 => Ok(Self::response("x", text, detected)),
            MockBehavior::ShortThenFull => {
                Ok(Self::response(&text.to_uppercase(), text, detected))
            }
            MockBehavior::AlwaysShort => Ok(Self::response("x", text, detected)),
            MockBehavior::Failing => Err(EndpointError::Status(503)),
            MockBehavior::Malformed => Ok(json!({"error": "unexpected"})),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
