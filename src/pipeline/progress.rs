//! Completion tracking and remaining-time estimate

use std::time::{Duration, Instant};

/// Snapshot handed to progress displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub completed: usize,
    pub total: usize,
    pub elapsed: Duration,
}

impl ProgressUpdate {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64
    }

    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0).round() as u32
    }

    /// `elapsed * total / completed - elapsed`, floored at zero; zero until
    /// something has completed.
    pub fn remaining(&self) -> Duration {
        if self.completed == 0 || self.total == 0 {
            return Duration::ZERO;
        }
        let elapsed = self.elapsed.as_secs_f64();
        let estimated_total = elapsed * (self.total as f64 / self.completed as f64);
        Duration::from_secs_f64((estimated_total - elapsed).max(0.0))
    }
}

#[derive(Debug)]
pub struct ProgressState {
    completed: usize,
    total: usize,
    started: Instant,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            total,
            started: Instant::now(),
        }
    }

    pub fn advance(&mut self, sentences: usize) {
        self.completed = (self.completed + sentences).min(self.total);
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn snapshot(&self) -> ProgressUpdate {
        ProgressUpdate {
            completed: self.completed,
            total: self.total,
            elapsed: self.started.elapsed(),
        }
    }
}
