//! In-memory metrics registry.
//!
//! Observability only; never authoritative for pipeline correctness. The
//! registry is injected where it is needed so tests can use a local
//! collector instead of process-wide state.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationStats {
    pub total_requests: u64,
    pub total_time_seconds: f64,
    pub avg_time_seconds: f64,
}

/// Point-in-time copy of all counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub verification: VerificationStats,
    pub languages: HashMap<String, u64>,
    pub review_outcomes: HashMap<String, u64>,
    pub claim_categories: HashMap<String, u64>,
}

#[derive(Default)]
struct Counters {
    total_requests: u64,
    total_time_seconds: f64,
    languages: HashMap<String, u64>,
    review_outcomes: HashMap<String, u64>,
    claim_categories: HashMap<String, u64>,
}

#[derive(Default)]
pub struct MetricsRegistry {
    inner: Mutex<Counters>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Counters> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn record_verification_time(&self, duration: Duration) {
        let mut c = self.lock();
        c.total_requests += 1;
        c.total_time_seconds += duration.as_secs_f64().max(0.0);
    }

    pub fn record_language(&self, language_code: &str) {
        if language_code.is_empty() {
            return;
        }
        *self.lock().languages.entry(language_code.to_string()).or_default() += 1;
    }

    /// Outcome labels come from human reviewers, e.g. "true_positive".
    pub fn record_review_outcome(&self, outcome_label: &str) {
        if outcome_label.is_empty() {
            return;
        }
        *self.lock().review_outcomes.entry(outcome_label.to_string()).or_default() += 1;
    }

    pub fn record_claim_category(&self, category: &str) {
        if category.is_empty() {
            return;
        }
        *self.lock().claim_categories.entry(category.to_string()).or_default() += 1;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let c = self.lock();
        let avg = if c.total_requests == 0 {
            0.0
        } else {
            c.total_time_seconds / c.total_requests as f64
        };
        MetricsSnapshot {
            verification: VerificationStats {
                total_requests: c.total_requests,
                total_time_seconds: c.total_time_seconds,
                avg_time_seconds: avg,
            },
            languages: c.languages.clone(),
            review_outcomes: c.review_outcomes.clone(),
            claim_categories: c.claim_categories.clone(),
        }
    }
}
