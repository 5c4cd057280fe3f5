//! Process-wide counter registry
//!
//! One atomic counter per stable name, created at process start and never
//! reset. Workflow steps increment them from request tasks while the
//! `/metrics` endpoint reads them concurrently.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Named monotonic counters for the invitation and polling workflows.
#[derive(Debug, Default)]
pub struct Metrics {
    pub requests: Counter,
    pub missing_first_name: Counter,
    pub missing_last_name: Counter,
    pub missing_email: Counter,
    pub missing_coc: Counter,
    pub failed_captcha: Counter,
    pub invalid_captcha: Counter,
    pub successful_captcha: Counter,
    pub successful_invites: Counter,
    pub invite_errors: Counter,
}

/// A single monotonically non-decreasing counter.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn incr(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn value(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time view of every counter, keyed by stable name.
    pub fn snapshot(&self) -> BTreeMap<&'static str, u64> {
        BTreeMap::from([
            ("requests", self.requests.value()),
            ("missing_first_name", self.missing_first_name.value()),
            ("missing_last_name", self.missing_last_name.value()),
            ("missing_email", self.missing_email.value()),
            ("missing_coc", self.missing_coc.value()),
            ("failed_captcha", self.failed_captcha.value()),
            ("invalid_captcha", self.invalid_captcha.value()),
            ("successful_captcha", self.successful_captcha.value()),
            ("successful_invites", self.successful_invites.value()),
            ("invite_errors", self.invite_errors.value()),
        ])
    }
}
