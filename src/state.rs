//! Team state cache
//!
//! Last-known view of the workspace: identity metadata and membership counts.
//! Written only by the poller, read concurrently by the invite, badge, and
//! homepage paths. Counts are committed wholesale per poll cycle, never
//! adjusted incrementally.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use crate::client::TeamInfo;

/// Display metadata for the configured workspace.
#[derive(Debug, Clone, Default)]
pub struct TeamSnapshot {
    pub domain: String,
    pub name: String,
    pub icon: Option<String>,
}

/// Shared cache of workspace identity and membership counts.
#[derive(Debug, Default)]
pub struct TeamState {
    user_count: AtomicU64,
    active_user_count: AtomicU64,
    snapshot: RwLock<TeamSnapshot>,
}

impl TeamState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both membership counts with the totals of a completed cycle.
    pub fn set_counts(&self, total: u64, active: u64) {
        self.user_count.store(total, Ordering::Relaxed);
        self.active_user_count.store(active, Ordering::Relaxed);
    }

    pub fn user_count(&self) -> u64 {
        self.user_count.load(Ordering::Relaxed)
    }

    pub fn active_user_count(&self) -> u64 {
        self.active_user_count.load(Ordering::Relaxed)
    }

    /// Replace the workspace metadata after a successful team-info fetch.
    pub async fn set_snapshot(&self, info: TeamInfo) {
        let mut snapshot = self.snapshot.write().await;
        *snapshot = TeamSnapshot {
            domain: info.domain,
            name: info.name,
            icon: info.icon,
        };
    }

    pub async fn snapshot(&self) -> TeamSnapshot {
        self.snapshot.read().await.clone()
    }
}
