//! Background membership poller
//!
//! One poll cycle walks the entire member directory page by page, commits
//! the aggregated counts wholesale, then refreshes the workspace metadata.
//! The cycle reports how long the driving loop should sleep before calling
//! it again; every failure is contained here and only shortens that delay.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{error, info};

use crate::client::WorkspaceApi;
use crate::error::ApiError;
use crate::state::TeamState;

/// Members requested per directory page
const PAGE_SIZE: u32 = 500;

/// Delay before the next cycle after a failed cycle
const SHORT_INTERVAL: Duration = Duration::from_secs(60);

/// Delay before the next cycle after a fully successful cycle
const LONG_INTERVAL: Duration = Duration::from_secs(3600);

/// Suspends the poller task. Injected so tests can run a cycle synchronously
/// and assert on the requested sleeps instead of waiting them out.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Periodic team-state synchronization against the workspace directory.
pub struct Poller {
    api: Arc<dyn WorkspaceApi>,
    team: Arc<TeamState>,
    sleeper: Arc<dyn Sleeper>,
}

impl Poller {
    pub fn new(api: Arc<dyn WorkspaceApi>, team: Arc<TeamState>) -> Self {
        Self {
            api,
            team,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    #[cfg(test)]
    fn with_sleeper(
        api: Arc<dyn WorkspaceApi>,
        team: Arc<TeamState>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self { api, team, sleeper }
    }

    /// Drive poll cycles forever, honoring each cycle's requested delay.
    pub async fn run(self) {
        loop {
            let delay = self.poll_once().await;
            info!("next membership poll in {delay:?}");
            tokio::time::sleep(delay).await;
        }
    }

    /// Run one full cycle and return the delay before the next one.
    ///
    /// A rate-limit signal suspends the cycle for the indicated duration and
    /// retries the same page without resetting the running totals. Any other
    /// paging error aborts the cycle with the previous counts left intact;
    /// stale-but-consistent beats partially updated.
    pub async fn poll_once(&self) -> Duration {
        let mut cursor: Option<String> = None;
        let mut total: u64 = 0;
        let mut active: u64 = 0;

        loop {
            match self.api.members_page(cursor.as_deref(), true, PAGE_SIZE).await {
                Ok(page) => {
                    for member in &page.members {
                        if member.is_countable() {
                            total += 1;
                            if member.is_active() {
                                active += 1;
                            }
                        }
                    }
                    match page.next_cursor {
                        Some(next) => cursor = Some(next),
                        None => break,
                    }
                }
                Err(ApiError::RateLimited(retry_after)) => {
                    info!("rate limited by Slack, resuming page fetch in {retry_after:?}");
                    self.sleeper.sleep(retry_after).await;
                }
                Err(err) => {
                    error!("error polling slack for users: {err}");
                    return SHORT_INTERVAL;
                }
            }
        }

        self.team.set_counts(total, active);
        info!("membership poll complete: {total} members, {active} active");

        match self.api.team_info().await {
            Ok(info) => self.team.set_snapshot(info).await,
            Err(err) => {
                error!("error polling slack for team info: {err}");
                return SHORT_INTERVAL;
            }
        }

        LONG_INTERVAL
    }
}
