//! Slack Web API client

use async_trait::async_trait;

use crate::error::Result;

#[cfg(test)]
pub mod mock;
pub mod models;
pub mod slack;

#[cfg(test)]
pub use mock::MockWorkspaceClient;
pub use models::{Member, MemberPage, TeamInfo};
pub use slack::SlackClient;

/// ID of the reserved Slack system-bot account, excluded from all counts.
pub const SLACKBOT_ID: &str = "USLACKBOT";

/// Slack workspace directory API.
///
/// The poller and the invitation workflow only ever talk to the workspace
/// through this trait, so tests can script paginated responses, rate-limit
/// signals, and invite outcomes deterministically.
#[async_trait]
pub trait WorkspaceApi: Send + Sync {
    /// Fetch one page of the member directory.
    ///
    /// `cursor` is `None` for the first page; subsequent pages thread the
    /// cursor returned in the previous [`MemberPage`]. When `presence` is
    /// set, each member carries a presence string.
    async fn members_page(
        &self,
        cursor: Option<&str>,
        presence: bool,
        limit: u32,
    ) -> Result<MemberPage>;

    /// Fetch workspace display metadata (domain, name, icon).
    async fn team_info(&self) -> Result<TeamInfo>;

    /// Invite a person to the workspace identified by `domain`, by email.
    async fn invite_member(
        &self,
        domain: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<()>;
}
