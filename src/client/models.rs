//! Wire models for the Slack Web API

use serde::Deserialize;

/// One entry in the workspace member directory.
#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    /// Member ID (e.g. `U023BECGF`)
    pub id: String,

    /// Whether this account is an automated bot
    #[serde(default)]
    pub is_bot: bool,

    /// Whether this account has been deactivated
    #[serde(default)]
    pub deleted: bool,

    /// Presence status (`"active"` or `"away"`); only populated when the
    /// page was requested with presence
    #[serde(default)]
    pub presence: Option<String>,
}

impl Member {
    /// Whether this member counts toward the workspace totals: not the
    /// reserved system bot, not an automated bot, not deactivated.
    pub fn is_countable(&self) -> bool {
        self.id != super::SLACKBOT_ID && !self.is_bot && !self.deleted
    }

    /// Whether presence reports this member as currently active.
    pub fn is_active(&self) -> bool {
        self.presence.as_deref() == Some("active")
    }
}

/// One page of the member directory plus the cursor to the next page.
#[derive(Debug, Clone, Default)]
pub struct MemberPage {
    pub members: Vec<Member>,
    /// Cursor for the next page; `None` on the final page
    pub next_cursor: Option<String>,
}

/// Workspace display metadata from `team.info`.
#[derive(Debug, Clone)]
pub struct TeamInfo {
    pub domain: String,
    pub name: String,
    /// Workspace icon URL, when the workspace has one
    pub icon: Option<String>,
}
