//! Mock workspace API client for testing
//!
//! Scripted implementation of [`WorkspaceApi`] so poller and invitation
//! tests can inject page sequences, rate-limit signals, and invite outcomes
//! deterministically, without real API calls.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{MemberPage, TeamInfo, WorkspaceApi};
use crate::error::{ApiError, Result};

/// Scripted mock client.
///
/// Responses are consumed front-to-back, one per call. An exhausted queue
/// yields an `InvalidResponse` error so an over-calling test fails loudly.
/// Locks are std mutexes; nothing is held across an await.
#[derive(Default)]
pub struct MockWorkspaceClient {
    pages: Mutex<VecDeque<Result<MemberPage>>>,
    team_infos: Mutex<VecDeque<Result<TeamInfo>>>,
    invites: Mutex<VecDeque<Result<()>>>,
    calls: Mutex<CallCounts>,
    captured_cursors: Mutex<Vec<Option<String>>>,
    captured_invites: Mutex<Vec<(String, String, String, String)>>,
}

/// Tracks API call counts for test verification
#[derive(Debug, Default, Clone)]
pub struct CallCounts {
    pub members_page: usize,
    pub team_info: usize,
    pub invite_member: usize,
}

impl MockWorkspaceClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(self, page: Result<MemberPage>) -> Self {
        self.pages.lock().unwrap().push_back(page);
        self
    }

    pub fn push_team_info(self, info: Result<TeamInfo>) -> Self {
        self.team_infos.lock().unwrap().push_back(info);
        self
    }

    pub fn push_invite(self, outcome: Result<()>) -> Self {
        self.invites.lock().unwrap().push_back(outcome);
        self
    }

    pub fn calls(&self) -> CallCounts {
        self.calls.lock().unwrap().clone()
    }

    /// Cursor argument of every `members_page` call, in order.
    pub fn cursors(&self) -> Vec<Option<String>> {
        self.captured_cursors.lock().unwrap().clone()
    }

    /// `(domain, first_name, last_name, email)` of every invite call, in order.
    pub fn invites(&self) -> Vec<(String, String, String, String)> {
        self.captured_invites.lock().unwrap().clone()
    }
}

fn exhausted(what: &str) -> ApiError {
    ApiError::InvalidResponse(format!("mock has no scripted {what} response"))
}

#[async_trait]
impl WorkspaceApi for MockWorkspaceClient {
    async fn members_page(
        &self,
        cursor: Option<&str>,
        _presence: bool,
        _limit: u32,
    ) -> Result<MemberPage> {
        self.calls.lock().unwrap().members_page += 1;
        self.captured_cursors
            .lock()
            .unwrap()
            .push(cursor.map(str::to_string));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("members_page")))
    }

    async fn team_info(&self) -> Result<TeamInfo> {
        self.calls.lock().unwrap().team_info += 1;
        self.team_infos
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("team_info")))
    }

    async fn invite_member(
        &self,
        domain: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<()> {
        self.calls.lock().unwrap().invite_member += 1;
        self.captured_invites.lock().unwrap().push((
            domain.to_string(),
            first_name.to_string(),
            last_name.to_string(),
            email.to_string(),
        ));
        self.invites
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("invite_member")))
    }
}
