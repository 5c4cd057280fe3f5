//! Slack Web API client implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{Member, MemberPage, TeamInfo, WorkspaceApi};
use crate::error::{ApiError, Result};

/// Slack Web API base URL
const API_BASE_URL: &str = "https://slack.com/api";

/// Fallback retry delay when a 429 arrives without a Retry-After header
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Slack Web API client
pub struct SlackClient {
    http: HttpClient,
    base_url: String,
    /// Test override; when unset, invites go to the per-workspace host
    invite_base_url: Option<String>,
    token: String,
}

impl SlackClient {
    /// Create a new Slack API client with the given bearer token.
    pub fn new(token: String) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: API_BASE_URL.to_string(),
            invite_base_url: None,
            token,
        })
    }

    #[cfg(test)]
    fn with_base_url(token: String, base_url: String) -> Self {
        Self {
            http: HttpClient::new(),
            base_url: base_url.clone(),
            invite_base_url: Some(base_url),
            token,
        }
    }

    /// The invite endpoint lives on the workspace's own host, not the
    /// generic API host.
    fn invite_url(&self, domain: &str) -> String {
        match &self.invite_base_url {
            Some(base) => format!("{}/users.admin.invite", base),
            None => format!("https://{}.slack.com/api/users.admin.invite", domain),
        }
    }

    /// Check transport-level status and deserialize the response body.
    ///
    /// Slack reports most failures inside a 200 envelope; the per-endpoint
    /// callers check the `ok` flag. 429 carries the rate-limit signal in the
    /// Retry-After header.
    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_RETRY_AFTER);
                Err(ApiError::RateLimited(retry_after))
            }
            status if status.is_server_error() => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Server error: {}", status));
                Err(ApiError::ServerError(error_msg))
            }
            _ => response
                .json::<T>()
                .await
                .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e))),
        }
    }

    async fn get<T: DeserializeOwned>(&self, method: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, method);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .map_err(ApiError::from)?;
        self.decode(response).await
    }

    async fn post_form<T: DeserializeOwned>(&self, url: &str, form: &[(&str, &str)]) -> Result<T> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .form(form)
            .send()
            .await
            .map_err(ApiError::from)?;
        self.decode(response).await
    }
}

#[derive(Deserialize)]
struct UsersListResponse {
    ok: bool,
    error: Option<String>,
    #[serde(default)]
    members: Vec<Member>,
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Deserialize)]
struct TeamInfoResponse {
    ok: bool,
    error: Option<String>,
    team: Option<TeamRecord>,
}

#[derive(Deserialize)]
struct TeamRecord {
    domain: String,
    name: String,
    #[serde(default)]
    icon: Option<TeamIcon>,
}

#[derive(Deserialize)]
struct TeamIcon {
    image_132: Option<String>,
}

#[derive(Deserialize)]
struct InviteResponse {
    ok: bool,
    error: Option<String>,
}

fn slack_err(error: Option<String>) -> ApiError {
    ApiError::Slack(error.unwrap_or_else(|| "unknown_error".to_string()))
}

#[async_trait]
impl WorkspaceApi for SlackClient {
    async fn members_page(
        &self,
        cursor: Option<&str>,
        presence: bool,
        limit: u32,
    ) -> Result<MemberPage> {
        let mut query = vec![
            ("limit", limit.to_string()),
            ("presence", presence.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let response: UsersListResponse = self.get("users.list", &query).await?;
        if !response.ok {
            return Err(slack_err(response.error));
        }

        // Slack signals the final page with an empty cursor.
        let next_cursor = response
            .response_metadata
            .map(|meta| meta.next_cursor)
            .filter(|cursor| !cursor.is_empty());

        Ok(MemberPage {
            members: response.members,
            next_cursor,
        })
    }

    async fn team_info(&self) -> Result<TeamInfo> {
        let response: TeamInfoResponse = self.get("team.info", &[]).await?;
        if !response.ok {
            return Err(slack_err(response.error));
        }

        let team = response
            .team
            .ok_or_else(|| ApiError::InvalidResponse("team.info without team".to_string()))?;

        Ok(TeamInfo {
            domain: team.domain,
            name: team.name,
            icon: team.icon.and_then(|icon| icon.image_132),
        })
    }

    async fn invite_member(
        &self,
        domain: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<()> {
        let form = [
            ("email", email),
            ("first_name", first_name),
            ("last_name", last_name),
        ];

        let response: InviteResponse = self.post_form(&self.invite_url(domain), &form).await?;
        if !response.ok {
            return Err(slack_err(response.error));
        }
        Ok(())
    }
}
