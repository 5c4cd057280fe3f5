//! Invitation workflow
//!
//! Validates the submitted form, runs the human-verification gate, then
//! issues a single add-member call against the cached workspace domain.
//! Each step updates its counter. No idempotency: two submissions with the
//! same email issue two external invite attempts.

use std::sync::Arc;

use log::error;
use serde::Deserialize;

use crate::client::WorkspaceApi;
use crate::error::InviteError;
use crate::metrics::Metrics;
use crate::state::TeamState;
use crate::verify::{Verdict, Verifier};

/// Form fields submitted from the homepage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InviteForm {
    #[serde(default)]
    pub fname: String,
    #[serde(default)]
    pub lname: String,
    #[serde(default)]
    pub email: String,
    /// Code-of-conduct consent; must be the literal "1"
    #[serde(default)]
    pub coc: String,
    #[serde(default, rename = "g-recaptcha-response")]
    pub captcha_response: String,
}

/// Orchestrates verification and the external add-member call.
pub struct Inviter {
    api: Arc<dyn WorkspaceApi>,
    verifier: Arc<dyn Verifier>,
    team: Arc<TeamState>,
    metrics: Arc<Metrics>,
}

impl Inviter {
    pub fn new(
        api: Arc<dyn WorkspaceApi>,
        verifier: Arc<dyn Verifier>,
        team: Arc<TeamState>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            api,
            verifier,
            team,
            metrics,
        }
    }

    /// Validate preconditions; each missing field is counted separately and
    /// short-circuits before any external call.
    fn check_preconditions(&self, form: &InviteForm) -> Result<(), InviteError> {
        if form.email.is_empty() {
            self.metrics.missing_email.incr();
            return Err(InviteError::MissingEmail);
        }
        if form.fname.is_empty() {
            self.metrics.missing_first_name.incr();
            return Err(InviteError::MissingFirstName);
        }
        if form.lname.is_empty() {
            self.metrics.missing_last_name.incr();
            return Err(InviteError::MissingLastName);
        }
        if form.coc != "1" {
            self.metrics.missing_coc.incr();
            return Err(InviteError::MissingCoc);
        }
        Ok(())
    }

    /// Run the full workflow for one submission.
    pub async fn invite(&self, form: &InviteForm, remote_ip: &str) -> Result<(), InviteError> {
        self.check_preconditions(form)?;

        match self
            .verifier
            .verify(&form.captcha_response, remote_ip)
            .await
        {
            Verdict::Unavailable => {
                self.metrics.failed_captcha.incr();
                return Err(InviteError::VerificationUnavailable);
            }
            Verdict::Invalid => {
                self.metrics.invalid_captcha.incr();
                return Err(InviteError::VerificationRejected);
            }
            Verdict::Valid => self.metrics.successful_captcha.incr(),
        }

        let domain = self.team.snapshot().await.domain;
        if let Err(err) = self
            .api
            .invite_member(&domain, &form.fname, &form.lname, &form.email)
            .await
        {
            error!("invite_member error: {err}");
            self.metrics.invite_errors.incr();
            return Err(InviteError::Rejected(err));
        }

        self.metrics.successful_invites.incr();
        Ok(())
    }
}
