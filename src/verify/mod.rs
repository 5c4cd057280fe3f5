//! Human-verification gate
//!
//! Wraps the server-side reCAPTCHA confirmation. A verification-service
//! failure is reported as [`Verdict::Unavailable`] and is never conflated
//! with a human failing the challenge. One attempt per request, no retries.

use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::error::{ApiError, Result};

/// reCAPTCHA server-side verification endpoint
const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Outcome of one verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The challenge response was confirmed valid
    Valid,
    /// The call completed and reported the response as not valid
    Invalid,
    /// The verification call itself could not complete
    Unavailable,
}

/// Human-verification check.
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Verify one challenge response for the given requester address.
    async fn verify(&self, response: &str, remote_ip: &str) -> Verdict;
}

/// Verifier backed by the Google reCAPTCHA siteverify endpoint.
pub struct RecaptchaVerifier {
    http: HttpClient,
    url: String,
    secret: String,
}

#[derive(Deserialize)]
struct SiteverifyResponse {
    success: bool,
}

impl RecaptchaVerifier {
    pub fn new(secret: String) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            url: SITEVERIFY_URL.to_string(),
            secret,
        })
    }

    #[cfg(test)]
    fn with_url(secret: String, url: String) -> Self {
        Self {
            http: HttpClient::new(),
            url,
            secret,
        }
    }
}

#[async_trait]
impl Verifier for RecaptchaVerifier {
    async fn verify(&self, response: &str, remote_ip: &str) -> Verdict {
        let form = [
            ("secret", self.secret.as_str()),
            ("response", response),
            ("remoteip", remote_ip),
        ];

        let result = async {
            self.http
                .post(&self.url)
                .form(&form)
                .send()
                .await?
                .json::<SiteverifyResponse>()
                .await
        }
        .await;

        match result {
            Ok(body) if body.success => Verdict::Valid,
            Ok(_) => Verdict::Invalid,
            Err(err) => {
                warn!("captcha verification unavailable: {err}");
                Verdict::Unavailable
            }
        }
    }
}
