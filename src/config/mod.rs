//! Configuration for slackgate
//!
//! Every knob is an environment variable with a flag override; required
//! values are validated at startup by clap.

use clap::Parser;

/// Runtime configuration, sourced from flags or the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "slackgate", version, about)]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Slack API token with `users:read` and admin invite scope
    #[arg(long, env = "SLACKGATE_SLACK_TOKEN", hide_env_values = true)]
    pub slack_token: String,

    /// reCAPTCHA site key, exposed to the homepage widget
    #[arg(long, env = "SLACKGATE_CAPTCHA_SITEKEY")]
    pub captcha_sitekey: String,

    /// reCAPTCHA shared secret for server-side verification
    #[arg(long, env = "SLACKGATE_CAPTCHA_SECRET", hide_env_values = true)]
    pub captcha_secret: String,

    /// Code of conduct URL linked from the invite form
    #[arg(
        long,
        env = "SLACKGATE_COC_URL",
        default_value = "https://coc.golangbridge.org/"
    )]
    pub coc_url: String,

    /// Redirect plain-HTTP requests (by X-Forwarded-Proto) to HTTPS
    #[arg(long, env = "SLACKGATE_ENFORCE_HTTPS", default_value_t = false)]
    pub enforce_https: bool,
}
