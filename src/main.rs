//! slackgate - self-service Slack workspace invitations

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use log::info;

mod client;
mod config;
mod error;
mod invite;
mod metrics;
mod poller;
mod server;
mod state;
mod verify;

use client::SlackClient;
use config::Config;
use invite::Inviter;
use metrics::Metrics;
use poller::Poller;
use server::{AppState, SiteConfig};
use state::TeamState;
use verify::RecaptchaVerifier;

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    let api = Arc::new(SlackClient::new(config.slack_token.clone())?);
    let verifier = Arc::new(RecaptchaVerifier::new(config.captcha_secret.clone())?);
    let team = Arc::new(TeamState::new());
    let metrics = Arc::new(Metrics::new());

    let poller = Poller::new(api.clone(), team.clone());
    tokio::spawn(poller.run());

    let inviter = Arc::new(Inviter::new(api, verifier, team.clone(), metrics.clone()));
    let state = AppState {
        team,
        metrics,
        inviter,
        site: SiteConfig {
            captcha_sitekey: config.captcha_sitekey,
            coc_url: config.coc_url,
            enforce_https: config.enforce_https,
        },
    };

    let router = server::build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {addr}");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
