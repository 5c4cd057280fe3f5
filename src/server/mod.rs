//! HTTP surface
//!
//! Thin axum layer over the core: it decodes the invite form, extracts the
//! requester address, and maps workflow errors onto status codes. Everything
//! with real control flow lives behind [`AppState`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use log::error;
use serde_json::json;
use tower_http::services::ServeDir;

use crate::error::InviteError;
use crate::invite::{InviteForm, Inviter};
use crate::metrics::Metrics;
use crate::state::TeamState;

pub mod badge;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub team: Arc<TeamState>,
    pub metrics: Arc<Metrics>,
    pub inviter: Arc<Inviter>,
    pub site: SiteConfig,
}

/// Static site parameters rendered into the homepage.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub captcha_sitekey: String,
    pub coc_url: String,
    pub enforce_https: bool,
}

pub fn build_router(state: AppState) -> Router {
    let enforce_https = state.site.enforce_https;

    let router = Router::new()
        .route("/", get(homepage))
        .route("/invite", post(handle_invite))
        .route("/badge.svg", get(handle_badge))
        .route("/metrics", get(handle_metrics))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state);

    if enforce_https {
        router.layer(middleware::from_fn(redirect_plain_http))
    } else {
        router
    }
}

/// Redirect requests that arrived over plain HTTP at the proxy.
async fn redirect_plain_http(req: Request, next: Next) -> Response {
    let forwarded_proto = req
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok());

    if forwarded_proto == Some("http") {
        let host = req
            .headers()
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        return Redirect::permanent(&format!("https://{}{}", host, req.uri())).into_response();
    }

    next.run(req).await
}

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

async fn homepage(State(state): State<AppState>) -> Html<String> {
    state.metrics.requests.incr();

    let snapshot = state.team.snapshot().await;
    let page = INDEX_TEMPLATE
        .replace("{{team_name}}", &html_escape(&snapshot.name))
        .replace("{{team_domain}}", &html_escape(&snapshot.domain))
        .replace(
            "{{team_icon}}",
            &html_escape(snapshot.icon.as_deref().unwrap_or_default()),
        )
        .replace("{{user_count}}", &state.team.user_count().to_string())
        .replace(
            "{{active_count}}",
            &state.team.active_user_count().to_string(),
        )
        .replace("{{site_key}}", &html_escape(&state.site.captcha_sitekey))
        .replace("{{coc_url}}", &html_escape(&state.site.coc_url));

    Html(page)
}

async fn handle_invite(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Form(form): Form<InviteForm>,
) -> Response {
    // Host only; the peer port is meaningless to the verifier.
    let remote_ip = addr.ip().to_string();

    match state.inviter.invite(&form, &remote_ip).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) if err.is_precondition() => {
            (StatusCode::PRECONDITION_FAILED, err.to_string()).into_response()
        }
        Err(InviteError::Rejected(cause)) => {
            // Diagnostics stay in the log; the caller gets a generic message.
            error!("invitation rejected upstream: {cause}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Invitation failed").into_response()
        }
        Err(err) => {
            error!("unexpected invite error: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn handle_badge(State(state): State<AppState>) -> Response {
    let value = badge::membership_value(state.team.active_user_count(), state.team.user_count());

    match badge::render(badge::BADGE_LABEL, &value, badge::BADGE_COLOR) {
        Ok(svg) => (
            [(header::CONTENT_TYPE, "image/svg+xml; charset=utf-8")],
            svg,
        )
            .into_response(),
        Err(err) => {
            error!("badge rendering failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn handle_metrics(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut exposition = json!(state.metrics.snapshot());
    exposition["user_count"] = json!(state.team.user_count());
    exposition["active_user_count"] = json!(state.team.active_user_count());
    Json(exposition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::Request as HttpRequest;
    use tower::ServiceExt;

    use crate::client::{MockWorkspaceClient, TeamInfo};
    use crate::error::ApiError;
    use crate::verify::mock::ScriptedVerifier;
    use crate::verify::Verdict;

    async fn test_state(api: MockWorkspaceClient, verifier: ScriptedVerifier) -> AppState {
        let team = Arc::new(TeamState::new());
        team.set_counts(42, 7);
        team.set_snapshot(TeamInfo {
            domain: "gophers".into(),
            name: "Gophers".into(),
            icon: None,
        })
        .await;

        let metrics = Arc::new(Metrics::new());
        let inviter = Arc::new(Inviter::new(
            Arc::new(api),
            Arc::new(verifier),
            team.clone(),
            metrics.clone(),
        ));

        AppState {
            team,
            metrics,
            inviter,
            site: SiteConfig {
                captcha_sitekey: "site-key-123".into(),
                coc_url: "https://example.com/coc".into(),
                enforce_https: false,
            },
        }
    }

    fn router(state: AppState) -> Router {
        build_router(state).layer(MockConnectInfo(SocketAddr::from(([203, 0, 113, 9], 4242))))
    }

    fn invite_request(body: &str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri("/invite")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_homepage_renders_team_and_counts() {
        let state = test_state(
            MockWorkspaceClient::new(),
            ScriptedVerifier::always(Verdict::Valid),
        )
        .await;
        let metrics = state.metrics.clone();

        let response = router(state)
            .oneshot(HttpRequest::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("Gophers"));
        assert!(body.contains("site-key-123"));
        assert!(body.contains("42"));
        assert_eq!(metrics.requests.value(), 1);
    }

    #[tokio::test]
    async fn test_invite_missing_email_is_precondition_failed() {
        let state = test_state(
            MockWorkspaceClient::new(),
            ScriptedVerifier::always(Verdict::Valid),
        )
        .await;

        let response = router(state)
            .oneshot(invite_request("fname=Go&lname=Pher&coc=1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
        assert_eq!(body_string(response).await, "Missing email");
    }

    #[tokio::test]
    async fn test_invite_invalid_captcha_is_precondition_failed() {
        let state = test_state(
            MockWorkspaceClient::new(),
            ScriptedVerifier::always(Verdict::Invalid),
        )
        .await;

        let response = router(state)
            .oneshot(invite_request(
                "fname=Go&lname=Pher&email=g%40example.com&coc=1&g-recaptcha-response=tok",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
        assert_eq!(body_string(response).await, "Invalid captcha");
    }

    #[tokio::test]
    async fn test_invite_success() {
        let state = test_state(
            MockWorkspaceClient::new().push_invite(Ok(())),
            ScriptedVerifier::always(Verdict::Valid),
        )
        .await;
        let metrics = state.metrics.clone();

        let response = router(state)
            .oneshot(invite_request(
                "fname=Go&lname=Pher&email=g%40example.com&coc=1&g-recaptcha-response=tok",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(metrics.successful_invites.value(), 1);
    }

    #[tokio::test]
    async fn test_invite_rejection_does_not_leak_cause() {
        let state = test_state(
            MockWorkspaceClient::new()
                .push_invite(Err(ApiError::Slack("already_in_team".into()))),
            ScriptedVerifier::always(Verdict::Valid),
        )
        .await;

        let response = router(state)
            .oneshot(invite_request(
                "fname=Go&lname=Pher&email=g%40example.com&coc=1&g-recaptcha-response=tok",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_string(response).await;
        assert!(!body.contains("already_in_team"));
    }

    #[tokio::test]
    async fn test_invite_rejects_get() {
        let state = test_state(
            MockWorkspaceClient::new(),
            ScriptedVerifier::always(Verdict::Valid),
        )
        .await;

        let response = router(state)
            .oneshot(HttpRequest::get("/invite").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_badge_shows_active_over_total() {
        let state = test_state(
            MockWorkspaceClient::new(),
            ScriptedVerifier::always(Verdict::Valid),
        )
        .await;

        let response = router(state)
            .oneshot(HttpRequest::get("/badge.svg").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "image/svg+xml; charset=utf-8"
        );
        assert!(body_string(response).await.contains(">7/42</text>"));
    }

    #[tokio::test]
    async fn test_badge_with_no_active_members() {
        let state = test_state(
            MockWorkspaceClient::new(),
            ScriptedVerifier::always(Verdict::Valid),
        )
        .await;
        state.team.set_counts(42, 0);

        let response = router(state)
            .oneshot(HttpRequest::get("/badge.svg").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = body_string(response).await;
        assert!(body.contains(">42</text>"));
        assert!(!body.contains("/42"));
    }

    #[tokio::test]
    async fn test_metrics_exposition() {
        let state = test_state(
            MockWorkspaceClient::new(),
            ScriptedVerifier::always(Verdict::Valid),
        )
        .await;
        state.metrics.successful_invites.incr();

        let response = router(state)
            .oneshot(HttpRequest::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["successful_invites"], 1);
        assert_eq!(body["user_count"], 42);
        assert_eq!(body["active_user_count"], 7);
    }

    #[tokio::test]
    async fn test_https_redirect_when_enforced() {
        let mut state = test_state(
            MockWorkspaceClient::new(),
            ScriptedVerifier::always(Verdict::Valid),
        )
        .await;
        state.site.enforce_https = true;

        let response = router(state)
            .oneshot(
                HttpRequest::get("/")
                    .header("x-forwarded-proto", "http")
                    .header(header::HOST, "invite.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://invite.example.com/"
        );
    }

    #[tokio::test]
    async fn test_https_passthrough_when_already_secure() {
        let mut state = test_state(
            MockWorkspaceClient::new(),
            ScriptedVerifier::always(Verdict::Valid),
        )
        .await;
        state.site.enforce_https = true;

        let response = router(state)
            .oneshot(
                HttpRequest::get("/")
                    .header("x-forwarded-proto", "https")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
