// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Web entry points for OAuth onboarding.
//!
//! Three routes: `GET /` answers with the agent name, `GET /auth` sends
//! the operator to the instance's consent screen, and `GET /auth/callback`
//! completes the code exchange. Failures never leak detail to the remote
//! caller; they are logged and answered with a redirect to `/`.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use fedibot_core::FedibotError;
use fedibot_engine::AuthFlow;
use serde::Deserialize;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct ServeState {
    pub auth: Arc<AuthFlow>,
    pub agent_name: String,
    pub redirect_uri: String,
}

pub fn router(state: ServeState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/auth", get(auth_start))
        .route("/auth/callback", get(auth_callback))
        .with_state(state)
}

/// Serve the onboarding routes until the process is stopped.
pub async fn run(state: ServeState, host: &str, port: u16) -> Result<(), FedibotError> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .map_err(|e| FedibotError::Internal(format!("failed to bind {host}:{port}: {e}")))?;
    info!(host, port, "serving auth entry points");
    axum::serve(listener, app)
        .await
        .map_err(|e| FedibotError::Internal(format!("server error: {e}")))
}

async fn root(State(state): State<ServeState>) -> String {
    state.agent_name.clone()
}

async fn auth_start(State(state): State<ServeState>) -> Response {
    match state.auth.authorize_start(&state.redirect_uri).await {
        Ok(url) => Redirect::temporary(&url).into_response(),
        Err(FedibotError::TokenAlreadyExists) => {
            warn!("authorization requested but onboarding is already complete");
            Redirect::temporary("/").into_response()
        }
        Err(e) => {
            error!(error = %e, "authorization start failed");
            Redirect::temporary("/").into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
}

async fn auth_callback(
    State(state): State<ServeState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let Some(code) = params.code else {
        warn!("callback hit without a code parameter");
        return Redirect::temporary("/").into_response();
    };

    match state.auth.create_token(&code, &state.redirect_uri).await {
        Ok(_) => "success".into_response(),
        Err(e) => {
            error!(error = %e, "token exchange failed");
            Redirect::temporary("/").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use fedibot_core::{AccessToken, AppRegistration, Credentials, NewStatus, Notification, SinceQuery, SocialApi, Status};
    use fedibot_store::{AppStore, Database, TokenStore};

    struct StubApi;

    #[async_trait::async_trait]
    impl SocialApi for StubApi {
        async fn register_app(&self, _: &str) -> Result<AppRegistration, FedibotError> {
            Ok(AppRegistration {
                client_id: "cid".into(),
                client_secret: "secret".into(),
                id: None,
                name: None,
                redirect_uri: None,
                vapid_key: None,
                website: None,
            })
        }

        fn authorize_url(&self, app: &AppRegistration, redirect_uri: &str) -> String {
            format!("https://m.example/oauth/authorize?client_id={}&redirect_uri={redirect_uri}", app.client_id)
        }

        async fn obtain_token(
            &self,
            _: &AppRegistration,
            _: &str,
            _: &str,
        ) -> Result<AccessToken, FedibotError> {
            Ok(AccessToken {
                access_token: "fresh".into(),
                token_type: "Bearer".into(),
                scope: "read write follow".into(),
                created_at: None,
            })
        }

        async fn verify_credentials(&self, _: &AccessToken) -> Result<Credentials, FedibotError> {
            unimplemented!("not used by the web entry points")
        }

        async fn notifications(
            &self,
            _: &AccessToken,
            _: &SinceQuery,
        ) -> Result<Vec<Notification>, FedibotError> {
            unimplemented!("not used by the web entry points")
        }

        async fn home_timeline(
            &self,
            _: &AccessToken,
            _: &SinceQuery,
        ) -> Result<Vec<Status>, FedibotError> {
            unimplemented!("not used by the web entry points")
        }

        async fn status(&self, _: &AccessToken, _: &str) -> Result<Status, FedibotError> {
            unimplemented!("not used by the web entry points")
        }

        async fn post_status(&self, _: &AccessToken, _: &NewStatus) -> Result<Status, FedibotError> {
            unimplemented!("not used by the web entry points")
        }

        async fn follow(&self, _: &AccessToken, _: &str) -> Result<(), FedibotError> {
            unimplemented!("not used by the web entry points")
        }

        async fn favourite(&self, _: &AccessToken, _: &str) -> Result<(), FedibotError> {
            unimplemented!("not used by the web entry points")
        }
    }

    async fn state() -> ServeState {
        let db = Arc::new(Database::open_in_memory().await.unwrap());
        let auth = AuthFlow::new(
            Arc::new(StubApi),
            AppStore::new(Arc::clone(&db), "m.example"),
            TokenStore::new(db, "m.example"),
        );
        ServeState {
            auth: Arc::new(auth),
            agent_name: "luna".into(),
            redirect_uri: "https://bot.example/auth/callback".into(),
        }
    }

    fn location(response: &Response) -> Option<String> {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }

    #[tokio::test]
    async fn root_answers_with_agent_name() {
        let body = root(State(state().await)).await;
        assert_eq!(body, "luna");
    }

    #[tokio::test]
    async fn auth_redirects_to_consent_screen() {
        let response = auth_start(State(state().await)).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        let target = location(&response).unwrap();
        assert!(target.starts_with("https://m.example/oauth/authorize"));
    }

    #[tokio::test]
    async fn completed_onboarding_redirects_home() {
        let state = state().await;
        state
            .auth
            .create_token("code", &state.redirect_uri)
            .await
            .ok();
        // App is missing, so seed it first and exchange for real.
        state.auth.authorize_start(&state.redirect_uri).await.ok();
        state
            .auth
            .create_token("code", &state.redirect_uri)
            .await
            .unwrap();

        let response = auth_start(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response).as_deref(), Some("/"));
    }

    #[tokio::test]
    async fn callback_exchanges_code_for_success() {
        let state = state().await;
        state.auth.authorize_start(&state.redirect_uri).await.unwrap();

        let response = auth_callback(
            State(state),
            Query(CallbackParams {
                code: Some("one-time".into()),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn callback_without_code_redirects_home() {
        let response = auth_callback(State(state().await), Query(CallbackParams { code: None })).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response).as_deref(), Some("/"));
    }

    #[tokio::test]
    async fn callback_failure_hides_detail() {
        // No app registration stored: the exchange fails with AppNotFound,
        // but the caller only sees a redirect.
        let response = auth_callback(
            State(state().await),
            Query(CallbackParams {
                code: Some("one-time".into()),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response).as_deref(), Some("/"));
    }
}
