// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OAuth onboarding state machine.
//!
//! The flow runs exactly once per deployment: registration and token are
//! create-once records, and a stored token short-circuits every later
//! call. Reaching for the consent screen again after onboarding is a
//! conflict, not a refresh.

use std::sync::Arc;

use fedibot_core::{AccessToken, FedibotError, SocialApi};
use fedibot_store::{AppStore, TokenStore};
use tracing::info;

pub struct AuthFlow {
    api: Arc<dyn SocialApi>,
    apps: AppStore,
    tokens: TokenStore,
}

impl AuthFlow {
    pub fn new(api: Arc<dyn SocialApi>, apps: AppStore, tokens: TokenStore) -> Self {
        Self { api, apps, tokens }
    }

    /// Begin authorization: ensure an app registration exists and return
    /// the consent URL the operator must visit.
    ///
    /// Fails with [`FedibotError::TokenAlreadyExists`] once onboarding has
    /// completed.
    pub async fn authorize_start(&self, redirect_uri: &str) -> Result<String, FedibotError> {
        if self.tokens.find().await?.is_some() {
            return Err(FedibotError::TokenAlreadyExists);
        }

        let app = match self.apps.find().await? {
            Some(app) => app,
            None => {
                let app = self.api.register_app(redirect_uri).await?;
                self.apps.save(&app).await?;
                info!("app registered with remote instance");
                app
            }
        };

        Ok(self.api.authorize_url(&app, redirect_uri))
    }

    /// Exchange the one-time consent code for an access token.
    ///
    /// Idempotent: a stored token is returned without calling the remote
    /// endpoint, so a replayed callback cannot burn the deployment's only
    /// code exchange.
    pub async fn create_token(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AccessToken, FedibotError> {
        if let Some(existing) = self.tokens.find().await? {
            return Ok(existing);
        }

        let Some(app) = self.apps.find().await? else {
            return Err(FedibotError::AppNotFound);
        };

        let token = self.api.obtain_token(&app, code, redirect_uri).await?;
        self.tokens.save(&token).await?;
        info!("access token obtained and persisted");
        Ok(token)
    }
}
