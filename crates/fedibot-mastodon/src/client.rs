// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Mastodon REST API.
//!
//! One [`MastodonClient`] per deployment, pointed at a single instance
//! domain. All list endpoints go through [`MastodonClient::list_get`] so
//! `Link` pagination headers are parsed uniformly.

use std::time::Duration;

use async_trait::async_trait;
use fedibot_core::{
    AccessToken, AppRegistration, Credentials, FedibotError, NewStatus, Notification, SinceQuery,
    SocialApi, Status,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::pagination::PageLinks;

/// OAuth scopes requested at registration and token exchange.
const APP_SCOPE: &str = "read write follow";

/// Client for a single Mastodon instance.
#[derive(Debug, Clone)]
pub struct MastodonClient {
    http: reqwest::Client,
    base_url: String,
    app_name: String,
}

impl MastodonClient {
    /// Creates a client for `https://<domain>`.
    pub fn new(domain: &str, app_name: &str) -> Result<Self, FedibotError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FedibotError::Api {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            http,
            base_url: format!("https://{domain}"),
            app_name: app_name.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, FedibotError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| FedibotError::Api {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        if !status.is_success() {
            return Err(FedibotError::Api {
                message: format!("mastodon returned {status}: {body}"),
                source: None,
            });
        }
        serde_json::from_str(&body).map_err(|e| FedibotError::Api {
            message: format!("failed to parse mastodon response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    async fn check_status(response: reqwest::Response) -> Result<(), FedibotError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(FedibotError::Api {
            message: format!("mastodon returned {status}: {body}"),
            source: None,
        })
    }

    /// GET a list endpoint, parsing the `Link` pagination header alongside
    /// the body.
    async fn list_get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &AccessToken,
        query: &SinceQuery,
    ) -> Result<(Vec<T>, PageLinks), FedibotError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(since_id) = &query.since_id {
            params.push(("since_id", since_id.clone()));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }

        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&token.access_token)
            .query(&params)
            .send()
            .await
            .map_err(|e| FedibotError::Api {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let links = response
            .headers()
            .get("link")
            .and_then(|v| v.to_str().ok())
            .map(PageLinks::parse)
            .unwrap_or_default();

        let items: Vec<T> = Self::read_json(response).await?;
        debug!(
            path,
            count = items.len(),
            has_next = links.next.is_some(),
            "list fetched"
        );
        Ok((items, links))
    }
}

#[async_trait]
impl SocialApi for MastodonClient {
    async fn register_app(&self, redirect_uri: &str) -> Result<AppRegistration, FedibotError> {
        let response = self
            .http
            .post(self.url("/api/v1/apps"))
            .form(&[
                ("client_name", self.app_name.as_str()),
                ("redirect_uris", redirect_uri),
                ("scope", APP_SCOPE),
            ])
            .send()
            .await
            .map_err(|e| FedibotError::Api {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        Self::read_json(response).await
    }

    fn authorize_url(&self, app: &AppRegistration, redirect_uri: &str) -> String {
        // base_url is constructed from a validated hostname, so parsing it
        // back cannot fail.
        let mut url = Url::parse(&format!("{}/oauth/authorize", self.base_url))
            .unwrap_or_else(|_| Url::parse("https://invalid.invalid/oauth/authorize").unwrap());
        url.query_pairs_mut()
            .append_pair("client_id", &app.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", APP_SCOPE);
        url.to_string()
    }

    async fn obtain_token(
        &self,
        app: &AppRegistration,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AccessToken, FedibotError> {
        let response = self
            .http
            .post(self.url("/oauth/token"))
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", app.client_id.as_str()),
                ("client_secret", app.client_secret.as_str()),
                ("code", code),
                ("scope", APP_SCOPE),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| FedibotError::Api {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        Self::read_json(response).await
    }

    async fn verify_credentials(&self, token: &AccessToken) -> Result<Credentials, FedibotError> {
        let response = self
            .http
            .get(self.url("/api/v1/accounts/verify_credentials"))
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| FedibotError::Api {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        Self::read_json(response).await
    }

    async fn notifications(
        &self,
        token: &AccessToken,
        query: &SinceQuery,
    ) -> Result<Vec<Notification>, FedibotError> {
        let (items, _links) = self.list_get("/api/v1/notifications", token, query).await?;
        Ok(items)
    }

    async fn home_timeline(
        &self,
        token: &AccessToken,
        query: &SinceQuery,
    ) -> Result<Vec<Status>, FedibotError> {
        let (items, _links) = self.list_get("/api/v1/timelines/home", token, query).await?;
        Ok(items)
    }

    async fn status(&self, token: &AccessToken, id: &str) -> Result<Status, FedibotError> {
        let response = self
            .http
            .get(self.url(&format!("/api/v1/statuses/{id}")))
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| FedibotError::Api {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        Self::read_json(response).await
    }

    async fn post_status(
        &self,
        token: &AccessToken,
        new_status: &NewStatus,
    ) -> Result<Status, FedibotError> {
        let mut form: Vec<(&str, &str)> = vec![
            ("status", new_status.status.as_str()),
            ("visibility", "public"),
        ];
        if let Some(reply_to) = &new_status.in_reply_to_id {
            form.push(("in_reply_to_id", reply_to.as_str()));
        }

        let response = self
            .http
            .post(self.url("/api/v1/statuses"))
            .bearer_auth(&token.access_token)
            .form(&form)
            .send()
            .await
            .map_err(|e| FedibotError::Api {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        Self::read_json(response).await
    }

    async fn follow(&self, token: &AccessToken, account_id: &str) -> Result<(), FedibotError> {
        let response = self
            .http
            .post(self.url(&format!("/api/v1/accounts/{account_id}/follow")))
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| FedibotError::Api {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        Self::check_status(response).await
    }

    async fn favourite(&self, token: &AccessToken, status_id: &str) -> Result<(), FedibotError> {
        let response = self
            .http
            .post(self.url(&format!("/api/v1/statuses/{status_id}/favourite")))
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| FedibotError::Api {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        Self::check_status(response).await
    }
}
