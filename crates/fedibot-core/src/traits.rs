// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The remote social API seam.
//!
//! The stream processors and the auth flow only ever talk to the network
//! through [`SocialApi`], so tests can substitute a fake that replays a
//! fixed item history or fails on demand.

use async_trait::async_trait;

use crate::error::FedibotError;
use crate::types::{
    AccessToken, AppRegistration, Credentials, NewStatus, Notification, SinceQuery, Status,
};

/// Typed surface of the remote social network's REST API.
///
/// Errors from these calls are unexpected (network/HTTP failures) and
/// propagate, aborting the remainder of the current batch; the caller's
/// cursor is still committed up to the last fully processed item.
#[async_trait]
pub trait SocialApi: Send + Sync {
    /// `POST /api/v1/apps`: register the OAuth app.
    async fn register_app(&self, redirect_uri: &str) -> Result<AppRegistration, FedibotError>;

    /// Build the `GET /oauth/authorize` consent URL the end user must visit.
    fn authorize_url(&self, app: &AppRegistration, redirect_uri: &str) -> String;

    /// `POST /oauth/token`: exchange a one-time code for an access token.
    async fn obtain_token(
        &self,
        app: &AppRegistration,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AccessToken, FedibotError>;

    /// `GET /api/v1/accounts/verify_credentials`.
    async fn verify_credentials(&self, token: &AccessToken) -> Result<Credentials, FedibotError>;

    /// `GET /api/v1/notifications`, newest first.
    async fn notifications(
        &self,
        token: &AccessToken,
        query: &SinceQuery,
    ) -> Result<Vec<Notification>, FedibotError>;

    /// `GET /api/v1/timelines/home`, newest first.
    async fn home_timeline(
        &self,
        token: &AccessToken,
        query: &SinceQuery,
    ) -> Result<Vec<Status>, FedibotError>;

    /// `GET /api/v1/statuses/{id}`.
    async fn status(&self, token: &AccessToken, id: &str) -> Result<Status, FedibotError>;

    /// `POST /api/v1/statuses` with public visibility.
    async fn post_status(
        &self,
        token: &AccessToken,
        new_status: &NewStatus,
    ) -> Result<Status, FedibotError>;

    /// `POST /api/v1/accounts/{id}/follow`.
    async fn follow(&self, token: &AccessToken, account_id: &str) -> Result<(), FedibotError>;

    /// `POST /api/v1/statuses/{id}/favourite`.
    async fn favourite(&self, token: &AccessToken, status_id: &str) -> Result<(), FedibotError>;
}
