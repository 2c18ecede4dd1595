// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for the [`SocialApi`] and [`DecisionService`] seams.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use fedibot_core::{
    AccessToken, AppRegistration, Credentials, FedibotError, NewStatus, Notification, SinceQuery,
    SocialApi, Status,
};

use crate::generator::{ConversationMessage, DecisionService, Evaluation, PlannedAction, TimelineMessage};

/// One recorded side effect against the fake social API.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    RegisterApp,
    ObtainToken,
    VerifyCredentials,
    Notifications {
        since_id: Option<String>,
        limit: Option<u32>,
    },
    Timeline {
        since_id: Option<String>,
        limit: Option<u32>,
    },
    StatusFetch(String),
    Post {
        status: String,
        in_reply_to_id: Option<String>,
    },
    Follow(String),
    Favourite(String),
}

#[derive(Default)]
pub struct FakeSocialApi {
    pub notification_pages: Mutex<VecDeque<Vec<Notification>>>,
    pub timeline_pages: Mutex<VecDeque<Vec<Status>>>,
    pub statuses: Mutex<HashMap<String, Status>>,
    pub calls: Mutex<Vec<Call>>,
    /// Posts whose body contains this marker fail with an API error.
    pub fail_post_containing: Mutex<Option<String>>,
}

impl FakeSocialApi {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Post { status, .. } => Some(status),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn account(id: &str, acct: &str) -> fedibot_core::Account {
    fedibot_core::Account {
        id: id.to_string(),
        username: acct.split('@').next().unwrap_or(acct).to_string(),
        acct: acct.to_string(),
    }
}

pub fn status(id: &str, acct: &str, content: &str) -> Status {
    Status {
        id: id.to_string(),
        uri: None,
        url: None,
        in_reply_to_id: None,
        in_reply_to_account_id: None,
        account: account(&format!("acct-{acct}"), acct),
        content: content.to_string(),
        mentions: Vec::new(),
        text: None,
        reblog: None,
    }
}

pub fn token() -> AccessToken {
    AccessToken {
        access_token: "tok".into(),
        token_type: "Bearer".into(),
        scope: "read write follow".into(),
        created_at: None,
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        id: "self-id".into(),
        username: "luna".into(),
        acct: "luna".into(),
    }
}

#[async_trait]
impl SocialApi for FakeSocialApi {
    async fn register_app(&self, _redirect_uri: &str) -> Result<AppRegistration, FedibotError> {
        self.record(Call::RegisterApp);
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
        format!(
            "https://fake.example/oauth/authorize?client_id={}&redirect_uri={redirect_uri}",
            app.client_id
        )
    }

    async fn obtain_token(
        &self,
        _app: &AppRegistration,
        _code: &str,
        _redirect_uri: &str,
    ) -> Result<AccessToken, FedibotError> {
        self.record(Call::ObtainToken);
        Ok(AccessToken {
            access_token: "fresh".into(),
            token_type: "Bearer".into(),
            scope: "read write follow".into(),
            created_at: Some(1700000000),
        })
    }

    async fn verify_credentials(&self, _token: &AccessToken) -> Result<Credentials, FedibotError> {
        self.record(Call::VerifyCredentials);
        Ok(credentials())
    }

    async fn notifications(
        &self,
        _token: &AccessToken,
        query: &SinceQuery,
    ) -> Result<Vec<Notification>, FedibotError> {
        self.record(Call::Notifications {
            since_id: query.since_id.clone(),
            limit: query.limit,
        });
        Ok(self
            .notification_pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn home_timeline(
        &self,
        _token: &AccessToken,
        query: &SinceQuery,
    ) -> Result<Vec<Status>, FedibotError> {
        self.record(Call::Timeline {
            since_id: query.since_id.clone(),
            limit: query.limit,
        });
        Ok(self
            .timeline_pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn status(&self, _token: &AccessToken, id: &str) -> Result<Status, FedibotError> {
        self.record(Call::StatusFetch(id.to_string()));
        self.statuses
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| FedibotError::Api {
                message: format!("status {id} not found"),
                source: None,
            })
    }

    async fn post_status(
        &self,
        _token: &AccessToken,
        new_status: &NewStatus,
    ) -> Result<Status, FedibotError> {
        if let Some(marker) = self.fail_post_containing.lock().unwrap().as_deref()
            && new_status.status.contains(marker)
        {
            return Err(FedibotError::Api {
                message: "post rejected".into(),
                source: None,
            });
        }
        self.record(Call::Post {
            status: new_status.status.clone(),
            in_reply_to_id: new_status.in_reply_to_id.clone(),
        });
        Ok(status("posted", "luna", &new_status.status))
    }

    async fn follow(&self, _token: &AccessToken, account_id: &str) -> Result<(), FedibotError> {
        self.record(Call::Follow(account_id.to_string()));
        Ok(())
    }

    async fn favourite(&self, _token: &AccessToken, status_id: &str) -> Result<(), FedibotError> {
        self.record(Call::Favourite(status_id.to_string()));
        Ok(())
    }
}

/// Deterministic decision service. Replies and approaches are generated for
/// everything except messages containing `[skip]`, which simulate a
/// generation miss.
#[derive(Default)]
pub struct FakeDecisions {
    pub evaluations: Mutex<Vec<Evaluation>>,
    pub evaluate_requests: Mutex<Vec<Vec<TimelineMessage>>>,
    pub evaluation_fails: bool,
    pub planned: Mutex<Option<PlannedAction>>,
}

#[async_trait]
impl DecisionService for FakeDecisions {
    fn greeting(&self) -> String {
        "thanks for the follow!".into()
    }

    async fn reply(
        &self,
        _own_username: &str,
        history: &[ConversationMessage],
    ) -> Result<Option<String>, FedibotError> {
        let skip = history
            .last()
            .is_some_and(|m| m.message.contains("[skip]"));
        Ok((!skip).then(|| "generated reply".to_string()))
    }

    async fn evaluate_timeline(
        &self,
        messages: &[TimelineMessage],
    ) -> Result<Vec<Evaluation>, FedibotError> {
        self.evaluate_requests
            .lock()
            .unwrap()
            .push(messages.to_vec());
        if self.evaluation_fails {
            return Err(FedibotError::Generation {
                message: "evaluation failed".into(),
                source: None,
            });
        }
        Ok(self.evaluations.lock().unwrap().clone())
    }

    async fn approach(&self, message: &str) -> Result<Option<String>, FedibotError> {
        Ok((!message.contains("[skip]")).then(|| "generated approach".to_string()))
    }

    async fn plan_action(
        &self,
        _now: &str,
        _history: &[fedibot_store::LifeState],
    ) -> Result<Option<PlannedAction>, FedibotError> {
        Ok(self.planned.lock().unwrap().clone())
    }
}
