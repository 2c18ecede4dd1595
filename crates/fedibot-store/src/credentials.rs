// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Create-once persistence for OAuth app registrations and access tokens.
//!
//! Both records are written with a conditional insert. A corrupt stored
//! record fails the load rather than being silently re-registered; losing
//! a client secret or token is an operator problem, not a recoverable one.

use fedibot_core::{AccessToken, AppRegistration, FedibotError};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::database::Database;
use crate::kv::{KvItem, KvStore};

fn to_payload<T: Serialize>(value: &T) -> Result<serde_json::Value, FedibotError> {
    serde_json::to_value(value).map_err(|e| FedibotError::Store {
        source: Box::new(e),
    })
}

fn from_payload<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T, FedibotError> {
    serde_json::from_value(payload).map_err(|e| FedibotError::Store {
        source: Box::new(e),
    })
}

/// Store for the per-instance OAuth app registration.
pub struct AppStore {
    db: Arc<Database>,
    domain: String,
}

impl AppStore {
    pub fn new(db: Arc<Database>, domain: impl Into<String>) -> Self {
        Self {
            db,
            domain: domain.into(),
        }
    }

    fn pk(&self) -> String {
        format!("app#{}", self.domain)
    }

    pub async fn find(&self) -> Result<Option<AppRegistration>, FedibotError> {
        let kv = KvStore::new(&self.db);
        match kv.get(&self.pk(), "#").await? {
            Some(item) => Ok(Some(from_payload(item.payload)?)),
            None => Ok(None),
        }
    }

    /// Persist the registration, failing with [`FedibotError::AlreadyExists`]
    /// if one is already stored for this domain.
    pub async fn save(&self, app: &AppRegistration) -> Result<(), FedibotError> {
        let kv = KvStore::new(&self.db);
        kv.put_if_absent(KvItem {
            pk: self.pk(),
            sk: "#".to_string(),
            payload: to_payload(app)?,
            expire_at: None,
        })
        .await?;
        info!(domain = %self.domain, "app registration persisted");
        Ok(())
    }
}

/// Store for the per-instance OAuth access token.
pub struct TokenStore {
    db: Arc<Database>,
    domain: String,
}

impl TokenStore {
    pub fn new(db: Arc<Database>, domain: impl Into<String>) -> Self {
        Self {
            db,
            domain: domain.into(),
        }
    }

    fn pk(&self) -> String {
        format!("app#{}#token", self.domain)
    }

    pub async fn find(&self) -> Result<Option<AccessToken>, FedibotError> {
        let kv = KvStore::new(&self.db);
        match kv.get(&self.pk(), "#").await? {
            Some(item) => Ok(Some(from_payload(item.payload)?)),
            None => Ok(None),
        }
    }

    /// Persist the token, failing with [`FedibotError::AlreadyExists`] if one
    /// is already stored for this domain.
    pub async fn save(&self, token: &AccessToken) -> Result<(), FedibotError> {
        let kv = KvStore::new(&self.db);
        kv.put_if_absent(KvItem {
            pk: self.pk(),
            sk: "#".to_string(),
            payload: to_payload(token)?,
            expire_at: None,
        })
        .await?;
        info!(domain = %self.domain, "access token persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> AppRegistration {
        AppRegistration {
            client_id: "cid".into(),
            client_secret: "secret".into(),
            id: Some("1".into()),
            name: Some("fedibot".into()),
            redirect_uri: Some("urn:ietf:wg:oauth:2.0:oob".into()),
            vapid_key: None,
            website: None,
        }
    }

    fn token() -> AccessToken {
        AccessToken {
            access_token: "tok".into(),
            token_type: "Bearer".into(),
            scope: "read write follow".into(),
            created_at: Some(1700000000),
        }
    }

    async fn db() -> Arc<Database> {
        Arc::new(Database::open_in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn app_save_then_find_roundtrips() {
        let apps = AppStore::new(db().await, "mastodon.example");
        assert!(apps.find().await.unwrap().is_none());
        apps.save(&registration()).await.unwrap();
        assert_eq!(apps.find().await.unwrap().unwrap().client_id, "cid");
    }

    #[tokio::test]
    async fn app_save_is_create_once() {
        let apps = AppStore::new(db().await, "mastodon.example");
        apps.save(&registration()).await.unwrap();
        let mut second = registration();
        second.client_id = "other".into();
        let err = apps.save(&second).await.unwrap_err();
        assert!(matches!(err, FedibotError::AlreadyExists { .. }));
        assert_eq!(apps.find().await.unwrap().unwrap().client_id, "cid");
    }

    #[tokio::test]
    async fn token_save_is_create_once() {
        let tokens = TokenStore::new(db().await, "mastodon.example");
        tokens.save(&token()).await.unwrap();
        let err = tokens.save(&token()).await.unwrap_err();
        assert!(matches!(err, FedibotError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn app_and_token_keys_are_disjoint() {
        let db = db().await;
        let apps = AppStore::new(Arc::clone(&db), "mastodon.example");
        let tokens = TokenStore::new(Arc::clone(&db), "mastodon.example");
        apps.save(&registration()).await.unwrap();
        // No token yet, even though the app row exists.
        assert!(tokens.find().await.unwrap().is_none());
        tokens.save(&token()).await.unwrap();
        assert_eq!(tokens.find().await.unwrap().unwrap().access_token, "tok");
    }

    #[tokio::test]
    async fn corrupt_record_fails_the_load() {
        let db = db().await;
        let kv = KvStore::new(&db);
        kv.put(KvItem {
            pk: "app#mastodon.example#token".into(),
            sk: "#".into(),
            payload: serde_json::json!({"not_a_token": true}),
            expire_at: None,
        })
        .await
        .unwrap();

        let tokens = TokenStore::new(Arc::clone(&db), "mastodon.example");
        assert!(matches!(
            tokens.find().await.unwrap_err(),
            FedibotError::Store { .. }
        ));
    }
}
