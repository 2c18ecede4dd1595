// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One scheduled agent run.
//!
//! Loads the stored token (absence is a normal pre-onboarding condition,
//! not an error), resolves the agent's own identity, then runs the
//! notification and timeline processors concurrently. Each processor's
//! outcome is logged on its own; a failure in one never cancels the other.

use std::sync::Arc;

use fedibot_core::{FedibotError, SocialApi};
use fedibot_store::TokenStore;
use tracing::{error, info};

use crate::notifications::NotificationProcessor;
use crate::timeline::TimelineProcessor;

pub struct BatchRunner {
    api: Arc<dyn SocialApi>,
    tokens: TokenStore,
    notifications: NotificationProcessor,
    timeline: TimelineProcessor,
}

impl BatchRunner {
    pub fn new(
        api: Arc<dyn SocialApi>,
        tokens: TokenStore,
        notifications: NotificationProcessor,
        timeline: TimelineProcessor,
    ) -> Self {
        Self {
            api,
            tokens,
            notifications,
            timeline,
        }
    }

    /// Run both stream processors once.
    ///
    /// Returns the first processor error after both have finished; partial
    /// progress (cursors, posts) from either side is already durable.
    pub async fn run(&self) -> Result<(), FedibotError> {
        let Some(token) = self.tokens.find().await? else {
            info!("no access token stored; complete authorization first");
            return Ok(());
        };

        let credentials = self.api.verify_credentials(&token).await?;
        info!(acct = %credentials.acct, "running batch");

        let (notification_result, timeline_result) = tokio::join!(
            self.notifications.run(&token, &credentials),
            self.timeline.run(&token, &credentials),
        );

        match &notification_result {
            Ok(()) => info!("notification batch finished"),
            Err(e) => error!(error = %e, "notification batch failed"),
        }
        match &timeline_result {
            Ok(()) => info!("timeline batch finished"),
            Err(e) => error!(error = %e, "timeline batch failed"),
        }

        notification_result.and(timeline_result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{status, token, Call, FakeDecisions, FakeSocialApi};
    use crate::generator::DecisionService;
    use fedibot_store::{CursorStore, Database, Stream};

    async fn runner(api: Arc<FakeSocialApi>, with_token: bool) -> (BatchRunner, Arc<CursorStore>) {
        let db = Arc::new(Database::open_in_memory().await.unwrap());
        let tokens = TokenStore::new(Arc::clone(&db), "mastodon.example");
        if with_token {
            tokens.save(&token()).await.unwrap();
        }
        let cursors = Arc::new(CursorStore::new(Arc::clone(&db), "mastodon.example"));
        let decisions: Arc<dyn DecisionService> = Arc::new(FakeDecisions::default());
        let notifications = NotificationProcessor::new(
            Arc::clone(&api) as Arc<dyn SocialApi>,
            Arc::clone(&decisions),
            Arc::clone(&cursors),
            80,
        );
        let timeline = TimelineProcessor::new(
            Arc::clone(&api) as Arc<dyn SocialApi>,
            Arc::clone(&decisions),
            Arc::clone(&cursors),
            20,
        );
        (
            BatchRunner::new(api, tokens, notifications, timeline),
            cursors,
        )
    }

    #[tokio::test]
    async fn missing_token_skips_the_batch_quietly() {
        let api = Arc::new(FakeSocialApi::default());
        let (runner, _) = runner(Arc::clone(&api), false).await;

        runner.run().await.unwrap();
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn both_streams_run_in_one_batch() {
        let api = Arc::new(FakeSocialApi::default());
        // Both streams unseeded: each seeds from its newest item.
        api.notification_pages.lock().unwrap().push_back(vec![]);
        api.timeline_pages
            .lock()
            .unwrap()
            .push_back(vec![status("900", "ada", "<p>x</p>")]);
        let (runner, cursors) = runner(Arc::clone(&api), true).await;

        runner.run().await.unwrap();

        let calls = api.calls();
        assert!(calls.contains(&Call::VerifyCredentials));
        assert!(calls
            .iter()
            .any(|c| matches!(c, Call::Notifications { .. })));
        assert!(calls.iter().any(|c| matches!(c, Call::Timeline { .. })));
        assert_eq!(
            cursors.find(Stream::Timeline).await.unwrap().as_deref(),
            Some("900")
        );
    }

    #[tokio::test]
    async fn timeline_failure_does_not_stop_notifications() {
        let api = Arc::new(FakeSocialApi::default());
        // Notifications: one follow to process. Timeline: evaluation fails.
        api.notification_pages
            .lock()
            .unwrap()
            .push_back(vec![fedibot_core::Notification {
                id: "10".into(),
                created_at: None,
                kind: fedibot_core::NotificationKind::Follow {
                    account: crate::fakes::account("7", "ada"),
                },
            }]);
        api.timeline_pages
            .lock()
            .unwrap()
            .push_back(vec![status("30", "bob", "<p>x</p>")]);

        let db = Arc::new(Database::open_in_memory().await.unwrap());
        let tokens = TokenStore::new(Arc::clone(&db), "mastodon.example");
        tokens.save(&token()).await.unwrap();
        let cursors = Arc::new(CursorStore::new(Arc::clone(&db), "mastodon.example"));
        cursors.save(Stream::Notifications, "5").await.unwrap();
        cursors.save(Stream::Timeline, "5").await.unwrap();

        let failing: Arc<dyn DecisionService> = Arc::new(FakeDecisions {
            evaluation_fails: true,
            ..Default::default()
        });
        let notifications = NotificationProcessor::new(
            Arc::clone(&api) as Arc<dyn SocialApi>,
            Arc::clone(&failing),
            Arc::clone(&cursors),
            80,
        );
        let timeline = TimelineProcessor::new(
            Arc::clone(&api) as Arc<dyn SocialApi>,
            failing,
            Arc::clone(&cursors),
            20,
        );
        let runner = BatchRunner::new(Arc::clone(&api) as Arc<dyn SocialApi>, tokens, notifications, timeline);

        let err = runner.run().await.unwrap_err();
        assert!(matches!(err, FedibotError::Generation { .. }));

        // The notification side still completed and committed its cursor.
        assert!(api.calls().contains(&Call::Follow("7".into())));
        assert_eq!(
            cursors.find(Stream::Notifications).await.unwrap().as_deref(),
            Some("10")
        );
        // The timeline cursor did not move.
        assert_eq!(
            cursors.find(Stream::Timeline).await.unwrap().as_deref(),
            Some("5")
        );
    }
}
