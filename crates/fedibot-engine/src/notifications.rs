// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Incremental notification processing.
//!
//! Follows the cursor protocol: an unseeded stream is seeded from the
//! newest item with zero side effects; otherwise everything strictly newer
//! than the cursor is processed oldest-first, and the watermark is
//! committed on every exit path so a mid-batch failure never reprocesses
//! finished items.

use std::sync::Arc;

use fedibot_core::{
    AccessToken, Credentials, FedibotError, NewStatus, Notification, NotificationKind, SinceQuery,
    SocialApi, Status,
};
use fedibot_mastodon::{strip_html, truncate_chars};
use fedibot_store::{CursorStore, Stream};
use tracing::{debug, error, info, warn};

use crate::generator::{ConversationMessage, DecisionService};

/// Mention threads are reconstructed at most this many parents deep.
const CONTEXT_WALK_DEPTH: usize = 5;
/// Each conversation message is truncated to this many characters.
const MESSAGE_CHAR_LIMIT: usize = 200;

pub struct NotificationProcessor {
    api: Arc<dyn SocialApi>,
    decisions: Arc<dyn DecisionService>,
    cursors: Arc<CursorStore>,
    page_size: u32,
}

impl NotificationProcessor {
    pub fn new(
        api: Arc<dyn SocialApi>,
        decisions: Arc<dyn DecisionService>,
        cursors: Arc<CursorStore>,
        page_size: u32,
    ) -> Self {
        Self {
            api,
            decisions,
            cursors,
            page_size,
        }
    }

    /// Run one notification batch.
    pub async fn run(
        &self,
        token: &AccessToken,
        credentials: &Credentials,
    ) -> Result<(), FedibotError> {
        let Some(since_id) = self.cursors.find(Stream::Notifications).await? else {
            return self.seed_cursor(token).await;
        };

        let items = self
            .api
            .notifications(
                token,
                &SinceQuery {
                    since_id: Some(since_id),
                    limit: Some(self.page_size),
                },
            )
            .await?;
        if items.is_empty() {
            debug!("no new notifications");
            return Ok(());
        }

        // Oldest first, so a failure loses the least progress.
        let mut items = items;
        items.reverse();

        let mut watermark: Option<String> = None;
        let result = self
            .process_items(token, credentials, &items, &mut watermark)
            .await;

        if let Some(id) = &watermark {
            if let Err(e) = self.cursors.save(Stream::Notifications, id).await {
                error!(error = %e, since_id = %id, "failed to persist notification cursor");
            }
        }
        result
    }

    /// First run against this stream: remember the newest item and do
    /// nothing else.
    async fn seed_cursor(&self, token: &AccessToken) -> Result<(), FedibotError> {
        let newest = self
            .api
            .notifications(
                token,
                &SinceQuery {
                    since_id: None,
                    limit: Some(1),
                },
            )
            .await?;
        if let Some(first) = newest.first() {
            self.cursors.save(Stream::Notifications, &first.id).await?;
            info!(since_id = %first.id, "notification cursor seeded");
        }
        Ok(())
    }

    async fn process_items(
        &self,
        token: &AccessToken,
        credentials: &Credentials,
        items: &[Notification],
        watermark: &mut Option<String>,
    ) -> Result<(), FedibotError> {
        for notification in items {
            self.process_one(token, credentials, notification).await?;
            *watermark = Some(notification.id.clone());
        }
        Ok(())
    }

    async fn process_one(
        &self,
        token: &AccessToken,
        credentials: &Credentials,
        notification: &Notification,
    ) -> Result<(), FedibotError> {
        match &notification.kind {
            NotificationKind::Follow { account } => {
                self.api.follow(token, &account.id).await?;
                let greeting = self.decisions.greeting();
                self.api
                    .post_status(
                        token,
                        &NewStatus {
                            status: format!("@{} {greeting}", account.acct),
                            in_reply_to_id: None,
                        },
                    )
                    .await?;
                info!(acct = %account.acct, "followed back and greeted");
            }
            NotificationKind::Mention { status } => {
                self.respond_to_mention(token, credentials, status).await?;
            }
            NotificationKind::Other => {
                debug!(id = %notification.id, "ignoring notification type");
            }
        }
        Ok(())
    }

    async fn respond_to_mention(
        &self,
        token: &AccessToken,
        credentials: &Credentials,
        mention: &Status,
    ) -> Result<(), FedibotError> {
        // Reconstruct the thread by walking reply parents.
        let mut thread = vec![mention.clone()];
        let mut cursor = mention.clone();
        for _ in 0..CONTEXT_WALK_DEPTH {
            let Some(parent_id) = &cursor.in_reply_to_id else {
                break;
            };
            cursor = self.api.status(token, parent_id).await?;
            thread.push(cursor.clone());
        }

        let mut history: Vec<ConversationMessage> = thread
            .iter()
            .map(|status| {
                let text = status
                    .text
                    .clone()
                    .unwrap_or_else(|| strip_html(&status.content));
                ConversationMessage {
                    name: status.account.username.clone(),
                    screen_name: status.account.acct.clone(),
                    message: truncate_chars(&text, MESSAGE_CHAR_LIMIT).to_string(),
                }
            })
            .collect();
        history.reverse();

        let Some(reply) = self.decisions.reply(&credentials.username, &history).await? else {
            warn!(status_id = %mention.id, "no reply generated; skipping mention");
            return Ok(());
        };

        self.api
            .post_status(
                token,
                &NewStatus {
                    status: format!("@{} {reply}", mention.account.acct),
                    in_reply_to_id: Some(mention.id.clone()),
                },
            )
            .await?;
        info!(status_id = %mention.id, "replied to mention");
        Ok(())
    }
}
