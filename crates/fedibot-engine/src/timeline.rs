// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Incremental home-timeline processing.
//!
//! New statuses are filtered down to plain, original posts by strangers,
//! scored in one batched evaluation request, and engaged with (favourite
//! and/or reply) against randomized thresholds so the agent doesn't react
//! to everything above a fixed line.

use std::collections::HashMap;
use std::sync::Arc;

use fedibot_core::{
    AccessToken, Credentials, FedibotError, NewStatus, SinceQuery, SocialApi, Status,
};
use fedibot_mastodon::strip_html;
use fedibot_store::{CursorStore, Stream};
use rand::Rng;
use tracing::{debug, error, info};

use crate::generator::{DecisionService, TimelineMessage};

pub struct TimelineProcessor {
    api: Arc<dyn SocialApi>,
    decisions: Arc<dyn DecisionService>,
    cursors: Arc<CursorStore>,
    page_size: u32,
}

struct Scores {
    interest: f64,
    fav: f64,
}

impl TimelineProcessor {
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

    /// Run one timeline batch.
    pub async fn run(
        &self,
        token: &AccessToken,
        credentials: &Credentials,
    ) -> Result<(), FedibotError> {
        let Some(since_id) = self.cursors.find(Stream::Timeline).await? else {
            return self.seed_cursor(token).await;
        };

        let timeline = self
            .api
            .home_timeline(
                token,
                &SinceQuery {
                    since_id: Some(since_id),
                    limit: Some(self.page_size),
                },
            )
            .await?;
        if timeline.is_empty() {
            debug!("no new timeline statuses");
            return Ok(());
        }

        // Reblogs, own posts, replies, and @-prefixed posts are not
        // engagement candidates.
        let targets: Vec<(&Status, String)> = timeline
            .iter()
            .map(|status| {
                let text = status
                    .text
                    .clone()
                    .unwrap_or_else(|| strip_html(&status.content));
                (status, text)
            })
            .filter(|(status, text)| {
                status.reblog.is_none()
                    && status.account.id != credentials.id
                    && status.in_reply_to_id.is_none()
                    && !text.starts_with('@')
            })
            .collect();

        // One request scores the whole page. If scoring fails wholesale, no
        // engagement decision is trustworthy and the cursor stays put, so
        // the page is rescored next run.
        let messages: Vec<TimelineMessage> = targets
            .iter()
            .enumerate()
            .map(|(id, (_, text))| TimelineMessage {
                id,
                message: text.clone(),
            })
            .collect();
        let evaluations = self.decisions.evaluate_timeline(&messages).await?;

        // Correlate positionally; anything the model omitted scores zero.
        let mut scores: HashMap<&str, Scores> = HashMap::new();
        for (index, (status, _)) in targets.iter().enumerate() {
            let evaluation = evaluations.iter().find(|e| e.id == index);
            scores.insert(
                status.id.as_str(),
                Scores {
                    interest: evaluation.map_or(0.0, |e| e.interest),
                    fav: evaluation.map_or(0.0, |e| e.fav),
                },
            );
        }

        let mut ordered = timeline.clone();
        ordered.reverse();

        let mut watermark: Option<String> = None;
        let result = self
            .engage(token, &ordered, &scores, &mut watermark)
            .await;

        if let Some(id) = &watermark {
            if let Err(e) = self.cursors.save(Stream::Timeline, id).await {
                error!(error = %e, since_id = %id, "failed to persist timeline cursor");
            }
        }
        result
    }

    async fn seed_cursor(&self, token: &AccessToken) -> Result<(), FedibotError> {
        let newest = self
            .api
            .home_timeline(
                token,
                &SinceQuery {
                    since_id: None,
                    limit: Some(1),
                },
            )
            .await?;
        if let Some(first) = newest.first() {
            self.cursors.save(Stream::Timeline, &first.id).await?;
            info!(since_id = %first.id, "timeline cursor seeded");
        }
        Ok(())
    }

    async fn engage(
        &self,
        token: &AccessToken,
        ordered: &[Status],
        scores: &HashMap<&str, Scores>,
        watermark: &mut Option<String>,
    ) -> Result<(), FedibotError> {
        for status in ordered {
            if let Some(score) = scores.get(status.id.as_str()) {
                self.engage_one(token, status, score).await?;
            }
            *watermark = Some(status.id.clone());
        }
        Ok(())
    }

    async fn engage_one(
        &self,
        token: &AccessToken,
        status: &Status,
        score: &Scores,
    ) -> Result<(), FedibotError> {
        let fav_threshold = rand::thread_rng().gen_range(5..=8) as f64;
        if score.fav > fav_threshold {
            self.api.favourite(token, &status.id).await?;
            debug!(status_id = %status.id, fav = score.fav, "favourited");
        }

        let reply_threshold: f64 = rand::thread_rng().gen_range(7.0..10.0);
        if score.interest >= reply_threshold {
            self.approach(token, status).await?;
        }
        Ok(())
    }

    /// Post an unprompted reply to a status the agent found interesting.
    async fn approach(&self, token: &AccessToken, status: &Status) -> Result<(), FedibotError> {
        let detail = self.api.status(token, &status.id).await?;
        let message = strip_html(&status.content);

        let Some(reply) = self.decisions.approach(&message).await? else {
            debug!(status_id = %status.id, "no approach generated; skipping");
            return Ok(());
        };

        self.api
            .post_status(
                token,
                &NewStatus {
                    status: format!("@{} {reply}", detail.account.acct),
                    in_reply_to_id: Some(status.id.clone()),
                },
            )
            .await?;
        info!(status_id = %status.id, "approached");
        Ok(())
    }
}
