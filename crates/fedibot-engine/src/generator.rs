// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The decision seam between the processors and the generative model.
//!
//! [`DecisionService`] is everything the stream processors ever ask an
//! LLM; [`PersonaDecisions`] is the Gemini-backed implementation carrying
//! the agent's persona prompts. Per-item generation failures surface as
//! `Ok(None)` so one bad generation never aborts a batch; only the
//! timeline evaluation, where a missing result would silently drop a whole
//! page of scores, propagates the error.

use async_trait::async_trait;
use fedibot_core::FedibotError;
use fedibot_gemini::{GeminiClient, GenerateRequest, Parsed};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

const FOLLOW_GREETINGS: &[&str] = &[
    "Oh wow, thank you for the follow! I'm so happy 😊💖",
    "You followed me! I'm truly honored ✨",
    "Thank you for following me! It really made my day 🥰",
    "A new follower! So glad you're here, let's get along well~",
    "Thanks for the follow! Please be kind to me~",
    "Yay, a follow! Thank you so much 😊",
    "Thank you for the follow! I'm delighted 🥰",
    "Oh, you followed me! That makes me so happy 💖",
    "I'm so glad you followed me, thank you!",
    "Yay! Thanks for following, let's be friends from now on~",
    "Thank you for the follow! Looking forward to chatting with you~",
    "You followed me! Thank you, truly!",
];

const CHARACTER_SETTING: &str = "\
Name: Luna
First person: I (sometimes refers to herself as \"Luna\")
Tone: gentle and drawn-out, ends sentences with soft trailing particles
Quirks: suddenly gets excited mid-sentence, mixes up polite phrasing, \
occasionally slips into casual speech";

const CHARACTER_PERSONALITY: &str = "\
Personality: calm and soothing / clever / endlessly curious / loves \
subculture / enjoys being alone";

/// One message of a mention conversation, oldest first when handed to the
/// model.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationMessage {
    pub name: String,
    pub screen_name: String,
    pub message: String,
}

/// One filtered timeline status, identified by its position in the
/// evaluation request.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineMessage {
    pub id: usize,
    pub message: String,
}

/// A score pair the model assigned to one timeline message.
#[derive(Debug, Clone, Deserialize)]
pub struct Evaluation {
    pub id: usize,
    pub interest: f64,
    pub fav: f64,
}

/// The persona's next life step.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedAction {
    pub next_location: String,
    pub next_situation: String,
    pub thinking: String,
    pub action: String,
}

/// Everything the processors ask the generative model.
#[async_trait]
pub trait DecisionService: Send + Sync {
    /// A canned greeting for a new follower. Never hits the model.
    fn greeting(&self) -> String;

    /// Generate a reply to a mention thread, or `None` to stay silent.
    async fn reply(
        &self,
        own_username: &str,
        history: &[ConversationMessage],
    ) -> Result<Option<String>, FedibotError>;

    /// Score a page of timeline messages in one request.
    async fn evaluate_timeline(
        &self,
        messages: &[TimelineMessage],
    ) -> Result<Vec<Evaluation>, FedibotError>;

    /// Generate an unprompted reply to an interesting status, or `None`.
    async fn approach(&self, message: &str) -> Result<Option<String>, FedibotError>;

    /// Plan the persona's next life state from recent history.
    async fn plan_action(
        &self,
        now: &str,
        history: &[fedibot_store::LifeState],
    ) -> Result<Option<PlannedAction>, FedibotError>;
}

/// Gemini-backed [`DecisionService`] carrying the persona prompts.
pub struct PersonaDecisions {
    gemini: GeminiClient,
}

impl PersonaDecisions {
    pub fn new(gemini: GeminiClient) -> Self {
        Self { gemini }
    }

    fn reply_system_instruction() -> String {
        format!(
            "**About you**\n\n{CHARACTER_SETTING}\n{CHARACTER_PERSONALITY}\n\n\
             Post based on the situation and settings you are given.\n\
             Use the conversation techniques of an attentive host.\n\
             Return null when no reply is needed.\n\n\
             **Output format**\n\"\"\"\n{{\n  // Reply body. Do not include @screen_name.\n  \"status\": string\n}} | null\n\"\"\"\n"
        )
    }

    fn evaluation_system_instruction() -> &'static str {
        "Read the messages and score them.\n\
         **Scoring rules**\n\n\
         Degree of interest:\n\
         * scale of 1-10\n\
         * nonsensical: low\n\
         * hostile: low\n\
         * celebrations: highest\n\
         * someone struggling: slightly high\n\
         * goals achieved: high\n\n\
         Degree of likability:\n\
         * hostile: low\n\
         * celebrations: highest\n\
         * progress toward goals: highest\n\
         * goals achieved: highest\n\
         * humor: high\n\n\
         **Output format**\n\"\"\"\n{\n  // message id\n  \"id\": number,\n  // first 10 characters of the message\n  \"message\": string,\n  // interest 1-10 (10 is highest)\n  \"interest\": number,\n  // likability 1-10 (10 is highest)\n  \"fav\": number\n}[]\n\"\"\"\n"
    }

    fn approach_system_instruction() -> String {
        format!(
            "Reply to the message as the following character.\n\
             Pick the post length randomly between 1 and 3 sentences.\n\n\
             {CHARACTER_SETTING}\n{CHARACTER_PERSONALITY}\n\n\
             **Output format**\n\"\"\"\n{{\n  // message\n  \"message\": string\n}}\n\"\"\"\n"
        )
    }

    fn action_system_instruction() -> String {
        format!(
            "You are living one day as the following character. Given the \
             current time and recent states, decide what happens next.\n\n\
             {CHARACTER_SETTING}\n{CHARACTER_PERSONALITY}\n\n\
             **Output format**\n\"\"\"\n{{\n  \"nextLocation\": string,\n  \"nextSituation\": string,\n  \"thinking\": string,\n  \"action\": string\n}}\n\"\"\"\n"
        )
    }
}

#[derive(Debug, Deserialize)]
struct ReplyShape {
    status: String,
}

#[derive(Debug, Deserialize)]
struct ApproachShape {
    message: String,
}

/// A generation problem at a per-item call site is skippable; log it and
/// move on.
fn skip_on_generation_error<T>(
    result: Result<Option<T>, FedibotError>,
) -> Result<Option<T>, FedibotError> {
    match result {
        Err(FedibotError::Generation { message, .. }) => {
            warn!(error = %message, "generation failed; skipping item");
            Ok(None)
        }
        other => other,
    }
}

#[async_trait]
impl DecisionService for PersonaDecisions {
    fn greeting(&self) -> String {
        let index = rand::thread_rng().gen_range(0..FOLLOW_GREETINGS.len());
        FOLLOW_GREETINGS[index].to_string()
    }

    async fn reply(
        &self,
        own_username: &str,
        history: &[ConversationMessage],
    ) -> Result<Option<String>, FedibotError> {
        let history_json =
            serde_json::to_string_pretty(history).map_err(|e| FedibotError::Internal(format!(
                "failed to serialize conversation history: {e}"
            )))?;
        let prompt = format!(
            "**Setting**\n\nYour screen_name: {own_username}\n\n\
             **Conversation so far**\n\n{history_json}\n"
        );

        let result = async {
            let value = self
                .gemini
                .generate(&GenerateRequest {
                    system_instruction: Some(Self::reply_system_instruction()),
                    prompt,
                    temperature: None,
                })
                .await?;
            if value.is_null() {
                // The model declining is an expected outcome.
                return Ok(None);
            }
            Ok(Parsed::<ReplyShape>::from_value(value)
                .into_option()
                .map(|r| r.status))
        }
        .await;
        skip_on_generation_error(result)
    }

    async fn evaluate_timeline(
        &self,
        messages: &[TimelineMessage],
    ) -> Result<Vec<Evaluation>, FedibotError> {
        if messages.is_empty() {
            return Ok(Vec::new());
        }

        let formatted: Vec<String> = messages
            .iter()
            .map(|m| {
                let truncated = fedibot_mastodon::truncate_chars(&m.message, 200);
                format!(
                    "  {}",
                    serde_json::json!({"id": m.id, "message": truncated})
                )
            })
            .collect();
        let prompt = format!("**Messages**\n\n[\n{}\n]\n", formatted.join(",\n"));

        let value = self
            .gemini
            .generate(&GenerateRequest {
                system_instruction: Some(Self::evaluation_system_instruction().to_string()),
                prompt,
                temperature: None,
            })
            .await?;

        // A page of scores that cannot be read means no engagement decision
        // is trustworthy, so this one propagates.
        serde_json::from_value(value).map_err(|e| FedibotError::Generation {
            message: format!("timeline evaluation did not match expected shape: {e}"),
            source: Some(Box::new(e)),
        })
    }

    async fn approach(&self, message: &str) -> Result<Option<String>, FedibotError> {
        let prompt = format!("**Target message**\n\"\"\"\n{message}\n\"\"\"\n");
        let result = async {
            let value = self
                .gemini
                .generate(&GenerateRequest {
                    system_instruction: Some(Self::approach_system_instruction()),
                    prompt,
                    temperature: None,
                })
                .await?;
            Ok(Parsed::<ApproachShape>::from_value(value)
                .into_option()
                .map(|r| r.message))
        }
        .await;
        skip_on_generation_error(result)
    }

    async fn plan_action(
        &self,
        now: &str,
        history: &[fedibot_store::LifeState],
    ) -> Result<Option<PlannedAction>, FedibotError> {
        let history_json =
            serde_json::to_string_pretty(history).map_err(|e| FedibotError::Internal(format!(
                "failed to serialize state history: {e}"
            )))?;
        let prompt = format!(
            "**Current time**\n\n{now}\n\n**Recent states (newest first)**\n\n{history_json}\n"
        );
        let result = async {
            let value = self
                .gemini
                .generate(&GenerateRequest {
                    system_instruction: Some(Self::action_system_instruction()),
                    prompt,
                    temperature: None,
                })
                .await?;
            Ok(Parsed::<PlannedAction>::from_value(value).into_option())
        }
        .await;
        skip_on_generation_error(result)
    }
}
