// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fedibot - an autonomous social media agent for the Fediverse.
//!
//! This is the binary entry point for the fedibot agent.

mod serve;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use fedibot_config::FedibotConfig;
use fedibot_core::{FedibotError, SocialApi};
use fedibot_engine::{
    AuthFlow, BatchRunner, DecisionService, LifeSystem, NotificationProcessor, PersonaDecisions,
    TimelineProcessor,
};
use fedibot_gemini::GeminiClient;
use fedibot_mastodon::MastodonClient;
use fedibot_store::{AppStore, CursorStore, Database, StateStore, TokenStore};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Fedibot - an autonomous social media agent for the Fediverse.
#[derive(Parser, Debug)]
#[command(name = "fedibot", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the OAuth onboarding web entry points.
    Serve,
    /// Run one notification and timeline batch.
    Batch,
    /// Seed the persona's morning life state.
    WakeUp,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match fedibot_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            fedibot_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => run_serve(&config).await,
        Some(Commands::Batch) => run_batch(&config).await,
        Some(Commands::WakeUp) => run_wake_up(&config).await,
        None => {
            println!("fedibot: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        error!(error = %e, "fedibot exited with an error");
        std::process::exit(1);
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn open_database(config: &FedibotConfig) -> Result<Arc<Database>, FedibotError> {
    let db = Database::open(&config.storage.database_path, config.storage.wal_mode).await?;
    Ok(Arc::new(db))
}

fn social_api(config: &FedibotConfig) -> Result<Arc<dyn SocialApi>, FedibotError> {
    Ok(Arc::new(MastodonClient::new(
        &config.mastodon.domain,
        &config.agent.name,
    )?))
}

fn decision_service(config: &FedibotConfig) -> Result<Arc<dyn DecisionService>, FedibotError> {
    let Some(api_key) = config.gemini.api_key.clone() else {
        return Err(FedibotError::Config(
            "gemini.api_key must be set (or FEDIBOT_GEMINI_API_KEY exported)".into(),
        ));
    };
    let gemini = GeminiClient::new(api_key, config.gemini.model.clone(), config.gemini.temperature)?;
    Ok(Arc::new(PersonaDecisions::new(gemini)))
}

fn redirect_uri(config: &FedibotConfig) -> String {
    let base = config.server.public_url.clone().unwrap_or_else(|| {
        format!("http://{}:{}", config.server.host, config.server.port)
    });
    format!("{}/auth/callback", base.trim_end_matches('/'))
}

async fn run_serve(config: &FedibotConfig) -> Result<(), FedibotError> {
    let db = open_database(config).await?;
    let domain = &config.mastodon.domain;
    let auth = AuthFlow::new(
        social_api(config)?,
        AppStore::new(Arc::clone(&db), domain),
        TokenStore::new(Arc::clone(&db), domain),
    );
    let state = serve::ServeState {
        auth: Arc::new(auth),
        agent_name: config.agent.name.clone(),
        redirect_uri: redirect_uri(config),
    };
    serve::run(state, &config.server.host, config.server.port).await
}

async fn run_batch(config: &FedibotConfig) -> Result<(), FedibotError> {
    let db = open_database(config).await?;
    let domain = &config.mastodon.domain;
    let api = social_api(config)?;
    let decisions = decision_service(config)?;
    let cursors = Arc::new(CursorStore::new(Arc::clone(&db), domain));

    let notifications = NotificationProcessor::new(
        Arc::clone(&api),
        Arc::clone(&decisions),
        Arc::clone(&cursors),
        config.batch.notification_page_size,
    );
    let timeline = TimelineProcessor::new(
        Arc::clone(&api),
        decisions,
        cursors,
        config.batch.timeline_page_size,
    );
    let runner = BatchRunner::new(
        api,
        TokenStore::new(Arc::clone(&db), domain),
        notifications,
        timeline,
    );
    let result = runner.run().await;
    db.close().await?;
    result
}

async fn run_wake_up(config: &FedibotConfig) -> Result<(), FedibotError> {
    let db = open_database(config).await?;
    let life = LifeSystem::new(
        StateStore::new(Arc::clone(&db), &config.mastodon.domain),
        decision_service(config)?,
    );
    let result = life.wake_up().await;
    db.close().await?;
    result
}
