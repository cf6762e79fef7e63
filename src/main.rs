//! dilemma binary entry point.
//!
//! Bootstraps the bot: CLI parsing, configuration, logging, the question
//! bank, the Telegram transport, and the update loop with graceful shutdown.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use dilemma::bot::{Bot, BotError};
use dilemma::channels::telegram::TelegramTransport;
use dilemma::cli::{Cli, Command};
use dilemma::config::Config;
use dilemma::logging;
use dilemma::questions::{QuestionPicker, QuestionPool};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("dilemma: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), BotError> {
    match cli.command.unwrap_or(Command::Start) {
        Command::Version => {
            print_version();
            Ok(())
        }
        Command::Check { path } => check_questions(cli.config.as_deref(), path.as_deref()),
        Command::Start => serve(cli.config.as_deref()).await,
    }
}

fn print_version() {
    println!(
        "dilemma {} ({}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("DILEMMA_GIT_HASH"),
        env!("DILEMMA_BUILD_DATE")
    );
}

fn check_questions(
    config_path: Option<&Path>,
    override_path: Option<&Path>,
) -> Result<(), BotError> {
    let config = Config::load(config_path)?;
    let path = override_path.unwrap_or(&config.questions.path);
    let pool = QuestionPool::load(path)?;
    println!("{}: {} questions", path.display(), pool.len());
    Ok(())
}

async fn serve(config_path: Option<&Path>) -> Result<(), BotError> {
    let config = Config::load(config_path)?;
    logging::init(&config.logging)?;
    config.require_token()?;

    let pool = Arc::new(QuestionPool::load(&config.questions.path)?);
    info!(questions = pool.len(), "question bank loaded");

    let telegram = Arc::new(TelegramTransport::new(config.telegram.clone())?);
    let me = telegram.get_me().await?;
    info!(
        bot = me.username.as_deref().unwrap_or("unknown"),
        "connected to Telegram"
    );

    let picker = Arc::new(QuestionPicker::new(pool));
    let bot = Bot::new(
        telegram,
        picker,
        Duration::from_secs(config.rounds.countdown_seconds),
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    bot.run(shutdown_rx).await;
    Ok(())
}
