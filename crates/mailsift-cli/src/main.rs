//! Mailsift CLI - topic discovery and classification for exported email.

use anyhow::Context;
use clap::Parser;
use mailsift_cli::{commands, config, Cli, Command, Formatter};
use mailsift_engine::TopicEngine;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load(&cli).context("Failed to load configuration")?;

    let formatter = Formatter::new(cli.format, !cli.no_color);
    let engine = TopicEngine::new(config).context("Failed to initialize engine")?;

    match cli.command {
        Command::Topics(args) => commands::execute_topics(args, &engine, &formatter)?,
        Command::LlmTopics(args) => commands::execute_llm_topics(args, &engine, &formatter)?,
        Command::Classify(args) => commands::execute_classify(args, &engine, &formatter)?,
        Command::Analyze(args) => commands::execute_analyze(args, &engine, &formatter)?,
        Command::Templates => commands::execute_templates(&engine, &formatter)?,
        Command::Validate(args) => commands::execute_validate(args, &engine, &formatter)?,
        Command::Client => commands::execute_client(&engine, &formatter)?,
    }

    Ok(())
}
