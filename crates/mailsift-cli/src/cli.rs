//! CLI command definitions and argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Mailsift - topic discovery and classification for exported email.
#[derive(Debug, Parser)]
#[command(name = "mailsift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "table")]
    pub format: CliFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (defaults to ~/.mailsift/config.toml)
    #[arg(short, long, global = true, env = "MAILSIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Prompt template directory, overriding the configuration
    #[arg(long, global = true, env = "MAILSIFT_PROMPTS_DIR")]
    pub prompts_dir: Option<PathBuf>,

    /// Model provider (openai, anthropic, google), overriding the configuration
    #[arg(long, global = true, env = "MAILSIFT_PROVIDER")]
    pub provider: Option<String>,

    /// Model name, overriding the configuration
    #[arg(long, global = true, env = "MAILSIFT_MODEL")]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Human-readable tables
    Table,
    /// Pretty-printed JSON
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Cluster messages into topics locally (no model calls)
    Topics(TopicsArgs),

    /// Ask the model to propose topics
    LlmTopics(InputArgs),

    /// Classify messages against a topics document
    Classify(ClassifyArgs),

    /// Run a free-form analysis task over messages
    Analyze(AnalyzeArgs),

    /// List the available prompt templates
    Templates,

    /// Render a template with placeholder inputs
    Validate(ValidateArgs),

    /// Show the configured provider and the resolved client
    Client,
}

/// Where messages are read from.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// JSON file holding an array of {subject, body_text, sender} objects ("-" for stdin)
    #[arg(short, long)]
    pub input: PathBuf,
}

/// Arguments for the topics command.
#[derive(Debug, Args)]
pub struct TopicsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Number of topics (defaults to topics.n_topics from the configuration)
    #[arg(short = 'n', long)]
    pub n_topics: Option<usize>,
}

/// Arguments for the classify command.
#[derive(Debug, Args)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// File describing the available topics
    #[arg(short, long, conflicts_with = "topics_text", required_unless_present = "topics_text")]
    pub topics: Option<PathBuf>,

    /// Topics description given inline
    #[arg(long)]
    pub topics_text: Option<String>,

    /// Messages per model call (defaults to classification.batch_size)
    #[arg(short, long)]
    pub batch_size: Option<usize>,
}

/// Arguments for the analyze command.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// What the model should do with the messages
    #[arg(short, long)]
    pub task: String,

    /// Additional context for the task
    #[arg(long, default_value = "")]
    pub context: String,
}

/// Arguments for the validate command.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Template name (file stem)
    pub name: String,
}
