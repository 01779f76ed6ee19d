//! Analyze command implementation.

use mailsift_engine::TopicEngine;

use crate::cli::AnalyzeArgs;
use crate::error::{CliError, Result};
use crate::input::read_messages;
use crate::output::Formatter;

/// Execute the analyze command.
pub fn execute_analyze(
    args: AnalyzeArgs,
    engine: &TopicEngine,
    formatter: &Formatter,
) -> Result<()> {
    if args.task.trim().is_empty() {
        return Err(CliError::InvalidInput("Task cannot be empty".to_string()));
    }

    let messages = read_messages(&args.input.input)?;
    let answer = engine.analyze_messages(&messages, &args.task, &args.context);
    println!("{}", formatter.analysis(&args.task, &answer)?);

    Ok(())
}
