//! Classify command implementation.

use mailsift_engine::TopicEngine;

use crate::cli::ClassifyArgs;
use crate::error::{CliError, Result};
use crate::input::read_messages;
use crate::output::Formatter;

/// Execute the classify command.
pub fn execute_classify(
    args: ClassifyArgs,
    engine: &TopicEngine,
    formatter: &Formatter,
) -> Result<()> {
    let topics_document = topics_document(&args)?;
    let messages = read_messages(&args.input.input)?;
    let batch_size = args
        .batch_size
        .unwrap_or(engine.config().classification.batch_size);

    let results = engine.batch_classify_messages(&messages, &topics_document, batch_size);
    println!("{}", formatter.classifications(&results, &messages)?);

    Ok(())
}

fn topics_document(args: &ClassifyArgs) -> Result<String> {
    let document = match (&args.topics, &args.topics_text) {
        (Some(path), _) => std::fs::read_to_string(path)?,
        (None, Some(text)) => text.clone(),
        (None, None) => {
            return Err(CliError::InvalidInput(
                "Either --topics or --topics-text is required".to_string(),
            ))
        }
    };

    if document.trim().is_empty() {
        return Err(CliError::InvalidInput(
            "Topics document is empty".to_string(),
        ));
    }
    Ok(document)
}
