//! Topic extraction commands.

use mailsift_engine::{ClientInfo, TopicEngine};
use tracing::info;

use crate::cli::{InputArgs, TopicsArgs};
use crate::error::Result;
use crate::input::read_messages;
use crate::output::Formatter;

/// Execute the topics command.
pub fn execute_topics(args: TopicsArgs, engine: &TopicEngine, formatter: &Formatter) -> Result<()> {
    let messages = read_messages(&args.input.input)?;
    let n_topics = args.n_topics.unwrap_or(engine.config().topics.n_topics);
    info!("Clustering {} messages into {} topics", messages.len(), n_topics);

    let topics = engine.extract_topics_knn(&messages, n_topics);
    println!("{}", formatter.cluster_topics(&topics)?);

    Ok(())
}

/// Execute the llm-topics command.
///
/// Failures are logged and reported as no topics. When no model is
/// configured a hint goes to stderr so stdout stays parseable.
pub fn execute_llm_topics(
    args: InputArgs,
    engine: &TopicEngine,
    formatter: &Formatter,
) -> Result<()> {
    let messages = read_messages(&args.input)?;
    if let Some(hint) = stub_hint(&engine.client_info()) {
        eprintln!("{}", formatter.warning(&hint));
    }

    let topics = engine.extract_topics_llm(&messages);
    println!("{}", formatter.llm_topics(&topics)?);

    Ok(())
}

fn stub_hint(info: &ClientInfo) -> Option<String> {
    info.is_stub.then(|| {
        format!(
            "No language model configured for provider '{}'; set an API key to get model topics",
            info.provider
        )
    })
}
