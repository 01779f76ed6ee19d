//! Client command implementation.

use mailsift_engine::TopicEngine;

use crate::error::Result;
use crate::output::Formatter;

/// Execute the client command.
pub fn execute_client(engine: &TopicEngine, formatter: &Formatter) -> Result<()> {
    let info = engine.client_info();
    println!("{}", formatter.client_info(&info)?);
    Ok(())
}
