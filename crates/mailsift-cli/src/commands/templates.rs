//! Template listing and validation commands.

use mailsift_engine::TopicEngine;

use crate::cli::ValidateArgs;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the templates command.
pub fn execute_templates(engine: &TopicEngine, formatter: &Formatter) -> Result<()> {
    let names = engine.available_templates();
    println!("{}", formatter.templates(&names)?);
    Ok(())
}

/// Execute the validate command.
///
/// An invalid template is reported, not treated as a command failure.
pub fn execute_validate(
    args: ValidateArgs,
    engine: &TopicEngine,
    formatter: &Formatter,
) -> Result<()> {
    let report = engine.validate_template(&args.name);
    println!("{}", formatter.validation(&args.name, &report)?);
    Ok(())
}
