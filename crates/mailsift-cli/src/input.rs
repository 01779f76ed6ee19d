//! Reading exported messages.

use std::io::Read;
use std::path::Path;

use mailsift_domain::Message;

use crate::error::{CliError, Result};

/// Read a JSON array of messages from `path`, or stdin when `path` is `-`.
pub fn read_messages(path: &Path) -> Result<Vec<Message>> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    parse_messages(&raw)
}

/// Parse a JSON array of `{subject, body_text, sender}` objects.
pub fn parse_messages(raw: &str) -> Result<Vec<Message>> {
    serde_json::from_str(raw)
        .map_err(|e| CliError::InvalidInput(format!("expected a JSON array of messages: {}", e)))
}
