//! Output formatting for the CLI.

use colored::*;
use mailsift_domain::{Classification, ClusterTopic, LlmTopic, Message};
use mailsift_engine::{ClientInfo, ValidationReport};
use serde::Serialize;
use serde_json::json;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

use crate::cli::CliFormat;
use crate::error::Result;

/// Output formatter.
pub struct Formatter {
    format: CliFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: CliFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    fn table(&self, header: &[&str], rows: Vec<Vec<String>>) -> String {
        let mut builder = Builder::default();
        builder.push_record(header.iter().map(|h| h.to_string()));
        for row in rows {
            builder.push_record(row);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format locally clustered topics.
    pub fn cluster_topics(&self, topics: &[ClusterTopic<'_, Message>]) -> Result<String> {
        if self.format == CliFormat::Json {
            return self.json(topics);
        }
        if topics.is_empty() {
            return Ok(self.warning("No topics found."));
        }

        let rows = topics
            .iter()
            .map(|t| {
                vec![
                    t.name.clone(),
                    t.len().to_string(),
                    join_indices(&t.message_indices),
                    t.top_terms.join(", "),
                ]
            })
            .collect();
        Ok(self.table(&["Topic", "Emails", "Indices", "Top terms"], rows))
    }

    /// Format model-proposed topics.
    pub fn llm_topics(&self, topics: &[LlmTopic]) -> Result<String> {
        if self.format == CliFormat::Json {
            return self.json(topics);
        }
        if topics.is_empty() {
            return Ok(self.warning("No topics found."));
        }

        let rows = topics
            .iter()
            .map(|t| vec![t.name.clone(), t.description.clone()])
            .collect();
        Ok(self.table(&["Topic", "Description"], rows))
    }

    /// Format classification results next to the message subjects.
    pub fn classifications(
        &self,
        results: &[Classification],
        messages: &[Message],
    ) -> Result<String> {
        if self.format == CliFormat::Json {
            return self.json(results);
        }
        if results.is_empty() {
            return Ok(self.warning("No classifications returned."));
        }

        let rows = results
            .iter()
            .map(|c| {
                let subject = messages
                    .get(c.email_index)
                    .map(|m| m.subject.clone())
                    .unwrap_or_default();
                vec![
                    c.email_index.to_string(),
                    subject,
                    c.topic.clone(),
                    format!("{:.2}", c.confidence),
                ]
            })
            .collect();
        Ok(self.table(&["#", "Subject", "Topic", "Confidence"], rows))
    }

    /// Format an analysis answer.
    pub fn analysis(&self, task: &str, answer: &str) -> Result<String> {
        if self.format == CliFormat::Json {
            return self.json(&json!({ "task": task, "result": answer }));
        }
        Ok(answer.to_string())
    }

    /// Format template names.
    pub fn templates(&self, names: &[String]) -> Result<String> {
        if self.format == CliFormat::Json {
            return self.json(names);
        }
        if names.is_empty() {
            return Ok(self.warning("No prompt templates loaded."));
        }
        Ok(names.join("\n"))
    }

    /// Format a template validation report.
    pub fn validation(&self, name: &str, report: &ValidationReport) -> Result<String> {
        if self.format == CliFormat::Json {
            return self.json(report);
        }

        let mut lines = Vec::new();
        if report.valid {
            lines.push(self.success(&format!("Template '{}' is valid", name)));
        } else {
            lines.push(self.error(&format!("Template '{}' is invalid", name)));
        }
        if let Some(error) = &report.error {
            lines.push(format!("  error: {}", error));
        }
        if let Some(vars) = &report.input_variables {
            lines.push(format!("  variables: {}", vars.join(", ")));
        }
        if let Some(length) = report.length {
            lines.push(format!("  length: {} chars", length));
        }
        if let Some(available) = &report.available {
            lines.push(format!("  available: {}", available.join(", ")));
        }
        Ok(lines.join("\n"))
    }

    /// Format client information.
    pub fn client_info(&self, info: &ClientInfo) -> Result<String> {
        if self.format == CliFormat::Json {
            return self.json(info);
        }

        let client = if info.is_stub {
            self.warning(&format!("{} (no model configured)", info.client_type))
        } else {
            self.success(&info.client_type)
        };
        Ok(format!(
            "provider: {}\nmodel:    {}\nclient:   {}",
            info.provider, info.model, client
        ))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn join_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
