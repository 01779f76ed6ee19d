//! Mailsift Prompt Templates
//!
//! Loads parameterized prompt documents from a directory, infers the
//! variables each one references, and renders them against a JSON context.
//!
//! # Template language
//!
//! A deliberately small Jinja-style subset:
//!
//! ```text
//! {{ task }}                              substitution
//! {{ message.subject | truncate(80) }}    attribute access and filters
//! {% for message in messages %}...{% endfor %}
//! {% if message.body_text %}...{% elif x %}...{% else %}...{% endif %}
//! {{ loop.index }} / {{ loop.length }}    loop state inside `for`
//! {# comment #}                           dropped from output
//! {%- ... -%}                             trim surrounding whitespace
//! ```
//!
//! Filters: `length` (alias `count`), `upper`, `lower`, `trim`, `title`,
//! `truncate(n)`, `default("x")` (alias `d`), `join(", ")`, `tojson`.
//! `truncate(n)` keeps at most `n` characters including the trailing `...`,
//! cuts at a word boundary and leaves text up to five characters over `n`
//! untouched.
//!
//! # Example
//!
//! ```
//! use mailsift_prompts::PromptTemplate;
//! use serde_json::{json, Map};
//!
//! let template = PromptTemplate::compile(
//!     "greeting",
//!     "{% for m in messages %}{{ loop.index }}. {{ m.subject }}\n{% endfor %}",
//! ).unwrap();
//! assert!(template.variables().contains("messages"));
//!
//! let mut vars = Map::new();
//! vars.insert("messages".into(), json!([{"subject": "Hi"}, {"subject": "Bye"}]));
//! assert_eq!(template.render(&vars).unwrap(), "1. Hi\n2. Bye\n");
//! ```

#![warn(missing_docs)]

mod render;
mod syntax;

pub mod store;
pub mod template;
pub mod validator;
pub mod variables;

use thiserror::Error;

pub use store::{TemplateStore, TEMPLATE_EXTENSION};
pub use template::{PromptTemplate, Variables};
pub use validator::{validate_template, ValidationReport};
pub use variables::infer_variables;

/// Errors that can occur while loading or rendering templates
#[derive(Error, Debug)]
pub enum PromptError {
    /// No template is registered under this name
    #[error("Prompt template '{0}' not found")]
    TemplateNotFound(String),

    /// Template source is malformed
    #[error("Failed to parse template '{name}' (line {line}): {message}")]
    Parse {
        /// Template name
        name: String,
        /// 1-based line of the offending tag
        line: usize,
        /// What went wrong
        message: String,
    },

    /// Rendering failed: missing variable or a value of the wrong shape
    #[error("Failed to render template '{name}': {message}")]
    Render {
        /// Template name
        name: String,
        /// What went wrong
        message: String,
    },

    /// Template directory or file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
