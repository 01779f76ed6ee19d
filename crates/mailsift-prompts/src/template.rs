//! Compiled prompt templates

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::render::Renderer;
use crate::syntax::{self, Node};
use crate::variables::infer_variables;
use crate::PromptError;

/// Named values a template is rendered against
pub type Variables = Map<String, Value>;

/// A parsed template with its inferred input variables
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    name: String,
    source: String,
    variables: BTreeSet<String>,
    nodes: Vec<Node>,
}

impl PromptTemplate {
    /// Parse `source` under the given name
    pub fn compile(name: impl Into<String>, source: impl Into<String>) -> Result<Self, PromptError> {
        let name = name.into();
        let source = source.into();
        let nodes = syntax::parse(&name, &source)?;
        let variables = infer_variables(&source);
        Ok(Self {
            name,
            source,
            variables,
            nodes,
        })
    }

    /// Template name (file stem when loaded from disk)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw template text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Variables the template references at top level
    pub fn variables(&self) -> &BTreeSet<String> {
        &self.variables
    }

    /// Variables as a sorted list
    pub fn input_variables(&self) -> Vec<String> {
        self.variables.iter().cloned().collect()
    }

    /// Character count of the raw template text
    pub fn length(&self) -> usize {
        self.source.chars().count()
    }

    /// Render against `vars`
    pub fn render(&self, vars: &Variables) -> Result<String, PromptError> {
        Renderer::new(&self.name, vars).render(&self.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compile_infers_variables() {
        let t = PromptTemplate::compile(
            "classify",
            "Topics:\n{{ topics_document }}\n{% for m in messages %}{{ m.subject }}{% endfor %}",
        )
        .unwrap();
        assert_eq!(t.input_variables(), vec!["messages", "topics_document"]);
        assert_eq!(t.name(), "classify");
    }

    #[test]
    fn test_length_counts_chars() {
        let t = PromptTemplate::compile("t", "héllo").unwrap();
        assert_eq!(t.length(), 5);
    }

    #[test]
    fn test_compile_error_names_template() {
        let err = PromptTemplate::compile("broken", "{% if x %}").unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_render_twice() {
        let t = PromptTemplate::compile("t", "{{ a }}-{{ b }}").unwrap();
        let mut vars = Variables::new();
        vars.insert("a".into(), json!(1));
        vars.insert("b".into(), json!("two"));
        assert_eq!(t.render(&vars).unwrap(), "1-two");
        assert_eq!(t.render(&vars).unwrap(), "1-two");
    }
}
