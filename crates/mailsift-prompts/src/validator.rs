//! Template diagnostics

use serde::Serialize;
use serde_json::json;

use crate::store::TemplateStore;
use crate::template::Variables;

/// Name of the template dialect reported by validation
pub const TEMPLATE_FORMAT: &str = "jinja";

/// Outcome of exercising a template with placeholder inputs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Whether the template is registered and renders
    pub valid: bool,

    /// Why validation failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Registered names, reported when the template is unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<Vec<String>>,

    /// Inferred input variables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_variables: Option<Vec<String>>,

    /// Template dialect, reported on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_format: Option<String>,

    /// Character length of the raw template, reported on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
}

fn placeholder_inputs() -> Variables {
    let mut vars = Variables::new();
    vars.insert("messages".into(), json!([]));
    vars.insert("task".into(), json!("test"));
    vars.insert("context".into(), json!("test"));
    vars.insert("topics_document".into(), json!("test"));
    vars
}

/// Render `name` with an empty message list and `"test"` scalars
///
/// Never fails and never modifies the store.
pub fn validate_template(store: &TemplateStore, name: &str) -> ValidationReport {
    let template = match store.get(name) {
        Ok(template) => template,
        Err(e) => {
            return ValidationReport {
                valid: false,
                error: Some(e.to_string()),
                available: Some(store.names()),
                input_variables: None,
                template_format: None,
                length: None,
            }
        }
    };

    match template.render(&placeholder_inputs()) {
        Ok(_) => ValidationReport {
            valid: true,
            error: None,
            available: None,
            input_variables: Some(template.input_variables()),
            template_format: Some(TEMPLATE_FORMAT.to_string()),
            length: Some(template.length()),
        },
        Err(e) => ValidationReport {
            valid: false,
            error: Some(e.to_string()),
            available: None,
            input_variables: Some(template.input_variables()),
            template_format: None,
            length: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> TemplateStore {
        let store = TemplateStore::new("/nonexistent");
        store
            .register("analysis", "Task: {{ task }}\nContext: {{ context }}\n{{ messages | length }} emails")
            .unwrap();
        store.register("needs_extra", "{{ sender_filter }}").unwrap();
        store
    }

    #[test]
    fn test_valid_template() {
        let store = store();
        let report = validate_template(&store, "analysis");
        assert!(report.valid);
        assert_eq!(
            report.input_variables,
            Some(vec!["context".to_string(), "messages".to_string(), "task".to_string()])
        );
        assert_eq!(report.length, Some(store.get("analysis").unwrap().length()));
        assert!(report.error.is_none());
    }

    #[test]
    fn test_unknown_template_lists_available() {
        let report = validate_template(&store(), "missing");
        assert!(!report.valid);
        assert_eq!(
            report.available,
            Some(vec!["analysis".to_string(), "needs_extra".to_string()])
        );
        assert!(report.error.unwrap().contains("missing"));
    }

    #[test]
    fn test_render_failure_reports_variables() {
        let report = validate_template(&store(), "needs_extra");
        assert!(!report.valid);
        assert!(report.error.is_some());
        assert_eq!(report.input_variables, Some(vec!["sender_filter".to_string()]));
    }

    #[test]
    fn test_serialized_shape_skips_absent_fields() {
        let value = serde_json::to_value(validate_template(&store(), "missing")).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("available"));
        assert!(!obj.contains_key("length"));
    }
}
