//! Node evaluation against a JSON context

use mailsift_domain::text::title_case;
use serde_json::{json, Map, Value};

use crate::syntax::{Condition, Expr, Filter, Node};
use crate::PromptError;

pub(crate) struct Renderer<'a> {
    name: &'a str,
    globals: &'a Map<String, Value>,
    locals: Vec<(String, Value)>,
}

impl<'a> Renderer<'a> {
    pub fn new(name: &'a str, globals: &'a Map<String, Value>) -> Self {
        Self {
            name,
            globals,
            locals: Vec::new(),
        }
    }

    pub fn render(&mut self, nodes: &[Node]) -> Result<String, PromptError> {
        let mut out = String::new();
        self.render_into(nodes, &mut out)?;
        Ok(out)
    }

    fn error(&self, message: impl Into<String>) -> PromptError {
        PromptError::Render {
            name: self.name.to_string(),
            message: message.into(),
        }
    }

    fn render_into(&mut self, nodes: &[Node], out: &mut String) -> Result<(), PromptError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Output(expr) => {
                    let value = self.eval(expr, true)?;
                    out.push_str(&display(&value));
                }
                Node::For {
                    var,
                    iterable,
                    body,
                } => self.render_for(var, iterable, body, out)?,
                Node::If {
                    branches,
                    otherwise,
                } => {
                    let mut taken = None;
                    for (condition, body) in branches {
                        if self.test(condition)? {
                            taken = Some(body);
                            break;
                        }
                    }
                    self.render_into(taken.unwrap_or(otherwise), out)?;
                }
            }
        }
        Ok(())
    }

    fn render_for(
        &mut self,
        var: &str,
        iterable: &Expr,
        body: &[Node],
        out: &mut String,
    ) -> Result<(), PromptError> {
        let items = match self.eval(iterable, true)? {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => {
                return Err(self.error(format!(
                    "'{}' is not iterable (found {})",
                    iterable.path(),
                    kind(&other)
                )))
            }
        };

        let length = items.len();
        for (index0, item) in items.into_iter().enumerate() {
            let loop_info = json!({
                "index": index0 + 1,
                "index0": index0,
                "revindex": length - index0,
                "length": length,
                "first": index0 == 0,
                "last": index0 + 1 == length,
            });
            self.locals.push(("loop".to_string(), loop_info));
            self.locals.push((var.to_string(), item));
            let result = self.render_into(body, out);
            self.locals.truncate(self.locals.len() - 2);
            result?;
        }
        Ok(())
    }

    fn test(&self, condition: &Condition) -> Result<bool, PromptError> {
        let value = self.eval(&condition.expr, false)?;
        Ok(truthy(&value) != condition.negated)
    }

    fn lookup(&self, root: &str) -> Option<&Value> {
        self.locals
            .iter()
            .rev()
            .find(|(name, _)| name == root)
            .map(|(_, value)| value)
            .or_else(|| self.globals.get(root))
    }

    /// Evaluate an expression; `strict` rejects undefined root variables
    fn eval(&self, expr: &Expr, strict: bool) -> Result<Value, PromptError> {
        let mut value = match self.lookup(&expr.root) {
            Some(value) => value.clone(),
            None if strict && !expr.has_default() => {
                return Err(self.error(format!("undefined variable '{}'", expr.root)))
            }
            None => Value::Null,
        };

        for attr in &expr.attrs {
            value = match value {
                Value::Object(mut map) => map.remove(attr).unwrap_or(Value::Null),
                Value::Array(mut items) => match attr.parse::<usize>() {
                    Ok(i) if i < items.len() => items.swap_remove(i),
                    _ => Value::Null,
                },
                Value::Null => Value::Null,
                other => {
                    return Err(self.error(format!(
                        "cannot read '{}' of {} in '{}'",
                        attr,
                        kind(&other),
                        expr.path()
                    )))
                }
            };
        }

        expr.filters
            .iter()
            .try_fold(value, |value, filter| self.apply(filter, value))
    }

    fn apply(&self, filter: &Filter, value: Value) -> Result<Value, PromptError> {
        let value = match filter {
            Filter::Length => match &value {
                Value::Array(items) => json!(items.len()),
                Value::Object(map) => json!(map.len()),
                Value::String(s) => json!(s.chars().count()),
                Value::Null => json!(0),
                other => return Err(self.error(format!("{} has no length", kind(other)))),
            },
            Filter::Upper => Value::String(display(&value).to_uppercase()),
            Filter::Lower => Value::String(display(&value).to_lowercase()),
            Filter::Trim => Value::String(display(&value).trim().to_string()),
            Filter::Title => Value::String(title_case(&display(&value))),
            Filter::Truncate(limit) => Value::String(truncate(&display(&value), *limit)),
            Filter::Default(fallback) => {
                if value.is_null() {
                    Value::String(fallback.clone())
                } else {
                    value
                }
            }
            Filter::Join(sep) => match &value {
                Value::Array(items) => Value::String(
                    items.iter().map(display).collect::<Vec<_>>().join(sep),
                ),
                _ => value,
            },
            Filter::ToJson => Value::String(value.to_string()),
        };
        Ok(value)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Text form of a value as inserted into output
pub(crate) fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

const TRUNCATE_END: &str = "...";

/// Text up to this many characters past the limit is left whole
const TRUNCATE_LEEWAY: usize = 5;

/// Shorten `text` to at most `limit` characters including the `...` marker,
/// cutting at the last space that fits
fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit + TRUNCATE_LEEWAY {
        return text.to_string();
    }

    let kept: String = text
        .chars()
        .take(limit.saturating_sub(TRUNCATE_END.len()))
        .collect();
    let cut = kept.rsplit_once(' ').map_or(kept.as_str(), |(head, _)| head);
    format!("{}{}", cut, TRUNCATE_END)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn render(source: &str, context: Value) -> Result<String, PromptError> {
        let nodes = parse("t", source)?;
        let globals = match context {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Renderer::new("t", &globals).render(&nodes)
    }

    #[test]
    fn test_variable_substitution() {
        let out = render("Task: {{ task }}", json!({"task": "summarize"})).unwrap();
        assert_eq!(out, "Task: summarize");
    }

    #[test]
    fn test_loop_metadata() {
        let out = render(
            "{% for m in messages %}{{ loop.index }}/{{ loop.length }} {{ m.subject }}{% if not loop.last %}, {% endif %}{% endfor %}",
            json!({"messages": [{"subject": "a"}, {"subject": "b"}]}),
        )
        .unwrap();
        assert_eq!(out, "1/2 a, 2/2 b");
    }

    #[test]
    fn test_nested_loops_restore_scope() {
        let out = render(
            "{% for x in outer %}{% for x in inner %}{{ x }}{% endfor %}{{ x }};{% endfor %}",
            json!({"outer": ["A", "B"], "inner": [1, 2]}),
        )
        .unwrap();
        assert_eq!(out, "12A;12B;");
    }

    #[test]
    fn test_undefined_output_is_error() {
        let err = render("{{ missing }}", json!({})).unwrap_err();
        assert!(matches!(err, PromptError::Render { .. }));
    }

    #[test]
    fn test_undefined_with_default() {
        let out = render("{{ context | default('none') }}", json!({})).unwrap();
        assert_eq!(out, "none");
    }

    #[test]
    fn test_undefined_condition_is_false() {
        let out = render("{% if context %}yes{% else %}no{% endif %}", json!({})).unwrap();
        assert_eq!(out, "no");
    }

    #[test]
    fn test_missing_attribute_is_empty() {
        let out = render("[{{ m.body_text }}]", json!({"m": {"subject": "x"}})).unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_attribute_of_scalar_is_error() {
        assert!(render("{{ task.name }}", json!({"task": "x"})).is_err());
    }

    #[test]
    fn test_iterating_scalar_is_error() {
        assert!(render("{% for x in task %}{% endfor %}", json!({"task": "x"})).is_err());
    }

    #[test]
    fn test_filters() {
        let ctx = json!({"s": "  hello world  ", "items": ["a", "b"], "n": 3});
        assert_eq!(render("{{ s | trim | upper }}", ctx.clone()).unwrap(), "HELLO WORLD");
        assert_eq!(render("{{ s | trim | title }}", ctx.clone()).unwrap(), "Hello World");
        assert_eq!(render("{{ items | length }}", ctx.clone()).unwrap(), "2");
        assert_eq!(render("{{ items | join(', ') }}", ctx.clone()).unwrap(), "a, b");
        assert_eq!(render("{{ items | tojson }}", ctx.clone()).unwrap(), r#"["a","b"]"#);
        assert_eq!(render("{{ n }}", ctx).unwrap(), "3");
    }

    #[test]
    fn test_truncate_counts_marker_and_leeway() {
        let ctx = json!({"s": "the quick brown fox jumps over the lazy dog", "short": "hello world"});
        assert_eq!(
            render("{{ s | truncate(20) }}", ctx.clone()).unwrap(),
            "the quick brown..."
        );
        // within the leeway
        assert_eq!(render("{{ short | truncate(9) }}", ctx.clone()).unwrap(), "hello world");
        // no space to cut at
        assert_eq!(render("{{ short | truncate(5) }}", ctx).unwrap(), "he...");
    }

    #[test]
    fn test_elif_and_aliases() {
        let ctx = json!({"items": ["a", "b", "c"], "flag": false, "other": true});
        assert_eq!(
            render("{% if flag %}one{% elif other %}two{% else %}three{% endif %}", ctx.clone()).unwrap(),
            "two"
        );
        assert_eq!(render("{{ items | count }}", ctx.clone()).unwrap(), "3");
        assert_eq!(render("{{ missing | d('n/a') }}", ctx).unwrap(), "n/a");
    }

    #[test]
    fn test_empty_list_loop() {
        let out = render("[{% for m in messages %}x{% endfor %}]", json!({"messages": []})).unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_truthiness() {
        assert!(!truthy(&Value::Null));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!([])));
        assert!(truthy(&json!(1.5)));
        assert!(truthy(&json!({"a": 1})));
    }
}
