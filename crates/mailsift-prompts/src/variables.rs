//! Input variable inference

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Comments, output roots, `for` headers and `endfor`, in source order
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?s)\{#.*?#\}",
        r"|\{\{-?\s*(?P<output>[A-Za-z_][A-Za-z0-9_]*)",
        r"|\{%-?\s*for\s+(?P<var>[A-Za-z_][A-Za-z0-9_]*)\s+in\s+(?P<iter>[A-Za-z_][A-Za-z0-9_]*)",
        r"|\{%-?\s*(?P<end>endfor)\b",
    ))
    .expect("valid regex")
});

const BUILTINS: &[&str] = &["loop", "length"];

/// Collect the top-level names a template requires
///
/// Picks up the root of every `{{ ... }}` expression and every `for`
/// iterable. A loop-bound name is excluded only inside its loop body.
/// Names read only by `if` conditions are optional (undefined is falsy) and
/// are not reported. Comments are skipped.
///
/// ```
/// use mailsift_prompts::infer_variables;
///
/// let vars = infer_variables("{% for m in messages %}{{ m.subject }} {{ loop.index }}{% endfor %}{{ task }}");
/// assert_eq!(vars.into_iter().collect::<Vec<_>>(), vec!["messages", "task"]);
/// ```
pub fn infer_variables(source: &str) -> BTreeSet<String> {
    let mut bound: Vec<&str> = Vec::new();
    let mut names = BTreeSet::new();

    for caps in TAG.captures_iter(source) {
        if let Some(output) = caps.name("output") {
            if is_input(output.as_str(), &bound) {
                names.insert(output.as_str().to_string());
            }
        } else if let (Some(var), Some(iter)) = (caps.name("var"), caps.name("iter")) {
            if is_input(iter.as_str(), &bound) {
                names.insert(iter.as_str().to_string());
            }
            bound.push(var.as_str());
        } else if caps.name("end").is_some() {
            bound.pop();
        }
    }

    names
}

fn is_input(name: &str, bound: &[&str]) -> bool {
    !BUILTINS.contains(&name) && !bound.iter().any(|b| *b == name)
}
