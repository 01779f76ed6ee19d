//! Template tokenizer and parser

use crate::PromptError;

/// Parsed template node
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Text(String),
    Output(Expr),
    For {
        var: String,
        iterable: Expr,
        body: Vec<Node>,
    },
    If {
        branches: Vec<(Condition, Vec<Node>)>,
        otherwise: Vec<Node>,
    },
}

/// Variable path with a filter chain: `root.attr.attr | filter | filter`
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Expr {
    pub root: String,
    pub attrs: Vec<String>,
    pub filters: Vec<Filter>,
}

impl Expr {
    pub fn has_default(&self) -> bool {
        self.filters.iter().any(|f| matches!(f, Filter::Default(_)))
    }

    pub fn path(&self) -> String {
        std::iter::once(self.root.as_str())
            .chain(self.attrs.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Condition {
    pub negated: bool,
    pub expr: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Filter {
    Length,
    Upper,
    Lower,
    Trim,
    Title,
    Truncate(usize),
    Default(String),
    Join(String),
    ToJson,
}

const DEFAULT_TRUNCATE: usize = 255;

#[derive(Debug, Clone)]
enum Token {
    Text(String),
    Expr { body: String, line: usize },
    Tag { body: String, line: usize },
}

/// Closing tag that ended a block
struct EndTag {
    keyword: String,
    rest: String,
    line: usize,
}

/// Parse template source into nodes
pub(crate) fn parse(name: &str, source: &str) -> Result<Vec<Node>, PromptError> {
    let tokens = tokenize(name, source)?;
    let mut parser = Parser {
        name,
        tokens,
        pos: 0,
    };
    let (nodes, _) = parser.parse_block(&[])?;
    Ok(nodes)
}

fn parse_error(name: &str, line: usize, message: impl Into<String>) -> PromptError {
    PromptError::Parse {
        name: name.to_string(),
        line,
        message: message.into(),
    }
}

fn line_at(source: &str, byte: usize) -> usize {
    source[..byte].matches('\n').count() + 1
}

fn find_open(s: &str) -> Option<usize> {
    s.match_indices('{')
        .map(|(i, _)| i)
        .find(|&i| matches!(s.as_bytes().get(i + 1), Some(b'{' | b'%' | b'#')))
}

fn push_text(tokens: &mut Vec<Token>, text: &str, trim_start: bool) {
    let text = if trim_start { text.trim_start() } else { text };
    if !text.is_empty() {
        tokens.push(Token::Text(text.to_string()));
    }
}

fn trim_last_text(tokens: &mut Vec<Token>) {
    if let Some(Token::Text(text)) = tokens.last_mut() {
        let trimmed_len = text.trim_end().len();
        text.truncate(trimmed_len);
        if text.is_empty() {
            tokens.pop();
        }
    }
}

fn tokenize(name: &str, source: &str) -> Result<Vec<Token>, PromptError> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut offset = 0;
    let mut trim_next = false;

    while let Some(start) = find_open(rest) {
        push_text(&mut tokens, &rest[..start], trim_next);

        let line = line_at(source, offset + start);
        let marker = &rest[start..start + 2];
        let close = match marker {
            "{{" => "}}",
            "{%" => "%}",
            _ => "#}",
        };

        let inner_start = start + 2;
        let close_rel = rest[inner_start..]
            .find(close)
            .ok_or_else(|| parse_error(name, line, format!("unclosed '{}'", marker)))?;

        let mut inner = &rest[inner_start..inner_start + close_rel];
        if let Some(stripped) = inner.strip_prefix('-') {
            inner = stripped;
            trim_last_text(&mut tokens);
        }
        trim_next = false;
        if let Some(stripped) = inner.strip_suffix('-') {
            inner = stripped;
            trim_next = true;
        }

        let body = inner.trim().to_string();
        match marker {
            "{{" => {
                if body.is_empty() {
                    return Err(parse_error(name, line, "empty expression"));
                }
                tokens.push(Token::Expr { body, line });
            }
            "{%" => tokens.push(Token::Tag { body, line }),
            _ => {}
        }

        let consumed = inner_start + close_rel + close.len();
        rest = &rest[consumed..];
        offset += consumed;
    }

    push_text(&mut tokens, rest, trim_next);
    Ok(tokens)
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn split_keyword(body: &str) -> (&str, &str) {
    match body.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (body, ""),
    }
}

/// Split on `|` outside of quoted strings
fn split_filters(src: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in src.char_indices() {
        match (quote, ch) {
            (None, '"' | '\'') => quote = Some(ch),
            (Some(q), c) if c == q => quote = None,
            (None, '|') => {
                parts.push(&src[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&src[start..]);
    parts
}

fn parse_string_literal(src: &str) -> Option<String> {
    let src = src.trim();
    ["\"", "'"].iter().find_map(|q| {
        src.strip_prefix(q)
            .and_then(|s| s.strip_suffix(q))
            .map(str::to_string)
    })
}

struct Parser<'a> {
    name: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, line: usize, message: impl Into<String>) -> PromptError {
        parse_error(self.name, line, message)
    }

    /// Parse nodes until one of `until` (or end of input) is reached
    fn parse_block(&mut self, until: &[&str]) -> Result<(Vec<Node>, Option<EndTag>), PromptError> {
        let mut nodes = Vec::new();

        while let Some(token) = self.tokens.get(self.pos).cloned() {
            self.pos += 1;
            match token {
                Token::Text(text) => nodes.push(Node::Text(text)),
                Token::Expr { body, line } => nodes.push(Node::Output(self.parse_expr(&body, line)?)),
                Token::Tag { body, line } => {
                    let (keyword, rest) = split_keyword(&body);
                    if until.contains(&keyword) {
                        let end = EndTag {
                            keyword: keyword.to_string(),
                            rest: rest.to_string(),
                            line,
                        };
                        return Ok((nodes, Some(end)));
                    }
                    match keyword {
                        "for" => nodes.push(self.parse_for(rest, line)?),
                        "if" => nodes.push(self.parse_if(rest, line)?),
                        "endfor" | "endif" | "elif" | "else" => {
                            return Err(self.error(line, format!("unexpected '{}'", keyword)));
                        }
                        other => {
                            return Err(self.error(line, format!("unknown tag '{}'", other)));
                        }
                    }
                }
            }
        }

        Ok((nodes, None))
    }

    fn parse_for(&mut self, rest: &str, line: usize) -> Result<Node, PromptError> {
        let malformed = || self.error(line, "expected 'for <name> in <expression>'");

        let (var, tail) = rest.split_once(char::is_whitespace).ok_or_else(malformed)?;
        let iterable = tail
            .trim_start()
            .strip_prefix("in")
            .filter(|t| t.starts_with(char::is_whitespace))
            .ok_or_else(malformed)?
            .trim();
        if !is_ident(var) {
            return Err(self.error(line, format!("invalid loop variable '{}'", var)));
        }
        let iterable = self.parse_expr(iterable, line)?;

        let (body, end) = self.parse_block(&["endfor"])?;
        if end.is_none() {
            return Err(self.error(line, "'for' block is never closed"));
        }

        Ok(Node::For {
            var: var.to_string(),
            iterable,
            body,
        })
    }

    fn parse_if(&mut self, rest: &str, line: usize) -> Result<Node, PromptError> {
        let mut branches = Vec::new();
        let mut condition = self.parse_condition(rest, line)?;

        loop {
            let (body, end) = self.parse_block(&["elif", "else", "endif"])?;
            let end = end.ok_or_else(|| self.error(line, "'if' block is never closed"))?;
            branches.push((condition, body));

            match end.keyword.as_str() {
                "elif" => condition = self.parse_condition(&end.rest, end.line)?,
                "else" => {
                    let (otherwise, end) = self.parse_block(&["endif"])?;
                    if end.is_none() {
                        return Err(self.error(line, "'if' block is never closed"));
                    }
                    return Ok(Node::If {
                        branches,
                        otherwise,
                    });
                }
                _ => {
                    return Ok(Node::If {
                        branches,
                        otherwise: Vec::new(),
                    })
                }
            }
        }
    }

    fn parse_condition(&self, src: &str, line: usize) -> Result<Condition, PromptError> {
        let src = src.trim();
        let (negated, src) = match src.strip_prefix("not") {
            Some(rest) if rest.starts_with(char::is_whitespace) => (true, rest.trim_start()),
            _ => (false, src),
        };
        Ok(Condition {
            negated,
            expr: self.parse_expr(src, line)?,
        })
    }

    fn parse_expr(&self, src: &str, line: usize) -> Result<Expr, PromptError> {
        let mut parts = split_filters(src).into_iter();
        let path = parts.next().unwrap_or_default().trim();

        let mut segments = path.split('.');
        let root = segments.next().unwrap_or_default();
        if !is_ident(root) {
            return Err(self.error(line, format!("invalid expression '{}'", src.trim())));
        }
        let attrs = segments
            .map(|seg| {
                if is_ident(seg) || (!seg.is_empty() && seg.chars().all(|c| c.is_ascii_digit())) {
                    Ok(seg.to_string())
                } else {
                    Err(self.error(line, format!("invalid attribute '{}' in '{}'", seg, path)))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let filters = parts
            .map(|part| self.parse_filter(part.trim(), line))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Expr {
            root: root.to_string(),
            attrs,
            filters,
        })
    }

    fn parse_filter(&self, src: &str, line: usize) -> Result<Filter, PromptError> {
        let (name, arg) = match src.split_once('(') {
            Some((name, arg)) => {
                let arg = arg
                    .trim()
                    .strip_suffix(')')
                    .ok_or_else(|| self.error(line, format!("unclosed filter arguments in '{}'", src)))?;
                (name.trim(), Some(arg.trim()))
            }
            None => (src, None),
        };

        let bad_argument = || self.error(line, format!("bad argument for filter '{}'", name));

        match (name, arg) {
            ("length" | "count", None) => Ok(Filter::Length),
            ("upper", None) => Ok(Filter::Upper),
            ("lower", None) => Ok(Filter::Lower),
            ("trim", None) => Ok(Filter::Trim),
            ("title", None) => Ok(Filter::Title),
            ("tojson", None) => Ok(Filter::ToJson),
            ("truncate", None) => Ok(Filter::Truncate(DEFAULT_TRUNCATE)),
            ("truncate", Some(arg)) => arg.parse().map(Filter::Truncate).map_err(|_| bad_argument()),
            ("default" | "d", Some(arg)) => parse_string_literal(arg)
                .map(Filter::Default)
                .ok_or_else(bad_argument),
            ("join", None) => Ok(Filter::Join(String::new())),
            ("join", Some(arg)) => parse_string_literal(arg).map(Filter::Join).ok_or_else(bad_argument),
            (name, _) => Err(self.error(line, format!("unknown filter '{}'", name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(root: &str) -> Expr {
        Expr {
            root: root.to_string(),
            attrs: Vec::new(),
            filters: Vec::new(),
        }
    }

    #[test]
    fn test_plain_text() {
        let nodes = parse("t", "no tags here").unwrap();
        assert_eq!(nodes, vec![Node::Text("no tags here".into())]);
    }

    #[test]
    fn test_single_brace_is_text() {
        let nodes = parse("t", r#"Return {"topics": []}"#).unwrap();
        assert_eq!(nodes, vec![Node::Text(r#"Return {"topics": []}"#.into())]);
    }

    #[test]
    fn test_output_with_attrs_and_filters() {
        let nodes = parse("t", "{{ message.subject | upper | truncate(10) }}").unwrap();
        assert_eq!(
            nodes,
            vec![Node::Output(Expr {
                root: "message".into(),
                attrs: vec!["subject".into()],
                filters: vec![Filter::Upper, Filter::Truncate(10)],
            })]
        );
    }

    #[test]
    fn test_join_argument_may_contain_pipe() {
        let nodes = parse("t", r#"{{ terms | join(" | ") }}"#).unwrap();
        match &nodes[0] {
            Node::Output(e) => assert_eq!(e.filters, vec![Filter::Join(" | ".into())]),
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_for_block() {
        let nodes = parse("t", "{% for m in messages %}x{% endfor %}").unwrap();
        assert_eq!(
            nodes,
            vec![Node::For {
                var: "m".into(),
                iterable: expr("messages"),
                body: vec![Node::Text("x".into())],
            }]
        );
    }

    #[test]
    fn test_if_elif_else() {
        let nodes = parse("t", "{% if a %}A{% elif not b %}B{% else %}C{% endif %}").unwrap();
        match &nodes[0] {
            Node::If { branches, otherwise } => {
                assert_eq!(branches.len(), 2);
                assert!(!branches[0].0.negated);
                assert!(branches[1].0.negated);
                assert_eq!(branches[1].0.expr.root, "b");
                assert_eq!(otherwise, &vec![Node::Text("C".into())]);
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_comment_dropped() {
        let nodes = parse("t", "a{# hidden {{ x }} #}b").unwrap();
        assert_eq!(nodes, vec![Node::Text("a".into()), Node::Text("b".into())]);
    }

    #[test]
    fn test_trim_markers() {
        let nodes = parse("t", "a  \n{%- if x -%}\n  b\n{%- endif %}").unwrap();
        match &nodes[..] {
            [Node::Text(a), Node::If { branches, .. }] => {
                assert_eq!(a, "a");
                assert_eq!(branches[0].1, vec![Node::Text("b".into())]);
            }
            other => panic!("unexpected nodes {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_expression() {
        let err = parse("t", "line one\n{{ oops").unwrap_err();
        match err {
            PromptError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_for() {
        assert!(parse("t", "{% for m in messages %}x").is_err());
    }

    #[test]
    fn test_stray_endif() {
        assert!(parse("t", "x{% endif %}").is_err());
    }

    #[test]
    fn test_unknown_tag() {
        assert!(parse("t", "{% include 'x' %}").is_err());
    }

    #[test]
    fn test_unknown_filter() {
        assert!(parse("t", "{{ x | shout }}").is_err());
    }

    #[test]
    fn test_malformed_for() {
        assert!(parse("t", "{% for messages %}{% endfor %}").is_err());
        assert!(parse("t", "{% for 1x in messages %}{% endfor %}").is_err());
    }

    #[test]
    fn test_default_filter_argument() {
        let nodes = parse("t", "{{ context | default('none') }}").unwrap();
        match &nodes[0] {
            Node::Output(e) => {
                assert!(e.has_default());
                assert_eq!(e.filters, vec![Filter::Default("none".into())]);
            }
            other => panic!("unexpected node {:?}", other),
        }
    }
}
