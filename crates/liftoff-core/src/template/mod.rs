//! Release body templating
//!
//! Templates use mustache syntax: `{{name}}` interpolation (HTML-escaped),
//! `{{{name}}}` / `{{& name}}` raw interpolation, dotted names, `{{.}}`,
//! `{{#section}}` / `{{^inverted}}` sections, comments and set-delimiter
//! tags. Partials render as nothing. Undefined names render as empty.
//!
//! ## Example
//!
//! ```rust
//! use liftoff_core::template::{render, TemplateVariables};
//!
//! let vars = TemplateVariables::from_json_str(r#"{"version": "1.2.0"}"#).unwrap();
//! assert_eq!(render("Release {{version}}", &vars).unwrap(), "Release 1.2.0");
//! ```

mod parse;

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::TemplateError;
use parse::Node;

type TemplateResult<T> = std::result::Result<T, TemplateError>;

/// Values substituted into a template
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateVariables {
    /// A JSON object; values may be nested
    Json(Map<String, Value>),
    /// A flat string mapping, typically the process environment
    Environment(BTreeMap<String, String>),
}

impl Default for TemplateVariables {
    fn default() -> Self {
        Self::Json(Map::new())
    }
}

impl TemplateVariables {
    /// Parse a JSON object. Blank input yields no variables.
    pub fn from_json_str(input: &str) -> TemplateResult<Self> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }

        match serde_json::from_str::<Value>(input) {
            Ok(Value::Object(map)) => Ok(Self::Json(map)),
            Ok(other) => Err(TemplateError::InvalidVariables(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))),
            Err(e) => Err(TemplateError::InvalidVariables(e.to_string())),
        }
    }

    /// Snapshot of the process environment
    pub fn from_env() -> Self {
        Self::Environment(std::env::vars().collect())
    }

    /// Check whether a top-level name is defined
    pub fn contains(&self, key: &str) -> bool {
        match self {
            Self::Json(map) => map.contains_key(key),
            Self::Environment(env) => env.contains_key(key),
        }
    }

    /// Define `key` unless the caller already did
    pub fn insert_default(&mut self, key: &str, value: &str) {
        if self.contains(key) {
            return;
        }
        match self {
            Self::Json(map) => {
                map.insert(key.to_string(), Value::String(value.to_string()));
            }
            Self::Environment(env) => {
                env.insert(key.to_string(), value.to_string());
            }
        }
    }

    /// Number of top-level names
    pub fn len(&self) -> usize {
        match self {
            Self::Json(map) => map.len(),
            Self::Environment(env) => env.len(),
        }
    }

    /// Check if no names are defined
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Root rendering context
    pub fn to_context(&self) -> Value {
        match self {
            Self::Json(map) => Value::Object(map.clone()),
            Self::Environment(env) => Value::Object(
                env.iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A parsed template, reusable across renders
#[derive(Debug, Clone)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template source
    pub fn compile(source: &str) -> TemplateResult<Self> {
        Ok(Self {
            nodes: parse::parse(source)?,
        })
    }

    /// Render against a JSON context
    pub fn render(&self, context: &Value) -> String {
        let mut out = String::new();
        let mut stack = vec![context];
        render_nodes(&self.nodes, &mut stack, &mut out);
        out
    }
}

/// Render template source with the given variables
pub fn render(source: &str, variables: &TemplateVariables) -> TemplateResult<String> {
    let template = Template::compile(source)?;
    let body = template.render(&variables.to_context());
    debug!(
        variables = variables.len(),
        bytes = body.len(),
        "rendered template"
    );
    Ok(body)
}

/// Read a template file and render it
pub fn render_file(path: &Path, variables: &TemplateVariables) -> TemplateResult<String> {
    let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    render(&source, variables)
}

fn render_nodes<'v>(nodes: &[Node], stack: &mut Vec<&'v Value>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Variable { name, escape } => {
                if let Some(value) = lookup(stack, name) {
                    let text = stringify(value);
                    if *escape {
                        escape_html(&text, out);
                    } else {
                        out.push_str(&text);
                    }
                }
            }
            Node::Section {
                name,
                inverted,
                children,
            } => {
                let value = lookup(stack, name);
                let falsy = value.map_or(true, is_falsy);

                if *inverted {
                    if falsy {
                        render_nodes(children, stack, out);
                    }
                    continue;
                }

                match value {
                    Some(_) if falsy => {}
                    None => {}
                    Some(Value::Array(items)) => {
                        for item in items {
                            stack.push(item);
                            render_nodes(children, stack, out);
                            stack.pop();
                        }
                    }
                    Some(value) => {
                        stack.push(value);
                        render_nodes(children, stack, out);
                        stack.pop();
                    }
                }
            }
        }
    }
}

/// Resolve a (possibly dotted) name against the context stack, innermost first
fn lookup<'v>(stack: &[&'v Value], name: &str) -> Option<&'v Value> {
    if name == "." {
        return stack.last().copied();
    }

    let mut parts = name.split('.');
    let first = parts.next()?;

    let mut value = stack
        .iter()
        .rev()
        .find_map(|ctx| ctx.as_object().and_then(|obj| obj.get(first)))?;

    for part in parts {
        value = match value {
            Value::Object(obj) => obj.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(value)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(items) => items.is_empty(),
        Value::Object(_) => false,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => stringify_number(n),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Whole floats print without a fraction, so `1.0` renders as `1`
fn stringify_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

fn escape_html(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '/' => out.push_str("&#x2F;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            _ => out.push(c),
        }
    }
}
