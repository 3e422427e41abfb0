//! Mustache template parsing

use crate::error::TemplateError;

type ParseResult<T> = std::result::Result<T, TemplateError>;

/// A parsed template node
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    /// Literal text
    Text(String),
    /// `{{name}}` (escaped) or `{{{name}}}` / `{{& name}}` (raw)
    Variable { name: String, escape: bool },
    /// `{{#name}}…{{/name}}` or `{{^name}}…{{/name}}`
    Section {
        name: String,
        inverted: bool,
        children: Vec<Node>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Escaped,
    Raw,
    Open,
    Inverted,
    Close,
    Comment,
    Partial,
    Delimiters,
}

impl TagKind {
    /// Tags that vanish together with their line when alone on it
    fn can_stand_alone(self) -> bool {
        !matches!(self, Self::Escaped | Self::Raw)
    }
}

#[derive(Debug)]
enum Token {
    Text(String),
    Tag {
        kind: TagKind,
        name: String,
        line: usize,
    },
}

fn line_of(src: &str, offset: usize) -> usize {
    src[..offset].matches('\n').count() + 1
}

fn is_blank(s: &str) -> bool {
    s.chars().all(|c| c == ' ' || c == '\t' || c == '\r')
}

fn syntax(line: usize, message: impl Into<String>) -> TemplateError {
    TemplateError::Syntax {
        line,
        message: message.into(),
    }
}

fn tokenize(src: &str) -> ParseResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut open = String::from("{{");
    let mut close = String::from("}}");
    let mut pos = 0;

    while pos < src.len() {
        let Some(rel) = src[pos..].find(open.as_str()) else {
            tokens.push(Token::Text(src[pos..].to_string()));
            break;
        };
        let start = pos + rel;
        let line = line_of(src, start);
        let inner_start = start + open.len();

        // Triple mustache is only recognised with the default delimiters
        let triple = open == "{{" && src[inner_start..].starts_with('{');
        let (content, end) = if triple {
            let terminator = format!("}}{}", close);
            let rel_close = src[inner_start + 1..]
                .find(terminator.as_str())
                .ok_or_else(|| syntax(line, "unclosed tag"))?;
            let close_at = inner_start + 1 + rel_close;
            (&src[inner_start + 1..close_at], close_at + terminator.len())
        } else {
            let rel_close = src[inner_start..]
                .find(close.as_str())
                .ok_or_else(|| syntax(line, "unclosed tag"))?;
            let close_at = inner_start + rel_close;
            (&src[inner_start..close_at], close_at + close.len())
        };

        let content = content.trim();
        let (kind, name) = if triple {
            (TagKind::Raw, content)
        } else {
            match content.chars().next() {
                Some('#') => (TagKind::Open, content[1..].trim()),
                Some('^') => (TagKind::Inverted, content[1..].trim()),
                Some('/') => (TagKind::Close, content[1..].trim()),
                Some('!') => (TagKind::Comment, ""),
                Some('>') => (TagKind::Partial, content[1..].trim()),
                Some('&') => (TagKind::Raw, content[1..].trim()),
                Some('=') => (TagKind::Delimiters, content),
                _ => (TagKind::Escaped, content),
            }
        };

        if name.is_empty() && !matches!(kind, TagKind::Comment) {
            return Err(syntax(line, "empty tag"));
        }

        // Standalone tags take their whole line with them
        let line_start = src[..start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = src[end..].find('\n').map_or(src.len(), |i| end + i + 1);
        let standalone = kind.can_stand_alone()
            && line_start >= pos
            && is_blank(&src[line_start..start])
            && is_blank(&src[end..line_end].trim_end_matches('\n'));

        let (text_end, next) = if standalone {
            (line_start, line_end)
        } else {
            (start, end)
        };
        if text_end > pos {
            tokens.push(Token::Text(src[pos..text_end].to_string()));
        }

        if kind == TagKind::Delimiters {
            let spec = name
                .strip_prefix('=')
                .and_then(|s| s.strip_suffix('='))
                .ok_or_else(|| syntax(line, "malformed delimiter tag"))?;
            let mut parts = spec.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(o), Some(c), None) => {
                    open = o.to_string();
                    close = c.to_string();
                }
                _ => return Err(syntax(line, "malformed delimiter tag")),
            }
        } else {
            tokens.push(Token::Tag {
                kind,
                name: name.to_string(),
                line,
            });
        }

        pos = next;
    }

    Ok(tokens)
}

/// Parse a template into a node tree
pub(crate) fn parse(src: &str) -> ParseResult<Vec<Node>> {
    // Each frame: (section name, inverted, opening line, collected children)
    let mut stack: Vec<(String, bool, usize, Vec<Node>)> = Vec::new();
    let mut current: Vec<Node> = Vec::new();

    for token in tokenize(src)? {
        match token {
            Token::Text(text) => current.push(Node::Text(text)),
            Token::Tag { kind, name, line } => match kind {
                TagKind::Escaped => current.push(Node::Variable { name, escape: true }),
                TagKind::Raw => current.push(Node::Variable {
                    name,
                    escape: false,
                }),
                TagKind::Open | TagKind::Inverted => {
                    let parent = std::mem::take(&mut current);
                    stack.push((name, kind == TagKind::Inverted, line, parent));
                }
                TagKind::Close => {
                    let (open_name, inverted, _, parent) = stack
                        .pop()
                        .ok_or_else(|| syntax(line, format!("unopened section '{}'", name)))?;
                    if open_name != name {
                        return Err(syntax(
                            line,
                            format!("section '{}' closed by '{}'", open_name, name),
                        ));
                    }
                    let children = std::mem::replace(&mut current, parent);
                    current.push(Node::Section {
                        name,
                        inverted,
                        children,
                    });
                }
                TagKind::Comment | TagKind::Partial | TagKind::Delimiters => {}
            },
        }
    }

    if let Some((name, _, line, _)) = stack.pop() {
        return Err(syntax(line, format!("unclosed section '{}'", name)));
    }

    Ok(current)
}
