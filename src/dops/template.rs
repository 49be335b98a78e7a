//! # Template Printer
//!
//! Formats such as `{{.Names}}: {{.Status}}` are split once into literal text
//! and placeholders. Rendering walks the tokens and looks every placeholder up
//! in the [`FieldRegistry`].
//!
//! Anything that is not a recognized placeholder is written back exactly as it
//! appeared in the format: unknown keys, expressions that do not start with a
//! `.`, and a trailing `{{` with no closing braces. Formats written for other
//! tools keep working, they just show the raw token.

use crate::fields::{FieldRegistry, RenderOptions};
use crate::model::ContainerRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    /// `raw` is the placeholder exactly as written, braces included.
    Field { key: String, raw: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    tokens: Vec<Token>,
}

impl Template {
    /// Tokenizes `source`. Never fails: malformed placeholders become literals.
    pub fn parse(source: &str) -> Self {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            literal.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];

            let Some(end) = after_open.find("}}") else {
                literal.push_str(&rest[start..]);
                rest = "";
                break;
            };

            let raw = &rest[start..start + 2 + end + 2];
            match placeholder_key(&after_open[..end]) {
                Some(key) => {
                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }
                    tokens.push(Token::Field {
                        key: key.to_string(),
                        raw: raw.to_string(),
                    });
                }
                None => literal.push_str(raw),
            }
            rest = &after_open[end + 2..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Self { tokens }
    }

    /// Placeholder keys in order of appearance, duplicates included.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            Token::Field { key, .. } => Some(key.as_str()),
            Token::Literal(_) => None,
        })
    }

    pub fn references(&self, key: &str) -> bool {
        self.keys().any(|k| k == key)
    }

    /// The key when the template is exactly one placeholder and nothing else.
    pub fn single_key(&self) -> Option<&str> {
        match self.tokens.as_slice() {
            [Token::Field { key, .. }] => Some(key),
            _ => None,
        }
    }

    /// Substitutes every known placeholder with the record's value.
    pub fn render(
        &self,
        record: &ContainerRecord,
        registry: &FieldRegistry,
        options: &RenderOptions,
    ) -> String {
        self.substitute(|key| {
            registry
                .contains(key)
                .then(|| registry.resolve(record, key, options))
        })
    }

    /// Header text: known placeholders become their column labels.
    pub fn render_header(&self, registry: &FieldRegistry) -> String {
        self.substitute(|key| registry.contains(key).then(|| registry.header(key)))
    }

    fn substitute(&self, mut lookup: impl FnMut(&str) -> Option<String>) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Field { key, raw } => match lookup(key) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(raw),
                },
            }
        }
        out
    }
}

/// `.Key` with optional surrounding whitespace; `None` for anything else.
fn placeholder_key(inner: &str) -> Option<&str> {
    let key = inner.trim().strip_prefix('.')?;
    let valid = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(key)
}
