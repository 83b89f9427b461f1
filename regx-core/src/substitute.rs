//! Substitution values and their rendering
//!
//! Values spliced into a template are rendered to pattern source before
//! the scanner runs:
//! - text is escaped so it matches literally
//! - a compiled pattern (or raw native source) is spliced verbatim
//! - a list becomes a non-capturing alternation
//! - a map becomes an alternation of named groups

use crate::engine::Pattern;
use crate::error::{Result, SyntaxError, TypeError};
use crate::escape::{escape_literal, is_identifier};
use crate::flags::Options;
use serde_json::Value;

/// A value interpolated between the literal segments of a template
#[derive(Debug, Clone, PartialEq)]
pub enum Substitution {
    /// Text matched literally
    Text(String),
    /// Native pattern source, spliced as is
    Source(String),
    /// Alternatives, rendered `(?:a|b|...)`
    List(Vec<Substitution>),
    /// Named alternatives in insertion order, rendered `(?:(?<k>a)|...)`
    Map(Vec<(String, Substitution)>),
    /// A dynamic value of a shape that cannot be rendered
    Other(String),
}

impl Substitution {
    /// Raw native source, e.g. a pattern written for the engine directly
    pub fn source(source: impl Into<String>) -> Self {
        Substitution::Source(source.into())
    }

    /// Named alternatives from `(name, value)` pairs
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Substitution>,
    {
        Substitution::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Render to pattern source
    ///
    /// `position` is the index of the substitution in its template and is
    /// only used in error messages.
    pub fn render(&self, position: usize, options: &Options) -> Result<String> {
        match self {
            Substitution::Text(text) => Ok(escape_literal(text, options.unicode)),
            Substitution::Source(source) => Ok(source.clone()),
            Substitution::List(items) => {
                let parts = items
                    .iter()
                    .map(|item| item.render(position, options))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("(?:{})", parts.join("|")))
            }
            Substitution::Map(entries) => {
                let mut parts = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    if !is_identifier(key) {
                        return Err(SyntaxError::InvalidGroupName(key.clone()).into());
                    }
                    parts.push(format!("(?<{}>{})", key, value.render(position, options)?));
                }
                Ok(format!("(?:{})", parts.join("|")))
            }
            Substitution::Other(kind) => Err(TypeError::InvalidSubstitution {
                position,
                kind: kind.clone(),
            }
            .into()),
        }
    }
}

impl From<&str> for Substitution {
    fn from(text: &str) -> Self {
        Substitution::Text(text.to_string())
    }
}

impl From<String> for Substitution {
    fn from(text: String) -> Self {
        Substitution::Text(text)
    }
}

impl From<&Pattern> for Substitution {
    fn from(pattern: &Pattern) -> Self {
        Substitution::Source(pattern.source().to_string())
    }
}

impl<T: Into<Substitution>> From<Vec<T>> for Substitution {
    fn from(items: Vec<T>) -> Self {
        Substitution::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for Substitution {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Substitution::Text(text),
            Value::Array(items) => {
                Substitution::List(items.into_iter().map(Substitution::from).collect())
            }
            Value::Object(entries) => Substitution::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Substitution::from(v)))
                    .collect(),
            ),
            Value::Null => Substitution::Other("null".to_string()),
            Value::Bool(b) => Substitution::Other(format!("boolean ({b})")),
            Value::Number(n) => Substitution::Other(format!("number ({n})")),
        }
    }
}
