//! Template container
//!
//! A template is a list of literal pattern segments interleaved with
//! substitution values: `lit0 sub0 lit1 sub1 ... litN`. Literal segments
//! are taken as authored; substitutions are rendered first.

use crate::error::{Result, TypeError};
use crate::escape::is_escaped_at;
use crate::flags::Options;
use crate::substitute::Substitution;

/// The placeholder [`Template::parse`] splits on
pub const HOLE: &str = "${}";

/// Literal segments and the values between them
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    literals: Vec<String>,
    substitutions: Vec<Substitution>,
}

impl Template {
    /// A template with one literal segment and no substitutions
    pub fn new(literal: impl Into<String>) -> Self {
        Template {
            literals: vec![literal.into()],
            substitutions: Vec::new(),
        }
    }

    /// Build from parts
    ///
    /// # Errors
    /// There must be exactly one substitution fewer than literal segments.
    pub fn from_parts(literals: Vec<String>, substitutions: Vec<Substitution>) -> Result<Self> {
        if literals.is_empty() || substitutions.len() != literals.len() - 1 {
            return Err(TypeError::TemplateArity {
                literals: literals.len(),
                substitutions: substitutions.len(),
            }
            .into());
        }
        Ok(Template {
            literals,
            substitutions,
        })
    }

    /// Split `text` on every unescaped `${}` and fill the holes in order
    pub fn parse(text: &str, substitutions: Vec<Substitution>) -> Result<Self> {
        let mut literals = Vec::new();
        let mut start = 0;
        let mut search = 0;
        while let Some(offset) = text[search..].find(HOLE) {
            let at = search + offset;
            search = at + HOLE.len();
            if is_escaped_at(text, at) {
                continue;
            }
            literals.push(text[start..at].to_string());
            start = search;
        }
        literals.push(text[start..].to_string());
        Template::from_parts(literals, substitutions)
    }

    /// Append a substitution followed by an empty literal segment
    pub fn then(mut self, substitution: impl Into<Substitution>) -> Self {
        self.substitutions.push(substitution.into());
        self.literals.push(String::new());
        self
    }

    /// Append text to the last literal segment
    pub fn text(mut self, literal: &str) -> Self {
        if let Some(last) = self.literals.last_mut() {
            last.push_str(literal);
        }
        self
    }

    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    pub fn substitutions(&self) -> &[Substitution] {
        &self.substitutions
    }

    /// Render every substitution and concatenate with the literals
    pub fn merge(&self, options: &Options) -> Result<String> {
        let mut merged = self.literals[0].clone();
        for (position, (substitution, literal)) in self
            .substitutions
            .iter()
            .zip(&self.literals[1..])
            .enumerate()
        {
            merged.push_str(&substitution.render(position, options)?);
            merged.push_str(literal);
        }
        Ok(merged)
    }
}

impl From<&str> for Template {
    fn from(literal: &str) -> Self {
        Template::new(literal)
    }
}

impl From<String> for Template {
    fn from(literal: String) -> Self {
        Template::new(literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_merge() {
        let template = Template::new("a ").then("?").text(" b").then(vec!["x", "y"]);
        assert_eq!(template.literals().len(), 3);
        assert_eq!(template.merge(&Options::new()).unwrap(), r"a \? b(?:x|y)");
    }

    #[test]
    fn test_arity() {
        let err = Template::from_parts(vec!["a".into()], vec!["b".into()]).unwrap_err();
        assert!(matches!(
            err,
            Error::Type(TypeError::TemplateArity {
                literals: 1,
                substitutions: 1
            })
        ));
        assert!(Template::from_parts(Vec::new(), Vec::new()).is_err());
        assert!(Template::from_parts(vec!["a".into(), "b".into()], vec!["-".into()]).is_ok());
    }

    #[test]
    fn test_parse_holes() {
        let template = Template::parse("a${}b${}", vec!["1".into(), "2".into()]).unwrap();
        assert_eq!(template.literals(), &["a", "b", ""]);
        assert_eq!(template.merge(&Options::new()).unwrap(), "a1b2");
    }

    #[test]
    fn test_parse_skips_escaped_holes() {
        let template = Template::parse(r"a\${}b${}", vec!["c".into()]).unwrap();
        assert_eq!(template.literals(), &[r"a\${}b", ""]);
        assert!(Template::parse("${}", Vec::new()).is_err());
    }

    #[test]
    fn test_render_error_names_position() {
        let template = Template::new("")
            .then("ok")
            .then(Substitution::Other("null".to_string()));
        let err = template.merge(&Options::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Type(TypeError::InvalidSubstitution { position: 1, .. })
        ));
    }
}
