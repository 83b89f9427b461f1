//! Regx Core Library
//!
//! Compiles an extended regular-expression dialect (free spacing, comments,
//! named groups and references, possessive quantifiers, atomic groups and
//! value substitution) into native ECMAScript pattern syntax, and wraps the
//! native matcher so named groups come back by name.

pub mod builder;
pub mod engine;
pub mod error;
pub mod escape;
pub mod flags;
pub mod groups;
pub mod lexer;
pub mod quantifier;
pub mod registry;
pub mod scanner;
pub mod substitute;
pub mod template;

pub use builder::Builder;
pub use engine::{Match, Matches, Pattern};
pub use error::{Error, ErrorKind, Result, SyntaxError, TypeError};
pub use escape::{escape_literal, is_escaped_at};
pub use flags::{Flag, Options};
pub use groups::{GroupTable, Slot};
pub use lexer::{Construct, Lexer};
pub use scanner::{ScanOutput, scan};
pub use substitute::Substitution;
pub use template::Template;

/// Compile a pattern with default options
///
/// This is the shortest path from dialect text to a matcher.
pub fn compile(pattern: &str) -> Result<Pattern> {
    Builder::new().compile(pattern)
}

/// Convert dialect text to native source without compiling it
pub fn convert(pattern: &str, flags: &str) -> Result<String> {
    let options = Options::new().refine_str(flags)?;
    Ok(scan(pattern, &options, None)?.source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end() {
        let pattern = compile(
            r"
            (?<year> \d{4} ) - (?<month> \d\d )   # iso date
            ",
        )
        .unwrap();
        assert_eq!(pattern.source(), r"(\d{4})-(\d\d)");
        let found = pattern.find("on 2020-05-01").unwrap();
        assert_eq!(found.name("year"), Some("2020"));
        assert_eq!(found.name("month"), Some("05"));
    }

    #[test]
    fn test_convert() {
        assert_eq!(convert("a b # c", "").unwrap(), "ab");
        assert_eq!(convert(".*", "U").unwrap(), ".*?");
        assert!(convert("a", "1").is_err());
    }
}
