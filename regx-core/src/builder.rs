//! Pattern builder
//!
//! A [`Builder`] binds an options snapshot. Refining it with a flag string,
//! an option record or a single flag returns a new builder and leaves the
//! receiver untouched, so partially configured builders can be shared.

use crate::engine::Pattern;
use crate::error::Result;
use crate::flags::{Flag, Options};
use crate::scanner::scan;
use crate::template::Template;
use log::debug;

/// Reusable compiler with bound options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Builder {
    options: Options,
    delimiter: Option<char>,
}

impl Builder {
    /// A builder with every flag off
    pub fn new() -> Self {
        Builder::default()
    }

    /// Refine with a flag string such as `"g-im"`
    pub fn flags(&self, flags: &str) -> Result<Self> {
        Ok(Builder {
            options: self.options.refine_str(flags)?,
            delimiter: self.delimiter,
        })
    }

    /// Refine with an option record of `(name, value)` pairs
    pub fn options<I, K>(&self, record: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, bool)>,
        K: AsRef<str>,
    {
        Ok(Builder {
            options: self.options.refine_record(record)?,
            delimiter: self.delimiter,
        })
    }

    /// Set a single flag
    pub fn set(&self, flag: Flag, value: bool) -> Self {
        Builder {
            options: self.options.with(flag, value),
            delimiter: self.delimiter,
        }
    }

    /// Accept trailing flags after `delimiter`, e.g. `a+b/gi`
    pub fn delimited(&self, delimiter: char) -> Self {
        Builder {
            options: self.options.clone(),
            delimiter: Some(delimiter),
        }
    }

    /// The bound options
    pub fn snapshot(&self) -> &Options {
        &self.options
    }

    /// Compile a template
    pub fn build(&self, template: &Template) -> Result<Pattern> {
        let mut options = self.options.clone();
        let mut input = template.merge(&options)?;
        debug!(
            "compiling {:?} with flags {:?}",
            input,
            options.original_flags()
        );
        let mut output = scan(&input, &options, self.delimiter)?;
        let mut trailing = output.trailing_flags.take();

        if let Some(flags) = &trailing {
            let refined = options.refine_str(flags)?;
            if refined != options {
                debug!("inline flags {:?} changed the options, rescanning", flags);
                input = template.merge(&refined)?;
                output = scan(&input, &refined, self.delimiter)?;
                trailing = output.trailing_flags.take();
                options = refined;
            }
        }

        let body_len = match (self.delimiter, &trailing) {
            (Some(delimiter), Some(flags)) => input.len() - flags.len() - delimiter.len_utf8(),
            _ => input.len(),
        };
        debug!(
            "emitted {:?} with flags {:?}, {} groups",
            output.source,
            options.native_flags(),
            output.groups.len() - 1
        );
        Pattern::from_scan(output, &options, &input[..body_len])
    }

    /// Compile a single literal pattern
    pub fn compile(&self, pattern: &str) -> Result<Pattern> {
        self.build(&Template::new(pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, SyntaxError};

    #[test]
    fn test_refinement_returns_new_builder() {
        let base = Builder::new().flags("i").unwrap();
        let refined = base.flags("g").unwrap();
        assert_eq!(base.snapshot().native_flags(), "i");
        assert_eq!(refined.snapshot().native_flags(), "gi");
        assert_eq!(refined.set(Flag::Global, false).snapshot().native_flags(), "i");
    }

    #[test]
    fn test_chained_forms() {
        let builder = Builder::new()
            .flags("gim")
            .unwrap()
            .options([("global", false)])
            .unwrap();
        assert_eq!(builder.compile("").unwrap().flags(), "im");
        assert!(Builder::new().options([("nocapture", true)]).unwrap_err().is_type());
    }

    #[test]
    fn test_build_template() {
        let template = Template::new("").then("Name").text(" ").then(vec!["?", "!"]);
        let pattern = Builder::new().build(&template).unwrap();
        assert_eq!(pattern.source(), r"Name(?:\?|!)");
        assert_eq!(pattern.original_source(), r"Name (?:\?|!)");
    }

    #[test]
    fn test_delimited_flags() {
        let builder = Builder::new().delimited('/');
        let pattern = builder.compile("a b/gi").unwrap();
        assert_eq!(pattern.source(), "ab");
        assert_eq!(pattern.flags(), "gi");
        assert_eq!(pattern.original_source(), "a b");
        assert_eq!(pattern.original_flags(), "gi");
    }

    #[test]
    fn test_delimited_flags_rescan() {
        let builder = Builder::new().delimited('/');
        let pattern = builder.compile("(.)/n").unwrap();
        assert_eq!(pattern.source(), "(?:.)");
        assert_eq!(pattern.original_flags(), "n");

        let template = Template::new("").then("a-b").text("/u");
        let pattern = builder.build(&template).unwrap();
        assert_eq!(pattern.source(), "a-b");
        assert_eq!(pattern.flags(), "u");
    }

    #[test]
    fn test_delimited_errors() {
        let builder = Builder::new().delimited('/');
        assert_eq!(
            builder.compile("a/g/").unwrap_err(),
            Error::Syntax(SyntaxError::DuplicateFlagsDelimiter('/'))
        );
        assert!(matches!(
            builder.compile("a/1").unwrap_err(),
            Error::Syntax(SyntaxError::UnrecognizedFlags(_))
        ));
        assert_eq!(builder.compile("a").unwrap().source(), "a");
    }
}
