//! Flag and option model
//!
//! An [`Options`] value is an immutable snapshot of the nine boolean flags
//! plus any unrecognised single-letter flags. Refinement never mutates a
//! snapshot in place; it returns a new one.

use crate::error::{Result, SyntaxError, TypeError};
use std::fmt;

/// A recognised flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// `g`: find all matches
    Global,
    /// `i`: case-insensitive
    IgnoreCase,
    /// `m`: `^`/`$` match at line boundaries
    Multiline,
    /// `u`: unicode mode
    Unicode,
    /// `y`: matches must start at the search position
    Sticky,
    /// `n`: plain groups do not capture
    NoCapture,
    /// `s`: `.` matches line terminators
    SingleLine,
    /// `U`: quantifiers are lazy unless marked with `?`
    Ungreedy,
    /// `X`: reject unnecessary backslash-letter escapes
    Extra,
}

impl Flag {
    /// Native flags in canonical order
    pub const NATIVE: [Flag; 5] = [
        Flag::Global,
        Flag::IgnoreCase,
        Flag::Multiline,
        Flag::Unicode,
        Flag::Sticky,
    ];

    /// Extended flags in canonical order
    pub const EXTENDED: [Flag; 4] = [
        Flag::NoCapture,
        Flag::SingleLine,
        Flag::Ungreedy,
        Flag::Extra,
    ];

    /// The single-letter form of the flag
    pub fn letter(self) -> char {
        match self {
            Flag::Global => 'g',
            Flag::IgnoreCase => 'i',
            Flag::Multiline => 'm',
            Flag::Unicode => 'u',
            Flag::Sticky => 'y',
            Flag::NoCapture => 'n',
            Flag::SingleLine => 's',
            Flag::Ungreedy => 'U',
            Flag::Extra => 'X',
        }
    }

    /// The option-record name of the flag
    pub fn name(self) -> &'static str {
        match self {
            Flag::Global => "global",
            Flag::IgnoreCase => "ignoreCase",
            Flag::Multiline => "multiline",
            Flag::Unicode => "unicode",
            Flag::Sticky => "sticky",
            Flag::NoCapture => "noCapture",
            Flag::SingleLine => "singleLine",
            Flag::Ungreedy => "ungreedy",
            Flag::Extra => "extra",
        }
    }

    pub fn from_letter(letter: char) -> Option<Flag> {
        Flag::NATIVE
            .into_iter()
            .chain(Flag::EXTENDED)
            .find(|flag| flag.letter() == letter)
    }

    pub fn from_name(name: &str) -> Option<Flag> {
        Flag::NATIVE
            .into_iter()
            .chain(Flag::EXTENDED)
            .find(|flag| flag.name() == name)
    }

    /// Whether the native engine understands this flag
    pub fn is_native(self) -> bool {
        Flag::NATIVE.contains(&self)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Immutable snapshot of compilation options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub global: bool,
    pub ignore_case: bool,
    pub multiline: bool,
    pub unicode: bool,
    pub sticky: bool,
    pub no_capture: bool,
    pub single_line: bool,
    pub ungreedy: bool,
    pub extra: bool,
    /// Unrecognised flag letters, in insertion order
    other_flags: Vec<char>,
}

impl Options {
    /// Create a snapshot with every flag off
    pub fn new() -> Self {
        Options::default()
    }

    /// Read one flag
    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::Global => self.global,
            Flag::IgnoreCase => self.ignore_case,
            Flag::Multiline => self.multiline,
            Flag::Unicode => self.unicode,
            Flag::Sticky => self.sticky,
            Flag::NoCapture => self.no_capture,
            Flag::SingleLine => self.single_line,
            Flag::Ungreedy => self.ungreedy,
            Flag::Extra => self.extra,
        }
    }

    /// Return a copy with one flag set
    pub fn with(&self, flag: Flag, value: bool) -> Self {
        let mut next = self.clone();
        *next.slot(flag) = value;
        next
    }

    fn slot(&mut self, flag: Flag) -> &mut bool {
        match flag {
            Flag::Global => &mut self.global,
            Flag::IgnoreCase => &mut self.ignore_case,
            Flag::Multiline => &mut self.multiline,
            Flag::Unicode => &mut self.unicode,
            Flag::Sticky => &mut self.sticky,
            Flag::NoCapture => &mut self.no_capture,
            Flag::SingleLine => &mut self.single_line,
            Flag::Ungreedy => &mut self.ungreedy,
            Flag::Extra => &mut self.extra,
        }
    }

    /// Unrecognised flag letters, in insertion order
    pub fn other_flags(&self) -> &[char] {
        &self.other_flags
    }

    /// Return a copy refined by a flag string such as `"g-im"`
    ///
    /// Each letter may be preceded by `-` to remove it. Whitespace is
    /// ignored; any other leftover character is a syntax error.
    pub fn refine_str(&self, flags: &str) -> Result<Self> {
        let mut next = self.clone();
        let mut left = String::new();
        let mut chars = flags.chars().peekable();

        while let Some(c) = chars.next() {
            let (remove, letter) = match c {
                '-' => match chars.peek() {
                    Some(&l) if l.is_ascii_alphabetic() => {
                        chars.next();
                        (true, l)
                    }
                    _ => {
                        left.push(c);
                        continue;
                    }
                },
                l if l.is_ascii_alphabetic() => (false, l),
                other => {
                    left.push(other);
                    continue;
                }
            };

            match Flag::from_letter(letter) {
                Some(flag) => *next.slot(flag) = !remove,
                None if remove => next.other_flags.retain(|&f| f != letter),
                None => {
                    if !next.other_flags.contains(&letter) {
                        next.other_flags.push(letter);
                    }
                }
            }
        }

        if !left.chars().all(char::is_whitespace) {
            return Err(SyntaxError::UnrecognizedFlags(left).into());
        }
        Ok(next)
    }

    /// Return a copy refined by an option record of `(name, value)` pairs
    pub fn refine_record<I, K>(&self, record: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, bool)>,
        K: AsRef<str>,
    {
        let mut next = self.clone();
        for (key, value) in record {
            let key = key.as_ref();
            let flag = Flag::from_name(key)
                .ok_or_else(|| TypeError::UnrecognizedOption(key.to_string()))?;
            *next.slot(flag) = value;
        }
        Ok(next)
    }

    /// Native flags in canonical order, followed by the other flags
    pub fn native_flags(&self) -> String {
        Flag::NATIVE
            .into_iter()
            .filter(|&flag| self.get(flag))
            .map(Flag::letter)
            .chain(self.other_flags.iter().copied())
            .collect()
    }

    /// Native flags followed by the active extended letters
    pub fn original_flags(&self) -> String {
        let mut flags = self.native_flags();
        flags.extend(
            Flag::EXTENDED
                .into_iter()
                .filter(|&flag| self.get(flag))
                .map(Flag::letter),
        );
        flags
    }
}
