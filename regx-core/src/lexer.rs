//! Construct classification for the scanner
//!
//! The lexer looks at a single position of the merged pattern text and
//! reports which special construct (if any) starts there. It never decides
//! what to do with the construct; that is the scanner's job.

use std::fmt;

/// The group opener forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// `(`
    Capture,
    /// `(?:`
    NonCapture,
    /// `(?=` or `(?!`
    Lookahead { negative: bool },
    /// `(?<=` or `(?<!`
    Lookbehind { negative: bool },
    /// `(?<`, the name follows
    Named,
    /// `(?>`
    Atomic,
    /// `(?` followed by anything else
    Invalid,
}

impl GroupKind {
    /// Length in bytes of the opener text
    pub fn opener_len(self) -> usize {
        match self {
            GroupKind::Capture => 1,
            GroupKind::Invalid => 2,
            GroupKind::NonCapture
            | GroupKind::Lookahead { .. }
            | GroupKind::Named
            | GroupKind::Atomic => 3,
            GroupKind::Lookbehind { .. } => 4,
        }
    }
}

/// The repeat part of a quantifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repeat {
    /// `*`
    Star,
    /// `+`
    Plus,
    /// `?`
    Question,
    /// `{n}`, `{n,}` or `{n,m}`, kept as written
    Braces(String),
}

impl Repeat {
    pub fn as_str(&self) -> &str {
        match self {
            Repeat::Star => "*",
            Repeat::Plus => "+",
            Repeat::Question => "?",
            Repeat::Braces(text) => text,
        }
    }
}

/// A quantifier with its optional markers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantifier {
    pub repeat: Repeat,
    /// Followed by `?`
    pub lazy: bool,
    /// Followed by `+` (and not lazy)
    pub possessive: bool,
}

impl Quantifier {
    /// Length of the repeat part alone
    pub fn repeat_len(&self) -> usize {
        self.repeat.as_str().len()
    }

    /// Length including the markers
    pub fn len(&self) -> usize {
        self.repeat_len() + usize::from(self.lazy) + usize::from(self.possessive)
    }
}

/// A special construct found at some position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Construct {
    /// A whitespace character
    Whitespace(char),
    /// `[`
    OpenClass,
    /// `]`
    CloseClass,
    /// `.`
    Dot,
    /// `*`, `+`, `?` or a braced count
    Quantifier(Quantifier),
    /// `$` followed by a digit
    NumberRef,
    /// `$<` or `\k<`; holds the opener text
    NameRef(&'static str),
    /// A group opener
    GroupOpen(GroupKind),
    /// `)`
    GroupClose,
    /// `#`
    Comment,
    /// `\` followed by a digit
    EscapedDigit(char),
    /// `\` followed by an ASCII letter
    EscapedLetter(char),
    /// The inline flags delimiter
    FlagsDelimiter(char),
}

impl Construct {
    /// Number of input bytes the construct covers
    pub fn len(&self) -> usize {
        match self {
            Construct::Whitespace(c) | Construct::FlagsDelimiter(c) => c.len_utf8(),
            Construct::OpenClass
            | Construct::CloseClass
            | Construct::Dot
            | Construct::GroupClose
            | Construct::Comment => 1,
            Construct::Quantifier(q) => q.len(),
            Construct::NumberRef | Construct::EscapedDigit(_) | Construct::EscapedLetter(_) => 2,
            Construct::NameRef(opener) => opener.len(),
            Construct::GroupOpen(kind) => kind.opener_len(),
        }
    }

    /// Never true, every construct covers at least one byte
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Construct::Whitespace(c) => write!(f, "whitespace {:?}", c),
            Construct::OpenClass => write!(f, "`[`"),
            Construct::CloseClass => write!(f, "`]`"),
            Construct::Dot => write!(f, "`.`"),
            Construct::Quantifier(q) => write!(f, "quantifier `{}`", q.repeat.as_str()),
            Construct::NumberRef => write!(f, "numbered reference"),
            Construct::NameRef(opener) => write!(f, "named reference `{}`", opener),
            Construct::GroupOpen(kind) => write!(f, "group opener {:?}", kind),
            Construct::GroupClose => write!(f, "`)`"),
            Construct::Comment => write!(f, "comment"),
            Construct::EscapedDigit(d) => write!(f, "escape `\\{}`", d),
            Construct::EscapedLetter(l) => write!(f, "escape `\\{}`", l),
            Construct::FlagsDelimiter(d) => write!(f, "flags delimiter `{}`", d),
        }
    }
}

/// Classifies positions of a pattern text
pub struct Lexer<'a> {
    input: &'a str,
    delimiter: Option<char>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer; `delimiter` enables inline trailing flags
    pub fn new(input: &'a str, delimiter: Option<char>) -> Self {
        Lexer { input, delimiter }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Character at a byte position
    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.input.get(pos..).and_then(|rest| rest.chars().next())
    }

    /// Find the construct starting at `pos`, if any
    pub fn construct_at(&self, pos: usize) -> Option<Construct> {
        let rest = self.input.get(pos..)?;
        let c = rest.chars().next()?;

        if Some(c) == self.delimiter {
            return Some(Construct::FlagsDelimiter(c));
        }

        match c {
            c if crate::escape::is_whitespace(c) => Some(Construct::Whitespace(c)),
            '[' => Some(Construct::OpenClass),
            ']' => Some(Construct::CloseClass),
            '.' => Some(Construct::Dot),
            '*' | '+' | '?' => Some(Construct::Quantifier(Self::read_markers(
                match c {
                    '*' => Repeat::Star,
                    '+' => Repeat::Plus,
                    _ => Repeat::Question,
                },
                &rest[1..],
            ))),
            '{' => Self::read_braces(rest)
                .map(|braces| {
                    let after = &rest[braces.len()..];
                    Self::read_markers(Repeat::Braces(braces), after)
                })
                .map(Construct::Quantifier),
            '$' => match rest[1..].chars().next() {
                Some(d) if d.is_ascii_digit() => Some(Construct::NumberRef),
                Some('<') => Some(Construct::NameRef("$<")),
                _ => None,
            },
            '(' => Some(Construct::GroupOpen(Self::read_group_kind(&rest[1..]))),
            ')' => Some(Construct::GroupClose),
            '#' => Some(Construct::Comment),
            '\\' if !crate::escape::is_escaped_at(self.input, pos) => {
                let after = &rest[1..];
                match after.chars().next() {
                    Some(d) if d.is_ascii_digit() => Some(Construct::EscapedDigit(d)),
                    Some('k') if after.starts_with("k<") => Some(Construct::NameRef("\\k<")),
                    Some(l) if l.is_ascii_alphabetic() => Some(Construct::EscapedLetter(l)),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Read the optional lazy or possessive marker after a repeat
    fn read_markers(repeat: Repeat, after: &str) -> Quantifier {
        let lazy = after.starts_with('?');
        let possessive = !lazy && after.starts_with('+');
        Quantifier {
            repeat,
            lazy,
            possessive,
        }
    }

    /// Read `{n}`, `{n,}` or `{n,m}` from the start of `text`
    fn read_braces(text: &str) -> Option<String> {
        let bytes = text.as_bytes();
        let mut i = 1;
        let digits = |i: &mut usize| {
            let start = *i;
            while *i < bytes.len() && bytes[*i].is_ascii_digit() {
                *i += 1;
            }
            *i > start
        };
        if !digits(&mut i) {
            return None;
        }
        if bytes.get(i) == Some(&b',') {
            i += 1;
            digits(&mut i);
        }
        if bytes.get(i) != Some(&b'}') {
            return None;
        }
        Some(text[..=i].to_string())
    }

    /// Decide the group form from the text following `(`
    fn read_group_kind(after: &str) -> GroupKind {
        let Some(after) = after.strip_prefix('?') else {
            return GroupKind::Capture;
        };
        let mut chars = after.chars();
        match chars.next() {
            Some(':') => GroupKind::NonCapture,
            Some('=') => GroupKind::Lookahead { negative: false },
            Some('!') => GroupKind::Lookahead { negative: true },
            Some('>') => GroupKind::Atomic,
            Some('<') => match chars.next() {
                Some('=') => GroupKind::Lookbehind { negative: false },
                Some('!') => GroupKind::Lookbehind { negative: true },
                _ => GroupKind::Named,
            },
            _ => GroupKind::Invalid,
        }
    }

    /// Read `\w+>` at `pos`, returning the word and the length consumed
    pub fn read_name(&self, pos: usize) -> Option<(&'a str, usize)> {
        let rest = self.input.get(pos..)?;
        let end = rest
            .find(|c: char| !crate::escape::is_word_char(c))
            .unwrap_or(rest.len());
        if end == 0 || !rest[end..].starts_with('>') {
            return None;
        }
        Some((&rest[..end], end + 1))
    }

    /// Read a run of ASCII digits at `pos`
    pub fn read_digits(&self, pos: usize) -> &'a str {
        let rest = self.input.get(pos..).unwrap_or("");
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    }

    /// First character at or after `pos` that is not whitespace
    pub fn next_significant(&self, pos: usize) -> Option<char> {
        self.input
            .get(pos..)?
            .chars()
            .find(|&c| !crate::escape::is_whitespace(c))
    }
}
