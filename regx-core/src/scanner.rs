//! Token scanner
//!
//! The scanner walks the merged pattern text once, left to right. At every
//! position it asks the [`Lexer`] which construct starts there and hands it
//! to exactly one handler in [`Scanner::dispatch`]. Text that starts no
//! construct is copied to the output unchanged.
//!
//! Escapedness is always decided on the input, so a handler that sees an
//! escaped construct emits the bare character and lets the escape that was
//! already copied stand.

use crate::error::{Result, SyntaxError};
use crate::escape::{is_escaped_at, is_line_terminator};
use crate::flags::Options;
use crate::groups::GroupTable;
use crate::lexer::{Construct, GroupKind, Lexer, Quantifier};
use crate::quantifier::{self, Atom};
use log::trace;

/// Characters that end the run the whitespace rule looks back through
const SPECIAL: &[char] = &['(', ')', '[', ']', '{', '}', '$', '|', '*', '+', '\\', '?'];

/// What the scanner produced for one input
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutput {
    /// Native pattern source
    pub source: String,
    /// Every native capture group, in emission order
    pub groups: GroupTable,
    /// Text after the flags delimiter, if one was found
    pub trailing_flags: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Capture(usize),
    Plain,
    Lookahead { negative: bool },
    Atomic(usize),
}

/// An open group
#[derive(Debug, Clone, Copy)]
struct Frame {
    kind: FrameKind,
    /// Output offset of the opener
    start: usize,
    /// Group count when the opener was seen
    first_group: usize,
}

/// A closed capture, used to recognise spliced emulations
#[derive(Debug, Clone, Copy)]
struct ClosedCapture {
    slot: usize,
    start: usize,
    end: usize,
}

/// Parse context for a single compilation
pub struct Scanner<'a> {
    lexer: Lexer<'a>,
    input: &'a str,
    options: &'a Options,
    pos: usize,
    out: String,
    in_class: bool,
    class_start: usize,
    groups: GroupTable,
    frames: Vec<Frame>,
    last_atom: Option<Atom>,
    last_capture: Option<ClosedCapture>,
    /// Slot and output end of a lookahead holding a single capture
    spliced: Option<(usize, usize)>,
    /// Output length right after the last emitted backreference
    after_backref: Option<usize>,
    trailing_flags: Option<String>,
}

/// Scan `input` with the given options
///
/// With a `delimiter`, the first unescaped delimiter outside a class ends
/// the pattern body and the rest is returned as trailing flags.
pub fn scan(input: &str, options: &Options, delimiter: Option<char>) -> Result<ScanOutput> {
    Scanner::new(input, options, delimiter).run()
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str, options: &'a Options, delimiter: Option<char>) -> Self {
        Scanner {
            lexer: Lexer::new(input, delimiter),
            input,
            options,
            pos: 0,
            out: String::with_capacity(input.len()),
            in_class: false,
            class_start: 0,
            groups: GroupTable::new(),
            frames: Vec::new(),
            last_atom: None,
            last_capture: None,
            spliced: None,
            after_backref: None,
            trailing_flags: None,
        }
    }

    /// Consume the whole input
    pub fn run(mut self) -> Result<ScanOutput> {
        while let Some(c) = self.lexer.char_at(self.pos) {
            match self.lexer.construct_at(self.pos) {
                Some(construct) => {
                    trace!("{} at {}", construct, self.pos);
                    self.dispatch(construct)?;
                }
                None => self.copy_char(c),
            }
            if self.trailing_flags.is_some() {
                break;
            }
        }
        self.finish()
    }

    fn finish(self) -> Result<ScanOutput> {
        if self.in_class {
            // Let the engine word the error the way it always does
            return Err(match regress::Regex::new("[") {
                Err(err) => err.into(),
                Ok(_) => SyntaxError::Native("unterminated character class".to_string()).into(),
            });
        }
        if self
            .frames
            .iter()
            .any(|frame| matches!(frame.kind, FrameKind::Atomic(_)))
        {
            return Err(SyntaxError::UnterminatedAtomicGroup.into());
        }
        Ok(ScanOutput {
            source: self.out,
            groups: self.groups,
            trailing_flags: self.trailing_flags,
        })
    }

    fn dispatch(&mut self, construct: Construct) -> Result<()> {
        let escaped = is_escaped_at(self.input, self.pos);

        match construct {
            Construct::Whitespace(c) => self.whitespace(c, escaped),
            Construct::OpenClass => {
                if !self.in_class && !escaped {
                    self.in_class = true;
                    self.class_start = self.out.len();
                }
                self.copy(1);
            }
            Construct::CloseClass => {
                let closes = self.in_class && !escaped;
                self.copy(1);
                if closes {
                    self.in_class = false;
                    self.record_atom(self.class_start, false);
                }
            }
            Construct::Dot => {
                if !self.in_class && !escaped && self.options.single_line {
                    let start = self.out.len();
                    self.out.push_str("[^]");
                    self.pos += 1;
                    self.record_atom(start, false);
                } else {
                    self.copy(1);
                }
            }
            Construct::Quantifier(q) => {
                if escaped {
                    self.copy(1);
                } else if self.in_class {
                    self.copy(q.len());
                } else {
                    self.quantifier(q)?;
                }
            }
            Construct::NumberRef => {
                if self.in_class || escaped {
                    self.copy(1);
                } else {
                    self.number_ref()?;
                }
            }
            Construct::NameRef(opener) => {
                if escaped {
                    self.copy(1);
                } else if self.in_class {
                    self.copy(opener.len());
                } else {
                    self.name_ref(opener)?;
                }
            }
            Construct::GroupOpen(kind) => {
                if escaped {
                    self.copy(1);
                } else if self.in_class {
                    self.copy(kind.opener_len());
                } else {
                    self.group_open(kind)?;
                }
            }
            Construct::GroupClose => {
                if self.in_class || escaped {
                    self.copy(1);
                } else {
                    self.group_close();
                }
            }
            Construct::Comment => {
                if self.in_class {
                    self.copy(1);
                } else if escaped {
                    self.drop_escape();
                    self.copy(1);
                } else {
                    self.skip_comment();
                }
            }
            Construct::EscapedDigit(d) => {
                if self.in_class {
                    self.copy(2);
                } else {
                    self.escaped_digit(d)?;
                }
            }
            Construct::EscapedLetter(l) => {
                if self.options.extra {
                    self.check_escape(l)?;
                }
                let braces = if l == 'u' && self.options.unicode {
                    self.code_point_braces()
                } else {
                    0
                };
                self.copy(2 + braces);
            }
            Construct::FlagsDelimiter(d) => {
                if self.in_class || escaped {
                    self.copy(d.len_utf8());
                } else {
                    self.flags_delimiter(d)?;
                }
            }
        }
        Ok(())
    }

    /// Copy `len` input bytes to the output
    fn copy(&mut self, len: usize) {
        let end = (self.pos + len).min(self.input.len());
        self.out.push_str(&self.input[self.pos..end]);
        self.pos = end;
    }

    fn copy_char(&mut self, c: char) {
        if c.is_ascii_digit() && self.after_backref == Some(self.out.len()) {
            self.out.push_str("(?:)");
        }
        self.out.push(c);
        self.pos += c.len_utf8();
    }

    /// Remove the backslash that escaped the current character
    fn drop_escape(&mut self) {
        if self.out.ends_with('\\') {
            self.out.pop();
        }
    }

    fn record_atom(&mut self, start: usize, emulated: bool) {
        self.last_atom = Some(Atom {
            start,
            end: self.out.len(),
            first_group: self.groups.len(),
            emulated,
        });
    }

    fn push_backref(&mut self, index: usize) {
        quantifier::push_backref(&mut self.out, index);
        self.after_backref = Some(self.out.len());
    }

    fn whitespace(&mut self, c: char, escaped: bool) {
        if self.in_class {
            self.copy(c.len_utf8());
            return;
        }
        if escaped {
            self.drop_escape();
            self.copy(c.len_utf8());
            return;
        }

        self.pos += c.len_utf8();
        let continues = self
            .lexer
            .next_significant(self.pos)
            .is_some_and(|next| self.continues_escape(next));
        if self.in_open_braces() || continues {
            self.out.push_str("(?:)");
        }
    }

    /// Whether the most recent special character is an unescaped `{`
    fn in_open_braces(&self) -> bool {
        self.out
            .rfind(SPECIAL)
            .is_some_and(|i| self.out[i..].starts_with('{') && !is_escaped_at(&self.out, i))
    }

    /// Whether `next` would extend an unfinished escape at the end of the output
    fn continues_escape(&self, next: char) -> bool {
        let Some(i) = self.out.rfind('\\') else {
            return false;
        };
        if is_escaped_at(&self.out, i) {
            return false;
        }
        let mut tail = self.out[i + 1..].chars();
        let Some(kind) = tail.next() else {
            return false;
        };
        let body = tail.as_str();
        let hex = |s: &str| s.chars().all(|c| c.is_ascii_hexdigit());

        match kind {
            'c' => body.is_empty() && next.is_ascii_alphabetic(),
            'x' => body.len() < 2 && hex(body) && next.is_ascii_hexdigit(),
            'u' => match body.strip_prefix('{') {
                Some(braced) => hex(braced) && (next.is_ascii_hexdigit() || next == '}'),
                None => body.len() < 4 && hex(body) && next.is_ascii_hexdigit(),
            },
            _ => false,
        }
    }

    fn skip_comment(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest
            .find(is_line_terminator)
            .map(|i| i + rest[i..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(rest.len());
    }

    fn quantifier(&mut self, q: Quantifier) -> Result<()> {
        let here = self.out.len();
        let mut atom = self.last_atom.filter(|atom| atom.end == here);
        if q.possessive {
            atom = quantifier::trailing_atom(&self.out, atom, &self.groups);
        }

        if let Some(found) = atom
            && found.emulated
        {
            atom = Some(quantifier::wrap_emulated(&mut self.out, found));
        }

        if q.possessive {
            let Some(found) = atom else {
                let text = &self.input[self.pos..self.pos + q.len()];
                return Err(SyntaxError::NothingToRepeat(text.to_string()).into());
            };
            let rewritten = quantifier::make_possessive(
                &mut self.out,
                found,
                q.repeat.as_str(),
                &mut self.groups,
            );
            self.last_atom = Some(rewritten);
            self.after_backref = Some(self.out.len());
        } else {
            self.out
                .push_str(&quantifier::render_quantifier(&q, self.options.ungreedy));
            self.last_atom = None;
        }
        self.pos += q.len();
        Ok(())
    }

    fn number_ref(&mut self) -> Result<()> {
        let digits = self.lexer.read_digits(self.pos + 1);
        let index = self.resolve_number(digits)?;
        self.pos += 1 + digits.len();
        self.push_backref(index);
        Ok(())
    }

    fn resolve_number(&self, digits: &str) -> Result<usize> {
        let number = digits
            .parse::<usize>()
            .map_err(|_| SyntaxError::UnresolvedReference(digits.to_string()))?;
        Ok(self.groups.resolve_number(number)?)
    }

    fn name_ref(&mut self, opener: &str) -> Result<()> {
        let (name, consumed) = self
            .lexer
            .read_name(self.pos + opener.len())
            .ok_or_else(|| SyntaxError::ExpectedReferenceName(opener.to_string()))?;
        let index = if name.chars().all(|c| c.is_ascii_digit()) {
            self.resolve_number(name)?
        } else {
            self.groups.resolve_name(name)?
        };
        self.pos += opener.len() + consumed;
        self.push_backref(index);
        Ok(())
    }

    fn group_open(&mut self, kind: GroupKind) -> Result<()> {
        let start = self.out.len();
        let first_group = self.groups.len();
        let frame = match kind {
            GroupKind::Capture => {
                // `( ?:` would only become a group opener once the space is dropped
                if self.lexer.next_significant(self.pos + 1) == Some('?') {
                    let rest = &self.input[self.pos..];
                    let end = rest.find('?').map_or(rest.len(), |i| i + 1);
                    return Err(SyntaxError::InvalidGroup(rest[..end].to_string()).into());
                }
                let in_lookahead_opener = self.frames.last().is_some_and(|frame| {
                    matches!(frame.kind, FrameKind::Lookahead { negative: false })
                        && frame.start + 3 == start
                });
                if !self.options.no_capture {
                    FrameKind::Capture(self.groups.push_anonymous())
                } else if in_lookahead_opener {
                    FrameKind::Capture(self.groups.push_suppressed())
                } else {
                    self.out.push_str("(?:");
                    self.pos += 1;
                    self.open_frame(FrameKind::Plain, start, first_group);
                    return Ok(());
                }
            }
            GroupKind::NonCapture | GroupKind::Lookbehind { .. } => FrameKind::Plain,
            GroupKind::Lookahead { negative } => FrameKind::Lookahead { negative },
            GroupKind::Named => {
                let (name, consumed) = self
                    .lexer
                    .read_name(self.pos + kind.opener_len())
                    .ok_or(SyntaxError::ExpectedGroupName)?;
                let slot = self.groups.push_named(name)?;
                self.out.push('(');
                self.pos += kind.opener_len() + consumed;
                self.open_frame(FrameKind::Capture(slot), start, first_group);
                return Ok(());
            }
            GroupKind::Atomic => {
                let slot = self.groups.push_suppressed();
                self.out.push_str(quantifier::ATOMIC_OPEN);
                self.pos += kind.opener_len();
                self.open_frame(FrameKind::Atomic(slot), start, first_group);
                return Ok(());
            }
            GroupKind::Invalid => {
                let text: String = self.input[self.pos..].chars().take(3).collect();
                return Err(SyntaxError::InvalidGroup(text).into());
            }
        };
        self.copy(kind.opener_len());
        self.open_frame(frame, start, first_group);
        Ok(())
    }

    fn open_frame(&mut self, kind: FrameKind, start: usize, first_group: usize) {
        self.frames.push(Frame {
            kind,
            start,
            first_group,
        });
        self.spliced = None;
    }

    fn group_close(&mut self) {
        let Some(frame) = self.frames.pop() else {
            // unbalanced, the engine reports it
            self.copy(1);
            return;
        };
        let inner_end = self.out.len();

        match frame.kind {
            FrameKind::Atomic(slot) => {
                quantifier::close_atomic(&mut self.out, slot);
                self.pos += 1;
                self.after_backref = Some(self.out.len());
            }
            _ => self.copy(1),
        }

        self.spliced = match frame.kind {
            FrameKind::Lookahead { negative: false } => self
                .last_capture
                .filter(|capture| capture.start == frame.start + 3 && capture.end == inner_end)
                .map(|capture| (capture.slot, self.out.len())),
            _ => None,
        };
        if let FrameKind::Capture(slot) = frame.kind {
            self.last_capture = Some(ClosedCapture {
                slot,
                start: frame.start,
                end: self.out.len(),
            });
        }

        self.last_atom = Some(Atom {
            start: frame.start,
            end: self.out.len(),
            first_group: frame.first_group,
            emulated: matches!(frame.kind, FrameKind::Atomic(_)),
        });
    }

    fn escaped_digit(&mut self, digit: char) -> Result<()> {
        let digits = self.lexer.read_digits(self.pos + 1);

        if let Some((slot, end)) = self.spliced
            && end == self.out.len()
        {
            self.groups.suppress(slot);
            self.pos += 1 + digits.len();
            self.push_backref(slot);
            self.spliced = None;
            return Ok(());
        }

        if digit == '0' && digits.len() == 1 {
            let after = self.pos + 2;
            let next = self.lexer.char_at(after);
            self.copy(2);
            if next.is_some_and(crate::escape::is_whitespace)
                && self
                    .lexer
                    .next_significant(after)
                    .is_some_and(|c| c.is_ascii_digit())
            {
                self.out.push_str("(?:)");
            }
            return Ok(());
        }

        Err(SyntaxError::OctalEscape(format!("\\{digits}")).into())
    }

    /// Length of the `{hex}` body of a `\u{...}` escape at the current position
    ///
    /// The braces belong to the escape, never to a quantifier.
    fn code_point_braces(&self) -> usize {
        self.input[self.pos + 2..]
            .strip_prefix('{')
            .and_then(|body| body.find('}').map(|end| &body[..end]))
            .filter(|hex| !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .map_or(0, |hex| hex.len() + 2)
    }

    /// Check an escape against the strict escape set
    fn check_escape(&self, letter: char) -> Result<()> {
        let rest = &self.input[self.pos + 2..];
        let hex_run = |n: usize| {
            rest.len() >= n && rest.as_bytes()[..n].iter().all(u8::is_ascii_hexdigit)
        };
        let braced = |min: usize, max: usize| {
            rest.strip_prefix('{')
                .and_then(|r| r.split_once('}'))
                .is_some_and(|(hex, _)| {
                    (min..=max).contains(&hex.len()) && hex.bytes().all(|b| b.is_ascii_hexdigit())
                })
        };

        let allowed = match letter {
            'd' | 'D' | 'w' | 'W' | 's' | 'S' | 't' | 'r' | 'n' | 'v' | 'f' | 'b' | 'B' => true,
            'c' => rest.starts_with(|c: char| c.is_ascii_alphabetic()),
            'x' => hex_run(2),
            'u' if hex_run(4) => true,
            'u' if braced(4, 5) => {
                if !self.options.unicode {
                    return Err(SyntaxError::UnicodeFlagRequired('u').into());
                }
                true
            }
            'p' | 'P' if rest.starts_with('{') && rest.contains('}') => {
                if !self.options.unicode {
                    return Err(SyntaxError::UnicodeFlagRequired(letter).into());
                }
                true
            }
            _ => false,
        };

        if allowed {
            Ok(())
        } else {
            Err(SyntaxError::UnnecessaryEscape(letter).into())
        }
    }

    fn flags_delimiter(&mut self, delimiter: char) -> Result<()> {
        let start = self.pos + delimiter.len_utf8();
        let rest = &self.input[start..];
        if rest
            .char_indices()
            .any(|(i, c)| c == delimiter && !is_escaped_at(self.input, start + i))
        {
            return Err(SyntaxError::DuplicateFlagsDelimiter(delimiter).into());
        }
        self.trailing_flags = Some(rest.to_string());
        self.pos = self.input.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::groups::Slot;

    fn convert_with(input: &str, flags: &str) -> Result<String> {
        let options = Options::new().refine_str(flags)?;
        Ok(scan(input, &options, None)?.source)
    }

    fn convert(input: &str) -> String {
        convert_with(input, "").unwrap()
    }

    fn syntax_error(input: &str, flags: &str) -> SyntaxError {
        match convert_with(input, flags) {
            Err(Error::Syntax(err)) => err,
            other => panic!("expected a syntax error for {input:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_plain_text_is_copied() {
        assert_eq!(convert("abc"), "abc");
        assert_eq!(convert(""), "");
        assert_eq!(convert("é€"), "é€");
    }

    #[test]
    fn test_comments() {
        assert_eq!(convert("#"), "");
        assert_eq!(convert("a#b"), "a");
        assert_eq!(convert("[a#b]{10}"), "[a#b]{10}");
        assert_eq!(convert("(a#b){10}"), "(a");
        assert_eq!(convert("a # one\nb # two\r\nc"), "abc");
    }

    #[test]
    fn test_escaped_comments() {
        assert_eq!(convert(r"\#"), "#");
        assert_eq!(convert(r"a\#b"), "a#b");
        assert_eq!(convert(r"[a\#b]{10}"), r"[a\#b]{10}");
        assert_eq!(convert(r"(a\#b){10}"), "(a#b){10}");
        assert_eq!(convert(r"\##"), "#");
        assert_eq!(convert(r"\#a#b"), "#a");
        assert_eq!(convert(r"\\\#a\\#b"), r"\\#a\\");
        assert_eq!(convert(r"\\\#a\\\\#b"), r"\\#a\\\\");
        assert_eq!(convert(r"\#[a#b]{10}"), "#[a#b]{10}");
    }

    #[test]
    fn test_whitespace_is_stripped() {
        assert_eq!(convert(" "), "");
        assert_eq!(convert("\n\t\t"), "");
        assert_eq!(convert("a bc\\\\\td"), r"abc\\d");
        assert_eq!(convert("a\n\t"), "a");
        assert_eq!(convert("a {1,3}"), "a{1,3}");
    }

    #[test]
    fn test_escaped_whitespace_is_kept() {
        assert_eq!(convert(r"\ "), " ");
        assert_eq!(convert("\\\n"), "\n");
        assert_eq!(convert(r"\\\\\ "), r"\\\\ ");
        assert_eq!(convert("\\\\\\\\\\ \\\\\t"), r"\\\\ \\");
        assert_eq!(convert(r"a\ b"), "a b");
        assert_eq!(convert("[a b]{10}"), "[a b]{10}");
        assert_eq!(convert(r"[a\ b]{10}"), r"[a\ b]{10}");
    }

    #[test]
    fn test_whitespace_inside_open_braces() {
        assert_eq!(convert("a{ 1,3}"), "a{(?:)1,3}");
        assert_eq!(convert("a{1, 3}"), "a{1,(?:)3}");
        assert_eq!(convert(r"a\{ 1}"), r"a\{1}");
        assert_eq!(convert("a{  1}"), "a{(?:)1}");
    }

    #[test]
    fn test_whitespace_inside_escapes() {
        assert_eq!(convert(r"\x1 F"), r"\x1(?:)F");
        assert_eq!(convert(r"\u12 Af"), r"\u12(?:)Af");
        assert_eq!(convert(r"\c M"), r"\c(?:)M");
        assert_eq!(convert(r"\x41 F"), r"\x41F");
        assert_eq!(convert_with(r"\u {12Af}", "u").unwrap(), r"\u{12Af}");
        assert_eq!(convert_with(r"\u{12 Af}", "u").unwrap(), r"\u{12(?:)Af}");
    }

    #[test]
    fn test_code_point_braces_are_not_quantifiers() {
        assert_eq!(convert_with(r"\u{10000}+", "u").unwrap(), r"\u{10000}+");
        assert_eq!(convert_with(r"\u{10000}", "uU").unwrap(), r"\u{10000}");
        assert_eq!(convert_with(r"\u{10000}*", "uU").unwrap(), r"\u{10000}*?");
        assert_eq!(convert_with(r"\u{10000}++", "u").unwrap(), r"(?=(\u{10000}+))\1");
        assert_eq!(convert_with(r"a\u{41}{2}", "u").unwrap(), r"a\u{41}{2}");
        // without the unicode flag `\u{4}` repeats `u`
        assert_eq!(convert_with(r"\u{4}", "U").unwrap(), r"\u{4}?");
    }

    #[test]
    fn test_character_classes() {
        assert_eq!(convert(r"\[a[b\]c]d\[]"), r"\[a[b\]c]d\[]");
        assert_eq!(convert(r"\[a\ [b\]\ /c]\ d\[\ ]"), r"\[a [b\]\ /c] d\[ ]");
    }

    #[test]
    fn test_unterminated_class() {
        assert!(matches!(syntax_error("[a", ""), SyntaxError::Native(_)));
        assert!(matches!(syntax_error(r"[a\]", ""), SyntaxError::Native(_)));
    }

    #[test]
    fn test_octal_escapes() {
        assert_eq!(convert(r"\0"), r"\0");
        assert_eq!(convert(r"\0a"), r"\0a");
        assert_eq!(convert(r"\0 1"), r"\0(?:)1");
        assert_eq!(convert("\\0\n\t\t9"), r"\0(?:)9");
        assert_eq!(convert(r"\0 a"), r"\0a");
        assert_eq!(convert(r"[\1]"), r"[\1]");
        for input in [r"\1", r"\01", r"\001", r"\901", r"(.) \1 23"] {
            assert!(
                matches!(syntax_error(input, ""), SyntaxError::OctalEscape(_)),
                "{input}"
            );
        }
    }

    #[test]
    fn test_single_line_dot() {
        assert_eq!(convert("."), ".");
        assert_eq!(convert_with(".", "s").unwrap(), "[^]");
        assert_eq!(convert_with(r"\.", "s").unwrap(), r"\.");
        assert_eq!(convert_with(".[.]", "s").unwrap(), "[^][.]");
    }

    #[test]
    fn test_ungreedy() {
        let u = |input| convert_with(input, "U").unwrap();
        assert_eq!(convert(".*"), ".*");
        assert_eq!(u(".*"), ".*?");
        assert_eq!(u(".*?"), ".*");
        assert_eq!(u(".+"), ".+?");
        assert_eq!(u(".+?"), ".+");
        assert_eq!(u(".{10}"), ".{10}?");
        assert_eq!(u(".{10}?"), ".{10}");
        assert_eq!(u(".{10,}"), ".{10,}?");
        assert_eq!(u(".{10,20}?"), ".{10,20}");
        assert_eq!(u("[a.{10,20}b]"), "[a.{10,20}b]");
        assert_eq!(u(r"\*"), r"\*");
    }

    #[test]
    fn test_no_capture() {
        let n = |input| convert_with(input, "n").unwrap();
        assert_eq!(convert("(.)"), "(.)");
        assert_eq!(n("(.)"), "(?:.)");
        assert_eq!(n("(?:.)"), "(?:.)");
        assert_eq!(n("(?!.)"), "(?!.)");
        assert_eq!(n("[(.)]"), "[(.)]");
        assert_eq!(n(r"(.)-(?:(?<char>\w))"), r"(?:.)-(?:(\w))");
    }

    #[test]
    fn test_strict_escapes() {
        let x = |input| convert_with(input, "X");
        assert_eq!(x(r"\d\D\w\W\s\S\t\r\n\v\f\b\B").unwrap(), r"\d\D\w\W\s\S\t\r\n\v\f\b\B");
        assert_eq!(x(r"\cM\x0F\u12Af").unwrap(), r"\cM\x0F\u12Af");
        assert_eq!(convert_with(r"\u{12Af7}", "Xu").unwrap(), r"\u{12Af7}");
        assert_eq!(convert_with(r"\p{L}", "Xu").unwrap(), r"\p{L}");
        assert_eq!(convert_with(r"\ u{12345}", "Xu").unwrap(), " u{12345}");
        assert_eq!(x(r"[\w]").unwrap(), r"[\w]");

        assert_eq!(syntax_error(r"\a", "X"), SyntaxError::UnnecessaryEscape('a'));
        assert_eq!(syntax_error(r"[\a]", "X"), SyntaxError::UnnecessaryEscape('a'));
        assert_eq!(syntax_error(r"\u{12Af7}", "X"), SyntaxError::UnicodeFlagRequired('u'));
        assert_eq!(syntax_error(r"\p{L}", "X"), SyntaxError::UnicodeFlagRequired('p'));
        for input in [r"\c M", r"\x1", r"\x1G", r"\x1 F", r"\u12", r"\u12 Af", r"\u {12Af}"] {
            assert!(syntax_error(input, "Xu").to_string().contains("unnecessary"), "{input}");
        }
        assert!(convert_with(r"\u{12 Af}", "Xu").is_err());
    }

    #[test]
    fn test_lax_escapes() {
        for input in [r"\c M", r"\a", r"\x1", r"\x1G", r"\u12"] {
            assert!(convert_with(input, "").is_ok(), "{input}");
        }
        assert!(convert_with(r"\u{12Af7}", "").is_ok());
    }

    #[test]
    fn test_references() {
        assert_eq!(convert("(.)$1"), r"(.)\1");
        assert_eq!(convert("(.)$<1>"), r"(.)\1");
        assert_eq!(convert(r"(?<char>\w)$1"), r"(\w)\1");
        assert_eq!(convert(r"(?<char>\w)$<char>"), r"(\w)\1");
        assert_eq!(convert(r"(?<char>\w)\k<char>"), r"(\w)\1");
        assert_eq!(convert(r"(?<char>\w)$ <char>"), r"(\w)$<char>");
        assert_eq!(convert("(.)[$1]"), "(.)[$1]");
        assert_eq!(convert(r"(.)\$1"), r"(.)\$1");
        assert_eq!(
            convert("(a)(b)(c)(d)(e)(f)(g)(h)(i)(j)$10"),
            r"(a)(b)(c)(d)(e)(f)(g)(h)(i)(j)\10"
        );
    }

    #[test]
    fn test_digit_after_reference_is_separated() {
        assert_eq!(convert("(a)$1 1"), r"(a)\1(?:)1");
        assert_eq!(convert("(a)$<1>2"), r"(a)\1(?:)2");
        assert_eq!(convert("(a)$1a"), r"(a)\1a");
    }

    #[test]
    fn test_bad_references() {
        assert!(matches!(syntax_error("$0", ""), SyntaxError::UnresolvedReference(_)));
        assert!(matches!(syntax_error("$1", ""), SyntaxError::UnresolvedReference(_)));
        assert!(matches!(syntax_error("(.)$1", "n"), SyntaxError::UnresolvedReference(_)));
        assert!(matches!(syntax_error("$1(.)", ""), SyntaxError::UnresolvedReference(_)));
        assert!(matches!(syntax_error("$<a>(?<a>.)", ""), SyntaxError::UnresolvedReference(_)));
        assert_eq!(syntax_error(r"(?<ch ar>\w)", ""), SyntaxError::ExpectedGroupName);
        assert!(matches!(syntax_error(r"(? <char>\w)", ""), SyntaxError::InvalidGroup(_)));
        assert_eq!(
            syntax_error("(?<a>x)( ?:y)(?<b>z)", ""),
            SyntaxError::InvalidGroup("( ?".to_string())
        );
        assert!(matches!(syntax_error("(\n ?<b>z)", "n"), SyntaxError::InvalidGroup(_)));
        assert_eq!(convert("( a)(?<b>z)"), "(a)(z)");
        assert!(matches!(
            syntax_error(r"(?<char>\w)$<ch ar>", ""),
            SyntaxError::ExpectedReferenceName(_)
        ));
        assert!(matches!(
            syntax_error(r"(?<1st>\w)", ""),
            SyntaxError::GroupNameStartsWithDigit(_)
        ));
        assert!(matches!(
            syntax_error(r"(?<a>\w)(?<a>\w)", ""),
            SyntaxError::DuplicateGroupName(_)
        ));
    }

    #[test]
    fn test_group_table() {
        let options = Options::new();
        let output = scan(r"(a)(?<b>b)(?:c)(?=d)(?<=e)", &options, None).unwrap();
        assert_eq!(
            output.groups.slots(),
            &[Slot::Anonymous, Slot::Anonymous, Slot::Named("b".to_string())]
        );
    }

    #[test]
    fn test_atomic_groups() {
        assert_eq!(convert("(?>a+)b"), r"(?=(a+))\1b");
        assert_eq!(convert("(a)(?>b)$1"), r"(a)(?=(b))\2\1");
        assert_eq!(convert("(?>a)1"), r"(?=(a))\1(?:)1");
        assert_eq!(convert("(?>(?>a))"), r"(?=((?=(a))\2))\1");
        assert_eq!(convert("[(?>]"), "[(?>]");
        assert_eq!(syntax_error("(?>a", ""), SyntaxError::UnterminatedAtomicGroup);
        assert_eq!(syntax_error("(?>[)]", ""), SyntaxError::UnterminatedAtomicGroup);
        assert!(matches!(syntax_error("(?>[)", ""), SyntaxError::Native(_)));
    }

    #[test]
    fn test_atomic_group_is_hidden() {
        let options = Options::new();
        let output = scan("(?>(a))(b)", &options, None).unwrap();
        assert!(output.groups.is_suppressed(1));
        assert_eq!(output.groups.visible_count(), 2);
        assert_eq!(output.groups.resolve_number(1).unwrap(), 2);
    }

    #[test]
    fn test_quantified_atomic_group_is_wrapped() {
        assert_eq!(convert("(?>a)+"), r"(?:(?=(a))\1)+");
        assert_eq!(convert_with("(?>a)*", "U").unwrap(), r"(?:(?=(a))\1)*?");
    }

    #[test]
    fn test_possessive_quantifiers() {
        assert_eq!(convert("a++b"), r"(?=(a+))\1b");
        assert_eq!(convert("xa*+"), r"x(?=(a*))\1");
        assert_eq!(convert("[ab]?+"), r"(?=([ab]?))\1");
        assert_eq!(convert(r"\d{2,}+"), r"(?=(\d{2,}))\1");
        assert_eq!(convert_with(".++", "s").unwrap(), r"(?=([^]+))\1");
        assert_eq!(convert_with("a++", "U").unwrap(), r"(?=(a+))\1");
        assert_eq!(convert("(?>a)++"), r"(?=((?:(?=(a))\2)+))\1");
    }

    #[test]
    fn test_possessive_group_shifts_inner_captures() {
        assert_eq!(convert("(a)++$1"), r"(?=((a)+))\1\2");
        assert_eq!(convert(r"(x)((y)\k<3>)*+"), r"(x)(?=(((y)\4)*))\2");
        let options = Options::new();
        let output = scan("(a)(b)++", &options, None).unwrap();
        assert!(output.groups.is_suppressed(2));
        assert_eq!(output.groups.resolve_number(2).unwrap(), 3);
    }

    #[test]
    fn test_possessive_needs_an_atom() {
        assert!(matches!(syntax_error("++", ""), SyntaxError::NothingToRepeat(_)));
        assert!(matches!(syntax_error("(++)", ""), SyntaxError::NothingToRepeat(_)));
        assert!(matches!(syntax_error("a|*+", ""), SyntaxError::NothingToRepeat(_)));
    }

    #[test]
    fn test_spliced_emulation() {
        let options = Options::new();
        let output = scan(r"(?=(a+))\1b", &options, None).unwrap();
        assert_eq!(output.source, r"(?=(a+))\1b");
        assert!(output.groups.is_suppressed(1));
        assert_eq!(output.groups.visible_count(), 0);

        let output = scan(r"(x)(?=(a+))\1", &options, None).unwrap();
        assert_eq!(output.source, r"(x)(?=(a+))\2");
        assert_eq!(output.groups.visible_count(), 1);

        let no_capture = options.with(crate::flags::Flag::NoCapture, true);
        let output = scan(r"(?=(a+))\1", &no_capture, None).unwrap();
        assert_eq!(output.source, r"(?=(a+))\1");

        assert!(matches!(syntax_error(r"(?=(a)b)\1", ""), SyntaxError::OctalEscape(_)));
        assert!(matches!(syntax_error(r"(?=(a))c\1", ""), SyntaxError::OctalEscape(_)));
    }

    #[test]
    fn test_flags_delimiter() {
        let options = Options::new();
        let output = scan("a/gi", &options, Some('/')).unwrap();
        assert_eq!(output.source, "a");
        assert_eq!(output.trailing_flags.as_deref(), Some("gi"));

        let output = scan(r"a\/b[/]", &options, Some('/')).unwrap();
        assert_eq!(output.source, r"a\/b[/]");
        assert_eq!(output.trailing_flags, None);

        let err = scan("a/g/", &options, Some('/')).unwrap_err();
        assert_eq!(err, Error::Syntax(SyntaxError::DuplicateFlagsDelimiter('/')));
    }
}
