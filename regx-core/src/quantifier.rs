//! Quantifier and atomicity rewriting
//!
//! The native engine has neither possessive quantifiers nor atomic groups.
//! Both are emulated with a capturing lookahead followed by a backreference
//! to it: `(?=(X))\N` matches what `X` matches, and once the lookahead is
//! left its captured text cannot be backtracked into.

use crate::escape::is_escaped_at;
use crate::groups::GroupTable;
use crate::lexer::Quantifier;

/// A span of emitted source that a quantifier can apply to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Atom {
    /// Start offset in the output
    pub start: usize,
    /// End offset in the output
    pub end: usize,
    /// The native index the first group inside the atom has (or would have)
    pub first_group: usize,
    /// The span is an emulation `(?=(X))\N` that a quantifier must wrap
    pub emulated: bool,
}

/// Text of a quantifier after ungreedy inversion
///
/// The possessive marker is never emitted; the caller rewrites the atom.
pub fn render_quantifier(quantifier: &Quantifier, ungreedy: bool) -> String {
    let mut text = quantifier.repeat.as_str().to_string();
    if !quantifier.possessive && quantifier.lazy != ungreedy {
        text.push('?');
    }
    text
}

/// Find the atom that ends the output
///
/// `recorded` is the most recent group or class span; it is used when it
/// ends exactly where the output does. Otherwise the output is scanned
/// backwards for an escape sequence or a single character.
pub fn trailing_atom(out: &str, recorded: Option<Atom>, groups: &GroupTable) -> Option<Atom> {
    if let Some(atom) = recorded
        && atom.end == out.len()
    {
        return Some(atom);
    }

    let start = trailing_escape_start(out).or_else(|| {
        let (index, c) = out.char_indices().next_back()?;
        (!matches!(c, '(' | '|')).then_some(index)
    })?;

    Some(Atom {
        start,
        end: out.len(),
        first_group: groups.len(),
        emulated: false,
    })
}

/// Start of the escape sequence the output ends with, if any
fn trailing_escape_start(out: &str) -> Option<usize> {
    let bytes = out.as_bytes();
    let window = out.len().saturating_sub(16);
    (window..out.len())
        .rev()
        .filter(|&i| bytes[i] == b'\\' && !is_escaped_at(out, i))
        .find(|&i| is_complete_escape(&out[i..]))
}

/// Whether `text` is exactly one escape sequence
fn is_complete_escape(text: &str) -> bool {
    let Some(body) = text.strip_prefix('\\') else {
        return false;
    };
    let mut chars = body.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let rest = chars.as_str();
    let all_hex = |s: &str| s.chars().all(|c| c.is_ascii_hexdigit());

    match first {
        _ if rest.is_empty() => true,
        'c' => rest.len() == 1 && rest.chars().all(|c| c.is_ascii_alphabetic()),
        'x' => rest.len() == 2 && all_hex(rest),
        'u' => {
            (rest.len() == 4 && all_hex(rest))
                || rest
                    .strip_prefix('{')
                    .and_then(|r| r.strip_suffix('}'))
                    .is_some_and(|hex| !hex.is_empty() && all_hex(hex))
        }
        'p' | 'P' => rest.starts_with('{') && rest.ends_with('}') && !rest.contains('\\'),
        d if d.is_ascii_digit() => rest.chars().all(|c| c.is_ascii_digit()),
        _ => false,
    }
}

/// Add `by` to every emitted backreference `\N` with `N >= from`
///
/// Used when a synthetic group is inserted in front of an atom that
/// already contains groups.
pub fn renumber_backrefs(text: &str, from: usize, by: usize) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    let mut chars = text.char_indices().peekable();
    let mut in_class = false;

    while let Some((i, c)) = chars.next() {
        out.push(c);
        match c {
            '\\' => {
                let Some(&(_, next)) = chars.peek() else {
                    continue;
                };
                if in_class || !next.is_ascii_digit() || next == '0' {
                    out.push(next);
                    chars.next();
                    continue;
                }
                let digits: String = text[i + 1..]
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                for _ in 0..digits.len() {
                    chars.next();
                }
                match digits.parse::<usize>() {
                    Ok(n) if n >= from => out.push_str(&(n + by).to_string()),
                    _ => out.push_str(&digits),
                }
            }
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            _ => {}
        }
    }
    out
}

/// Rewrite the atom ending the output as a possessive repetition
///
/// The synthetic group is inserted at the atom's first group position so
/// that groups declared inside the atom and after it keep increasing
/// native indices.
pub fn make_possessive(
    out: &mut String,
    atom: Atom,
    repeat: &str,
    groups: &mut GroupTable,
) -> Atom {
    let slot = groups.insert_suppressed(atom.first_group);
    let body = renumber_backrefs(&out[atom.start..], slot, 1);
    out.truncate(atom.start);
    out.push_str("(?=(");
    out.push_str(&body);
    out.push_str(repeat);
    out.push_str("))");
    push_backref(out, slot);
    Atom {
        start: atom.start,
        end: out.len(),
        first_group: slot,
        emulated: true,
    }
}

/// Wrap an emulated atom in a non-capturing group so it can be repeated
pub fn wrap_emulated(out: &mut String, atom: Atom) -> Atom {
    out.insert_str(atom.start, "(?:");
    out.push(')');
    Atom {
        end: out.len(),
        emulated: false,
        ..atom
    }
}

/// Opener of an atomic group emulation
pub const ATOMIC_OPEN: &str = "(?=(";

/// Close an atomic group emulation whose synthetic group is `slot`
pub fn close_atomic(out: &mut String, slot: usize) {
    out.push_str("))");
    push_backref(out, slot);
}

/// Emit a native backreference
pub fn push_backref(out: &mut String, index: usize) {
    out.push('\\');
    out.push_str(&index.to_string());
}
