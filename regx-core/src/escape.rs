//! Escape and position analysis
//!
//! Helpers shared by the renderer and the scanner: deciding whether a
//! position is escaped, the character sets of the dialect, and escaping
//! literal text so it matches itself.

/// Returns true iff the run of backslashes immediately before `index` is odd.
///
/// `index` is a byte offset; positions past the end are clamped.
pub fn is_escaped_at(text: &str, index: usize) -> bool {
    let end = index.min(text.len());
    let run = text.as_bytes()[..end]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count();
    run % 2 == 1
}

/// Whitespace as the native engine's `\s` understands it.
pub fn is_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{000B}'
            | '\u{000C}'
            | '\r'
            | ' '
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// Characters that end a `#` comment.
pub fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Check if `name` is a valid identifier (`[A-Za-z_]\w*`)
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(is_word_char)
}

/// ASCII word character (`\w`)
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Escape every metacharacter and whitespace in `text`.
///
/// With `unicode` set, `-` and `,` stay bare: the engine rejects identity
/// escapes of non-syntax characters in unicode mode.
pub fn escape_literal(text: &str, unicode: bool) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        let needs_escape = match c {
            '[' | ']' | '{' | '}' | '(' | ')' | '*' | '+' | '?' | '.' | '\\' | '/' | '^'
            | '$' | '|' | '#' => true,
            '-' | ',' => !unicode,
            c => is_whitespace(c),
        };
        if needs_escape {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_escaped_positions() {
        assert!(!is_escaped_at("a.", 1));
        assert!(is_escaped_at(r"\.", 1));
        assert!(!is_escaped_at(r"\\.", 2));
        assert!(is_escaped_at(r"\\\.", 3));
        assert!(!is_escaped_at("", 0));
        assert!(!is_escaped_at(r"\", 0));
    }

    #[test]
    fn test_escaped_clamps_index() {
        assert!(is_escaped_at(r"a\", 10));
    }

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("char"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("$"));
        assert!(!is_identifier("1a"));
        assert!(!is_identifier("ch ar"));
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("?", false), r"\?");
        assert_eq!(escape_literal("a b", false), r"a\ b");
        assert_eq!(escape_literal("1,2-3", false), r"1\,2\-3");
        assert_eq!(escape_literal("1,2-3", true), "1,2-3");
        assert_eq!(escape_literal("#/", true), r"\#\/");
    }

    #[test]
    fn test_whitespace_set() {
        assert!(is_whitespace('\u{FEFF}'));
        assert!(is_whitespace('\u{2028}'));
        assert!(!is_whitespace('\u{0085}'));
        assert!(!is_whitespace('a'));
    }

    proptest! {
        #[test]
        fn prop_backslash_parity(n in 0usize..32) {
            let text = format!("{}x", "\\".repeat(n));
            prop_assert_eq!(is_escaped_at(&text, n), n % 2 == 1);
        }

        #[test]
        fn prop_escaped_literal_has_no_bare_metachar(text in "\\PC*") {
            let escaped = escape_literal(&text, false);
            let mut chars = escaped.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    prop_assert!(chars.next().is_some());
                } else {
                    let metachars = "[]{}()*+?.\\/^$|#";
                    prop_assert!(!metachars.contains(c));
                    prop_assert!(!is_whitespace(c));
                }
            }
        }
    }
}
