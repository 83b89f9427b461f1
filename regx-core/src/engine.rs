//! Compiled patterns and the match augmentation shim
//!
//! A [`Pattern`] wraps a native `regress` matcher together with the group
//! table the scanner produced. When the table holds named or synthetic
//! groups, every raw match is rewritten before it reaches the caller:
//! synthetic groups are removed and named groups are exposed by name.

use crate::error::{Result, SyntaxError, TypeError};
use crate::flags::Options;
use crate::groups::{GroupTable, Slot};
use crate::registry;
use crate::scanner::ScanOutput;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

/// A successful match over a haystack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'h> {
    haystack: &'h str,
    /// Group 0 is the whole match, then the visible groups in order
    groups: Vec<Option<Range<usize>>>,
    named_groups: HashMap<String, Range<usize>>,
}

impl<'h> Match<'h> {
    /// Start offset of the match
    pub fn start(&self) -> usize {
        self.range().start
    }

    /// End offset of the match (exclusive)
    pub fn end(&self) -> usize {
        self.range().end
    }

    pub fn range(&self) -> Range<usize> {
        self.groups[0].clone().unwrap_or_default()
    }

    /// The matched text
    pub fn as_str(&self) -> &'h str {
        &self.haystack[self.range()]
    }

    /// Range of a group by visible index, 0 being the whole match
    pub fn group(&self, index: usize) -> Option<Range<usize>> {
        self.groups.get(index).cloned().flatten()
    }

    /// Text of a group by visible index
    pub fn get(&self, index: usize) -> Option<&'h str> {
        self.group(index).map(|range| &self.haystack[range])
    }

    /// Text of a named group, if it participated in the match
    pub fn name(&self, name: &str) -> Option<&'h str> {
        self.named_groups
            .get(name)
            .map(|range| &self.haystack[range.clone()])
    }

    /// Ranges of the named groups that participated in the match
    pub fn named_groups(&self) -> &HashMap<String, Range<usize>> {
        &self.named_groups
    }

    /// Number of groups including the whole match
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Never true, group 0 is always present
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group texts in order, starting with the whole match
    pub fn iter(&self) -> impl Iterator<Item = Option<&'h str>> + '_ {
        (0..self.groups.len()).map(|index| self.get(index))
    }
}

/// A compiled pattern
pub struct Pattern {
    id: u64,
    native: regress::Regex,
    source: String,
    flags: String,
    original_source: String,
    original_flags: String,
    groups: GroupTable,
    augment: bool,
    global: bool,
    sticky: bool,
}

impl Pattern {
    /// Compile native source directly, without the dialect
    ///
    /// The result is not registered as a builder product and may be
    /// recompiled in place.
    pub fn native(source: &str, flags: &str) -> Result<Self> {
        let native = native_regex(source, flags)?;
        Ok(Pattern {
            id: registry::next_id(),
            native,
            source: source.to_string(),
            flags: flags.to_string(),
            original_source: source.to_string(),
            original_flags: flags.to_string(),
            groups: GroupTable::new(),
            augment: false,
            global: flags.contains('g'),
            sticky: flags.contains('y'),
        })
    }

    /// Wrap scanner output in a native matcher and register it
    pub(crate) fn from_scan(
        scan: ScanOutput,
        options: &Options,
        original_source: &str,
    ) -> Result<Self> {
        let flags = options.native_flags();
        let native = native_regex(&scan.source, &flags)?;
        let augment = scan.groups.needs_augmentation();
        Ok(Pattern {
            id: registry::register(),
            native,
            source: scan.source,
            flags,
            original_source: original_source.to_string(),
            original_flags: options.original_flags(),
            groups: scan.groups,
            augment,
            global: options.global,
            sticky: options.sticky,
        })
    }

    /// Emitted native source
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Native flag string
    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// The authored text, literals and rendered substitutions merged
    pub fn original_source(&self) -> &str {
        &self.original_source
    }

    /// Native flags followed by the active extended flags
    pub fn original_flags(&self) -> &str {
        &self.original_flags
    }

    /// Every native group, synthetic ones included
    pub fn groups(&self) -> &GroupTable {
        &self.groups
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    pub fn is_sticky(&self) -> bool {
        self.sticky
    }

    /// Whether matches are rewritten before they are returned
    pub fn is_augmented(&self) -> bool {
        self.augment
    }

    /// Replace the matcher of a natively compiled pattern
    ///
    /// # Errors
    /// Patterns produced by the builder can not be recompiled.
    pub fn recompile(&mut self, source: &str, flags: &str) -> Result<()> {
        if registry::contains(self.id) {
            return Err(TypeError::Recompile.into());
        }
        *self = Pattern::native(source, flags)?;
        Ok(())
    }

    /// Find the first match starting at or after `start`
    ///
    /// A sticky pattern only matches exactly at `start`.
    pub fn exec_at<'h>(&self, haystack: &'h str, start: usize) -> Option<Match<'h>> {
        if start > haystack.len() || !haystack.is_char_boundary(start) {
            return None;
        }
        let raw = self.native.find_from(haystack, start).next()?;
        if self.sticky && raw.range().start != start {
            return None;
        }
        Some(self.augment(haystack, raw))
    }

    /// Find the first match in `haystack`
    pub fn find<'h>(&self, haystack: &'h str) -> Option<Match<'h>> {
        self.exec_at(haystack, 0)
    }

    /// Alias of [`Pattern::find`]
    pub fn captures<'h>(&self, haystack: &'h str) -> Option<Match<'h>> {
        self.find(haystack)
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.find(haystack).is_some()
    }

    /// Iterate over successive matches
    ///
    /// An empty match advances the search by one character. For sticky
    /// patterns the matches must be contiguous.
    pub fn matches<'p, 'h>(&'p self, haystack: &'h str) -> Matches<'p, 'h> {
        Matches {
            pattern: self,
            haystack,
            pos: 0,
            done: false,
        }
    }

    /// All matches if the pattern is global, otherwise at most one
    pub fn find_all<'h>(&self, haystack: &'h str) -> Vec<Match<'h>> {
        if self.global {
            self.matches(haystack).collect()
        } else {
            self.find(haystack).into_iter().collect()
        }
    }

    fn augment<'h>(&self, haystack: &'h str, raw: regress::Match) -> Match<'h> {
        let whole = Some(raw.range());
        let captures = raw.captures;

        if !self.augment {
            return Match {
                haystack,
                groups: std::iter::once(whole).chain(captures).collect(),
                named_groups: HashMap::new(),
            };
        }

        let mut groups = vec![whole];
        let mut named_groups = HashMap::new();
        for (slot, capture) in self.groups.slots()[1..].iter().zip(captures) {
            match slot {
                Slot::Suppressed => continue,
                Slot::Named(name) => {
                    if let Some(range) = &capture {
                        named_groups.insert(name.clone(), range.clone());
                    }
                }
                Slot::Anonymous => {}
            }
            groups.push(capture);
        }
        Match {
            haystack,
            groups,
            named_groups,
        }
    }
}

impl Drop for Pattern {
    fn drop(&mut self) {
        registry::unregister(self.id);
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("source", &self.source)
            .field("flags", &self.flags)
            .field("groups", &self.groups)
            .finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = if self.source.is_empty() {
            "(?:)"
        } else {
            &self.source
        };
        write!(f, "/{}/{}", source, self.flags)
    }
}

/// Iterator returned by [`Pattern::matches`]
pub struct Matches<'p, 'h> {
    pattern: &'p Pattern,
    haystack: &'h str,
    pos: usize,
    done: bool,
}

impl<'h> Iterator for Matches<'_, 'h> {
    type Item = Match<'h>;

    fn next(&mut self) -> Option<Match<'h>> {
        if self.done {
            return None;
        }
        let Some(found) = self.pattern.exec_at(self.haystack, self.pos) else {
            self.done = true;
            return None;
        };
        let end = found.end();
        self.pos = if found.start() == end {
            match self.haystack[end..].chars().next() {
                Some(c) => end + c.len_utf8(),
                None => {
                    self.done = true;
                    end
                }
            }
        } else {
            end
        };
        Some(found)
    }
}

/// Build the native matcher, keeping only the flags the engine itself implements
///
/// `g` and `y` are carried out by the shim, `d` has no effect on the
/// results the shim produces.
fn native_regex(source: &str, flags: &str) -> Result<regress::Regex> {
    let mut native = String::with_capacity(flags.len());
    for c in flags.chars() {
        match c {
            'g' | 'y' | 'd' => {}
            'i' | 'm' | 'u' | 'v' => native.push(c),
            other => {
                return Err(SyntaxError::Native(format!(
                    "invalid flag '{other}' in \"{flags}\""
                ))
                .into());
            }
        }
    }
    Ok(regress::Regex::with_flags(source, native.as_str())?)
}
