//! Group table for tracking capture groups
//!
//! This module provides the table that tracks every native capture group the
//! scanner emits, in emission order. It is used for:
//! - Resolving `$1` / `$<name>` references to native `\N` form
//! - Ensuring group names are unique
//! - Hiding synthetic groups and attaching names after a match

use crate::error::SyntaxError;
use crate::escape::is_identifier;

/// What a native capture group stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// An anonymous capture, kept in results
    Anonymous,
    /// A named capture, kept in results and exposed by name
    Named(String),
    /// A synthetic capture from atomic/possessive emulation, hidden
    Suppressed,
}

/// Ordered table of capture groups; index 0 is the whole match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTable {
    slots: Vec<Slot>,
}

impl Default for GroupTable {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupTable {
    /// Create a table holding only the whole-match sentinel
    pub fn new() -> Self {
        GroupTable {
            slots: vec![Slot::Anonymous],
        }
    }

    /// Number of slots including the sentinel
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if no capture group was declared
    pub fn is_empty(&self) -> bool {
        self.slots.len() == 1
    }

    /// All slots, sentinel first
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Register an anonymous capture group
    ///
    /// # Returns
    /// The native index assigned to this group
    pub fn push_anonymous(&mut self) -> usize {
        self.slots.push(Slot::Anonymous);
        self.slots.len() - 1
    }

    /// Register a named capture group
    ///
    /// # Errors
    /// Returns an error if the name is not an identifier or already in use
    pub fn push_named(&mut self, name: &str) -> Result<usize, SyntaxError> {
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(SyntaxError::GroupNameStartsWithDigit(name.to_string()));
        }
        if !is_identifier(name) {
            return Err(SyntaxError::InvalidGroupName(name.to_string()));
        }
        if self.index_of(name).is_some() {
            return Err(SyntaxError::DuplicateGroupName(name.to_string()));
        }
        self.slots.push(Slot::Named(name.to_string()));
        Ok(self.slots.len() - 1)
    }

    /// Register a synthetic group at the end
    pub fn push_suppressed(&mut self) -> usize {
        self.slots.push(Slot::Suppressed);
        self.slots.len() - 1
    }

    /// Insert a synthetic group at `index`, shifting later groups up by one
    pub fn insert_suppressed(&mut self, index: usize) -> usize {
        let index = index.clamp(1, self.slots.len());
        self.slots.insert(index, Slot::Suppressed);
        index
    }

    /// Turn an existing anonymous group into a synthetic one
    pub fn suppress(&mut self, index: usize) {
        if index > 0 && self.slots.get(index) == Some(&Slot::Anonymous) {
            self.slots[index] = Slot::Suppressed;
        }
    }

    pub fn is_suppressed(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Slot::Suppressed))
    }

    /// Get the native index of a named group
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, Slot::Named(n) if n == name))
    }

    /// Number of groups a caller can see
    pub fn visible_count(&self) -> usize {
        self.slots[1..]
            .iter()
            .filter(|slot| !matches!(slot, Slot::Suppressed))
            .count()
    }

    /// Resolve a name reference to a native index
    pub fn resolve_name(&self, name: &str) -> Result<usize, SyntaxError> {
        self.index_of(name)
            .ok_or_else(|| SyntaxError::UnresolvedReference(name.to_string()))
    }

    /// Resolve a visible group number to a native index
    ///
    /// Synthetic groups do not count: `$1` is the first group the caller
    /// wrote, whatever the emulation inserted before it.
    pub fn resolve_number(&self, number: usize) -> Result<usize, SyntaxError> {
        if number == 0 {
            return Err(SyntaxError::UnresolvedReference(number.to_string()));
        }
        self.slots
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, slot)| !matches!(slot, Slot::Suppressed))
            .nth(number - 1)
            .map(|(index, _)| index)
            .ok_or_else(|| SyntaxError::UnresolvedReference(number.to_string()))
    }

    /// Whether matches need to be post-processed
    pub fn needs_augmentation(&self) -> bool {
        self.slots[1..]
            .iter()
            .any(|slot| !matches!(slot, Slot::Anonymous))
    }

    /// Names of the named groups in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Named(name) => Some(name.as_str()),
            _ => None,
        })
    }
}
