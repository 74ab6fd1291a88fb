//! Grouped back-stack.
//!
//! A [`History`] is a stack of stacks. Entries are always pushed onto the
//! latest group; a group can be discarded as a unit, which is how modal
//! sub-flows forget their steps when they are dismissed.
//!
//! ```text
//! groups: [ [home, list] , [wizard_1, wizard_2] ]
//!           base group     latest group (clear_latest_group drops it)
//! ```

use crate::error::HistoryError;

#[derive(Debug, Clone)]
pub struct History<T> {
    groups: Vec<Vec<T>>,
    count: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> History<T> {
    pub fn new() -> Self {
        Self {
            groups: vec![Vec::new()],
            count: 0,
        }
    }

    /// Total entries across all groups.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of groups, including the base group.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Entries in the latest group.
    pub fn latest_group_len(&self) -> usize {
        self.groups.last().map_or(0, Vec::len)
    }

    pub fn push(&mut self, entry: T) {
        match self.groups.last_mut() {
            Some(group) => group.push(entry),
            None => self.groups.push(vec![entry]),
        }
        self.count += 1;
    }

    /// Pop the most recent entry.
    ///
    /// Empty trailing groups are discarded on the way, so popping continues
    /// into the previous group once the latest one runs out.
    pub fn pop(&mut self) -> Result<T, HistoryError> {
        while self.groups.len() > 1 && self.groups.last().is_some_and(Vec::is_empty) {
            self.groups.pop();
        }

        let entry = self
            .groups
            .last_mut()
            .and_then(Vec::pop)
            .ok_or(HistoryError::Empty)?;
        self.count -= 1;
        Ok(entry)
    }

    /// The entry `pop` would return.
    pub fn peek(&self) -> Option<&T> {
        self.groups.iter().rev().find_map(|group| group.last())
    }

    /// Open a new group. Subsequent pushes land in it.
    pub fn start_new_group(&mut self) {
        self.groups.push(Vec::new());
    }

    /// Drop the latest group and all of its entries.
    ///
    /// Returns `false` when only the base group exists; the base group is
    /// never removed.
    pub fn clear_latest_group(&mut self) -> bool {
        if self.groups.len() <= 1 {
            return false;
        }
        if let Some(group) = self.groups.pop() {
            self.count -= group.len();
        }
        true
    }

    /// Remove every entry and every group except an empty base group.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.groups.push(Vec::new());
        self.count = 0;
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.groups.iter().flatten()
    }
}
