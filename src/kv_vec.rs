//! Ordered name/value vectors
//!
//! A parsed request is carried as a [`KeyValueVec`]: one entry per api-path
//! segment (`interface=eth0` becomes name `interface`, value `eth0`) or per
//! query parameter. Entries are addressed by index only; any insertion or
//! deletion may move them, so callers re-resolve by index after mutating.

use std::fmt;

/// A single owned (name, value) pair. An empty value means "no key component".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValue {
    name: String,
    value: String,
}

impl KeyValue {
    /// Create an entry from a name and value
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Entry name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entry value (empty when the segment carried no `=`)
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Check whether the entry carries a value
    pub fn has_value(&self) -> bool {
        !self.value.is_empty()
    }

    /// Replace the name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_owned();
    }

    /// Replace the value
    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_owned();
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}={}", self.name, self.value)
        }
    }
}

/// Resizable, owned sequence of [`KeyValue`] entries with an optional name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueVec {
    entries: Vec<KeyValue>,
    name: Option<String>,
}

/// Path-segment vector: one entry per api-path segment
pub type PathVec = KeyValueVec;

/// Query vector: one decoded entry per query parameter
pub type QueryVec = KeyValueVec;

impl KeyValueVec {
    /// Create an empty vector
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a vector of `len` empty entries
    pub fn with_len(len: usize) -> Self {
        Self {
            entries: vec![KeyValue::default(); len],
            name: None,
        }
    }

    /// Create a vector holding a clone of `entry`
    pub fn from_entry(entry: &KeyValue) -> Self {
        let mut vec = Self::new();
        vec.append(entry);
        vec
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the vector has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector-level name, if set
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set the vector-level name
    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_owned());
    }

    /// Append a new empty entry and return its index
    pub fn add(&mut self) -> usize {
        self.entries.push(KeyValue::default());
        self.entries.len() - 1
    }

    /// Append a clone of `entry` and return its index
    pub fn append(&mut self, entry: &KeyValue) -> usize {
        self.entries.push(entry.clone());
        self.entries.len() - 1
    }

    /// Append an entry built from a name and value and return its index
    pub fn push(&mut self, name: &str, value: &str) -> usize {
        self.entries.push(KeyValue::new(name, value));
        self.entries.len() - 1
    }

    /// Entry at index `i`
    pub fn get(&self, i: usize) -> Option<&KeyValue> {
        self.entries.get(i)
    }

    /// Mutable entry at index `i`
    pub fn get_mut(&mut self, i: usize) -> Option<&mut KeyValue> {
        self.entries.get_mut(i)
    }

    /// Index following `prev`, or the first index when `prev` is `None`
    pub fn next_index(&self, prev: Option<usize>) -> Option<usize> {
        let next = prev.map_or(0, |i| i + 1);
        (next < self.entries.len()).then_some(next)
    }

    /// Iterate over the entries as they are now
    pub fn iter(&self) -> std::slice::Iter<'_, KeyValue> {
        self.entries.iter()
    }

    /// Index of the first entry with the given name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Value of the first entry with the given name
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.entries[i].value())
    }

    /// Delete the entry at index `i`, shifting later entries down.
    /// Returns the new length; an out-of-range index leaves the vector untouched.
    pub fn delete(&mut self, i: usize) -> usize {
        if i < self.entries.len() {
            self.entries.remove(i);
            self.entries.shrink_to_fit();
        }
        self.entries.len()
    }

    /// Release every entry and the vector name
    pub fn reset(&mut self) {
        self.entries = Vec::new();
        self.name = None;
    }
}

impl<'a> IntoIterator for &'a KeyValueVec {
    type Item = &'a KeyValue;
    type IntoIter = std::slice::Iter<'a, KeyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
