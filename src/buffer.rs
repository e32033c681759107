//! Growable text buffer
//!
//! An append-only accumulator used for every XPath and document the
//! translator produces. Capacity starts at a configured size and doubles
//! whenever an append would not leave room for the terminator slot, so an
//! append never truncates.

use std::fmt;

/// Initial capacity of a buffer created with [`TextBuffer::new`]
pub const DEFAULT_CAPACITY: usize = 1024;

/// Append-only, auto-growing text accumulator
#[derive(Debug, Clone)]
pub struct TextBuffer {
    text: String,
    /// Logical capacity; always strictly greater than `text.len()`
    capacity: usize,
}

impl TextBuffer {
    /// Create an empty buffer with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty buffer with the given initial capacity (at least 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            text: String::with_capacity(capacity),
            capacity,
        }
    }

    /// Append formatted text, growing as needed
    pub fn append_fmt(&mut self, args: fmt::Arguments<'_>) {
        match args.as_str() {
            Some(s) => self.append_str(s),
            None => self.append_str(&args.to_string()),
        }
    }

    /// Append a string slice
    pub fn append_str(&mut self, s: &str) {
        self.grow_for(s.len());
        self.text.push_str(s);
    }

    /// Append a single character
    pub fn append_char(&mut self, c: char) {
        self.grow_for(c.len_utf8());
        self.text.push(c);
    }

    /// The accumulated text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length of the accumulated text (not the capacity)
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if nothing has been appended
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Current capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear the content, keeping the capacity
    pub fn reset(&mut self) {
        self.text.clear();
    }

    /// Consume the buffer and return its text
    pub fn into_string(self) -> String {
        self.text
    }

    fn grow_for(&mut self, additional: usize) {
        let needed = self.text.len() + additional;
        if needed < self.capacity {
            return;
        }
        let mut capacity = self.capacity;
        while needed >= capacity {
            capacity *= 2;
        }
        self.text.reserve_exact(capacity - self.text.len());
        self.capacity = capacity;
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Write for TextBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append_str(s);
        Ok(())
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
