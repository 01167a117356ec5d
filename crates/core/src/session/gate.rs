#![allow(missing_docs)]

/// Longest display name accepted at capture time, in characters.
pub const MAX_NAME_LEN: usize = 10;

/// Turn raw capture input into a display name; blank input is no login.
pub fn normalize_submission(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_NAME_LEN).collect())
}

/// Editable single-line buffer backing the name prompt.
///
/// The cursor is a character index, so multi-byte names edit correctly.
#[derive(Debug, Clone, Default)]
pub struct NameInput {
    chars: Vec<char>,
    cursor: usize,
}

impl NameInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_full(&self) -> bool {
        self.chars.len() >= MAX_NAME_LEN
    }

    /// Insert at the cursor; refused once the buffer is full or for control characters.
    pub fn insert(&mut self, ch: char) -> bool {
        if self.is_full() || ch.is_control() {
            return false;
        }
        self.chars.insert(self.cursor, ch);
        self.cursor += 1;
        true
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, self.chars.len() as isize) as usize;
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.chars.len();
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }
}
