//! Cursor/text buffer backing the markdown editing surface.

#[derive(Debug, Clone, PartialEq)]
pub struct EditBuffer {
    pub chars: Vec<char>,
    pub cursor: usize,
}

impl EditBuffer {
    pub fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let cursor = chars.len();
        Self { chars, cursor }
    }

    pub fn new_empty() -> Self {
        Self {
            chars: Vec::new(),
            cursor: 0,
        }
    }

    pub fn set_text(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.cursor = self.cursor.min(self.chars.len());
    }

    pub fn insert_char(&mut self, ch: char) {
        self.chars.insert(self.cursor, ch);
        self.cursor += 1;
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.insert_char(ch);
        }
    }

    pub fn delete_back(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.chars.len() {
            self.cursor += 1;
        }
    }

    pub fn move_line_home(&mut self) {
        self.cursor = self.current_line_start();
    }

    pub fn move_line_end(&mut self) {
        self.cursor = self.current_line_end();
    }

    pub fn move_word_left(&mut self) {
        while self.cursor > 0 && self.chars[self.cursor - 1].is_whitespace() {
            self.cursor -= 1;
        }
        while self.cursor > 0 && !self.chars[self.cursor - 1].is_whitespace() {
            self.cursor -= 1;
        }
    }

    pub fn move_word_right(&mut self) {
        let len = self.chars.len();
        while self.cursor < len && !self.chars[self.cursor].is_whitespace() {
            self.cursor += 1;
        }
        while self.cursor < len && self.chars[self.cursor].is_whitespace() {
            self.cursor += 1;
        }
    }

    pub fn move_up(&mut self) {
        let current_line_start = self.current_line_start();
        if current_line_start == 0 {
            self.cursor = 0;
            return;
        }

        let col = self.cursor - current_line_start;
        let prev_line_end = current_line_start - 1; // the \n before current line
        let prev_line_start = self.chars[..prev_line_end]
            .iter()
            .rposition(|&c| c == '\n')
            .map(|p| p + 1)
            .unwrap_or(0);
        let prev_line_len = prev_line_end - prev_line_start;
        self.cursor = prev_line_start + col.min(prev_line_len);
    }

    pub fn move_down(&mut self) {
        let current_line_start = self.current_line_start();
        let current_line_end = self.current_line_end();

        if current_line_end >= self.chars.len() {
            self.cursor = self.chars.len();
            return;
        }

        let col = self.cursor - current_line_start;
        let next_line_start = current_line_end + 1;
        let next_line_end = self.chars[next_line_start..]
            .iter()
            .position(|&c| c == '\n')
            .map(|p| next_line_start + p)
            .unwrap_or(self.chars.len());
        let next_line_len = next_line_end - next_line_start;
        self.cursor = next_line_start + col.min(next_line_len);
    }

    /// (line, column) of the cursor, both zero-based.
    pub fn cursor_position(&self) -> (usize, usize) {
        let line = self.chars[..self.cursor]
            .iter()
            .filter(|&&c| c == '\n')
            .count();
        let col = self.cursor - self.current_line_start();
        (line, col)
    }

    fn current_line_start(&self) -> usize {
        self.chars[..self.cursor]
            .iter()
            .rposition(|&c| c == '\n')
            .map(|p| p + 1)
            .unwrap_or(0)
    }

    fn current_line_end(&self) -> usize {
        self.chars[self.cursor..]
            .iter()
            .position(|&c| c == '\n')
            .map(|p| self.cursor + p)
            .unwrap_or(self.chars.len())
    }

    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cursor_at_end() {
        let buf = EditBuffer::new("hello");
        assert_eq!(buf.to_string(), "hello");
        assert_eq!(buf.cursor, 5);
    }

    #[test]
    fn insert_mid_text() {
        let mut buf = EditBuffer::new("hllo");
        buf.cursor = 1;
        buf.insert_char('e');
        assert_eq!(buf.to_string(), "hello");
        assert_eq!(buf.cursor, 2);
    }

    #[test]
    fn insert_str_advances_cursor() {
        let mut buf = EditBuffer::new_empty();
        buf.insert_str("# Title");
        assert_eq!(buf.to_string(), "# Title");
        assert_eq!(buf.cursor, 7);
    }

    #[test]
    fn delete_back_at_start_is_noop() {
        let mut buf = EditBuffer::new("ab");
        buf.cursor = 0;
        buf.delete_back();
        assert_eq!(buf.to_string(), "ab");
    }

    #[test]
    fn delete_forward_removes_under_cursor() {
        let mut buf = EditBuffer::new("abc");
        buf.cursor = 1;
        buf.delete_forward();
        assert_eq!(buf.to_string(), "ac");
        assert_eq!(buf.cursor, 1);
    }

    #[test]
    fn newline_splits_line() {
        let mut buf = EditBuffer::new("ab");
        buf.cursor = 1;
        buf.insert_newline();
        assert_eq!(buf.to_string(), "a\nb");
        assert_eq!(buf.cursor_position(), (1, 0));
    }

    #[test]
    fn move_up_clamps_to_shorter_line() {
        let mut buf = EditBuffer::new("ab\nlonger line");
        buf.cursor = buf.chars.len(); // end of "longer line"
        buf.move_up();
        assert_eq!(buf.cursor, 2); // end of "ab"
    }

    #[test]
    fn move_down_keeps_column() {
        let mut buf = EditBuffer::new("hello\nworld");
        buf.cursor = 2;
        buf.move_down();
        assert_eq!(buf.cursor_position(), (1, 2));
    }

    #[test]
    fn move_down_on_last_line_goes_to_end() {
        let mut buf = EditBuffer::new("only line");
        buf.cursor = 3;
        buf.move_down();
        assert_eq!(buf.cursor, 9);
    }

    #[test]
    fn line_home_and_end_stay_on_line() {
        let mut buf = EditBuffer::new("first\nsecond");
        buf.cursor = 8; // inside "second"
        buf.move_line_home();
        assert_eq!(buf.cursor, 6);
        buf.move_line_end();
        assert_eq!(buf.cursor, 12);
    }

    #[test]
    fn word_movement_skips_whitespace() {
        let mut buf = EditBuffer::new("one two three");
        buf.cursor = 0;
        buf.move_word_right();
        assert_eq!(buf.cursor, 4);
        buf.move_word_right();
        assert_eq!(buf.cursor, 8);
        buf.move_word_left();
        assert_eq!(buf.cursor, 4);
    }

    #[test]
    fn set_text_clamps_cursor() {
        let mut buf = EditBuffer::new("a longer body");
        buf.set_text("ab");
        assert_eq!(buf.cursor, 2);
    }
}
