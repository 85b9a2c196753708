/// Single-line input buffer with a character-based cursor
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    content: String,
    cursor_index: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a character at the cursor
    pub fn add_char(&mut self, character: char) {
        let at = self.byte_index(self.cursor_index);
        self.content.insert(at, character);
        self.cursor_index += 1;
    }

    /// Inserts a string at the cursor
    pub fn insert_str(&mut self, text: &str) {
        let at = self.byte_index(self.cursor_index);
        self.content.insert_str(at, text);
        self.cursor_index += text.chars().count();
    }

    /// Backspace
    pub fn remove_char(&mut self) {
        if self.cursor_index == 0 {
            return;
        }
        let start = self.byte_index(self.cursor_index - 1);
        let end = self.byte_index(self.cursor_index);
        self.content.replace_range(start..end, "");
        self.cursor_index -= 1;
    }

    /// Forward delete
    pub fn delete_char(&mut self) {
        if self.cursor_index >= self.char_count() {
            return;
        }
        let start = self.byte_index(self.cursor_index);
        let end = self.byte_index(self.cursor_index + 1);
        self.content.replace_range(start..end, "");
    }

    pub fn move_left(&mut self) {
        self.cursor_index = self.cursor_index.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor_index = (self.cursor_index + 1).min(self.char_count());
    }

    pub fn move_to_start(&mut self) {
        self.cursor_index = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor_index = self.char_count();
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cursor position in characters
    pub fn cursor_position(&self) -> usize {
        self.cursor_index
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Returns the content and leaves the input empty
    pub fn take(&mut self) -> String {
        self.cursor_index = 0;
        std::mem::take(&mut self.content)
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map_or(self.content.len(), |(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(text: &str) -> TextInput {
        let mut input = TextInput::new();
        input.insert_str(text);
        input
    }

    #[test]
    fn test_insert_in_middle_of_hangul() {
        let mut value = input("지하철");
        value.move_left();
        value.add_char('X');
        assert_eq!(value.content(), "지하X철");
        assert_eq!(value.cursor_position(), 3);
    }

    #[test]
    fn test_backspace_and_delete() {
        let mut value = input("버스앱");
        value.remove_char();
        assert_eq!(value.content(), "버스");
        value.move_to_start();
        value.delete_char();
        assert_eq!(value.content(), "스");
        value.remove_char();
        assert_eq!(value.content(), "스");
    }

    #[test]
    fn test_cursor_is_clamped() {
        let mut value = input("ab");
        value.move_right();
        value.move_right();
        assert_eq!(value.cursor_position(), 2);
        value.delete_char();
        assert_eq!(value.content(), "ab");
    }

    #[test]
    fn test_take_empties_input() {
        let mut value = input("/무브 질문");
        assert_eq!(value.take(), "/무브 질문");
        assert!(value.is_empty());
        assert_eq!(value.cursor_position(), 0);
    }
}
