impl crate::app::App {
    /// Scrolls toward older turns and pauses auto-scroll
    pub fn scroll_chat_up_lines(&mut self, lines: usize) {
        self.chat_auto_scroll = false;
        self.chat_scroll_offset = self
            .chat_scroll_offset
            .saturating_add(lines)
            .min(self.chat_scroll_limit.get());
    }

    /// Scrolls toward newer turns; reaching the bottom resumes auto-scroll
    pub fn scroll_chat_down_lines(&mut self, lines: usize) {
        self.chat_scroll_offset = self
            .chat_scroll_offset
            .min(self.chat_scroll_limit.get())
            .saturating_sub(lines);
        if self.chat_scroll_offset == 0 {
            self.chat_auto_scroll = true;
        }
    }

    pub fn scroll_chat_up_page(&mut self) {
        self.scroll_chat_up_lines(20);
    }

    pub fn scroll_chat_down_page(&mut self) {
        self.scroll_chat_down_lines(20);
    }

    pub fn jump_to_top(&mut self) {
        self.chat_auto_scroll = false;
        self.chat_scroll_offset = self.chat_scroll_limit.get();
    }

    pub fn reset_chat_scroll(&mut self) {
        self.chat_scroll_offset = 0;
        self.chat_auto_scroll = true;
    }
}
