mod chat;
mod components;
mod help;
mod wrap;

use crate::app::{App, AppMode};
use ratatui::Frame;

pub use chat::APP_TITLE;

pub fn render(f: &mut Frame, app: &App) {
    match app.mode {
        AppMode::Chat => chat::render_chat_view(f, app),
        AppMode::Help => help::render_help_view(f),
    }
}
