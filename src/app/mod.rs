mod chat;
mod help;
mod scroll;
mod text_input;
mod types;

pub use text_input::TextInput;
pub use types::*;

use crate::assistant::ChatBackend;
use crate::services::clipboard::ClipboardService;
use crate::session::ConversationSession;
use std::cell::Cell;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::{Duration, Instant};

/// Application mode state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Chat,
    Help,
}

/// Main application state
pub struct App {
    pub mode: AppMode,
    pub should_quit: bool,

    pub session: ConversationSession,
    pub backend: Arc<dyn ChatBackend>,
    pub chat_input: TextInput,
    pub event_rx: Receiver<AppEvent>,
    pub event_tx: Sender<AppEvent>,

    pub chat_scroll_offset: usize,
    /// Largest useful offset, recorded by the last transcript render
    pub chat_scroll_limit: Cell<usize>,
    pub chat_auto_scroll: bool,
    pub status_toast: Option<StatusToast>,
    pub clipboard_service: ClipboardService,
    pub loading_frame: u8,
    pub last_loading_tick: Option<Instant>,
}

impl App {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        let (event_tx, event_rx) = channel();
        Self {
            mode: AppMode::Chat,
            should_quit: false,
            session: ConversationSession::new(),
            backend,
            chat_input: TextInput::new(),
            event_rx,
            event_tx,
            chat_scroll_offset: 0,
            chat_scroll_limit: Cell::new(0),
            chat_auto_scroll: true,
            status_toast: None,
            clipboard_service: ClipboardService::new(),
            loading_frame: 0,
            last_loading_tick: None,
        }
    }

    /// Whether an exchange is waiting on the worker thread
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.session.is_pending()
    }

    pub fn show_status_toast(&mut self, message: impl Into<String>) {
        self.status_toast = Some(StatusToast::new(message));
    }

    pub fn clear_expired_status_toast(&mut self) {
        let should_clear = self
            .status_toast
            .as_ref()
            .is_some_and(|toast| toast.is_expired(Duration::from_secs(3)));
        if should_clear {
            self.status_toast = None;
        }
    }

    #[must_use]
    pub fn status_toast_message(&self) -> Option<&str> {
        self.status_toast.as_ref().map(|toast| toast.message.as_str())
    }

    /// Advances the waiting animation every 200ms while an exchange is in flight
    pub fn tick_loading_animation(&mut self) {
        if !self.is_loading() {
            self.loading_frame = 0;
            self.last_loading_tick = None;
            return;
        }

        let now = Instant::now();
        let should_tick = self
            .last_loading_tick
            .is_none_or(|last_tick| now.duration_since(last_tick) >= Duration::from_millis(200));

        if should_tick {
            self.loading_frame = self.loading_frame.wrapping_add(1);
            self.last_loading_tick = Some(now);
        }
    }
}
