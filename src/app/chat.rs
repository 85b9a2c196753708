use super::AppEvent;
use crate::app::{App, TextInput};
use crate::assistant::{ChatBackend, ExchangeRequest};
use crate::session::ConversationSession;
use color_eyre::Result;
use crate::assistant::AssistantError;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Instant;
use tracing::{debug, error, info};

impl App {
    /// Runs the request on a worker thread and reports back over the event channel.
    /// A panicking backend is reported as a failure so the session never stays pending.
    fn spawn_exchange_thread(
        backend: Arc<dyn ChatBackend>,
        request: ExchangeRequest,
        event_tx: Sender<AppEvent>,
    ) {
        std::thread::spawn(move || {
            let started = Instant::now();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| backend.respond(&request)));
            let event = match outcome {
                Ok(Ok(exchange)) => AppEvent::Answered(exchange),
                Ok(Err(failure)) => AppEvent::Failed(failure),
                Err(payload) => {
                    let reason = payload
                        .downcast_ref::<&str>()
                        .map(|message| (*message).to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "panic".to_string());
                    error!(%reason, "exchange worker panicked");
                    AppEvent::Failed(AssistantError::Interrupted(reason))
                }
            };
            debug!(elapsed_ms = started.elapsed().as_millis() as u64, "exchange returned");
            let _ = event_tx.send(event);
        });
    }

    /// Submits the input box. Whitespace-only input and input during a pending exchange are ignored.
    pub fn send_chat_message(&mut self) -> Result<()> {
        if self.is_loading() || self.chat_input.content().trim().is_empty() {
            return Ok(());
        }

        let raw = self.chat_input.take();
        let pending = self.session.begin_exchange(&raw)?;
        self.reset_chat_scroll();
        self.show_status_toast(format!("{} {} 검색", pending.scope.icon(), pending.scope.label()));

        Self::spawn_exchange_thread(
            Arc::clone(&self.backend),
            pending.request,
            self.event_tx.clone(),
        );
        Ok(())
    }

    /// Applies a finished exchange to the session, if one arrived
    pub fn check_assistant_response(&mut self) {
        let Ok(event) = self.event_rx.try_recv() else {
            return;
        };

        match event {
            AppEvent::Answered(exchange) => self.session.complete(exchange),
            AppEvent::Failed(error) => self.session.fail(&error),
        }

        if self.chat_auto_scroll {
            self.chat_scroll_offset = 0;
        }
    }

    /// Discards the session; refused while an exchange is in flight
    pub fn start_new_conversation(&mut self) {
        if self.is_loading() {
            self.show_status_toast("답변 대기 중");
            return;
        }
        info!(turns = self.session.transcript().len(), "discarding conversation");
        self.session = ConversationSession::new();
        self.chat_input = TextInput::new();
        self.reset_chat_scroll();
        self.show_status_toast("새 대화");
    }

    pub fn copy_last_answer(&mut self) {
        let Some(answer) = self.session.last_answer().map(str::to_string) else {
            self.show_status_toast("복사할 답변 없음");
            return;
        };
        if self.clipboard_service.copy_text(&answer).is_ok() {
            self.show_status_toast("복사됨");
        } else {
            self.show_status_toast("복사 실패");
        }
    }

    pub fn add_chat_input_char(&mut self, character: char) {
        if !self.is_loading() {
            self.chat_input.add_char(character);
        }
    }

    pub fn remove_chat_input_char(&mut self) {
        self.chat_input.remove_char();
    }

    /// Pastes text into the input box, flattening line breaks
    pub fn handle_chat_paste(&mut self, text: &str) {
        if self.is_loading() {
            return;
        }
        let flattened: String = text
            .chars()
            .map(|character| if character == '\n' { ' ' } else { character })
            .filter(|character| *character != '\r')
            .collect();
        self.chat_input.insert_str(&flattened);
    }
}
