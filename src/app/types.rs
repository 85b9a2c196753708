use crate::assistant::{AssistantError, Exchange};
use std::time::{Duration, Instant};

/// Results sent back from the exchange worker thread
#[derive(Debug)]
pub enum AppEvent {
    Answered(Exchange),
    Failed(AssistantError),
}

/// Short-lived message in the footer
#[derive(Debug, Clone)]
pub struct StatusToast {
    pub message: String,
    pub created_at: Instant,
}

impl StatusToast {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            created_at: Instant::now(),
        }
    }

    #[must_use]
    pub fn is_expired(&self, duration: Duration) -> bool {
        self.created_at.elapsed() >= duration
    }
}
