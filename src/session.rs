//! Conversation state: the transcript and the continuation token of the last
//! successful exchange. Owned by the caller and passed explicitly.

use chrono::Local;
use tracing::{info, warn};

use crate::assistant::{AssistantError, ChatBackend, Exchange, ExchangeRequest};
use crate::scope::{ServiceScope, compose_prompt, parse_command};

/// Author of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Assistant,
    /// Local notice such as a failed exchange; never sent upstream
    Notice,
}

/// One transcript entry, immutable once appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub scope: Option<ServiceScope>,
    pub timestamp: String,
}

impl Turn {
    fn now_timestamp() -> String {
        Local::now().format("%H:%M:%S").to_string()
    }

    fn user(scope: ServiceScope, content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
            scope: Some(scope),
            timestamp: Self::now_timestamp(),
        }
    }

    fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
            scope: None,
            timestamp: Self::now_timestamp(),
        }
    }

    fn notice(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Notice,
            content: content.into(),
            scope: None,
            timestamp: Self::now_timestamp(),
        }
    }

    /// Text as shown in the transcript; user turns carry their scope badge
    #[must_use]
    pub fn display_text(&self) -> String {
        match (self.role, self.scope) {
            (TurnRole::User, Some(scope)) => {
                format!("{} [{}] {}", scope.icon(), scope.label(), self.content)
            }
            _ => self.content.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No successful exchange yet
    Fresh,
    /// Holding the id of the last successful exchange
    Continuing,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("an exchange is already in flight")]
    ExchangePending,
}

/// An exchange that has been started and is waiting for the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingExchange {
    pub scope: ServiceScope,
    pub request: ExchangeRequest,
}

#[derive(Debug, Default)]
pub struct ConversationSession {
    transcript: Vec<Turn>,
    continuation_token: Option<String>,
    pending: bool,
}

impl ConversationSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.continuation_token.is_some() {
            SessionState::Continuing
        } else {
            SessionState::Fresh
        }
    }

    #[must_use]
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    #[must_use]
    pub fn continuation_token(&self) -> Option<&str> {
        self.continuation_token.as_deref()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    #[must_use]
    pub fn last_answer(&self) -> Option<&str> {
        self.transcript
            .iter()
            .rev()
            .find(|turn| turn.role == TurnRole::Assistant)
            .map(|turn| turn.content.as_str())
    }

    /// Parses the raw input, records the user turn and builds the outgoing request.
    ///
    /// A FRESH session sends no prior-turn reference; a CONTINUING one sends the stored token.
    pub fn begin_exchange(&mut self, raw: &str) -> Result<PendingExchange, SessionError> {
        if self.pending {
            return Err(SessionError::ExchangePending);
        }

        let (scope, cleaned) = parse_command(raw);
        let request = ExchangeRequest {
            prompt: compose_prompt(scope, &cleaned),
            previous_response_id: self.continuation_token.clone(),
        };
        info!(
            scope = scope.label(),
            state = ?self.state(),
            "starting exchange"
        );

        self.transcript.push(Turn::user(scope, cleaned));
        self.pending = true;

        Ok(PendingExchange {
            scope,
            request,
        })
    }

    /// Records the answer and moves the continuation token forward
    pub fn complete(&mut self, exchange: Exchange) {
        info!(response_id = %exchange.response_id, "exchange completed");
        self.transcript.push(Turn::assistant(exchange.text));
        self.continuation_token = Some(exchange.response_id);
        self.pending = false;
    }

    /// Records a notice for the failed exchange; the continuation token is left as it was
    pub fn fail(&mut self, error: &AssistantError) {
        warn!(%error, "exchange failed");
        self.transcript.push(Turn::notice(error.user_message()));
        self.pending = false;
    }

    /// Runs a whole exchange on the current thread
    pub fn exchange(&mut self, backend: &dyn ChatBackend, raw: &str) -> color_eyre::Result<String> {
        let pending = self.begin_exchange(raw)?;
        match backend.respond(&pending.request) {
            Ok(exchange) => {
                let answer = exchange.text.clone();
                self.complete(exchange);
                Ok(answer)
            }
            Err(error) => {
                self.fail(&error);
                Err(error.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::testing::ScriptedBackend;
    use crate::scope::scope_instruction;

    #[test]
    fn test_new_session_is_fresh_and_empty() {
        let session = ConversationSession::new();
        assert_eq!(session.state(), SessionState::Fresh);
        assert!(session.transcript().is_empty());
        assert_eq!(session.continuation_token(), None);
        assert!(!session.is_pending());
    }

    #[test]
    fn test_first_exchange_has_no_reference_second_uses_token() {
        let backend = ScriptedBackend::answering(&[("첫 답변", "resp_1"), ("둘째 답변", "resp_2")]);
        let mut session = ConversationSession::new();

        assert_eq!(session.exchange(&backend, "환불 정책이 뭐야").unwrap(), "첫 답변");
        assert_eq!(session.state(), SessionState::Continuing);
        session.exchange(&backend, "/버스 해지는?").unwrap();

        let seen = backend.seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].previous_response_id, None);
        assert_eq!(seen[1].previous_response_id.as_deref(), Some("resp_1"));
        assert_eq!(session.continuation_token(), Some("resp_2"));
    }

    #[test]
    fn test_transcript_alternates_after_n_exchanges() {
        let answers = [("a", "r1"), ("b", "r2"), ("c", "r3"), ("d", "r4")];
        let backend = ScriptedBackend::answering(&answers);
        let mut session = ConversationSession::new();

        for question in ["하나", "/지하철 둘", "/무브 셋", "넷"] {
            session.exchange(&backend, question).unwrap();
        }

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 8);
        for (index, turn) in transcript.iter().enumerate() {
            let expected = if index % 2 == 0 {
                TurnRole::User
            } else {
                TurnRole::Assistant
            };
            assert_eq!(turn.role, expected);
        }
        assert_eq!(session.continuation_token(), Some("r4"));
        assert_eq!(session.last_answer(), Some("d"));
    }

    #[test]
    fn test_user_turn_records_scope_and_cleaned_text() {
        let backend = ScriptedBackend::answering(&[("답", "r1")]);
        let mut session = ConversationSession::new();
        session.exchange(&backend, "/지하철 프리미엄 해지 방법").unwrap();

        let user = session.transcript().first().unwrap();
        assert_eq!(user.scope, Some(ServiceScope::Subway));
        assert_eq!(user.content, "프리미엄 해지 방법");
        assert_eq!(user.display_text(), "🚇 [지하철] 프리미엄 해지 방법");

        let prompt = &backend.seen()[0].prompt;
        assert!(prompt.starts_with("프리미엄 해지 방법"));
        assert!(prompt.ends_with(&scope_instruction(ServiceScope::Subway)));
    }

    #[test]
    fn test_scope_only_input_still_calls_backend() {
        let backend = ScriptedBackend::answering(&[("버스 앱 안내", "r1")]);
        let mut session = ConversationSession::new();
        session.exchange(&backend, "/버스").unwrap();

        let seen = backend.seen();
        assert_eq!(seen[0].prompt, scope_instruction(ServiceScope::Bus));
        assert_eq!(session.transcript()[0].content, "");
        assert_eq!(session.transcript().len(), 2);
    }

    #[test]
    fn test_failure_keeps_last_confirmed_token() {
        let backend = ScriptedBackend::new(vec![
            Ok(Exchange {
                text: "ok".to_string(),
                response_id: "resp_1".to_string(),
            }),
            Err(AssistantError::Timeout),
            Ok(Exchange {
                text: "retry ok".to_string(),
                response_id: "resp_2".to_string(),
            }),
        ]);
        let mut session = ConversationSession::new();

        session.exchange(&backend, "첫 질문").unwrap();
        assert!(session.exchange(&backend, "두번째 질문").is_err());
        assert_eq!(session.continuation_token(), Some("resp_1"));
        assert!(!session.is_pending());

        let roles: Vec<TurnRole> = session.transcript().iter().map(|turn| turn.role).collect();
        assert_eq!(
            roles,
            vec![TurnRole::User, TurnRole::Assistant, TurnRole::User, TurnRole::Notice]
        );
        assert!(session.transcript()[3].content.contains("다시 시도해 주세요"));

        session.exchange(&backend, "두번째 질문").unwrap();
        assert_eq!(backend.seen()[2].previous_response_id.as_deref(), Some("resp_1"));
        assert_eq!(session.continuation_token(), Some("resp_2"));
    }

    #[test]
    fn test_failed_first_exchange_stays_fresh() {
        let backend = ScriptedBackend::new(vec![Err(AssistantError::Network("down".to_string()))]);
        let mut session = ConversationSession::new();
        assert!(session.exchange(&backend, "질문").is_err());
        assert_eq!(session.state(), SessionState::Fresh);
    }

    #[test]
    fn test_only_one_exchange_in_flight() {
        let mut session = ConversationSession::new();
        let pending = session.begin_exchange("질문").unwrap();
        assert_eq!(pending.request.previous_response_id, None);
        assert!(session.is_pending());
        assert_eq!(
            session.begin_exchange("또 질문"),
            Err(SessionError::ExchangePending)
        );
        assert_eq!(session.transcript().len(), 1);

        session.complete(Exchange {
            text: "답".to_string(),
            response_id: "r1".to_string(),
        });
        let next = session.begin_exchange("또 질문").unwrap();
        assert_eq!(next.request.previous_response_id.as_deref(), Some("r1"));
    }
}
