/// Failure of a single remote exchange
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("API key rejected ({status})")]
    Unauthorized { status: u16 },
    #[error("quota exhausted: {0}")]
    QuotaExceeded(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("exchange worker stopped: {0}")]
    Interrupted(String),
}

impl AssistantError {
    /// Whether retrying the same request could succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            AssistantError::Network(_) | AssistantError::Timeout | AssistantError::RateLimited(_) => {
                true
            }
            AssistantError::Api { status, .. } => *status >= 500,
            AssistantError::Unauthorized { .. }
            | AssistantError::QuotaExceeded(_)
            | AssistantError::Malformed(_)
            | AssistantError::Interrupted(_) => false,
        }
    }

    /// Explanation shown in the transcript
    #[must_use]
    pub fn user_message(&self) -> String {
        let reason = match self {
            AssistantError::Network(_) => "서버에 연결할 수 없습니다".to_string(),
            AssistantError::Timeout => "응답 시간이 초과되었습니다".to_string(),
            AssistantError::Unauthorized { .. } => "API 키가 올바르지 않습니다".to_string(),
            AssistantError::QuotaExceeded(_) => "API 사용 한도를 초과했습니다".to_string(),
            AssistantError::RateLimited(_) => "요청이 너무 많습니다".to_string(),
            AssistantError::Api { status, .. } => format!("API 오류 ({})", status),
            AssistantError::Malformed(_) => "응답을 해석할 수 없습니다".to_string(),
            AssistantError::Interrupted(_) => "요청 처리 중 내부 오류가 발생했습니다".to_string(),
        };
        format!("답변을 가져오지 못했습니다: {}. 다시 시도해 주세요.", reason)
    }
}

impl From<reqwest::Error> for AssistantError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            AssistantError::Timeout
        } else if error.is_decode() {
            AssistantError::Malformed(error.to_string())
        } else {
            AssistantError::Network(error.to_string())
        }
    }
}
