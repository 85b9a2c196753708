mod error;
pub mod instructions;
pub mod responses;

pub use error::AssistantError;
pub use responses::ResponsesClient;

/// One outgoing exchange: the composed prompt plus the prior-turn reference, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    pub prompt: String,
    pub previous_response_id: Option<String>,
}

/// A successful exchange: the generated answer and the id continuing the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub text: String,
    pub response_id: String,
}

/// The remote retrieval-augmented chat service.
///
/// Implementations carry the fixed instructions and knowledge source themselves;
/// scope restrictions travel inside [`ExchangeRequest::prompt`].
pub trait ChatBackend: Send + Sync {
    fn respond(&self, request: &ExchangeRequest) -> Result<Exchange, AssistantError>;

    /// Model name shown in the header
    fn model(&self) -> &str;
}
