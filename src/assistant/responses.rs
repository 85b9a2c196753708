//! Blocking client for the hosted `responses` endpoint with file-search retrieval.

use color_eyre::Result;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::thread::sleep;
use std::time::Duration;
use tracing::{debug, warn};

use crate::assistant::instructions::SUPPORT_INSTRUCTIONS;
use crate::assistant::{AssistantError, ChatBackend, Exchange, ExchangeRequest};
use crate::config::{Credentials, OpenAiConfig};

const RETRY_DELAYS_MS: [u64; 3] = [200, 500, 1000];

// -- Request types --

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
    tools: Vec<FileSearchTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_response_id: Option<&'a str>,
}

/// Retrieval tool descriptor naming the knowledge source
#[derive(Debug, Serialize)]
struct FileSearchTool<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    vector_store_ids: [&'a str; 1],
}

impl<'a> FileSearchTool<'a> {
    fn new(vector_store_id: &'a str) -> Self {
        Self {
            tool_type: "file_search",
            vector_store_ids: [vector_store_id],
        }
    }
}

// -- Response types --

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputItem {
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    /// Tool calls (file_search_call) and anything newer
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    OutputText { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Concatenates every output_text part of every message item, like the SDK's `output_text`
fn extract_exchange(response: ResponsesResponse) -> Result<Exchange, AssistantError> {
    let response_id = response
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AssistantError::Malformed("response missing id".to_string()))?;

    let text: String = response
        .output
        .into_iter()
        .filter_map(|item| match item {
            OutputItem::Message { content } => Some(content),
            OutputItem::Other => None,
        })
        .flatten()
        .filter_map(|part| match part {
            ContentPart::OutputText { text } => Some(text),
            ContentPart::Other => None,
        })
        .collect();

    if text.trim().is_empty() {
        return Err(AssistantError::Malformed(
            "response contained no output text".to_string(),
        ));
    }

    Ok(Exchange { text, response_id })
}

/// Maps a non-success status and its body to an error variant
fn classify_failure(status: u16, body: &str) -> AssistantError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|envelope| envelope.error);
    let message = parsed
        .as_ref()
        .map(|error| error.message.clone())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| body.trim().to_string());
    let quota = parsed.as_ref().is_some_and(|error| {
        error.code.as_deref() == Some("insufficient_quota")
            || error.error_type.as_deref() == Some("insufficient_quota")
    });

    match status {
        401 | 403 => AssistantError::Unauthorized { status },
        429 if quota => AssistantError::QuotaExceeded(message),
        429 => AssistantError::RateLimited(message),
        _ => AssistantError::Api { status, message },
    }
}

/// Builds a `reqwest::blocking::Client` with bounded timeouts
fn build_client(openai: &OpenAiConfig) -> Result<Client> {
    Ok(Client::builder()
        .connect_timeout(Duration::from_secs(openai.connect_timeout_secs))
        .timeout(Duration::from_secs(openai.request_timeout_secs))
        .build()?)
}

/// Remote chat client: fixed instructions, one knowledge source, prompt-level scoping
pub struct ResponsesClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    vector_store_id: String,
    retry_delays: Vec<Duration>,
}

impl ResponsesClient {
    pub fn new(openai: &OpenAiConfig, credentials: &Credentials) -> Result<Self> {
        Ok(Self {
            http: build_client(openai)?,
            endpoint: format!("{}/responses", openai.base_url.trim_end_matches('/')),
            api_key: credentials.api_key.clone(),
            model: openai.model.clone(),
            vector_store_id: credentials.vector_store_id.clone(),
            retry_delays: RETRY_DELAYS_MS.iter().copied().map(Duration::from_millis).collect(),
        })
    }

    /// Overrides the back-off schedule; an empty list disables retries
    #[cfg(test)]
    #[must_use]
    pub fn with_retry_delays(mut self, retry_delays: Vec<Duration>) -> Self {
        self.retry_delays = retry_delays;
        self
    }

    fn send_once(&self, body: &ResponsesRequest<'_>) -> Result<Exchange, AssistantError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()?;

        let status = response.status();
        if status.is_success() {
            let payload: ResponsesResponse = response.json()?;
            return extract_exchange(payload);
        }

        let details = response.text().unwrap_or_default();
        Err(classify_failure(status.as_u16(), &details))
    }
}

impl ChatBackend for ResponsesClient {
    fn respond(&self, request: &ExchangeRequest) -> Result<Exchange, AssistantError> {
        let body = ResponsesRequest {
            model: &self.model,
            instructions: SUPPORT_INSTRUCTIONS,
            input: &request.prompt,
            tools: vec![FileSearchTool::new(&self.vector_store_id)],
            previous_response_id: request.previous_response_id.as_deref(),
        };
        debug!(
            model = %self.model,
            continuing = body.previous_response_id.is_some(),
            "sending exchange"
        );

        let mut delays = self.retry_delays.iter();
        loop {
            match self.send_once(&body) {
                Ok(exchange) => return Ok(exchange),
                Err(error) if error.is_retryable() => match delays.next() {
                    Some(delay) => {
                        warn!(%error, delay_ms = delay.as_millis() as u64, "exchange failed, retrying");
                        sleep(*delay);
                    }
                    None => return Err(error),
                },
                Err(error) => return Err(error),
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::runtime::Runtime;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn answer_body(id: &str, text: &str) -> serde_json::Value {
        json!({
            "id": id,
            "object": "response",
            "output": [
                { "type": "file_search_call", "id": "fs_1", "status": "completed" },
                {
                    "type": "message",
                    "role": "assistant",
                    "content": [
                        { "type": "output_text", "text": text, "annotations": [] }
                    ]
                }
            ]
        })
    }

    fn client_for(server: &MockServer) -> ResponsesClient {
        let openai = OpenAiConfig {
            base_url: format!("{}/v1/", server.uri()),
            ..OpenAiConfig::default()
        };
        let credentials = Credentials {
            api_key: "sk-test".to_string(),
            vector_store_id: "vs_blog".to_string(),
        };
        ResponsesClient::new(&openai, &credentials)
            .unwrap()
            .with_retry_delays(vec![Duration::ZERO, Duration::ZERO])
    }

    fn fresh(prompt: &str) -> ExchangeRequest {
        ExchangeRequest {
            prompt: prompt.to_string(),
            previous_response_id: None,
        }
    }

    #[test]
    fn test_fresh_exchange_sends_instructions_and_retrieval_tool() {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        runtime.block_on(
            Mock::given(method("POST"))
                .and(path("/v1/responses"))
                .and(header("authorization", "Bearer sk-test"))
                .and(body_partial_json(json!({
                    "model": "gpt-4o-mini",
                    "input": "환불 정책이 뭐야",
                    "tools": [{ "type": "file_search", "vector_store_ids": ["vs_blog"] }]
                })))
                .respond_with(ResponseTemplate::new(200).set_body_json(answer_body("resp_1", "환불은 ...")))
                .expect(1)
                .mount(&server),
        );

        let exchange = client_for(&server).respond(&fresh("환불 정책이 뭐야")).unwrap();
        assert_eq!(exchange.text, "환불은 ...");
        assert_eq!(exchange.response_id, "resp_1");

        let received = runtime.block_on(server.received_requests()).unwrap_or_default();
        let first = received.first().unwrap();
        let body: serde_json::Value = serde_json::from_slice(&first.body).unwrap();
        assert!(body.get("previous_response_id").is_none());
        assert_eq!(body["instructions"], SUPPORT_INSTRUCTIONS);
    }

    #[test]
    fn test_continuing_exchange_sends_previous_id() {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        runtime.block_on(
            Mock::given(method("POST"))
                .and(path("/v1/responses"))
                .and(body_partial_json(json!({ "previous_response_id": "resp_1" })))
                .respond_with(ResponseTemplate::new(200).set_body_json(answer_body("resp_2", "네")))
                .expect(1)
                .mount(&server),
        );

        let request = ExchangeRequest {
            prompt: "그럼 해지는?".to_string(),
            previous_response_id: Some("resp_1".to_string()),
        };
        let exchange = client_for(&server).respond(&request).unwrap();
        assert_eq!(exchange.response_id, "resp_2");
    }

    #[test]
    fn test_unauthorized_is_not_retried() {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        runtime.block_on(
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                    "error": { "message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key" }
                })))
                .expect(1)
                .mount(&server),
        );

        let error = client_for(&server).respond(&fresh("질문")).unwrap_err();
        assert!(matches!(error, AssistantError::Unauthorized { status: 401 }));
    }

    #[test]
    fn test_server_error_is_retried() {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        runtime.block_on(
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
                .up_to_n_times(1)
                .expect(1)
                .mount(&server),
        );
        runtime.block_on(
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_json(answer_body("resp_9", "복구됨")))
                .expect(1)
                .mount(&server),
        );

        let exchange = client_for(&server).respond(&fresh("질문")).unwrap();
        assert_eq!(exchange.text, "복구됨");
    }

    #[test]
    fn test_retries_give_up_with_last_error() {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        runtime.block_on(
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
                .expect(3)
                .mount(&server),
        );

        let error = client_for(&server).respond(&fresh("질문")).unwrap_err();
        match error {
            AssistantError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "busy");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_quota_exhaustion() {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        runtime.block_on(
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                    "error": { "message": "You exceeded your current quota", "type": "insufficient_quota", "code": "insufficient_quota" }
                })))
                .expect(1)
                .mount(&server),
        );

        let error = client_for(&server).respond(&fresh("질문")).unwrap_err();
        assert!(matches!(error, AssistantError::QuotaExceeded(ref message) if message.contains("quota")));
    }

    #[test]
    fn test_empty_output_is_malformed() {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        runtime.block_on(
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "resp_1", "output": [] })))
                .mount(&server),
        );

        let error = client_for(&server).respond(&fresh("질문")).unwrap_err();
        assert!(matches!(error, AssistantError::Malformed(_)));
    }

    #[test]
    fn test_extract_joins_message_parts() {
        let response: ResponsesResponse = serde_json::from_value(json!({
            "id": "resp_3",
            "output": [
                { "type": "message", "content": [
                    { "type": "output_text", "text": "첫 줄\n" },
                    { "type": "refusal", "refusal": "no" },
                    { "type": "output_text", "text": "둘째 줄" }
                ]},
                { "type": "reasoning", "summary": [] }
            ]
        }))
        .unwrap();
        let exchange = extract_exchange(response).unwrap();
        assert_eq!(exchange.text, "첫 줄\n둘째 줄");
    }

    #[test]
    fn test_classify_rate_limit_and_plain_body() {
        assert!(matches!(
            classify_failure(429, r#"{"error":{"message":"Rate limit reached","type":"requests","code":"rate_limit_exceeded"}}"#),
            AssistantError::RateLimited(_)
        ));
        match classify_failure(400, "not json") {
            AssistantError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "not json");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
