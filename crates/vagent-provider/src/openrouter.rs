//! OpenRouter provider implementation.
//!
//! OpenRouter provides access to every catalogued model through a unified,
//! OpenAI-compatible chat completions API with custom headers. Reasoning is
//! requested through its `reasoning` object and streamed back as
//! `delta.reasoning`.

use crate::{
    catalog::ReasoningParam,
    error::ProviderError,
    message::{ContentPart, Message, Role},
    model::ModelInfo,
    stream::{FinishReason, StreamChunk, Usage},
    GenerateOptions, LanguageModel, ProviderResult, ToolDefinition,
};
use async_stream::try_stream;
use async_trait::async_trait;
use futures::stream::BoxStream;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, trace, warn};
use url::Url;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";

/// OpenRouter provider.
pub struct OpenRouterProvider {
    client: reqwest::Client,
    model: ModelInfo,
    base_url: String,
    reasoning: ReasoningParam,
}

impl OpenRouterProvider {
    /// Create a new OpenRouter provider.
    pub fn new(api_key: &str, model: ModelInfo) -> ProviderResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|_| ProviderError::invalid_api_key("openrouter"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        // Required OpenRouter headers
        headers.insert(
            "HTTP-Referer",
            HeaderValue::from_static("https://github.com/vagent-dev/vagent"),
        );
        headers.insert("X-Title", HeaderValue::from_static("vagent"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderError::internal(e.to_string()))?;

        Ok(Self {
            client,
            model,
            base_url: OPENROUTER_API_URL.to_string(),
            reasoning: ReasoningParam::None,
        })
    }

    /// Point the provider at another OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: &str) -> ProviderResult<Self> {
        let parsed = Url::parse(base_url)?;
        self.base_url = parsed.as_str().trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Set the reasoning parameter sent with every request.
    pub fn with_reasoning(mut self, reasoning: ReasoningParam) -> Self {
        self.reasoning = reasoning;
        self
    }

    /// Convert our messages to OpenAI format.
    fn convert_messages(messages: &[Message], system: Option<&str>) -> Vec<Value> {
        let mut result = Vec::new();

        if let Some(sys) = system {
            result.push(json!({
                "role": "system",
                "content": sys
            }));
        }

        for msg in messages {
            let role = match msg.role {
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::Tool => "tool",
                Role::System => "system",
            };

            // Tool results become one message per call
            if msg.role == Role::Tool {
                for part in &msg.content {
                    if let ContentPart::ToolResult {
                        tool_use_id,
                        content,
                        ..
                    } = part
                    {
                        result.push(json!({
                            "role": "tool",
                            "tool_call_id": tool_use_id,
                            "content": content
                        }));
                    }
                }
                continue;
            }

            let text = msg.text();
            let tool_calls = if msg.role == Role::Assistant {
                convert_tool_calls(&msg.content)
            } else {
                None
            };

            if text.is_empty() && tool_calls.is_none() {
                continue;
            }

            let mut message = json!({
                "role": role,
                "content": if text.is_empty() { Value::Null } else { Value::String(text) }
            });
            if let Some(tool_calls) = tool_calls {
                message["tool_calls"] = tool_calls;
            }
            result.push(message);
        }

        result
    }

    /// Convert tools to OpenAI format.
    fn convert_tools(tools: &[ToolDefinition]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters
                    }
                })
            })
            .collect()
    }

    fn build_request(&self, messages: &[Message], options: &GenerateOptions) -> ChatRequest {
        let temperature = if self.model.capabilities.temperature {
            options.temperature
        } else {
            None
        };
        ChatRequest {
            model: self.model.id.clone(),
            messages: Self::convert_messages(messages, options.system.as_deref()),
            max_tokens: options.max_tokens,
            temperature,
            tools: Self::convert_tools(&options.tools),
            reasoning: self.reasoning.to_request(),
            stream: true,
            stream_options: Some(StreamOptions {
                include_usage: true,
            }),
        }
    }
}

/// Convert tool calls to OpenAI format.
fn convert_tool_calls(parts: &[ContentPart]) -> Option<Value> {
    let calls: Vec<Value> = parts
        .iter()
        .filter_map(|part| {
            if let ContentPart::ToolUse { id, name, input } = part {
                Some(json!({
                    "id": id,
                    "type": "function",
                    "function": {
                        "name": name,
                        "arguments": input.to_string()
                    }
                }))
            } else {
                None
            }
        })
        .collect();

    if calls.is_empty() {
        None
    } else {
        Some(Value::Array(calls))
    }
}

/// Map an unsuccessful HTTP status to an error.
fn status_error(status: StatusCode, body: String) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::invalid_api_key("openrouter")
        }
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited { retry_after: None },
        _ => ProviderError::api_error(status.as_u16(), body),
    }
}

/// OpenAI chat completion request.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<Value>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<StreamOptions>,
}

#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

/// OpenAI streaming chunk.
#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    usage: Option<ChunkUsage>,
    #[serde(default)]
    error: Option<ChunkError>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    delta: ChunkDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct ToolCallDelta {
    index: usize,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<FunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct FunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    #[serde(default)]
    completion_tokens_details: Option<CompletionDetails>,
}

#[derive(Debug, Deserialize)]
struct CompletionDetails {
    #[serde(default)]
    reasoning_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChunkError {
    message: String,
}

#[async_trait]
impl LanguageModel for OpenRouterProvider {
    async fn generate(
        &self,
        messages: Vec<Message>,
        options: GenerateOptions,
    ) -> ProviderResult<BoxStream<'static, ProviderResult<StreamChunk>>> {
        let request = self.build_request(&messages, &options);

        debug!(model = %self.model.id, reasoning = ?self.reasoning, "Sending OpenRouter request");
        trace!(request = ?request, "Full request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenRouter API error");
            return Err(status_error(status, error_text));
        }

        let byte_stream = response.bytes_stream();
        let abort = options.abort.clone();

        Ok(Box::pin(try_stream! {
            use futures::StreamExt;
            use tokio::io::AsyncBufReadExt;
            use tokio_util::io::StreamReader;

            let reader = StreamReader::new(
                byte_stream.map(|r| r.map_err(std::io::Error::other))
            );
            let mut lines = reader.lines();

            // (id, name, args) per tool call index
            let mut tool_calls: Vec<(String, String, String)> = Vec::new();
            let mut text_started = false;
            let mut reasoning_started = false;
            let mut finish: Option<FinishReason> = None;
            let mut usage = Usage::default();

            while let Some(line) = lines.next_line().await? {
                if let Some(ref token) = abort {
                    if token.is_cancelled() {
                        Err(ProviderError::Cancelled)?;
                    }
                }

                let line = line.trim();

                // Skip keep-alive comments and empty lines
                if line.is_empty() || line.starts_with(':') {
                    continue;
                }
                if line == "data: [DONE]" {
                    break;
                }

                let data = line.strip_prefix("data: ").unwrap_or(line);

                let chunk: ChatChunk = match serde_json::from_str(data) {
                    Ok(c) => c,
                    Err(e) => {
                        trace!(error = %e, data = %data, "Failed to parse chunk");
                        continue;
                    }
                };

                if let Some(error) = chunk.error {
                    yield StreamChunk::Error(error.message);
                    continue;
                }

                if let Some(u) = &chunk.usage {
                    usage = Usage {
                        input_tokens: u.prompt_tokens,
                        output_tokens: u.completion_tokens,
                        reasoning_tokens: u
                            .completion_tokens_details
                            .as_ref()
                            .map(|d| d.reasoning_tokens)
                            .unwrap_or(0),
                    };
                }

                for choice in &chunk.choices {
                    if let Some(reasoning) = &choice.delta.reasoning {
                        if !reasoning.is_empty() {
                            if !reasoning_started {
                                yield StreamChunk::ReasoningStart;
                                reasoning_started = true;
                            }
                            yield StreamChunk::ReasoningDelta(reasoning.clone());
                        }
                    }

                    if let Some(content) = &choice.delta.content {
                        if !content.is_empty() {
                            if reasoning_started {
                                yield StreamChunk::ReasoningEnd;
                                reasoning_started = false;
                            }
                            if !text_started {
                                yield StreamChunk::TextStart;
                                text_started = true;
                            }
                            yield StreamChunk::TextDelta(content.clone());
                        }
                    }

                    if let Some(tool_deltas) = &choice.delta.tool_calls {
                        for delta in tool_deltas {
                            while tool_calls.len() <= delta.index {
                                tool_calls.push((String::new(), String::new(), String::new()));
                            }

                            let call = &mut tool_calls[delta.index];

                            if let Some(id) = &delta.id {
                                call.0 = id.clone();
                            }

                            if let Some(func) = &delta.function {
                                if let Some(name) = &func.name {
                                    call.1 = name.clone();
                                    yield StreamChunk::ToolCallStart {
                                        id: call.0.clone(),
                                        name: name.clone(),
                                    };
                                }
                                if let Some(args) = &func.arguments {
                                    call.2.push_str(args);
                                    yield StreamChunk::ToolCallDelta {
                                        id: call.0.clone(),
                                        delta: args.clone(),
                                    };
                                }
                            }
                        }
                    }

                    if let Some(reason) = &choice.finish_reason {
                        finish = Some(FinishReason::from_openai(reason));
                    }
                }
            }

            // Usage arrives after the finish reason, so the step is closed
            // once the stream ends.
            if reasoning_started {
                yield StreamChunk::ReasoningEnd;
            }
            if text_started {
                yield StreamChunk::TextEnd;
            }
            for (id, name, args) in tool_calls {
                if !id.is_empty() && !name.is_empty() {
                    yield StreamChunk::ToolCall { id, name, arguments: args };
                }
            }
            if let Some(finish_reason) = finish {
                yield StreamChunk::FinishStep { usage, finish_reason };
            } else {
                Err(ProviderError::StreamInterrupted)?;
            }
        }))
    }

    fn model_info(&self) -> &ModelInfo {
        &self.model
    }

    fn provider_id(&self) -> &str {
        "openrouter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::openai;
    use futures::StreamExt;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sse(events: &[Value]) -> String {
        let mut body = String::new();
        for event in events {
            body.push_str(&format!("data: {}\n\n", event));
        }
        body.push_str("data: [DONE]\n\n");
        body
    }

    async fn provider_for(server: &MockServer) -> OpenRouterProvider {
        OpenRouterProvider::new("sk-test", openai::o4_mini())
            .unwrap()
            .with_base_url(&server.uri())
            .unwrap()
    }

    async fn collect(
        provider: &OpenRouterProvider,
        messages: Vec<Message>,
    ) -> ProviderResult<Vec<StreamChunk>> {
        let mut stream = provider
            .generate(messages, GenerateOptions::default())
            .await?;
        let mut chunks = Vec::new();
        while let Some(chunk) = stream.next().await {
            chunks.push(chunk?);
        }
        Ok(chunks)
    }

    #[test]
    fn test_convert_messages() {
        let messages = vec![Message::user("Hello, world!")];

        let converted = OpenRouterProvider::convert_messages(&messages, Some("You are helpful"));

        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0]["role"], "system");
        assert_eq!(converted[1]["role"], "user");
        assert_eq!(converted[1]["content"], "Hello, world!");
    }

    #[test]
    fn test_convert_tool_round_trip() {
        let messages = vec![
            Message::user("list files"),
            Message::assistant_parts(vec![ContentPart::tool_use(
                "call_1",
                "run_shell",
                json!({"command": "ls"}),
            )]),
            Message::tool_result("call_1", "notes.md"),
        ];

        let converted = OpenRouterProvider::convert_messages(&messages, None);

        assert_eq!(converted.len(), 3);
        assert_eq!(converted[1]["content"], Value::Null);
        assert_eq!(converted[1]["tool_calls"][0]["function"]["name"], "run_shell");
        assert_eq!(converted[2]["role"], "tool");
        assert_eq!(converted[2]["tool_call_id"], "call_1");
    }

    #[test]
    fn test_convert_tools() {
        let tools = vec![ToolDefinition {
            name: "read_file".to_string(),
            description: "Read a file".to_string(),
            parameters: json!({"type": "object", "properties": {"path": {"type": "string"}}}),
        }];

        let converted = OpenRouterProvider::convert_tools(&tools);

        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0]["type"], "function");
        assert_eq!(converted[0]["function"]["name"], "read_file");
    }

    #[test]
    fn test_temperature_dropped_when_unsupported() {
        let provider = OpenRouterProvider::new("sk-test", openai::o4_mini()).unwrap();
        let options = GenerateOptions {
            temperature: Some(0.2),
            ..Default::default()
        };
        assert!(provider.build_request(&[], &options).temperature.is_none());
    }

    #[test]
    fn test_invalid_base_url() {
        let provider = OpenRouterProvider::new("sk-test", openai::gpt_4_1()).unwrap();
        assert!(matches!(
            provider.with_base_url("not a url"),
            Err(ProviderError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_streams_reasoning_text_and_tool_calls() {
        let server = MockServer::start().await;
        let body = sse(&[
            json!({"choices": [{"delta": {"reasoning": "Let me "}, "finish_reason": null}]}),
            json!({"choices": [{"delta": {"reasoning": "think."}, "finish_reason": null}]}),
            json!({"choices": [{"delta": {"content": "Listing."}, "finish_reason": null}]}),
            json!({"choices": [{"delta": {"tool_calls": [{"index": 0, "id": "call_1", "function": {"name": "run_shell", "arguments": "{\"command\":"}}]}, "finish_reason": null}]}),
            json!({"choices": [{"delta": {"tool_calls": [{"index": 0, "function": {"arguments": "\"ls\"}"}}]}, "finish_reason": "tool_calls"}]}),
            json!({"choices": [], "usage": {"prompt_tokens": 12, "completion_tokens": 7}}),
        ]);
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let provider = provider_for(&server)
            .await
            .with_reasoning(ReasoningParam::Effort("high"));
        let chunks = collect(&provider, vec![Message::user("hi")]).await.unwrap();

        let reasoning: String = chunks
            .iter()
            .filter_map(|c| match c {
                StreamChunk::ReasoningDelta(d) => Some(d.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(reasoning, "Let me think.");
        assert!(chunks.contains(&StreamChunk::TextDelta("Listing.".to_string())));
        assert!(chunks.contains(&StreamChunk::ToolCall {
            id: "call_1".to_string(),
            name: "run_shell".to_string(),
            arguments: "{\"command\":\"ls\"}".to_string(),
        }));
        assert_eq!(
            chunks.last(),
            Some(&StreamChunk::FinishStep {
                usage: Usage::new(12, 7),
                finish_reason: FinishReason::ToolUse,
            })
        );

        let requests = server.received_requests().await.unwrap();
        let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(sent["model"], "openai/o4-mini");
        assert_eq!(sent["reasoning"], json!({"effort": "high"}));
        assert_eq!(sent["stream"], true);
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_invalid_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("no auth"))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let err = collect(&provider, vec![Message::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidApiKey(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let err = collect(&provider, vec![Message::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::ApiError { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_stream_without_finish_is_interrupted() {
        let server = MockServer::start().await;
        let body = "data: {\"choices\": [{\"delta\": {\"content\": \"partial\"}, \"finish_reason\": null}]}\n\n";
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let err = collect(&provider, vec![Message::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::StreamInterrupted));
    }
}
