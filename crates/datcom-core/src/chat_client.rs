//! Chat Client (C2).
//!
//! A single-turn OpenAI-compatible chat completion call with optional
//! tool-call schemas (spec section 6). Grounded on the same `reqwest`
//! client-construction idiom as `embedding_client.rs`/
//! `sage-tools/src/brave.rs`; the wire shape itself comes directly from the
//! spec, since the teacher used dspy-rs/BAML for this instead of a literal
//! tool-calling request.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ChatError;
use crate::retry::{retry_with_backoff, RetryPolicy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    fn as_wire_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// One entry in `WorkflowState::messages` (spec section 3).
#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub tool_name: Option<String>,
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_name: None,
            tool_call_id: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_name: None,
            tool_call_id: None,
        }
    }

    pub fn tool_result(
        tool_name: impl Into<String>,
        tool_call_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_name: Some(tool_name.into()),
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// A tool's schema as presented to the chat model (spec section 3, `ToolSpec`).
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug, Clone)]
pub enum ChatResult {
    Text(String),
    ToolCalls(Vec<ToolCallRequest>),
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a ToolSpec,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Deserialize)]
struct WireToolCall {
    id: String,
    function: WireToolCallFunction,
}

#[derive(Deserialize)]
struct WireToolCallFunction {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct WireChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<WireChoice>,
}

#[derive(Clone)]
pub struct ChatClient {
    api_base: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl ChatClient {
    pub fn new(api_base: &str, api_key: &str, model: &str) -> Self {
        Self::with_tls_verification(api_base, api_key, model, true)
    }

    pub fn with_tls_verification(api_base: &str, api_key: &str, model: &str, verify_ssl: bool) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .danger_accept_invalid_certs(!verify_ssl)
                .build()
                .expect("reqwest client builds"),
        }
    }

    pub async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: Option<&[ToolSpec]>,
        temperature: f32,
    ) -> Result<ChatResult, ChatError> {
        let policy = RetryPolicy::default();
        let url = format!("{}/chat/completions", self.api_base);

        let mut wire_messages = Vec::with_capacity(messages.len() + 1);
        wire_messages.push(WireMessage {
            role: "system",
            content: system,
            tool_call_id: None,
        });
        for m in messages {
            wire_messages.push(WireMessage {
                role: m.role.as_wire_str(),
                content: &m.content,
                tool_call_id: m.tool_call_id.as_deref(),
            });
        }

        let wire_tools = tools.map(|ts| {
            ts.iter()
                .map(|t| WireTool {
                    kind: "function",
                    function: t,
                })
                .collect::<Vec<_>>()
        });

        let request = ChatRequest {
            model: &self.model,
            messages: wire_messages,
            temperature,
            tools: wire_tools,
            tool_choice: tools.map(|_| "auto"),
        };

        let response = retry_with_backoff(
            policy,
            |e: &ChatError| !matches!(e, ChatError::MalformedResponse(_)),
            || async {
                let response = self
                    .client
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| ChatError::Request(e.to_string()))?;

                if !response.status().is_success() {
                    return Err(ChatError::NonSuccessStatus(response.status().as_u16()));
                }

                let parsed: ChatResponse = response
                    .json()
                    .await
                    .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;

                Ok(parsed)
            },
        )
        .await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::MalformedResponse("no choices in response".to_string()))?;

        if !choice.message.tool_calls.is_empty() {
            let calls = choice
                .message
                .tool_calls
                .into_iter()
                .map(|tc| {
                    let arguments = serde_json::from_str(&tc.function.arguments)
                        .unwrap_or(Value::Object(Default::default()));
                    ToolCallRequest {
                        id: tc.id,
                        name: tc.function.name,
                        arguments,
                    }
                })
                .collect();
            return Ok(ChatResult::ToolCalls(calls));
        }

        Ok(ChatResult::Text(choice.message.content.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors_set_expected_roles() {
        let m = Message::user("hi");
        assert_eq!(m.role, Role::User);
        let m = Message::tool_result("retrieve_datcom_archive", "call_1", "result");
        assert_eq!(m.role, Role::Tool);
        assert_eq!(m.tool_call_id.as_deref(), Some("call_1"));
    }
}
