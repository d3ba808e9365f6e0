//! Reasoning Agent (C7): a bounded reason -> act -> observe loop over the
//! Tool Registry. Generalizes `sage_agent.rs`'s `SageAgent::step`/
//! `process_message` loop to the fixed tool set and grounding requirement
//! this spec adds.

use std::sync::Arc;

use crate::chat_client::{ChatClient, ChatResult, Message, Role};
use crate::errors::{BudgetError, ToolError};
use crate::retrieval_tools::RETRIEVAL_TOOL_NAMES;
use crate::tool_registry::ToolRegistry;

const SYSTEM_PROMPT: &str = r#"You are an assistant answering engineering questions about UAV/DATCOM aerodynamic design.

Rules:
- Every factual claim must be cited using "(source: file, locator)".
- Use article_lookup when the query contains an explicit article reference.
- Use design_area_router before retrieve_datcom_archive when a collection is not yet set.
- Use python_calculator for any arithmetic.
- When you have enough information, answer directly with no further tool calls."#;

/// Soft context-window limit (spec section 4.7): above this many messages,
/// trim to system + first user turn + last tool message per tool + last 4 turns.
const CONTEXT_SOFT_LIMIT: usize = 40;
const RECENT_TURNS_KEPT: usize = 4;

pub struct ReasoningAgent {
    chat: ChatClient,
    registry: Arc<ToolRegistry>,
    max_steps: usize,
    temperature: f32,
}

pub struct AgentRun {
    pub messages: Vec<Message>,
    pub generation: String,
    pub converged: bool,
}

impl ReasoningAgent {
    pub fn new(chat: ChatClient, registry: Arc<ToolRegistry>, max_steps: usize) -> Self {
        Self::with_temperature(chat, registry, max_steps, 0.0)
    }

    /// `temperature` governs only the answer-generation call below; the
    /// intent router (C5) and parameter extractor (C6 stage 1) always call
    /// at temperature 0 regardless, since those need a deterministic reply.
    pub fn with_temperature(chat: ChatClient, registry: Arc<ToolRegistry>, max_steps: usize, temperature: f32) -> Self {
        Self {
            chat,
            registry,
            max_steps,
            temperature,
        }
    }

    pub async fn run(&self, question: &str) -> Result<AgentRun, BudgetError> {
        let mut messages = vec![Message::user(question)];
        let tool_specs = self.registry.to_tool_specs();

        for step in 0..self.max_steps {
            let working_set = trim_messages(&messages);
            match self
                .chat
                .complete(SYSTEM_PROMPT, &working_set, Some(&tool_specs), self.temperature)
                .await
            {
                Ok(ChatResult::Text(text)) => {
                    messages.push(Message::assistant(text.clone()));
                    check_grounding(&text, &messages);
                    return Ok(AgentRun {
                        messages,
                        generation: text,
                        converged: true,
                    });
                }
                Ok(ChatResult::ToolCalls(calls)) => {
                    tracing::debug!(step, calls = calls.len(), "reasoning agent received tool calls");
                    for call in calls {
                        let observation = match self.registry.get(&call.name) {
                            Some(tool) => match tool.execute(&call.arguments).await {
                                Ok(result) if result.success => result.output,
                                Ok(result) => format!("error: {}", result.error.unwrap_or_default()),
                                Err(e) => format!("error: {}", e),
                            },
                            None => format!("error: {}", ToolError::UnknownTool(call.name.clone())),
                        };
                        messages.push(Message::tool_result(call.name, call.id, observation));
                    }
                }
                Err(e) => {
                    tracing::warn!("reasoning agent chat call failed at step {}: {}", step, e);
                    let generation = "无法生成回答：与对话模型的通信失败，请稍后重试。".to_string();
                    messages.push(Message::assistant(generation.clone()));
                    return Ok(AgentRun {
                        messages,
                        generation,
                        converged: false,
                    });
                }
            }
        }

        tracing::warn!(max_steps = self.max_steps, "reasoning agent exhausted its iteration cap");
        Err(BudgetError::IterationCapReached(self.max_steps))
    }
}

/// Trims the message list once it exceeds the soft limit, deterministically:
/// keep the first user turn, the last tool message per distinct tool name,
/// and the most recent turns. The system message is added back by the
/// caller at completion time, so it isn't tracked here.
fn trim_messages(messages: &[Message]) -> Vec<Message> {
    if messages.len() <= CONTEXT_SOFT_LIMIT {
        return messages.to_vec();
    }

    let mut kept: Vec<Message> = Vec::new();
    if let Some(first) = messages.first() {
        kept.push(first.clone());
    }

    let mut last_by_tool: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for (i, m) in messages.iter().enumerate() {
        if m.role == Role::Tool {
            if let Some(name) = &m.tool_name {
                last_by_tool.insert(name.clone(), i);
            }
        }
    }
    let mut tool_indices: Vec<usize> = last_by_tool.into_values().collect();
    tool_indices.sort_unstable();
    for i in tool_indices {
        kept.push(messages[i].clone());
    }

    let recent_start = messages.len().saturating_sub(RECENT_TURNS_KEPT);
    for m in &messages[recent_start..] {
        kept.push(m.clone());
    }

    kept
}

/// Scans the final answer for sentences that carry a numeric or specific
/// factual claim and warns (does not block) when no preceding tool
/// observation contains a matching substring. This is mandatory here
/// (unlike the spec's "optional but recommended" wording) per the Open
/// Question decision recorded in DESIGN.md.
fn check_grounding(answer: &str, messages: &[Message]) {
    let observations = retrieval_observations(messages);

    for sentence in answer.split(['.', '\n']) {
        let trimmed = sentence.trim();
        if trimmed.is_empty() || !trimmed.chars().any(|c| c.is_ascii_digit()) {
            continue;
        }
        let grounded = observations.iter().any(|o| o.contains(trimmed) || shares_a_number(trimmed, o));
        if !grounded {
            tracing::warn!("ungrounded claim in reasoning-agent answer: {:?}", trimmed);
        }
    }
}

/// Tool messages that count as grounding evidence: only retrieval tools
/// (spec GLOSSARY), never `python_calculator` or any other side-effecting
/// tool's output.
fn retrieval_observations(messages: &[Message]) -> Vec<&str> {
    messages
        .iter()
        .filter(|m| m.role == Role::Tool)
        .filter(|m| {
            m.tool_name
                .as_deref()
                .is_some_and(|name| RETRIEVAL_TOOL_NAMES.contains(&name))
        })
        .map(|m| m.content.as_str())
        .collect()
}

fn shares_a_number(sentence: &str, observation: &str) -> bool {
    let numbers_in = |s: &str| -> Vec<String> {
        s.split(|c: char| !c.is_ascii_digit() && c != '.')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    };
    let sentence_numbers = numbers_in(sentence);
    let observation_numbers = numbers_in(observation);
    sentence_numbers.iter().any(|n| observation_numbers.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_messages_is_a_no_op_under_the_soft_limit() {
        let messages = vec![Message::user("hi"), Message::assistant("hello")];
        assert_eq!(trim_messages(&messages).len(), 2);
    }

    #[test]
    fn trim_messages_keeps_first_message_and_recent_turns() {
        let mut messages = vec![Message::user("initial question")];
        for i in 0..50 {
            messages.push(Message::assistant(format!("turn {}", i)));
        }
        let trimmed = trim_messages(&messages);
        assert!(trimmed.len() < messages.len());
        assert_eq!(trimmed[0].content, "initial question");
        assert!(trimmed.last().unwrap().content.contains("turn 49"));
    }

    #[test]
    fn shares_a_number_matches_numeric_overlap() {
        assert!(shares_a_number("the wing area is 530 square feet", "S=530.0"));
        assert!(!shares_a_number("the wing area is huge", "S=530.0"));
    }

    #[test]
    fn retrieval_observations_excludes_calculator_output() {
        let messages = vec![
            Message::user("what is the wing area?"),
            Message::tool_result("python_calculator", "call_1", "result = 530.0"),
            Message::tool_result("retrieve_datcom_archive", "call_2", "(source: doc) S=530.0"),
        ];
        let observations = retrieval_observations(&messages);
        assert_eq!(observations, vec!["(source: doc) S=530.0"]);
    }
}
