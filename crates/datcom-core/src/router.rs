//! Intent Router (C5).
//!
//! Classifies a query into `datcom_generation` or `general_query` with a
//! single, temperature-0 chat call. Non-fatal on chat failure: falls back
//! to `general_query` and logs, the same non-fatal-with-log shape the
//! teacher uses for its Signal health-check retry.

use crate::chat_client::{ChatClient, ChatResult, Message};
use crate::workflow::Intent;

const ROUTER_SYSTEM_PROMPT: &str = r#"Classify the user's query into exactly one category. Reply with a single word, nothing else.

- Reply "datcom_generation" if the query mentions ".dat", "for005", "namelist", or gives explicit aerodynamic numeric parameters (area, aspect ratio, sweep, Mach, altitude, weight) intended to build a DATCOM input file.
- Otherwise reply "general_query"."#;

pub struct IntentRouter {
    chat: ChatClient,
}

impl IntentRouter {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }

    pub async fn classify(&self, question: &str) -> Intent {
        let messages = vec![Message::user(question)];
        match self.chat.complete(ROUTER_SYSTEM_PROMPT, &messages, None, 0.0).await {
            Ok(ChatResult::Text(text)) => parse_intent(&text),
            Ok(ChatResult::ToolCalls(_)) => {
                tracing::warn!("router received unexpected tool calls, defaulting to general_query");
                Intent::GeneralQuery
            }
            Err(e) => {
                tracing::warn!("router chat call failed ({}), defaulting to general_query", e);
                Intent::GeneralQuery
            }
        }
    }
}

fn parse_intent(reply: &str) -> Intent {
    let normalized = reply.trim().trim_matches('"').to_lowercase();
    if normalized.contains("datcom_generation") {
        Intent::DatcomGeneration
    } else {
        Intent::GeneralQuery
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_token() {
        assert_eq!(parse_intent("datcom_generation"), Intent::DatcomGeneration);
        assert_eq!(parse_intent("general_query"), Intent::GeneralQuery);
    }

    #[test]
    fn defaults_ambiguous_replies_to_general_query() {
        assert_eq!(parse_intent("I'm not sure"), Intent::GeneralQuery);
        assert_eq!(parse_intent(""), Intent::GeneralQuery);
    }

    #[test]
    fn tolerates_quoted_or_padded_replies() {
        assert_eq!(parse_intent(" \"datcom_generation\" \n"), Intent::DatcomGeneration);
    }
}
