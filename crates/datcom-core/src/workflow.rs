//! Workflow Engine (C8): `run(state) -> state`, composing C5 -> branch on
//! intent -> C6 or C7 -> terminal (spec section 4.8).

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::agent::ReasoningAgent;
use crate::chat_client::Message;
use crate::datcom;
use crate::errors::BudgetError;
use crate::router::IntentRouter;
use crate::vector_store::RetrievedDoc;

/// Default total per-query deadline (spec section 5).
pub const DEFAULT_QUERY_DEADLINE: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    DatcomGeneration,
    GeneralQuery,
}

/// The only value that flows between components (spec section 3).
pub struct WorkflowState {
    pub messages: Vec<Message>,
    pub question: String,
    pub intent: Option<Intent>,
    pub collection: String,
    pub retrieved_docs: Vec<RetrievedDoc>,
    pub generation: Option<String>,
}

impl WorkflowState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            question: question.into(),
            intent: None,
            collection: String::new(),
            retrieved_docs: Vec::new(),
            generation: None,
        }
    }
}

pub struct Workflow {
    router: IntentRouter,
    agent: ReasoningAgent,
    chat_for_extraction: crate::chat_client::ChatClient,
    deadline: Duration,
}

impl Workflow {
    pub fn new(
        router: IntentRouter,
        agent: ReasoningAgent,
        chat_for_extraction: crate::chat_client::ChatClient,
    ) -> Self {
        Self {
            router,
            agent,
            chat_for_extraction,
            deadline: DEFAULT_QUERY_DEADLINE,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Runs one query to completion, honoring the cancellation token and
    /// the per-query deadline (spec section 5). On cancellation or
    /// timeout, partial `messages` is discarded and no output is written.
    pub async fn run(
        &self,
        mut state: WorkflowState,
        cancellation: CancellationToken,
    ) -> Result<WorkflowState, BudgetError> {
        state.messages.push(Message::user(state.question.clone()));

        let body = async {
            let intent = self.router.classify(&state.question).await;
            state.intent = Some(intent);

            match intent {
                Intent::DatcomGeneration => {
                    let generation =
                        datcom::run_datcom_pipeline(&self.chat_for_extraction, &state.question).await;
                    state.messages.push(Message::assistant(generation.clone()));
                    state.generation = Some(generation);
                }
                Intent::GeneralQuery => {
                    let run = self.agent.run(&state.question).await?;
                    state.messages.extend(run.messages);
                    state.generation = Some(run.generation);
                }
            }

            Ok(state)
        };

        tokio::select! {
            result = body => result,
            _ = cancellation.cancelled() => Err(BudgetError::Cancelled),
            _ = tokio::time::sleep(self.deadline) => {
                Err(BudgetError::DeadlineExceeded(self.deadline.as_secs()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_starts_with_unset_intent_and_empty_generation() {
        let state = WorkflowState::new("hello");
        assert!(state.intent.is_none());
        assert!(state.generation.is_none());
        assert_eq!(state.question, "hello");
    }
}
