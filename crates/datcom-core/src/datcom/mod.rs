//! DATCOM Pipeline (C6): fixed-sequence `.dat` file generation, as opposed
//! to the tool-using Reasoning Agent (C7). See spec section 4.6.

pub mod extract;
pub mod format;
pub mod params;
pub mod pipeline;

use crate::chat_client::ChatClient;
use extract::ExtractResult;
use pipeline::PipelineResult;

/// Runs the whole pipeline: extract -> gate -> convert -> format.
/// Never panics; every failure mode resolves to a user-facing string.
pub async fn run_datcom_pipeline(chat: &ChatClient, question: &str) -> String {
    match extract::extract_datcom_params(chat, question).await {
        ExtractResult::ClarificationNeeded(message) => message,
        ExtractResult::Params(params) => match pipeline::run_pipeline(&params) {
            PipelineResult::GateFailed(message) => message,
            PipelineResult::Generated(text) => text,
        },
    }
}
