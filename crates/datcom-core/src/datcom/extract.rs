//! Stage 1 (Extract): ask C2 for a strict-JSON `DatcomParams` shape.
//! Unset fields must be absent, never hallucinated. On a JSON parse error,
//! retry once; then fail with a clarification message.

use crate::chat_client::{ChatClient, ChatResult, Message};
use crate::datcom::params::DatcomParams;

const EXTRACT_SYSTEM_PROMPT: &str = r#"Extract DATCOM generation parameters from the user's message into a strict JSON object matching this shape. Include ONLY fields the user explicitly stated; omit everything else (do not invent defaults or guess numbers).

{
  "aircraft_id": string,
  "wing": {"area": number, "aspect_ratio": number, "taper_ratio": number, "sweep_deg": number, "airfoil": string, "dihedral_deg": number, "twist_deg": number},
  "htail": {"area": number, "aspect_ratio": number, "taper_ratio": number, "sweep_deg": number},
  "vtail": {"area": number, "aspect_ratio": number, "taper_ratio": number, "sweep_deg": number},
  "fuselage": {"length": number, "max_diameter": number, "nose_length": number, "tail_length": number, "n_stations": integer},
  "flight": {"machs": [number], "altitudes": [number], "alpha_start": number, "alpha_end": number, "alpha_step": number, "weight": number},
  "synthesis": {"wing_pct": number, "htail_pct": number, "vtail_pct": number, "cg_pct": number}
}

Reply with ONLY the JSON object, no prose, no markdown fences."#;

pub enum ExtractResult {
    Params(DatcomParams),
    /// The model failed to return parseable JSON even after one retry.
    ClarificationNeeded(String),
}

pub async fn extract_datcom_params(chat: &ChatClient, question: &str) -> ExtractResult {
    let messages = vec![Message::user(question)];

    for attempt in 0..2 {
        match chat.complete(EXTRACT_SYSTEM_PROMPT, &messages, None, 0.0).await {
            Ok(ChatResult::Text(text)) => match parse_params(&text) {
                Ok(params) => return ExtractResult::Params(params),
                Err(e) => {
                    tracing::warn!(attempt, "DATCOM parameter extraction parse failed: {}", e);
                }
            },
            Ok(ChatResult::ToolCalls(_)) => {
                tracing::warn!(attempt, "extractor unexpectedly returned tool calls");
            }
            Err(e) => {
                tracing::warn!(attempt, "DATCOM extraction chat call failed: {}", e);
            }
        }
    }

    ExtractResult::ClarificationNeeded(
        "无法解析您提供的设计参数，请确认机翼面积、展弦比、梢根比、后掠角以及飞行条件（马赫数、高度、迎角范围）后重试。"
            .to_string(),
    )
}

fn parse_params(text: &str) -> Result<DatcomParams, serde_json::Error> {
    let trimmed = strip_markdown_fence(text.trim());
    serde_json::from_str(trimmed)
}

fn strip_markdown_fence(text: &str) -> &str {
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_json() {
        let text = r#"{"wing": {"area": 530.0, "aspect_ratio": 2.8, "taper_ratio": 0.3, "sweep_deg": 45.0}}"#;
        let params = parse_params(text).unwrap();
        assert_eq!(params.wing.unwrap().area, Some(530.0));
    }

    #[test]
    fn parses_a_partial_wing_with_only_area_stated() {
        let text = r#"{"wing": {"area": 530.0}}"#;
        let params = parse_params(text).unwrap();
        let wing = params.wing.unwrap();
        assert_eq!(wing.area, Some(530.0));
        assert_eq!(wing.aspect_ratio, None);
    }

    #[test]
    fn strips_markdown_code_fences() {
        let text = "```json\n{\"aircraft_id\": \"F-4\"}\n```";
        let params = parse_params(text).unwrap();
        assert_eq!(params.aircraft_id.as_deref(), Some("F-4"));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(parse_params("not json at all").is_err());
    }
}
