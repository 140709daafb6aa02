//! Data models shared across endpoints.

use serde::{Deserialize, Serialize};

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    FunctionCall,
    #[serde(other)]
    Other,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    /// Total prompt tokens used
    #[serde(default)]
    pub prompt_tokens: u32,

    /// Generated tokens; absent for embeddings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,

    #[serde(default)]
    pub total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_finish_reason_is_other() {
        let reason: FinishReason = serde_json::from_str("\"end_turn\"").unwrap();
        assert_eq!(reason, FinishReason::Other);

        let reason: FinishReason = serde_json::from_str("\"tool_calls\"").unwrap();
        assert_eq!(reason, FinishReason::ToolCalls);
    }

    #[test]
    fn embedding_usage_has_no_completion_tokens() {
        let usage: Usage = serde_json::from_str(r#"{"prompt_tokens":8,"total_tokens":8}"#).unwrap();
        assert_eq!(usage.completion_tokens, None);
        assert_eq!(usage.total_tokens, 8);
    }
}
