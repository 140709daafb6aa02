//! Content moderation.

use itertools::Itertools;
use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::BTreeMap;
use std::fmt;

use crate::client::{Client, ClientError};
use crate::http::HttpRequest;

/// Request body for `POST /moderations`.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct ModerationRequest {
    pub input: NonEmpty<String>,
    pub model: Option<String>,
}

impl ModerationRequest {
    pub fn new(input: NonEmpty<String>) -> Self {
        Self { input, model: None }
    }

    /// Classify a single text.
    pub fn single(input: impl Into<String>) -> Self {
        Self::new(NonEmpty::new(input.into()))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub results: Vec<ModerationResult>,
}

impl ModerationResponse {
    /// Whether any input was flagged.
    pub fn flagged(&self) -> bool {
        self.results.iter().any(|r| r.flagged)
    }
}

/// Classification of one input.
///
/// Categories are kept by their API names (`hate`, `self-harm/intent`, ...)
/// so categories added later still show up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationResult {
    pub flagged: bool,
    #[serde(default)]
    pub categories: BTreeMap<String, bool>,
    #[serde(default)]
    pub category_scores: BTreeMap<String, f64>,
}

impl ModerationResult {
    /// Names of the flagged categories, sorted.
    pub fn flagged_categories(&self) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|(_, flagged)| **flagged)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Score of a category, if reported.
    pub fn score(&self, category: &str) -> Option<f64> {
        self.category_scores.get(category).copied()
    }
}

impl fmt::Display for ModerationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.flagged {
            write!(f, "flagged: {}", self.flagged_categories().iter().join(", "))
        } else {
            f.write_str("not flagged")
        }
    }
}

impl Client {
    /// Classify whether inputs violate the content policy.
    pub async fn create_moderation(
        &self,
        request: ModerationRequest,
    ) -> Result<ModerationResponse, ClientError> {
        self.send_json(HttpRequest::post_json("moderations", &request)?)
            .await
    }
}
