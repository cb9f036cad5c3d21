//! Recommendation client abstraction and implementations.
//!
//! Defines the [`Recommender`] trait and concrete implementations:
//! - **[`DisabledRecommender`]**: reports failure; used when no provider is configured.
//! - **[`GeminiRecommender`]**: calls the Gemini `generateContent` API with a
//!   constrained JSON response schema.
//!
//! # Failure Contract
//!
//! [`Recommender::recommend`] never returns an error. Transport failures,
//! non-success statuses, missing candidate text, malformed JSON and shape
//! mismatches are logged and returned as [`Recommendation::Failed`], which
//! callers can tell apart from an empty (but successful) match list.
//!
//! There is no retry. A request timeout applies only when
//! `recommender.timeout_secs` is set.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use mentor_match_core::models::{Learner, MatchResult, Mentor};
use mentor_match_core::prompt::{match_prompt, response_schema, system_instruction, PromptOptions};
use mentor_match_core::recommend::{parse_match_response, RankingOrder, Recommendation};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::RecommenderConfig;

/// Produces a ranked mentor list for one learner.
#[async_trait]
pub trait Recommender: Send + Sync {
    /// Provider identifier (e.g. `"gemini"`).
    fn name(&self) -> &str;

    /// Recommend mentors from `mentors` for `learner`.
    ///
    /// An empty `mentors` slice yields an empty success without contacting
    /// any service.
    async fn recommend(&self, learner: &Learner, mentors: &[Mentor]) -> Recommendation;
}

// ============ Disabled ============

/// A recommender that always reports failure.
///
/// Used when `recommender.provider = "disabled"`.
pub struct DisabledRecommender;

#[async_trait]
impl Recommender for DisabledRecommender {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn recommend(&self, _learner: &Learner, mentors: &[Mentor]) -> Recommendation {
        if mentors.is_empty() {
            return Recommendation::matches(Vec::new());
        }
        Recommendation::failed("recommendation provider is disabled")
    }
}

// ============ Gemini ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

/// Recommender backed by the Gemini `generateContent` endpoint.
///
/// Sends `POST {base_url}/v1beta/models/{model}:generateContent` with the
/// API key in the `x-goog-api-key` header.
pub struct GeminiRecommender {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    prompt: PromptOptions,
    ranking: RankingOrder,
}

impl GeminiRecommender {
    /// Create a Gemini recommender from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is available or the HTTP client
    /// cannot be built.
    pub fn new(config: &RecommenderConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            api_key,
            prompt: config.prompt_options(),
            ranking: config.ranking,
        })
    }

    async fn request_matches(
        &self,
        learner: &Learner,
        mentors: &[Mentor],
    ) -> Result<Vec<MatchResult>> {
        let instruction = system_instruction(&self.prompt);
        let prompt = match_prompt(learner, mentors);
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: &instruction }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to recommendation service")?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Recommendation service error {}: {}", status, body_text);
        }

        let json: Value = response
            .json()
            .await
            .context("Recommendation service returned a non-JSON body")?;
        let text = extract_candidate_text(&json)?;
        parse_match_response(&text)
    }
}

#[async_trait]
impl Recommender for GeminiRecommender {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn recommend(&self, learner: &Learner, mentors: &[Mentor]) -> Recommendation {
        if mentors.is_empty() {
            return Recommendation::matches(Vec::new());
        }

        tracing::info!(
            learner_id = %learner.id,
            candidates = mentors.len(),
            "requesting mentor recommendations"
        );

        match self.request_matches(learner, mentors).await {
            Ok(mut matches) => {
                self.ranking.apply(&mut matches);
                tracing::info!(
                    learner_id = %learner.id,
                    returned = matches.len(),
                    "recommendations received"
                );
                Recommendation::matches(matches)
            }
            Err(e) => {
                let cause = format!("{:#}", e);
                tracing::warn!(
                    learner_id = %learner.id,
                    error = %cause,
                    "recommendation request failed"
                );
                Recommendation::failed(cause)
            }
        }
    }
}

/// Pull the generated text out of a `generateContent` response.
///
/// Concatenates every text part of the first candidate.
fn extract_candidate_text(json: &Value) -> Result<String> {
    let parts = json
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            anyhow::anyhow!("Invalid recommendation response: missing candidate content")
        })?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.trim().is_empty() {
        bail!("Invalid recommendation response: candidate has no text");
    }
    Ok(text)
}

/// Create the configured [`Recommender`].
///
/// | Config Value | Recommender |
/// |-------------|-------------|
/// | `"disabled"` | [`DisabledRecommender`] |
/// | `"gemini"` | [`GeminiRecommender`] |
pub fn create_recommender(config: &RecommenderConfig) -> Result<Arc<dyn Recommender>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledRecommender)),
        "gemini" => Ok(Arc::new(GeminiRecommender::new(config)?)),
        other => bail!("Unknown recommender provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn learner() -> Learner {
        Learner {
            id: "l1".to_string(),
            name: "Priya".to_string(),
            current_role: "Engineer".to_string(),
            career_goals: "Product".to_string(),
            challenges: "Pivoting".to_string(),
            assigned_mentor_id: None,
        }
    }

    fn mentor() -> Mentor {
        Mentor {
            id: "m1".to_string(),
            name: "Sarah".to_string(),
            industry: "Technology".to_string(),
            expertise: vec!["SaaS".to_string()],
            bio: "VP Product".to_string(),
            years_experience: 15,
            current_title: "Consultant".to_string(),
        }
    }

    fn unreachable_config() -> RecommenderConfig {
        RecommenderConfig {
            provider: "gemini".to_string(),
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: Some("test-key".to_string()),
            timeout_secs: Some(5),
            ..Default::default()
        }
    }

    #[test]
    fn test_extract_candidate_text_joins_parts() {
        let json = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"matches\":" }, { "text": "[]}" }] }
            }]
        });
        assert_eq!(extract_candidate_text(&json).unwrap(), "{\"matches\":[]}");
    }

    #[test]
    fn test_extract_candidate_text_missing() {
        assert!(extract_candidate_text(&json!({ "candidates": [] })).is_err());
        assert!(extract_candidate_text(&json!({ "error": { "code": 400 } })).is_err());
        let blank = json!({ "candidates": [{ "content": { "parts": [{ "text": " " }] } }] });
        assert!(extract_candidate_text(&blank).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: "sys" }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: "prompt" }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(v["systemInstruction"].get("role").is_none());
        assert_eq!(v["contents"][0]["role"], "user");
        assert_eq!(v["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(v["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_endpoint_from_config() {
        let cfg = RecommenderConfig {
            base_url: "https://example.test/".to_string(),
            model: "gemini-x".to_string(),
            ..unreachable_config()
        };
        let rec = GeminiRecommender::new(&cfg).unwrap();
        assert_eq!(
            rec.endpoint,
            "https://example.test/v1beta/models/gemini-x:generateContent"
        );
    }

    #[tokio::test]
    async fn test_empty_mentors_short_circuits() {
        let rec = GeminiRecommender::new(&unreachable_config()).unwrap();
        let result = rec.recommend(&learner(), &[]).await;
        assert_eq!(result, Recommendation::matches(Vec::new()));
    }

    #[tokio::test]
    async fn test_network_failure_is_tagged_failed() {
        let rec = GeminiRecommender::new(&unreachable_config()).unwrap();
        let result = rec.recommend(&learner(), &[mentor()]).await;
        assert!(result.is_failed());
        assert!(result.into_matches_or_empty().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_reports_failure() {
        let result = DisabledRecommender.recommend(&learner(), &[mentor()]).await;
        assert!(result.is_failed());
        let result = DisabledRecommender.recommend(&learner(), &[]).await;
        assert!(!result.is_failed());
    }

    #[test]
    fn test_create_recommender_requires_key_for_gemini() {
        let cfg = RecommenderConfig {
            provider: "gemini".to_string(),
            api_key_env: "MENTOR_MATCH_TEST_NO_SUCH_KEY".to_string(),
            ..Default::default()
        };
        assert!(create_recommender(&cfg).is_err());
        let disabled = create_recommender(&RecommenderConfig::default()).unwrap();
        assert_eq!(disabled.name(), "disabled");
    }
}
