//! Recommendation results and response parsing.
//!
//! A recommendation request either yields a list of [`MatchResult`]s or
//! fails. [`Recommendation`] keeps those two cases apart so that callers
//! can tell "no good matches" from "the request failed", while
//! [`Recommendation::into_matches_or_empty`] still offers the collapsed
//! view when a caller wants it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::MatchResult;

/// Outcome of one recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Recommendation {
    /// The service answered; matches are in presentation order.
    #[serde(rename = "ok")]
    Matches { matches: Vec<MatchResult> },
    /// The service could not be reached or its answer was unusable.
    Failed { cause: String },
}

impl Recommendation {
    pub fn matches(matches: Vec<MatchResult>) -> Self {
        Recommendation::Matches { matches }
    }

    pub fn failed(cause: impl Into<String>) -> Self {
        Recommendation::Failed {
            cause: cause.into(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Recommendation::Failed { .. })
    }

    /// Borrow the matches; empty for a failure.
    pub fn as_matches(&self) -> &[MatchResult] {
        match self {
            Recommendation::Matches { matches } => matches,
            Recommendation::Failed { .. } => &[],
        }
    }

    /// Collapse a failure into an empty list.
    pub fn into_matches_or_empty(self) -> Vec<MatchResult> {
        match self {
            Recommendation::Matches { matches } => matches,
            Recommendation::Failed { .. } => Vec::new(),
        }
    }
}

/// How returned matches are ordered before presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingOrder {
    /// Keep the service's order; position implies rank.
    #[default]
    AsReturned,
    /// Stable sort by score, highest first.
    Score,
}

impl RankingOrder {
    pub fn apply(self, matches: &mut [MatchResult]) {
        if self == RankingOrder::Score {
            matches.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
    }
}

#[derive(Deserialize)]
struct MatchEnvelope {
    matches: Vec<MatchResult>,
}

/// Parse the model's JSON text and extract the `matches` array.
///
/// Fails on malformed JSON or when the shape does not match
/// `{ matches: [{ mentorId, score, reason }] }`.
pub fn parse_match_response(text: &str) -> Result<Vec<MatchResult>> {
    let envelope: MatchEnvelope = serde_json::from_str(text.trim())
        .context("recommendation response is not the expected JSON shape")?;
    Ok(envelope.matches)
}
