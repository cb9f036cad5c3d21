//! Core data models used throughout Mentor Match.
//!
//! These types represent the two managed collections (mentors and
//! learners) and the ephemeral recommendation results produced for a
//! learner. All records serialize with camelCase field names, which is
//! the shape used on the HTTP API and in the recommendation prompt schema.

use serde::{Deserialize, Deserializer, Serialize};

/// An industry professional available for pairing with a learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mentor {
    pub id: String,
    pub name: String,
    pub industry: String,
    pub expertise: Vec<String>,
    pub bio: String,
    pub years_experience: u32,
    pub current_title: String,
}

/// A program participant seeking mentorship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Learner {
    pub id: String,
    pub name: String,
    pub current_role: String,
    pub career_goals: String,
    pub challenges: String,
    /// Set by match confirmation. Never checked against the mentor
    /// collection, so it may outlive the mentor it names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_mentor_id: Option<String>,
}

/// One recommended mentor for a learner, as scored by the external service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub mentor_id: String,
    /// Intended range 0–100; not validated.
    pub score: f64,
    pub reason: String,
}

/// Generate a fresh record identifier.
///
/// Identifiers are random UUID v4 strings, so records created in the same
/// instant never collide.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Split a comma-separated skill list into trimmed, non-empty tags.
///
/// ```rust
/// use mentor_match_core::models::parse_expertise;
///
/// assert_eq!(parse_expertise(" SaaS, ,Scaling Teams "), vec!["SaaS", "Scaling Teams"]);
/// ```
pub fn parse_expertise(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Mentor fields as submitted by a form, without an identifier.
///
/// Used for both creation and full-replace updates. `expertise` accepts
/// either a JSON list or a comma-separated string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorDraft {
    pub name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default, deserialize_with = "deserialize_expertise")]
    pub expertise: Vec<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub years_experience: u32,
    #[serde(default)]
    pub current_title: String,
}

impl MentorDraft {
    /// Build a [`Mentor`] carrying the given identifier.
    pub fn into_mentor(self, id: String) -> Mentor {
        Mentor {
            id,
            name: self.name.trim().to_string(),
            industry: self.industry,
            expertise: self.expertise,
            bio: self.bio,
            years_experience: self.years_experience,
            current_title: self.current_title,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("mentor name must not be empty");
        }
        Ok(())
    }
}

/// Learner fields as submitted by a form, without an identifier.
///
/// An update replaces the whole record, so a draft that omits
/// `assignedMentorId` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerDraft {
    pub name: String,
    #[serde(default)]
    pub current_role: String,
    #[serde(default)]
    pub career_goals: String,
    #[serde(default)]
    pub challenges: String,
    #[serde(default)]
    pub assigned_mentor_id: Option<String>,
}

impl LearnerDraft {
    /// Build a [`Learner`] carrying the given identifier.
    pub fn into_learner(self, id: String) -> Learner {
        Learner {
            id,
            name: self.name.trim().to_string(),
            current_role: self.current_role,
            career_goals: self.career_goals,
            challenges: self.challenges,
            assigned_mentor_id: self.assigned_mentor_id,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("learner name must not be empty");
        }
        Ok(())
    }
}

fn deserialize_expertise<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Expertise {
        List(Vec<String>),
        Text(String),
    }

    Ok(match Expertise::deserialize(deserializer)? {
        Expertise::List(items) => items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Expertise::Text(raw) => parse_expertise(&raw),
    })
}

/// Resolution of a learner's `assignedMentorId` against the mentor collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum AssignmentStatus {
    /// No mentor has been confirmed.
    Unassigned,
    /// The assigned mentor exists.
    Assigned { mentor: Mentor },
    /// The assigned identifier names no current mentor.
    #[serde(rename_all = "camelCase")]
    Dangling { mentor_id: String },
}

impl AssignmentStatus {
    pub fn resolve(learner: &Learner, mentors: &[Mentor]) -> Self {
        match &learner.assigned_mentor_id {
            None => AssignmentStatus::Unassigned,
            Some(id) => match mentors.iter().find(|m| &m.id == id) {
                Some(m) => AssignmentStatus::Assigned { mentor: m.clone() },
                None => AssignmentStatus::Dangling {
                    mentor_id: id.clone(),
                },
            },
        }
    }
}
