//! Recommendation prompt construction.
//!
//! Builds the two text inputs sent to the generation service (the system
//! instruction describing the matching criteria, and the content prompt
//! enumerating the learner and every candidate mentor) plus the response
//! schema that constrains the model's output to
//! `{ matches: [{ mentorId, score, reason }] }`.

use serde_json::{json, Value};

use crate::models::{Learner, Mentor};

/// Separator placed between serialized mentors in the content prompt.
pub const MENTOR_SEPARATOR: &str = "\n---\n";

/// Settings that shape the instruction text.
#[derive(Debug, Clone)]
pub struct PromptOptions {
    /// Organization name used in the coordinator persona.
    pub program_name: String,
    /// How many mentors the model is asked to recommend.
    pub top_n: usize,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            program_name: "Iron Lady".to_string(),
            top_n: 3,
        }
    }
}

/// The system instruction: persona, task, and matching criteria.
pub fn system_instruction(opts: &PromptOptions) -> String {
    format!(
        "You are an expert career coaching coordinator at '{program}', an organization \
dedicated to leadership development.\n\
Your task is to analyze a learner's profile and suggest the top {n} most compatible \
mentors from a provided list.\n\
\n\
Consider:\n\
1. Industry overlap.\n\
2. Alignment of the mentor's expertise with the learner's career goals.\n\
3. How the mentor's bio addresses the learner's specific challenges.\n\
4. Seniority gap (ideally 5-10 years ahead).\n\
\n\
Provide a compatibility score (0-100) and a brief 2-sentence professional rationale \
for each match. Only use mentor IDs that appear in the list.",
        program = opts.program_name,
        n = opts.top_n,
    )
}

/// One mentor as a single prompt line.
pub fn describe_mentor(m: &Mentor) -> String {
    format!(
        "ID: {}, Name: {}, Title: {}, Industry: {}, Expertise: {}, Years of experience: {}, Bio: {}",
        m.id,
        m.name,
        m.current_title,
        m.industry,
        m.expertise.join(", "),
        m.years_experience,
        m.bio
    )
}

/// The content prompt: learner attributes followed by every mentor.
pub fn match_prompt(learner: &Learner, mentors: &[Mentor]) -> String {
    let roster = mentors
        .iter()
        .map(describe_mentor)
        .collect::<Vec<_>>()
        .join(MENTOR_SEPARATOR);

    format!(
        "Learner Profile:\n\
Name: {}\n\
Current Role: {}\n\
Goals: {}\n\
Challenges: {}\n\
\n\
Available Mentors:\n\
{}",
        learner.name, learner.current_role, learner.career_goals, learner.challenges, roster
    )
}

/// Output schema in the generation API's OpenAPI-subset dialect.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "matches": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "mentorId": { "type": "STRING" },
                        "score": { "type": "NUMBER" },
                        "reason": { "type": "STRING" }
                    },
                    "required": ["mentorId", "score", "reason"]
                }
            }
        },
        "required": ["matches"]
    })
}
