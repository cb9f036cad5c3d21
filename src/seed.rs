//! Built-in demo roster, loaded unless `[seed] demo = false`.

use mentor_match_core::models::{Learner, Mentor};
use mentor_match_core::store::memory::InMemoryStore;

use crate::config::Config;

pub fn demo_mentors() -> Vec<Mentor> {
    vec![
        Mentor {
            id: "m1".to_string(),
            name: "Sarah Jenkins".to_string(),
            industry: "Technology".to_string(),
            expertise: vec![
                "Product Management".to_string(),
                "Scaling Teams".to_string(),
                "SaaS".to_string(),
            ],
            bio: "Former VP of Product at Google. Passionate about helping women transition \
                  into executive leadership roles."
                .to_string(),
            years_experience: 15,
            current_title: "Product Consultant".to_string(),
        },
        Mentor {
            id: "m2".to_string(),
            name: "Ananya Sharma".to_string(),
            industry: "Finance".to_string(),
            expertise: vec![
                "Investment Banking".to_string(),
                "Financial Strategy".to_string(),
                "Venture Capital".to_string(),
            ],
            bio: "12 years in Wall Street. Expertise in capital raising and corporate \
                  governance for female-led startups."
                .to_string(),
            years_experience: 12,
            current_title: "Senior Partner at FinVentures".to_string(),
        },
    ]
}

pub fn demo_learners() -> Vec<Learner> {
    vec![Learner {
        id: "l1".to_string(),
        name: "Priya Das".to_string(),
        current_role: "Senior Software Engineer".to_string(),
        career_goals: "Transition into Product Management within the next 12 months.".to_string(),
        challenges: "Finding it hard to pivot from coding to stakeholder management.".to_string(),
        assigned_mentor_id: None,
    }]
}

/// Build the process store, seeded according to config.
pub fn build_store(config: &Config) -> InMemoryStore {
    if config.seed.demo {
        tracing::info!("seeding store with demo roster");
        InMemoryStore::with_records(demo_mentors(), demo_learners())
    } else {
        InMemoryStore::new()
    }
}
