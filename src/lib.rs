//! # Mentor Match
//!
//! An administrative service for a mentorship program: manage mentors and
//! learners, view program-wide counts, and request a ranked mentor
//! recommendation list for a learner from an external text-generation
//! service.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌─────────────────┐
//! │  HTTP API /  │──▶│ Collection   │   │  Recommender    │
//! │  mentorctl   │   │ Store (mem)  │   │  (Gemini HTTP)  │
//! └──────┬───────┘   └──────▲───────┘   └────────▲────────┘
//!        │                  │                    │
//!        └────────▶ MatchMaker: select → generate → confirm
//! ```
//!
//! All records live in memory for the lifetime of the process.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`recommender`] | Recommendation client abstraction and Gemini implementation |
//! | [`matchmaker`] | Matching workflow state |
//! | [`server`] | JSON HTTP API |
//! | [`seed`] | Demo roster |
//! | [`stats`] | Roster overview printing |
//! | [`recommend_cmd`] | One-shot recommendation command |

pub mod config;
pub mod matchmaker;
pub mod recommend_cmd;
pub mod recommender;
pub mod seed;
pub mod server;
pub mod stats;
