//! Collection store abstraction for Mentor Match.
//!
//! The [`Store`] trait is the only sanctioned way to read or mutate the
//! mentor and learner collections. Consumers (the HTTP surface, the match
//! workflow, the CLI) hold an `Arc<dyn Store>` and never touch collection
//! fields directly, so a persisted backend can replace [`memory::InMemoryStore`]
//! without changes elsewhere.
//!
//! Collections are handed out as immutable [`Snapshot`]s. A mutation that
//! applies produces new collection values; one that does not apply leaves
//! the previous values (and their `Arc` identity) in place.

pub mod memory;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::models::{Learner, Mentor};

/// Immutable view of both collections at one point in time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub mentors: Arc<Vec<Mentor>>,
    pub learners: Arc<Vec<Learner>>,
    /// Incremented on every applied mutation.
    pub revision: u64,
}

impl Snapshot {
    pub fn mentor(&self, id: &str) -> Option<&Mentor> {
        self.mentors.iter().find(|m| m.id == id)
    }

    pub fn learner(&self, id: &str) -> Option<&Learner> {
        self.learners.iter().find(|l| l.id == id)
    }
}

/// Result of a store mutation.
///
/// Anything other than [`Applied`](MutationOutcome::Applied) means the
/// collection was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationOutcome {
    Applied,
    NotFound,
    DuplicateId,
}

impl MutationOutcome {
    pub fn is_applied(self) -> bool {
        self == MutationOutcome::Applied
    }
}

/// Abstract storage backend for the two record collections.
///
/// All operations are async (via `async-trait`) so that a networked or
/// persisted backend fits the same seam. The in-memory implementation
/// returns immediately-ready futures.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`snapshot`](Store::snapshot) | Read both collections |
/// | [`add_mentor`](Store::add_mentor) / [`add_learner`](Store::add_learner) | Append a new record |
/// | [`update_mentor`](Store::update_mentor) / [`update_learner`](Store::update_learner) | Full replace by id |
/// | [`delete_mentor`](Store::delete_mentor) / [`delete_learner`](Store::delete_learner) | Remove by id, no cascade |
/// | [`assign_mentor_to_learner`](Store::assign_mentor_to_learner) | Record a confirmed match |
#[async_trait]
pub trait Store: Send + Sync {
    async fn snapshot(&self) -> Result<Snapshot>;

    async fn get_mentor(&self, id: &str) -> Result<Option<Mentor>> {
        Ok(self.snapshot().await?.mentor(id).cloned())
    }

    async fn get_learner(&self, id: &str) -> Result<Option<Learner>> {
        Ok(self.snapshot().await?.learner(id).cloned())
    }

    /// Append a mentor. Rejects an identifier already in the collection.
    async fn add_mentor(&self, mentor: Mentor) -> Result<MutationOutcome>;

    /// Replace the mentor whose id matches `mentor.id`, keeping its position.
    async fn update_mentor(&self, mentor: Mentor) -> Result<MutationOutcome>;

    /// Remove a mentor. Learners pointing at it keep the dangling id.
    async fn delete_mentor(&self, id: &str) -> Result<MutationOutcome>;

    /// Append a learner. Rejects an identifier already in the collection.
    async fn add_learner(&self, learner: Learner) -> Result<MutationOutcome>;

    /// Replace the learner whose id matches `learner.id`, keeping its position.
    async fn update_learner(&self, learner: Learner) -> Result<MutationOutcome>;

    async fn delete_learner(&self, id: &str) -> Result<MutationOutcome>;

    /// Set `assignedMentorId` on one learner.
    ///
    /// `mentor_id` is not checked against the mentor collection.
    async fn assign_mentor_to_learner(
        &self,
        learner_id: &str,
        mentor_id: &str,
    ) -> Result<MutationOutcome>;
}
