//! In-memory [`Store`] implementation.
//!
//! Each collection lives behind an `Arc<Vec<_>>` inside a single
//! `std::sync::RwLock`. Mutations read the current vector, build a new one,
//! and swap it in while holding the write lock, so every operation is atomic
//! and shared records are never mutated in place.

use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{Learner, Mentor};

use super::{MutationOutcome, Snapshot, Store};

struct Collections {
    mentors: Arc<Vec<Mentor>>,
    learners: Arc<Vec<Learner>>,
    revision: u64,
}

/// Process-lifetime store. Contents are lost when the process exits.
pub struct InMemoryStore {
    inner: RwLock<Collections>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_records(Vec::new(), Vec::new())
    }

    /// Start from an initial roster (e.g. demo data).
    pub fn with_records(mentors: Vec<Mentor>, learners: Vec<Learner>) -> Self {
        Self {
            inner: RwLock::new(Collections {
                mentors: Arc::new(mentors),
                learners: Arc::new(learners),
                revision: 0,
            }),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Collections>> {
        self.inner
            .read()
            .map_err(|_| anyhow!("collection store lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Collections>> {
        self.inner
            .write()
            .map_err(|_| anyhow!("collection store lock poisoned"))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Append `item` unless its id is taken. Returns the new vector on success.
fn appended<T: Clone>(
    current: &[T],
    item: T,
    id_of: impl Fn(&T) -> &str,
) -> Option<Vec<T>> {
    if current.iter().any(|x| id_of(x) == id_of(&item)) {
        return None;
    }
    let mut next = current.to_vec();
    next.push(item);
    Some(next)
}

/// Replace the element with `item`'s id. `None` when there is none.
fn replaced<T: Clone>(current: &[T], item: T, id_of: impl Fn(&T) -> &str) -> Option<Vec<T>> {
    let pos = current.iter().position(|x| id_of(x) == id_of(&item))?;
    let mut next = current.to_vec();
    next[pos] = item;
    Some(next)
}

fn removed<T: Clone>(current: &[T], id: &str, id_of: impl Fn(&T) -> &str) -> Option<Vec<T>> {
    if !current.iter().any(|x| id_of(x) == id) {
        return None;
    }
    Some(current.iter().filter(|x| id_of(x) != id).cloned().collect())
}

impl Collections {
    fn commit_mentors(
        &mut self,
        next: Option<Vec<Mentor>>,
        miss: MutationOutcome,
    ) -> MutationOutcome {
        match next {
            Some(v) => {
                self.mentors = Arc::new(v);
                self.revision += 1;
                MutationOutcome::Applied
            }
            None => miss,
        }
    }

    fn commit_learners(
        &mut self,
        next: Option<Vec<Learner>>,
        miss: MutationOutcome,
    ) -> MutationOutcome {
        match next {
            Some(v) => {
                self.learners = Arc::new(v);
                self.revision += 1;
                MutationOutcome::Applied
            }
            None => miss,
        }
    }
}

fn mentor_id(m: &Mentor) -> &str {
    &m.id
}

fn learner_id(l: &Learner) -> &str {
    &l.id
}

#[async_trait]
impl Store for InMemoryStore {
    async fn snapshot(&self) -> Result<Snapshot> {
        let c = self.read()?;
        Ok(Snapshot {
            mentors: c.mentors.clone(),
            learners: c.learners.clone(),
            revision: c.revision,
        })
    }

    async fn add_mentor(&self, mentor: Mentor) -> Result<MutationOutcome> {
        let mut c = self.write()?;
        let next = appended(&c.mentors, mentor, mentor_id);
        let outcome = c.commit_mentors(next, MutationOutcome::DuplicateId);
        tracing::debug!(?outcome, revision = c.revision, "add_mentor");
        Ok(outcome)
    }

    async fn update_mentor(&self, mentor: Mentor) -> Result<MutationOutcome> {
        let mut c = self.write()?;
        let next = replaced(&c.mentors, mentor, mentor_id);
        let outcome = c.commit_mentors(next, MutationOutcome::NotFound);
        tracing::debug!(?outcome, revision = c.revision, "update_mentor");
        Ok(outcome)
    }

    async fn delete_mentor(&self, id: &str) -> Result<MutationOutcome> {
        let mut c = self.write()?;
        let next = removed(&c.mentors, id, mentor_id);
        let outcome = c.commit_mentors(next, MutationOutcome::NotFound);
        tracing::debug!(?outcome, id, "delete_mentor");
        Ok(outcome)
    }

    async fn add_learner(&self, learner: Learner) -> Result<MutationOutcome> {
        let mut c = self.write()?;
        let next = appended(&c.learners, learner, learner_id);
        let outcome = c.commit_learners(next, MutationOutcome::DuplicateId);
        tracing::debug!(?outcome, revision = c.revision, "add_learner");
        Ok(outcome)
    }

    async fn update_learner(&self, learner: Learner) -> Result<MutationOutcome> {
        let mut c = self.write()?;
        let next = replaced(&c.learners, learner, learner_id);
        let outcome = c.commit_learners(next, MutationOutcome::NotFound);
        tracing::debug!(?outcome, revision = c.revision, "update_learner");
        Ok(outcome)
    }

    async fn delete_learner(&self, id: &str) -> Result<MutationOutcome> {
        let mut c = self.write()?;
        let next = removed(&c.learners, id, learner_id);
        let outcome = c.commit_learners(next, MutationOutcome::NotFound);
        tracing::debug!(?outcome, id, "delete_learner");
        Ok(outcome)
    }

    async fn assign_mentor_to_learner(
        &self,
        learner_id: &str,
        mentor_id: &str,
    ) -> Result<MutationOutcome> {
        let mut c = self.write()?;
        let next = c
            .learners
            .iter()
            .position(|l| l.id == learner_id)
            .map(|pos| {
                let mut next = c.learners.as_ref().clone();
                next[pos] = Learner {
                    assigned_mentor_id: Some(mentor_id.to_string()),
                    ..next[pos].clone()
                };
                next
            });
        let outcome = c.commit_learners(next, MutationOutcome::NotFound);
        tracing::debug!(?outcome, learner_id, mentor_id, "assign_mentor_to_learner");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::new_id;
    use std::collections::HashSet;

    fn mentor(id: &str, name: &str) -> Mentor {
        Mentor {
            id: id.to_string(),
            name: name.to_string(),
            industry: "Tech".to_string(),
            expertise: vec!["X".to_string()],
            bio: "...".to_string(),
            years_experience: 10,
            current_title: "CTO".to_string(),
        }
    }

    fn learner(id: &str) -> Learner {
        Learner {
            id: id.to_string(),
            name: format!("Learner {}", id),
            current_role: "Engineer".to_string(),
            career_goals: "Lead".to_string(),
            challenges: "Delegation".to_string(),
            assigned_mentor_id: None,
        }
    }

    #[tokio::test]
    async fn test_adds_keep_ids_unique() {
        let store = InMemoryStore::new();
        for i in 0..50 {
            let outcome = store
                .add_mentor(mentor(&new_id(), &format!("M{}", i)))
                .await
                .unwrap();
            assert!(outcome.is_applied());
        }
        let snap = store.snapshot().await.unwrap();
        let ids: HashSet<&str> = snap.mentors.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), 50);
        assert_eq!(snap.revision, 50);
    }

    #[tokio::test]
    async fn test_add_appends_in_order() {
        let store = InMemoryStore::new();
        store.add_mentor(mentor("a", "first")).await.unwrap();
        store.add_mentor(mentor("b", "second")).await.unwrap();
        let snap = store.snapshot().await.unwrap();
        let names: Vec<&str> = snap.mentors.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_add_duplicate_id_rejected() {
        let store = InMemoryStore::with_records(vec![mentor("m1", "A")], vec![learner("l1")]);
        let before = store.snapshot().await.unwrap();

        assert_eq!(
            store.add_mentor(mentor("m1", "B")).await.unwrap(),
            MutationOutcome::DuplicateId
        );
        assert_eq!(
            store.add_learner(learner("l1")).await.unwrap(),
            MutationOutcome::DuplicateId
        );

        let after = store.snapshot().await.unwrap();
        assert!(Arc::ptr_eq(&before.mentors, &after.mentors));
        assert!(Arc::ptr_eq(&before.learners, &after.learners));
        assert_eq!(after.mentors[0].name, "A");
    }

    #[tokio::test]
    async fn test_update_replaces_whole_record() {
        let store = InMemoryStore::with_records(
            vec![mentor("m1", "A"), mentor("m2", "B")],
            Vec::new(),
        );
        let replacement = Mentor {
            expertise: Vec::new(),
            ..mentor("m1", "A2")
        };
        assert!(store.update_mentor(replacement).await.unwrap().is_applied());

        let snap = store.snapshot().await.unwrap();
        assert_eq!(snap.mentors[0].name, "A2");
        assert!(snap.mentors[0].expertise.is_empty());
        assert_eq!(snap.mentors[1].name, "B");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_noop() {
        let store = InMemoryStore::with_records(vec![mentor("m1", "A")], vec![learner("l1")]);
        let before = store.snapshot().await.unwrap();

        assert_eq!(
            store.update_mentor(mentor("nope", "Z")).await.unwrap(),
            MutationOutcome::NotFound
        );
        assert_eq!(
            store.update_learner(learner("nope")).await.unwrap(),
            MutationOutcome::NotFound
        );

        let after = store.snapshot().await.unwrap();
        assert!(Arc::ptr_eq(&before.mentors, &after.mentors));
        assert!(Arc::ptr_eq(&before.learners, &after.learners));
        assert_eq!(before.revision, after.revision);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_noop() {
        let store = InMemoryStore::with_records(vec![mentor("m1", "A")], vec![learner("l1")]);
        let before = store.snapshot().await.unwrap();

        assert_eq!(
            store.delete_mentor("nope").await.unwrap(),
            MutationOutcome::NotFound
        );
        assert_eq!(
            store.delete_learner("nope").await.unwrap(),
            MutationOutcome::NotFound
        );

        let after = store.snapshot().await.unwrap();
        assert!(Arc::ptr_eq(&before.mentors, &after.mentors));
        assert!(Arc::ptr_eq(&before.learners, &after.learners));
        assert_eq!(before.revision, after.revision);
    }

    #[tokio::test]
    async fn test_assign_targets_only_one_learner() {
        let store = InMemoryStore::with_records(
            vec![mentor("m1", "A")],
            vec![learner("l1"), learner("l2"), learner("l3")],
        );
        let outcome = store
            .assign_mentor_to_learner("l2", "does-not-exist")
            .await
            .unwrap();
        assert!(outcome.is_applied());

        let snap = store.snapshot().await.unwrap();
        assert_eq!(snap.learners[0].assigned_mentor_id, None);
        assert_eq!(
            snap.learners[1].assigned_mentor_id.as_deref(),
            Some("does-not-exist")
        );
        assert_eq!(snap.learners[2].assigned_mentor_id, None);
    }

    #[tokio::test]
    async fn test_assign_unknown_learner_is_noop() {
        let store = InMemoryStore::with_records(Vec::new(), vec![learner("l1")]);
        let before = store.snapshot().await.unwrap();
        assert_eq!(
            store.assign_mentor_to_learner("nope", "m1").await.unwrap(),
            MutationOutcome::NotFound
        );
        let after = store.snapshot().await.unwrap();
        assert!(Arc::ptr_eq(&before.learners, &after.learners));
    }

    #[tokio::test]
    async fn test_delete_mentor_leaves_dangling_assignment() {
        let store = InMemoryStore::with_records(vec![mentor("m1", "A")], vec![learner("l1")]);
        store.assign_mentor_to_learner("l1", "m1").await.unwrap();
        assert!(store.delete_mentor("m1").await.unwrap().is_applied());

        let snap = store.snapshot().await.unwrap();
        assert!(snap.mentor("m1").is_none());
        assert_eq!(
            snap.learner("l1").unwrap().assigned_mentor_id.as_deref(),
            Some("m1")
        );
    }

    #[tokio::test]
    async fn test_snapshot_is_isolated_from_later_mutations() {
        let store = InMemoryStore::with_records(vec![mentor("m1", "A")], Vec::new());
        let old = store.snapshot().await.unwrap();
        store.add_mentor(mentor("m2", "B")).await.unwrap();
        assert_eq!(old.mentors.len(), 1);
        assert_eq!(store.snapshot().await.unwrap().mentors.len(), 2);
    }
}
