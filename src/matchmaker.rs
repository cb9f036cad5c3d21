//! The select → generate → confirm matching workflow.
//!
//! [`MatchMaker`] holds the state of the matching screen: which learner is
//! selected, whether a recommendation request for that selection is in
//! flight, and the last result. Every selection change bumps a generation
//! counter; a request that resolves after its generation was superseded is
//! discarded instead of overwriting the newer selection's state.
//!
//! The session lock is never held across the recommendation call, so store
//! mutations and other requests stay live while it is outstanding.

use mentor_match_core::models::{Learner, Mentor};
use mentor_match_core::recommend::Recommendation;
use mentor_match_core::store::Store;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::recommender::Recommender;

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("no learner selected")]
    NoSelection,
    #[error("learner not found: {0}")]
    LearnerNotFound(String),
    #[error("a recommendation request is already in progress for learner {0}")]
    InProgress(String),
    #[error("mentor {0} is not among the current recommendations")]
    NotACandidate(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// A recommended mentor resolved against the current collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    pub mentor: Mentor,
    pub score: f64,
    pub reason: String,
}

/// What the matching screen shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub selected_learner: Option<Learner>,
    pub in_progress: bool,
    pub recommendation: Option<Recommendation>,
    /// Matches whose mentor still exists, in presentation order.
    pub candidates: Vec<MatchCandidate>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    Completed(Recommendation),
    /// The selection changed while the request was outstanding.
    Stale,
}

#[derive(Default)]
struct Session {
    selected: Option<String>,
    generation: u64,
    in_flight: Option<u64>,
    result: Option<Recommendation>,
}

impl Session {
    fn reset(&mut self, selected: Option<String>) {
        self.selected = selected;
        self.generation += 1;
        self.result = None;
    }
}

pub struct MatchMaker {
    store: Arc<dyn Store>,
    recommender: Arc<dyn Recommender>,
    session: Mutex<Session>,
}

fn resolve_candidates(recommendation: &Recommendation, mentors: &[Mentor]) -> Vec<MatchCandidate> {
    recommendation
        .as_matches()
        .iter()
        .filter_map(|m| {
            mentors
                .iter()
                .find(|mentor| mentor.id == m.mentor_id)
                .map(|mentor| MatchCandidate {
                    mentor: mentor.clone(),
                    score: m.score,
                    reason: m.reason.clone(),
                })
        })
        .collect()
}

impl MatchMaker {
    pub fn new(store: Arc<dyn Store>, recommender: Arc<dyn Recommender>) -> Self {
        Self {
            store,
            recommender,
            session: Mutex::new(Session::default()),
        }
    }

    fn session(&self) -> Result<MutexGuard<'_, Session>, MatchError> {
        self.session
            .lock()
            .map_err(|_| MatchError::Internal(anyhow::anyhow!("match session lock poisoned")))
    }

    /// Learners still waiting for a mentor.
    pub async fn pending_learners(&self) -> Result<Vec<Learner>, MatchError> {
        let snapshot = self.store.snapshot().await?;
        Ok(snapshot
            .learners
            .iter()
            .filter(|l| l.assigned_mentor_id.is_none())
            .cloned()
            .collect())
    }

    /// Select a learner, discarding any previous results.
    pub async fn select(&self, learner_id: &str) -> Result<(), MatchError> {
        if self.store.get_learner(learner_id).await?.is_none() {
            return Err(MatchError::LearnerNotFound(learner_id.to_string()));
        }
        self.session()?.reset(Some(learner_id.to_string()));
        tracing::debug!(learner_id, "learner selected for matching");
        Ok(())
    }

    /// Drop the selection and any results.
    pub fn clear(&self) -> Result<(), MatchError> {
        self.session()?.reset(None);
        Ok(())
    }

    /// Request recommendations for the selected learner.
    ///
    /// Offers every mentor in the current collection as a candidate.
    pub async fn generate(&self) -> Result<GenerateOutcome, MatchError> {
        let (learner_id, generation) = {
            let mut s = self.session()?;
            let id = s.selected.clone().ok_or(MatchError::NoSelection)?;
            if s.in_flight == Some(s.generation) {
                return Err(MatchError::InProgress(id));
            }
            s.in_flight = Some(s.generation);
            (id, s.generation)
        };

        let learner_and_mentors = match self.store.snapshot().await {
            Ok(snapshot) => snapshot
                .learner(&learner_id)
                .cloned()
                .map(|l| (l, snapshot.mentors.clone()))
                .ok_or_else(|| MatchError::LearnerNotFound(learner_id.clone())),
            Err(e) => Err(MatchError::Internal(e)),
        };
        let (learner, mentors) = match learner_and_mentors {
            Ok(pair) => pair,
            Err(e) => {
                self.finish(generation)?;
                return Err(e);
            }
        };

        let recommendation = self.recommender.recommend(&learner, &mentors).await;

        let mut s = self.session()?;
        if s.generation != generation {
            tracing::debug!(
                learner_id = %learner.id,
                "discarding recommendations for superseded selection"
            );
            return Ok(GenerateOutcome::Stale);
        }
        s.in_flight = None;
        s.result = Some(recommendation.clone());
        tracing::debug!(
            learner_id = %learner.id,
            failed = recommendation.is_failed(),
            "recommendations stored for selection"
        );
        Ok(GenerateOutcome::Completed(recommendation))
    }

    fn finish(&self, generation: u64) -> Result<(), MatchError> {
        let mut s = self.session()?;
        if s.in_flight == Some(generation) {
            s.in_flight = None;
        }
        Ok(())
    }

    /// Current workflow state with candidates resolved against live mentors.
    pub async fn view(&self) -> Result<SessionView, MatchError> {
        let snapshot = self.store.snapshot().await?;
        let s = self.session()?;
        let selected_learner = s
            .selected
            .as_deref()
            .and_then(|id| snapshot.learner(id))
            .cloned();
        let candidates = s
            .result
            .as_ref()
            .map(|r| resolve_candidates(r, &snapshot.mentors))
            .unwrap_or_default();

        Ok(SessionView {
            in_progress: selected_learner.is_some() && s.in_flight == Some(s.generation),
            selected_learner,
            recommendation: s.result.clone(),
            candidates,
        })
    }

    /// Bind one of the current candidates to the selected learner.
    ///
    /// Clears the selection and results on success.
    pub async fn confirm(&self, mentor_id: &str) -> Result<Learner, MatchError> {
        let (learner_id, generation, is_candidate) = {
            let s = self.session()?;
            let learner_id = s.selected.clone().ok_or(MatchError::NoSelection)?;
            let is_candidate = s
                .result
                .as_ref()
                .map(|r| r.as_matches().iter().any(|m| m.mentor_id == mentor_id))
                .unwrap_or(false);
            (learner_id, s.generation, is_candidate)
        };

        if !is_candidate || self.store.get_mentor(mentor_id).await?.is_none() {
            return Err(MatchError::NotACandidate(mentor_id.to_string()));
        }

        let outcome = self
            .store
            .assign_mentor_to_learner(&learner_id, mentor_id)
            .await?;
        if !outcome.is_applied() {
            return Err(MatchError::LearnerNotFound(learner_id));
        }

        // A selection made while the assignment was pending stays in place.
        {
            let mut s = self.session()?;
            if s.generation == generation {
                s.reset(None);
            }
        }
        tracing::info!(learner_id = %learner_id, mentor_id, "match confirmed");

        self.store
            .get_learner(&learner_id)
            .await?
            .ok_or(MatchError::LearnerNotFound(learner_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mentor_match_core::models::MatchResult;
    use mentor_match_core::store::memory::InMemoryStore;
    use mentor_match_core::store::{MutationOutcome, Snapshot};
    use tokio::sync::Notify;

    use crate::seed::{demo_learners, demo_mentors};

    /// Returns fixed matches, optionally waiting on a gate first.
    struct ScriptedRecommender {
        matches: Vec<MatchResult>,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl Recommender for ScriptedRecommender {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn recommend(&self, _learner: &Learner, _mentors: &[Mentor]) -> Recommendation {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            Recommendation::matches(self.matches.clone())
        }
    }

    /// Delegates to an in-memory store, pausing in `get_mentor` until released.
    struct GatedStore {
        inner: InMemoryStore,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl Store for GatedStore {
        async fn snapshot(&self) -> anyhow::Result<Snapshot> {
            self.inner.snapshot().await
        }

        async fn get_mentor(&self, id: &str) -> anyhow::Result<Option<Mentor>> {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.get_mentor(id).await
        }

        async fn add_mentor(&self, mentor: Mentor) -> anyhow::Result<MutationOutcome> {
            self.inner.add_mentor(mentor).await
        }

        async fn update_mentor(&self, mentor: Mentor) -> anyhow::Result<MutationOutcome> {
            self.inner.update_mentor(mentor).await
        }

        async fn delete_mentor(&self, id: &str) -> anyhow::Result<MutationOutcome> {
            self.inner.delete_mentor(id).await
        }

        async fn add_learner(&self, learner: Learner) -> anyhow::Result<MutationOutcome> {
            self.inner.add_learner(learner).await
        }

        async fn update_learner(&self, learner: Learner) -> anyhow::Result<MutationOutcome> {
            self.inner.update_learner(learner).await
        }

        async fn delete_learner(&self, id: &str) -> anyhow::Result<MutationOutcome> {
            self.inner.delete_learner(id).await
        }

        async fn assign_mentor_to_learner(
            &self,
            learner_id: &str,
            mentor_id: &str,
        ) -> anyhow::Result<MutationOutcome> {
            self.inner.assign_mentor_to_learner(learner_id, mentor_id).await
        }
    }

    fn result(id: &str, score: f64) -> MatchResult {
        MatchResult {
            mentor_id: id.to_string(),
            score,
            reason: format!("{} fits", id),
        }
    }

    fn roster() -> InMemoryStore {
        let mut learners = demo_learners();
        learners.push(Learner {
            id: "l2".to_string(),
            name: "Meera".to_string(),
            current_role: "Analyst".to_string(),
            career_goals: "CFO track".to_string(),
            challenges: "Visibility".to_string(),
            assigned_mentor_id: None,
        });
        InMemoryStore::with_records(demo_mentors(), learners)
    }

    fn setup(
        matches: Vec<MatchResult>,
        gate: Option<Arc<Notify>>,
    ) -> (Arc<InMemoryStore>, Arc<MatchMaker>) {
        let store = Arc::new(roster());
        let recommender = Arc::new(ScriptedRecommender { matches, gate });
        let mm = Arc::new(MatchMaker::new(store.clone(), recommender));
        (store, mm)
    }

    async fn wait_until_in_progress(mm: &MatchMaker) {
        for _ in 0..1000 {
            if mm.view().await.unwrap().in_progress {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("generation never started");
    }

    #[tokio::test]
    async fn test_generate_requires_selection() {
        let (_, mm) = setup(Vec::new(), None);
        assert!(matches!(mm.generate().await, Err(MatchError::NoSelection)));
    }

    #[tokio::test]
    async fn test_select_unknown_learner() {
        let (_, mm) = setup(Vec::new(), None);
        assert!(matches!(
            mm.select("ghost").await,
            Err(MatchError::LearnerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_and_view_drop_unknown_mentors() {
        let (_, mm) = setup(
            vec![result("m2", 88.0), result("ghost", 99.0), result("m1", 60.0)],
            None,
        );
        mm.select("l1").await.unwrap();
        let outcome = mm.generate().await.unwrap();
        assert!(matches!(outcome, GenerateOutcome::Completed(_)));

        let view = mm.view().await.unwrap();
        assert!(!view.in_progress);
        assert_eq!(view.selected_learner.unwrap().id, "l1");
        let ids: Vec<&str> = view.candidates.iter().map(|c| c.mentor.id.as_str()).collect();
        assert_eq!(ids, vec!["m2", "m1"]);
    }

    #[tokio::test]
    async fn test_confirm_assigns_and_clears() {
        let (store, mm) = setup(vec![result("m1", 90.0)], None);
        mm.select("l1").await.unwrap();
        mm.generate().await.unwrap();

        let learner = mm.confirm("m1").await.unwrap();
        assert_eq!(learner.assigned_mentor_id.as_deref(), Some("m1"));

        let view = mm.view().await.unwrap();
        assert!(view.selected_learner.is_none());
        assert!(view.candidates.is_empty());

        let pending = mm.pending_learners().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "l2");
        assert_eq!(
            store.get_learner("l1").await.unwrap().unwrap().assigned_mentor_id.as_deref(),
            Some("m1")
        );
    }

    #[tokio::test]
    async fn test_confirm_rejects_non_candidate() {
        let (_, mm) = setup(vec![result("m1", 90.0)], None);
        mm.select("l1").await.unwrap();
        mm.generate().await.unwrap();
        assert!(matches!(
            mm.confirm("m2").await,
            Err(MatchError::NotACandidate(_))
        ));
    }

    #[tokio::test]
    async fn test_reselect_discards_results() {
        let (_, mm) = setup(vec![result("m1", 90.0)], None);
        mm.select("l1").await.unwrap();
        mm.generate().await.unwrap();
        mm.select("l2").await.unwrap();
        let view = mm.view().await.unwrap();
        assert!(view.recommendation.is_none());
        assert!(view.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_clear_drops_selection() {
        let (_, mm) = setup(vec![result("m1", 90.0)], None);
        mm.select("l1").await.unwrap();
        mm.generate().await.unwrap();
        mm.clear().unwrap();
        let view = mm.view().await.unwrap();
        assert!(view.selected_learner.is_none());
        assert!(view.recommendation.is_none());
        assert!(matches!(mm.generate().await, Err(MatchError::NoSelection)));
    }

    #[tokio::test]
    async fn test_second_generate_while_in_flight_is_rejected() {
        let gate = Arc::new(Notify::new());
        let (_, mm) = setup(vec![result("m1", 90.0)], Some(gate.clone()));
        mm.select("l1").await.unwrap();

        let task = {
            let mm = mm.clone();
            tokio::spawn(async move { mm.generate().await })
        };
        wait_until_in_progress(&mm).await;

        assert!(matches!(mm.generate().await, Err(MatchError::InProgress(_))));

        gate.notify_one();
        let outcome = task.await.unwrap().unwrap();
        assert!(matches!(outcome, GenerateOutcome::Completed(_)));
        assert!(!mm.view().await.unwrap().in_progress);
    }

    #[tokio::test]
    async fn test_result_for_superseded_selection_is_discarded() {
        let gate = Arc::new(Notify::new());
        let (store, mm) = setup(vec![result("m1", 90.0)], Some(gate.clone()));
        mm.select("l1").await.unwrap();

        let task = {
            let mm = mm.clone();
            tokio::spawn(async move { mm.generate().await })
        };
        wait_until_in_progress(&mm).await;

        // Unrelated edits stay live while the request is outstanding.
        store.delete_mentor("m2").await.unwrap();
        mm.select("l2").await.unwrap();

        gate.notify_one();
        assert_eq!(task.await.unwrap().unwrap(), GenerateOutcome::Stale);

        let view = mm.view().await.unwrap();
        assert_eq!(view.selected_learner.unwrap().id, "l2");
        assert!(view.recommendation.is_none());
        assert!(!view.in_progress);
    }

    #[tokio::test]
    async fn test_selection_made_during_confirm_survives() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let store = Arc::new(GatedStore {
            inner: roster(),
            entered: entered.clone(),
            release: release.clone(),
        });
        let recommender = Arc::new(ScriptedRecommender {
            matches: vec![result("m1", 90.0)],
            gate: None,
        });
        let mm = Arc::new(MatchMaker::new(store.clone(), recommender));
        mm.select("l1").await.unwrap();
        mm.generate().await.unwrap();

        let task = {
            let mm = mm.clone();
            tokio::spawn(async move { mm.confirm("m1").await })
        };
        entered.notified().await;

        mm.select("l2").await.unwrap();
        release.notify_one();

        let confirmed = task.await.unwrap().unwrap();
        assert_eq!(confirmed.id, "l1");
        assert_eq!(confirmed.assigned_mentor_id.as_deref(), Some("m1"));

        let view = mm.view().await.unwrap();
        assert_eq!(view.selected_learner.unwrap().id, "l2");
        assert!(view.recommendation.is_none());
    }
}
