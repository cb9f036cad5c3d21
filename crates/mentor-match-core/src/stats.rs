//! Dashboard aggregation.
//!
//! Computes the program overview shown on the dashboard from a single
//! [`Snapshot`], so all counts are consistent with one another.

use serde::Serialize;

use crate::models::AssignmentStatus;
use crate::store::Snapshot;

/// Number of learners listed under recent enrollment.
const RECENT_ENROLLMENT_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_learners: usize,
    pub active_mentors: usize,
    /// Learners with an `assignedMentorId`, resolvable or not.
    pub matched: usize,
    pub pending: usize,
    /// `"matched/total"`.
    pub success_ratio: String,
    /// Matched learners whose mentor no longer exists.
    pub dangling: usize,
    pub recent_enrollment: Vec<EnrollmentEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentEntry {
    pub id: String,
    pub name: String,
    pub current_role: String,
    pub status: EnrollmentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Matched,
    Pending,
}

pub fn dashboard_stats(snapshot: &Snapshot) -> DashboardStats {
    let learners = snapshot.learners.as_slice();
    let mentors = snapshot.mentors.as_slice();

    let matched = learners
        .iter()
        .filter(|l| l.assigned_mentor_id.is_some())
        .count();
    let dangling = learners
        .iter()
        .filter(|l| {
            matches!(
                AssignmentStatus::resolve(l, mentors),
                AssignmentStatus::Dangling { .. }
            )
        })
        .count();

    let recent_enrollment = learners
        .iter()
        .take(RECENT_ENROLLMENT_LIMIT)
        .map(|l| EnrollmentEntry {
            id: l.id.clone(),
            name: l.name.clone(),
            current_role: l.current_role.clone(),
            status: if l.assigned_mentor_id.is_some() {
                EnrollmentStatus::Matched
            } else {
                EnrollmentStatus::Pending
            },
        })
        .collect();

    DashboardStats {
        total_learners: learners.len(),
        active_mentors: mentors.len(),
        matched,
        pending: learners.len() - matched,
        success_ratio: format!("{}/{}", matched, learners.len()),
        dangling,
        recent_enrollment,
    }
}
