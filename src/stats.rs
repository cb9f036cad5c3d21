//! Roster and dashboard overview.
//!
//! Prints the mentors, learners and aggregate counts held by the store.
//! Used by `mentorctl roster` to check that seeding and configuration are
//! what you expect before starting the server.

use anyhow::Result;
use mentor_match_core::models::AssignmentStatus;
use mentor_match_core::stats::dashboard_stats;
use mentor_match_core::store::Store;

/// Run the roster command: read a snapshot and print a summary.
pub async fn run_stats(store: &dyn Store) -> Result<()> {
    let snapshot = store.snapshot().await?;
    let stats = dashboard_stats(&snapshot);

    println!("Mentor Match: Program Overview");
    println!("==============================");
    println!();
    println!("  Learners:    {}", stats.total_learners);
    println!("  Mentors:     {}", stats.active_mentors);
    println!("  Matched:     {}", stats.success_ratio);
    println!("  Pending:     {}", stats.pending);
    if stats.dangling > 0 {
        println!("  Dangling:    {}", stats.dangling);
    }

    if !snapshot.mentors.is_empty() {
        println!();
        println!("  Mentors:");
        println!(
            "  {:<38} {:<24} {:<16} {:>5}",
            "ID", "NAME", "INDUSTRY", "YEARS"
        );
        println!("  {}", "-".repeat(86));
        for m in snapshot.mentors.iter() {
            println!(
                "  {:<38} {:<24} {:<16} {:>5}",
                m.id,
                truncate(&m.name, 24),
                truncate(&m.industry, 16),
                m.years_experience
            );
        }
    }

    if !snapshot.learners.is_empty() {
        println!();
        println!("  Learners:");
        println!("  {:<38} {:<24} {}", "ID", "NAME", "MENTOR");
        println!("  {}", "-".repeat(86));
        for l in snapshot.learners.iter() {
            let mentor = match AssignmentStatus::resolve(l, &snapshot.mentors) {
                AssignmentStatus::Unassigned => "pending".to_string(),
                AssignmentStatus::Assigned { mentor } => mentor.name,
                AssignmentStatus::Dangling { mentor_id } => format!("{} (missing)", mentor_id),
            };
            println!("  {:<38} {:<24} {}", l.id, truncate(&l.name, 24), mentor);
        }
    }

    println!();
    Ok(())
}

/// Truncate to at most `max` characters, marking the cut with `…`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
