//! `mentorctl recommend`: one recommendation request from the command line.
//!
//! Runs the configured recommender for a single learner against every
//! mentor in the store and prints the result, keeping a failed request
//! visibly distinct from an empty match list.

use anyhow::{bail, Result};
use mentor_match_core::recommend::Recommendation;
use mentor_match_core::store::Store;

use crate::recommender::Recommender;

pub async fn run_recommend(
    store: &dyn Store,
    recommender: &dyn Recommender,
    learner_id: &str,
) -> Result<()> {
    let snapshot = store.snapshot().await?;
    let learner = match snapshot.learner(learner_id) {
        Some(l) => l,
        None => bail!("learner not found: {}", learner_id),
    };

    println!(
        "Recommending mentors for {} ({}) from {} candidates via {}...",
        learner.name,
        learner.id,
        snapshot.mentors.len(),
        recommender.name()
    );

    let recommendation = recommender.recommend(learner, &snapshot.mentors).await;
    if let Recommendation::Failed { cause } = &recommendation {
        println!("Recommendation failed: {}", cause);
        return Ok(());
    }

    let matches = recommendation.into_matches_or_empty();
    if matches.is_empty() {
        println!("No matches.");
    }
    for (rank, m) in matches.iter().enumerate() {
        let name = snapshot
            .mentor(&m.mentor_id)
            .map(|mentor| mentor.name.as_str())
            .unwrap_or("(unknown mentor)");
        println!();
        println!(
            "{}. {} [{}]  score {:.0}",
            rank + 1,
            name,
            m.mentor_id,
            m.score
        );
        println!("   {}", m.reason);
    }

    Ok(())
}
