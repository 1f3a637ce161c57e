use crate::bacterium::Bacterium;
use crate::environment::Environment;
use crate::metrics::{self, Metrics};
use capsim_data::{BacteriumId, RemovalCause};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemovalRecord {
    pub id: BacteriumId,
    pub cause: RemovalCause,
    pub lifetime: u64,
}

/// Why `b` has to leave the population, if it does.
#[must_use]
pub fn removal_cause(b: &Bacterium, env: &Environment, min_viable_length: f64) -> Option<RemovalCause> {
    if !env.contains(b.position()) {
        Some(RemovalCause::OutOfBounds)
    } else if b.length < min_viable_length {
        Some(RemovalCause::NonViable)
    } else {
        None
    }
}

/// Drops bacteria whose midpoint left the box or whose length fell below
/// `min_viable_length`.
///
/// The dead set is collected over the whole population and removed in one go.
pub fn removal_system(
    bacteria: &mut Vec<Bacterium>,
    env: &Environment,
    min_viable_length: f64,
    metrics: &Metrics,
) -> Vec<RemovalRecord> {
    let dead: Vec<RemovalRecord> = bacteria
        .iter()
        .filter_map(|b| {
            removal_cause(b, env, min_viable_length).map(|cause| RemovalRecord {
                id: b.id(),
                cause,
                lifetime: b.lifetime,
            })
        })
        .collect();
    if dead.is_empty() {
        return dead;
    }

    let ids: HashSet<BacteriumId> = dead.iter().map(|r| r.id).collect();
    bacteria.retain(|b| !ids.contains(&b.id()));

    for record in &dead {
        let counter = match record.cause {
            RemovalCause::OutOfBounds => metrics::REMOVALS_OUT_OF_BOUNDS,
            RemovalCause::NonViable => metrics::REMOVALS_NON_VIABLE,
        };
        metrics.increment_counter(counter);
        tracing::debug!(id = %record.id, cause = ?record.cause, "Bacterium removed");
    }
    dead
}
