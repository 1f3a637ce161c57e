use crate::bacterium::Bacterium;
use crate::mover::RelaxationReport;
use capsim_data::PopulationStats;

pub struct StatsContext<'a> {
    pub stats: &'a mut PopulationStats,
    pub bacteria: &'a [Bacterium],
    pub divisions: usize,
    pub removals: usize,
    pub report: &'a RelaxationReport,
}

pub fn update_population_stats(ctx: StatsContext) {
    ctx.stats.population = ctx.bacteria.len();
    ctx.stats.divisions_total += ctx.divisions as u64;
    ctx.stats.removals_total += ctx.removals as u64;
    ctx.stats.last_relaxation_iterations = ctx.report.iterations;
    ctx.stats.last_residual_force = ctx.report.residual_force;
    ctx.stats.species_counts.clear();

    if ctx.bacteria.is_empty() {
        ctx.stats.mean_length = 0.0;
        ctx.stats.max_generation = 0;
        return;
    }

    let mut total_length = 0.0;
    let mut max_generation = 0;
    for b in ctx.bacteria {
        *ctx.stats.species_counts.entry(b.species.0).or_insert(0) += 1;
        total_length += b.length;
        max_generation = max_generation.max(b.lineage.generation);
    }
    ctx.stats.mean_length = total_length / ctx.bacteria.len() as f64;
    ctx.stats.max_generation = max_generation;
}
