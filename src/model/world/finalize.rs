use crate::model::world::World;
use capsim_core::metrics;

impl World {
    /// Closes a run: archives the lineage registry and division tree and
    /// flushes the event logs.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        self.logger.archive_lineage(&self.lineage_registry)?;
        self.logger.flush()?;

        let largest_clone = self
            .lineage_registry
            .clone_sizes()
            .first()
            .map_or(0, |&(_, size)| size);
        tracing::info!(
            tick = self.tick,
            population = self.bacteria.len(),
            divisions = self.metrics.counter(metrics::DIVISIONS),
            removed_out_of_bounds = self.metrics.counter(metrics::REMOVALS_OUT_OF_BOUNDS),
            removed_non_viable = self.metrics.counter(metrics::REMOVALS_NON_VIABLE),
            non_converged = self.metrics.counter(metrics::RELAXATION_NON_CONVERGED),
            largest_clone = largest_clone,
            elapsed_ms = self.metrics.elapsed().as_millis() as u64,
            "Run finished"
        );
        Ok(())
    }
}
