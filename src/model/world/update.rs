use crate::model::environment::Environment;
use crate::model::history::PopulationFrame;
use crate::model::world::World;
use capsim_core::systems::action::{self, ActionContext};
use capsim_core::systems::contact::{self, ContactContext};
use capsim_core::systems::growth::{self, GrowthContext};
use capsim_core::systems::removal;
use capsim_core::systems::stats::{self, StatsContext};
use capsim_data::LiveEvent;
use chrono::Utc;
use rand::SeedableRng;
use std::time::{Duration, Instant};

/// Wall time spent in each phase of one tick.
#[derive(Debug, Default, Clone, Copy)]
struct PhaseTimings {
    action: Duration,
    growth: Duration,
    relax: Duration,
    removal: Duration,
}

impl World {
    /// Advances the simulation by one tick.
    ///
    /// Phases run in a fixed order:
    /// - lifetimes, asymmetry and species behaviors
    /// - contact rules, then field diffusion and decay
    /// - growth and division (newborns join after the pass)
    /// - relaxation of all positions
    /// - removal of out-of-box and non-viable cells
    ///
    /// # Returns
    /// Vector of live events (divisions, removals, contacts, convergence
    /// failures, periodic snapshots) that occurred this tick
    ///
    /// # Errors
    /// A division that cannot produce two viable daughters fails the tick
    /// after the growth pass; every other split of that pass is kept and
    /// registered. A non-finite position fails the tick during relaxation.
    pub fn update(&mut self, env: &mut Environment) -> anyhow::Result<Vec<LiveEvent>> {
        let tick_start = Instant::now();
        self.tick += 1;
        let tick = self.tick;
        let dt = self.config.world.dt;
        let timestamp = Utc::now().to_rfc3339();
        let mut events = Vec::new();
        let mut timings = PhaseTimings::default();

        if self.config.world.deterministic {
            let seed = self.seed.wrapping_add(tick).wrapping_add(0x5EED);
            self.rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
        }

        let phase = Instant::now();
        action::action_system(
            &mut self.bacteria,
            ActionContext {
                config: &self.config,
                env: &mut *env,
                dt,
            },
        );
        if !self.config.contact_rules.is_empty() {
            self.mover.rebuild_grid(&self.bacteria);
            let contacts = contact::contact_system(
                &mut self.bacteria,
                ContactContext {
                    config: &self.config,
                    grid: &self.mover.grid,
                    rng: &mut self.rng,
                    metrics: &self.metrics,
                },
            );
            events.extend(contacts.into_iter().map(|c| LiveEvent::Contact {
                victim: c.victim,
                attacker: c.attacker,
                tick,
                timestamp: timestamp.clone(),
            }));
        }
        env.update_fields(dt);
        timings.action = phase.elapsed();

        let phase = Instant::now();
        let mut divisions = 0;
        if self.config.world.with_growth {
            let outcome = growth::growth_system(
                &mut self.bacteria,
                GrowthContext {
                    config: &self.config,
                    rng: &mut self.rng,
                    next_id: &mut self.next_id,
                    world_seed: self.seed,
                    metrics: &self.metrics,
                },
            );
            let records = outcome.divisions;
            divisions = records.len();
            let first_newborn = self.bacteria.len() - divisions;
            for newborn in &self.bacteria[first_newborn..] {
                self.lineage_registry
                    .record_birth(&newborn.lineage, newborn.species, tick);
            }
            events.extend(records.into_iter().map(|r| LiveEvent::Division {
                mother: r.mother,
                child: r.child,
                species: r.species,
                mother_length: r.mother_length,
                child_length: r.child_length,
                angle: r.angle,
                tick,
                timestamp: timestamp.clone(),
            }));
            if let Some(err) = outcome.failure {
                return Err(err.into());
            }
        }
        timings.growth = phase.elapsed();

        let phase = Instant::now();
        let report = self
            .mover
            .relax(&mut self.bacteria, env, &self.config, &self.metrics)?;
        if !report.converged {
            events.push(LiveEvent::ConvergenceFailure {
                iterations: report.iterations,
                residual_force: report.residual_force,
                tick,
                timestamp: timestamp.clone(),
            });
        }
        timings.relax = phase.elapsed();

        let phase = Instant::now();
        let removed = removal::removal_system(
            &mut self.bacteria,
            env,
            self.config.cell.min_viable_length,
            &self.metrics,
        );
        for r in &removed {
            self.lineage_registry.record_removal(r.id, r.cause, tick);
            events.push(LiveEvent::Removal {
                id: r.id,
                cause: r.cause,
                lifetime: r.lifetime,
                tick,
                timestamp: timestamp.clone(),
            });
        }
        timings.removal = phase.elapsed();

        stats::update_population_stats(StatsContext {
            stats: &mut self.pop_stats,
            bacteria: &self.bacteria,
            divisions,
            removals: removed.len(),
            report: &report,
        });
        self.last_report = report;

        let export_interval = self.config.world.export_interval;
        if export_interval > 0 && tick % export_interval == 0 {
            events.push(LiveEvent::Snapshot {
                tick,
                stats: self.pop_stats.clone(),
                timestamp,
            });
            let frame = PopulationFrame {
                tick,
                time: self.time(),
                bacteria: self.snapshot(),
            };
            self.logger.log_frame(&frame)?;
        }
        for event in &events {
            self.logger.log_event(event)?;
        }

        let log_interval = self.config.world.log_interval;
        if log_interval > 0 && tick % log_interval == 0 {
            tracing::debug!(
                tick = tick,
                action_us = timings.action.as_micros() as u64,
                growth_us = timings.growth.as_micros() as u64,
                relax_us = timings.relax.as_micros() as u64,
                removal_us = timings.removal.as_micros() as u64,
                iterations = report.iterations,
                "Phase timings"
            );
        }
        self.metrics
            .record_tick(tick_start.elapsed(), self.bacteria.len(), log_interval);

        Ok(events)
    }

    /// Runs `ticks` updates, stopping early once the population is gone.
    pub fn run(&mut self, env: &mut Environment, ticks: u64) -> anyhow::Result<()> {
        for _ in 0..ticks {
            self.update(env)?;
            if self.bacteria.is_empty() {
                tracing::info!(tick = self.tick, "Population extinct, stopping");
                break;
            }
        }
        Ok(())
    }
}
