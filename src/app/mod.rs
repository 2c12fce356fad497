pub mod agent;
pub mod state;

pub use agent::Agent;
pub use state::App;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use wayfarer_core::brain::GenomeLogic;
use wayfarer_core::metrics::counters;
use wayfarer_core::pheromone::DepositKind;
use wayfarer_core::{Adaptation, AgentView, EnvironmentInputs, MoveCommand};
use wayfarer_data::{Material, Voxel, VoxelLayer};

use agent::{nearest, random_standing_cell};

/// Ticks per season in the headless run.
const SEASON_TICKS: u64 = 250;

/// What one tick (or a whole run, summed) did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    pub ticks: u64,
    pub moved: usize,
    pub held: usize,
    pub stuck: usize,
    pub deposits: usize,
    pub highways: usize,
    pub consumed: usize,
    pub replaced: usize,
}

impl TickSummary {
    pub fn merge(&mut self, other: &TickSummary) {
        self.ticks += other.ticks;
        self.moved += other.moved;
        self.held += other.held;
        self.stuck += other.stuck;
        self.deposits += other.deposits;
        self.highways += other.highways;
        self.consumed += other.consumed;
        self.replaced += other.replaced;
    }
}

impl App {
    /// Advances the simulation by one tick.
    ///
    /// Agents are decided in parallel against a frozen world and field; moves,
    /// energy and deposits are then applied in agent order.
    pub fn step(&mut self) -> TickSummary {
        let started = Instant::now();
        self.tick += 1;
        self.time += self.config.world.tick_seconds;
        self.env = environment_for(self.tick);

        let resources = self.world.resource_cells();
        for agent in &mut self.agents {
            let stale = agent
                .goal
                .map_or(true, |g| g == agent.position || !resources.contains(&g));
            if stale {
                agent.goal = nearest(agent.position, &resources);
            }
        }

        let decisions = {
            let views: Vec<AgentView<'_>> =
                self.agents.iter().map(|a| a.view(&self.roster)).collect();
            self.navigator
                .decide_all(&self.world, &self.field, &views, &self.env)
        };

        let mut summary = TickSummary {
            ticks: 1,
            ..Default::default()
        };
        let move_cost = self.config.world.move_energy_cost;
        let resource_energy = self.config.world.resource_energy;

        for (agent, decision) in self.agents.iter_mut().zip(decisions) {
            agent.age += 1;
            let decision = match decision {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!(agent = %agent.id, error = %e, "Navigation failed, retiring agent");
                    agent.energy = 0.0;
                    continue;
                }
            };

            if agent.goal.is_some() {
                let name = if decision.route_found {
                    counters::PATH_FOUND
                } else {
                    counters::PATH_MISSING
                };
                self.metrics.increment_counter(name);
            }

            match decision.command {
                MoveCommand::Step { target, .. } => {
                    agent.position = target;
                    agent.energy -= move_cost * (0.5 + f64::from(decision.speed));
                    summary.moved += 1;
                }
                MoveCommand::Hold => summary.held += 1,
                MoveCommand::Stuck => {
                    summary.stuck += 1;
                    self.metrics.increment_counter(counters::AGENT_STUCK);
                }
            }

            if let Some(deposit) = decision.deposit {
                self.deposits.push(deposit);
            }

            if self.world.consume_resource(agent.position) {
                agent.energy = (agent.energy + resource_energy).min(agent.max_energy);
                agent.goal = None;
                summary.consumed += 1;
            }

            agent.energy -= self.energy_model.cost(&agent.genome, agent.efficiency);
            let (genome, adaptation) = self.energy_model.adapt(
                &agent.genome,
                agent.energy,
                agent.efficiency,
                &mut self.rng,
            );
            match adaptation {
                Adaptation::Pruned => self.metrics.increment_counter(counters::GENOME_PRUNED),
                Adaptation::Grown => self.metrics.increment_counter(counters::GENOME_GROWN),
                Adaptation::Unchanged => {}
            }
            agent.genome = genome;
        }

        summary.replaced = self.replace_exhausted();

        let events = self.deposits.flush_events(&mut self.field);
        summary.deposits = events.len();
        summary.highways = events
            .iter()
            .filter(|e| e.kind == DepositKind::Highway)
            .count();
        if summary.highways > 0 {
            self.metrics
                .add_to_counter(counters::HIGHWAY, summary.highways as u64);
        }
        self.field.update(self.time);
        self.regrow_resources(resources.len());

        self.metrics
            .record_tick(started.elapsed(), self.agents.len(), summary.deposits);
        summary
    }

    /// Runs `ticks` steps and returns their summed summary.
    pub fn run(&mut self, ticks: u64) -> TickSummary {
        let mut total = TickSummary::default();
        for _ in 0..ticks {
            let summary = self.step();
            total.merge(&summary);
        }
        tracing::info!(
            ticks = total.ticks,
            moved = total.moved,
            stuck = total.stuck,
            deposits = total.deposits,
            replaced = total.replaced,
            mean_energy = self.mean_energy(),
            "Run finished"
        );
        total
    }

    /// Replaces every exhausted agent with the mutated offspring of two
    /// survivors from the better-fed half. Returns how many were replaced.
    fn replace_exhausted(&mut self) -> usize {
        let mut survivors: Vec<usize> = (0..self.agents.len())
            .filter(|&i| self.agents[i].is_alive())
            .collect();
        let exhausted: Vec<usize> = (0..self.agents.len())
            .filter(|&i| !self.agents[i].is_alive())
            .collect();
        if exhausted.is_empty() {
            return 0;
        }
        survivors.sort_by(|&a, &b| {
            self.agents[b]
                .energy
                .total_cmp(&self.agents[a].energy)
                .then(a.cmp(&b))
        });
        let elite = &survivors[..survivors.len().div_ceil(2)];

        for &slot in &exhausted {
            let Some(position) = random_standing_cell(&self.world, &mut self.rng) else {
                continue;
            };
            let child = match (elite.choose(&mut self.rng), elite.choose(&mut self.rng)) {
                (Some(&a), Some(&b)) => {
                    let (pa, pb) = (&self.agents[a], &self.agents[b]);
                    let genome = pa
                        .genome
                        .crossover_with_rng(&pb.genome, &mut self.rng)
                        .mutated_with_config(&self.config, &mut self.rng);
                    let mut child = Agent::new_random(
                        pa.species,
                        position,
                        pa.max_energy,
                        &self.config.brain,
                        &mut self.rng,
                    );
                    child.sensitivity = (pa.sensitivity + pb.sensitivity) / 2.0;
                    child.efficiency = (pa.efficiency + pb.efficiency) / 2.0;
                    child.generation = pa.generation.max(pb.generation) + 1;
                    child.genome = genome;
                    child
                }
                _ => Agent::new_random(
                    self.agents[slot].species,
                    position,
                    self.agents[slot].max_energy,
                    &self.config.brain,
                    &mut self.rng,
                ),
            };
            tracing::debug!(
                replaced = %self.agents[slot].id,
                child = %child.id,
                generation = child.generation,
                "Agent replaced"
            );
            self.agents[slot] = child;
            self.metrics.increment_counter(counters::AGENT_REPLACED);
        }
        exhausted.len()
    }

    /// Tops resources back up to half the starting amount, one per tick.
    fn regrow_resources(&mut self, available: usize) {
        if available * 2 >= self.initial_resources {
            return;
        }
        if let Some(cell) = random_standing_cell(&self.world, &mut self.rng) {
            self.world.set(
                cell,
                Voxel::new(Material::Air, VoxelLayer::Surface).with_resource(),
            );
        }
    }
}

/// One-hot season cycling every [`SEASON_TICKS`]; other channels stay calm.
pub fn environment_for(tick: u64) -> EnvironmentInputs {
    let mut env = EnvironmentInputs::default();
    let season = ((tick / SEASON_TICKS) % 4) as usize;
    env.season[season] = 1.0;
    env.ecosystem = [0.5, 0.5, 0.5];
    env
}
