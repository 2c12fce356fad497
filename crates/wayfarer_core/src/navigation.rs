//! Turns sensing, the field and a planned route into one movement decision.
//!
//! Each decision reads the world and the field but writes neither. Deposits
//! come back as requests on the decision, so many agents can be decided in
//! parallel and their deposits flushed afterwards.

use crate::brain::{
    GenomeLogic, BRAIN_INPUTS, BRAIN_OUTPUTS, DISASTER_INPUT_OFFSET, ECOSYSTEM_INPUT_OFFSET,
    FIELD_INPUT_OFFSET, ROUTE_INPUT_OFFSET, SEASON_INPUT_OFFSET, TERRITORY_INPUT_OFFSET,
    WEATHER_INPUT_OFFSET,
};
use crate::config::NavigationConfig;
use crate::error::{NavError, Result};
use crate::pathfinding::{PathResult, VoxelPathfinder};
use crate::pheromone::{PheromoneDeposit, PheromoneField, SignalCategory};
use crate::voxel::VoxelWorld;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use wayfarer_data::{CellCoord, Direction, Genome, SpeciesProfile};

/// Scalar vectors handed over by the environment managers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentInputs {
    pub season: [f32; 4],
    pub weather: [f32; 3],
    pub disaster: [f32; 2],
    pub ecosystem: [f32; 3],
    pub territory: [f32; 2],
}

/// What the navigator needs to know about one agent.
#[derive(Debug, Clone, Copy)]
pub struct AgentView<'a> {
    pub position: CellCoord,
    pub energy: f64,
    pub max_energy: f64,
    pub sensitivity: f64,
    pub species: &'a SpeciesProfile,
    pub genome: &'a Genome,
    /// Cell the agent is heading for, if any.
    pub goal: Option<CellCoord>,
}

/// Fixed-width neural input vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensoryInput(pub [f32; BRAIN_INPUTS]);

impl SensoryInput {
    pub fn assemble(
        agent: &AgentView<'_>,
        field: &PheromoneField,
        route: Option<&PathResult>,
        env: &EnvironmentInputs,
        config: &NavigationConfig,
    ) -> Self {
        let mut v = [0.0f32; BRAIN_INPUTS];
        let (fx, fy) = field_position(agent.position, config.voxel_size);

        v[0] = energy_ratio(agent) as f32;
        if let Some((nx, ny)) = field.bounds().normalize(fx, fy) {
            v[1] = (nx * 2.0 - 1.0) as f32;
            v[2] = (ny * 2.0 - 1.0) as f32;
        }
        v[3] = (agent.position.z as f64 / config.vertical_normalization).clamp(0.0, 1.0) as f32;
        v[4] = agent.sensitivity.clamp(0.0, 1.0) as f32;

        let gradients = [
            SignalCategory::Danger,
            SignalCategory::FoodFound,
            SignalCategory::Success,
        ];
        for (i, category) in gradients.into_iter().enumerate() {
            let (gx, gy) = field.gradient_at(fx, fy, category).unwrap_or((0.0, 0.0));
            v[FIELD_INPUT_OFFSET + 2 * i] = gx as f32;
            v[FIELD_INPUT_OFFSET + 2 * i + 1] = gy as f32;
        }
        let max = field.config().max_intensity;
        v[FIELD_INPUT_OFFSET + 6] = level(field, fx, fy, SignalCategory::Danger, max);
        v[FIELD_INPUT_OFFSET + 7] = level(field, fx, fy, SignalCategory::Distress, max);

        if let Some(step) = route.and_then(PathResult::first_step) {
            let (dx, dy, dz) = step.delta();
            v[ROUTE_INPUT_OFFSET] = dx as f32;
            v[ROUTE_INPUT_OFFSET + 1] = dy as f32;
            v[ROUTE_INPUT_OFFSET + 2] = dz as f32;
        }
        if route.is_some() {
            v[ROUTE_INPUT_OFFSET + 3] = 1.0;
        }

        v[SEASON_INPUT_OFFSET..SEASON_INPUT_OFFSET + 4].copy_from_slice(&env.season);
        v[WEATHER_INPUT_OFFSET..WEATHER_INPUT_OFFSET + 3].copy_from_slice(&env.weather);
        v[DISASTER_INPUT_OFFSET..DISASTER_INPUT_OFFSET + 2].copy_from_slice(&env.disaster);
        v[ECOSYSTEM_INPUT_OFFSET..ECOSYSTEM_INPUT_OFFSET + 3].copy_from_slice(&env.ecosystem);
        v[TERRITORY_INPUT_OFFSET..TERRITORY_INPUT_OFFSET + 2].copy_from_slice(&env.territory);

        Self(v)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn danger_level(&self) -> f32 {
        self.0[FIELD_INPUT_OFFSET + 6]
    }
}

/// Controller outputs with their slots named.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotorOutput {
    pub move_x: f32,
    pub move_y: f32,
    pub move_z: f32,
    pub speed: f32,
    pub aggression: f32,
    pub follow_trail: f32,
    pub avoid_danger: f32,
    pub emit: f32,
}

impl MotorOutput {
    pub fn from_slice(outputs: &[f32]) -> Result<Self> {
        if outputs.len() != BRAIN_OUTPUTS {
            return Err(NavError::OutputMismatch {
                expected: BRAIN_OUTPUTS,
                actual: outputs.len(),
            });
        }
        Ok(Self {
            move_x: outputs[0],
            move_y: outputs[1],
            move_z: outputs[2],
            speed: outputs[3],
            aggression: outputs[4],
            follow_trail: outputs[5],
            avoid_danger: outputs[6],
            emit: outputs[7],
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveCommand {
    Step {
        direction: Direction,
        target: CellCoord,
    },
    Hold,
    /// No legal move exists; recovery is up to the caller.
    Stuck,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationDecision {
    pub command: MoveCommand,
    /// `[0, 1]`.
    pub speed: f32,
    /// `[0, 1]`.
    pub aggression: f32,
    pub deposit: Option<PheromoneDeposit>,
    pub route_found: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Navigator {
    pathfinder: VoxelPathfinder,
    config: NavigationConfig,
}

impl Navigator {
    pub fn new(pathfinder: VoxelPathfinder, config: NavigationConfig) -> Self {
        Self { pathfinder, config }
    }

    pub fn pathfinder(&self) -> &VoxelPathfinder {
        &self.pathfinder
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Decides one agent's next move.
    ///
    /// Fails only when the agent's genome does not fit the sensory or motor
    /// vector widths.
    pub fn decide<W>(
        &self,
        world: &W,
        field: &PheromoneField,
        agent: &AgentView<'_>,
        env: &EnvironmentInputs,
    ) -> Result<NavigationDecision>
    where
        W: VoxelWorld + ?Sized,
    {
        let route = agent.goal.and_then(|goal| {
            self.pathfinder.find_path(
                world,
                agent.position,
                goal,
                agent.species,
                agent.genome,
                self.pathfinder.config().max_distance,
            )
        });

        let input = SensoryInput::assemble(agent, field, route.as_ref(), env, &self.config);
        let outputs = agent.genome.predict(input.as_slice())?;
        let motor = MotorOutput::from_slice(&outputs)?;

        let desired = self.desired_vector(field, agent, &motor, route.as_ref());
        let moves = self
            .pathfinder
            .valid_moves(world, agent.position, agent.species, agent.genome);

        let command = if moves.is_empty() {
            MoveCommand::Stuck
        } else if norm(desired) < self.config.hold_threshold {
            MoveCommand::Hold
        } else {
            let mut best: Option<(f64, Direction, CellCoord)> = None;
            for (&direction, &target) in &moves {
                let score = dot(desired, direction.delta());
                if best.map_or(true, |(s, _, _)| score > s) {
                    best = Some((score, direction, target));
                }
            }
            match best {
                Some((score, direction, target)) if score > 0.0 => {
                    MoveCommand::Step { direction, target }
                }
                _ => MoveCommand::Hold,
            }
        };

        let on_resource = world
            .cell_at(agent.position)
            .is_some_and(|voxel| voxel.resource);
        let deposit = self.deposit_for(agent, &input, &motor, route.is_some(), on_resource);

        Ok(NavigationDecision {
            command,
            speed: unit(motor.speed),
            aggression: unit(motor.aggression),
            deposit,
            route_found: route.is_some(),
        })
    }

    /// [`decide`](Self::decide) for many agents at once, in parallel. Results
    /// keep the order of `agents`.
    pub fn decide_all<W>(
        &self,
        world: &W,
        field: &PheromoneField,
        agents: &[AgentView<'_>],
        env: &EnvironmentInputs,
    ) -> Vec<Result<NavigationDecision>>
    where
        W: VoxelWorld + Sync + ?Sized,
    {
        agents
            .par_iter()
            .map(|agent| self.decide(world, field, agent, env))
            .collect()
    }

    fn desired_vector(
        &self,
        field: &PheromoneField,
        agent: &AgentView<'_>,
        motor: &MotorOutput,
        route: Option<&PathResult>,
    ) -> [f64; 3] {
        let c = &self.config;
        let (fx, fy) = field_position(agent.position, c.voxel_size);
        let mut d = [
            motor.move_x as f64 * c.neural_weight,
            motor.move_y as f64 * c.neural_weight,
            motor.move_z as f64 * c.neural_weight,
        ];

        let trail = field
            .gradient_at(fx, fy, SignalCategory::Success)
            .or_else(|| field.gradient_at(fx, fy, SignalCategory::FoodFound));
        if let Some((gx, gy)) = trail {
            let w = c.trail_weight * unit(motor.follow_trail) as f64;
            d[0] += gx * w;
            d[1] += gy * w;
        }

        if let Some((gx, gy)) = field.gradient_at(fx, fy, SignalCategory::Danger) {
            let w = c.danger_weight * unit(motor.avoid_danger) as f64 * agent.sensitivity;
            d[0] -= gx * w;
            d[1] -= gy * w;
        }

        if let Some(step) = route.and_then(PathResult::first_step) {
            let (dx, dy, dz) = step.delta();
            d[0] += dx as f64 * c.path_weight;
            d[1] += dy as f64 * c.path_weight;
            d[2] += dz as f64 * c.path_weight;
        }
        d
    }

    fn deposit_for(
        &self,
        agent: &AgentView<'_>,
        input: &SensoryInput,
        motor: &MotorOutput,
        route_found: bool,
        on_resource: bool,
    ) -> Option<PheromoneDeposit> {
        let c = &self.config;
        if motor.emit <= c.emit_threshold {
            return None;
        }
        let category = if input.danger_level() as f64 > c.danger_alarm {
            SignalCategory::Danger
        } else if energy_ratio(agent) < c.distress_energy_ratio {
            SignalCategory::Distress
        } else if on_resource {
            SignalCategory::FoodFound
        } else if route_found {
            SignalCategory::Success
        } else {
            SignalCategory::Territory
        };
        let (x, y) = field_position(agent.position, c.voxel_size);
        Some(PheromoneDeposit {
            x,
            y,
            category,
            strength: c.deposit_strength * (0.5 + 0.5 * motor.emit as f64),
        })
    }
}

/// Field-plane position of a voxel's centre.
pub fn field_position(cell: CellCoord, voxel_size: f64) -> (f64, f64) {
    (
        (cell.x as f64 + 0.5) * voxel_size,
        (cell.y as f64 + 0.5) * voxel_size,
    )
}

fn energy_ratio(agent: &AgentView<'_>) -> f64 {
    if agent.max_energy > 0.0 {
        (agent.energy / agent.max_energy).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn level(field: &PheromoneField, x: f64, y: f64, category: SignalCategory, max: f64) -> f32 {
    (field.intensity_at(x, y, category) / max).clamp(0.0, 1.0) as f32
}

/// Maps a tanh output from `[-1, 1]` to `[0, 1]`.
#[inline]
fn unit(v: f32) -> f32 {
    ((v + 1.0) * 0.5).clamp(0.0, 1.0)
}

#[inline]
fn dot(a: [f64; 3], (x, y, z): (i32, i32, i32)) -> f64 {
    a[0] * x as f64 + a[1] * y as f64 + a[2] * z as f64
}

#[inline]
fn norm(a: [f64; 3]) -> f64 {
    (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt()
}
