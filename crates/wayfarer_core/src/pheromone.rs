//! Pheromone field for stigmergic communication.
//!
//! A dense `resolution × resolution` grid with one channel per
//! [`SignalCategory`]. Agents deposit into it, the field diffuses and decays
//! on a throttled tick, and gradients steer movement. Every spatial call is
//! bounds-checked and degrades to a no-op or a default value: the field is
//! advisory and never stops the simulation.
//!
//! The field has a single writer. Agents evaluated in parallel hand back
//! [`PheromoneDeposit`] requests which are flushed through
//! [`PheromoneField::apply_deposits`] once per tick.

use crate::config::FieldConfig;
use crate::noise::smooth_noise;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub use wayfarer_data::SignalCategory;

const DEPOSIT_NOISE_SCALE: f64 = 16.0;
const DIFFUSION_NOISE_SCALE: f64 = 0.25;
const DIFFUSION_NOISE_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

const NEIGHBORS_8: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Behaviour attached to each signal category.
pub trait SignalLogic {
    /// Importance multiplier applied to every deposit of this category.
    fn weight(&self) -> f64;
    /// Whether reinforced deposits of this category turn into highways.
    fn forms_highways(&self) -> bool;
}

impl SignalLogic for SignalCategory {
    fn weight(&self) -> f64 {
        match self {
            SignalCategory::Distress => 3.0,
            SignalCategory::Danger => 2.5,
            SignalCategory::FoodFound => 1.5,
            SignalCategory::Success => 1.2,
            SignalCategory::Mating => 1.0,
            SignalCategory::Territory => 0.4,
        }
    }

    fn forms_highways(&self) -> bool {
        matches!(self, SignalCategory::Success)
    }
}

/// Axis-aligned world rectangle covered by the field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl WorldBounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// `[0, width] × [0, depth]`.
    pub fn from_size(width: f64, depth: f64) -> Self {
        Self::new(0.0, 0.0, width, depth)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn depth(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Position mapped into `[0, 1]²`, or `None` outside the rectangle.
    pub fn normalize(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let nx = (x - self.min_x) / self.width();
        let ny = (y - self.min_y) / self.depth();
        if (0.0..=1.0).contains(&nx) && (0.0..=1.0).contains(&ny) {
            Some((nx, ny))
        } else {
            None
        }
    }
}

/// A request to deposit a signal at a world position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PheromoneDeposit {
    pub x: f64,
    pub y: f64,
    pub category: SignalCategory,
    pub strength: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepositKind {
    Normal,
    Highway,
}

/// Log entry for an applied deposit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepositEvent {
    pub category: SignalCategory,
    pub cell: (usize, usize),
    /// Strength after category weighting and noise.
    pub strength: f64,
    pub time: f64,
    pub kind: DepositKind,
}

/// Deposits collected during a parallel agent pass, applied in order later.
#[derive(Debug, Clone, Default)]
pub struct DepositBuffer {
    pending: Vec<PheromoneDeposit>,
}

impl DepositBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, deposit: PheromoneDeposit) {
        self.pending.push(deposit);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Applies and empties the buffer. Returns how many deposits landed.
    pub fn flush_into(&mut self, field: &mut PheromoneField) -> usize {
        field.apply_deposits(self.pending.drain(..))
    }

    /// Like [`flush_into`](Self::flush_into), keeping the event of every
    /// deposit that landed.
    pub fn flush_events(&mut self, field: &mut PheromoneField) -> Vec<DepositEvent> {
        self.pending
            .drain(..)
            .filter_map(|d| field.add_signal(d.category, d.x, d.y, d.strength))
            .collect()
    }
}

impl Extend<PheromoneDeposit> for DepositBuffer {
    fn extend<T: IntoIterator<Item = PheromoneDeposit>>(&mut self, iter: T) {
        self.pending.extend(iter);
    }
}

/// Multi-channel diffusion field.
#[derive(Debug, Clone)]
pub struct PheromoneField {
    /// `[x][y][category]`, flattened.
    cells: Vec<f64>,
    back_buffer: Vec<f64>,
    /// `|noise|` per cell, fixed for the lifetime of the field.
    diffusion_noise: Vec<f64>,
    resolution: usize,
    bounds: WorldBounds,
    config: FieldConfig,
    seed: u64,
    log: VecDeque<DepositEvent>,
    now: f64,
    last_update: Option<f64>,
}

impl PheromoneField {
    pub fn new(bounds: WorldBounds, resolution: usize, config: FieldConfig, seed: u64) -> Self {
        let resolution = resolution.max(1);
        let len = resolution * resolution * SignalCategory::COUNT;
        let mut diffusion_noise = Vec::with_capacity(resolution * resolution);
        for x in 0..resolution {
            for y in 0..resolution {
                let n = smooth_noise(
                    x as f64 * DIFFUSION_NOISE_SCALE,
                    y as f64 * DIFFUSION_NOISE_SCALE,
                    seed ^ DIFFUSION_NOISE_SALT,
                );
                diffusion_noise.push(n.abs());
            }
        }
        Self {
            cells: vec![0.0; len],
            back_buffer: vec![0.0; len],
            diffusion_noise,
            resolution,
            bounds,
            config,
            seed,
            log: VecDeque::new(),
            now: 0.0,
            last_update: None,
        }
    }

    pub fn with_defaults(bounds: WorldBounds, resolution: usize) -> Self {
        Self::new(bounds, resolution, FieldConfig::default(), 0)
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize, category: SignalCategory) -> usize {
        (x * self.resolution + y) * SignalCategory::COUNT + category.index()
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Latest simulated time seen by [`update`](Self::update).
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Grid cell for a world position; the far edge clamps into the last cell.
    pub fn cell_for(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let (nx, ny) = self.bounds.normalize(x, y)?;
        let r = self.resolution;
        let cx = ((nx * r as f64) as usize).min(r - 1);
        let cy = ((ny * r as f64) as usize).min(r - 1);
        Some((cx, cy))
    }

    /// Raw cell value; 0 outside the grid.
    pub fn cell_value(&self, cx: usize, cy: usize, category: SignalCategory) -> f64 {
        if cx >= self.resolution || cy >= self.resolution {
            return 0.0;
        }
        self.cells[self.index(cx, cy, category)]
    }

    /// Overwrites one cell, respecting the cap and the cleanup threshold.
    pub fn set_cell(&mut self, cx: usize, cy: usize, category: SignalCategory, value: f64) {
        if cx >= self.resolution || cy >= self.resolution || !value.is_finite() {
            return;
        }
        let idx = self.index(cx, cy, category);
        self.cells[idx] = self.sanitize(value);
    }

    #[inline]
    fn sanitize(&self, value: f64) -> f64 {
        let v = value.clamp(0.0, self.config.max_intensity);
        if v < self.config.cleanup_threshold {
            0.0
        } else {
            v
        }
    }

    /// Deposits a signal around a world position.
    ///
    /// Returns the logged event, or `None` when nothing was deposited
    /// (position off the grid, or a non-positive strength).
    pub fn add_signal(
        &mut self,
        category: SignalCategory,
        x: f64,
        y: f64,
        base_strength: f64,
    ) -> Option<DepositEvent> {
        if !(base_strength.is_finite() && base_strength > 0.0) {
            return None;
        }
        let (nx, ny) = self.bounds.normalize(x, y)?;
        let (cx, cy) = self.cell_for(x, y)?;

        let noise = smooth_noise(
            nx * DEPOSIT_NOISE_SCALE,
            ny * DEPOSIT_NOISE_SCALE,
            self.seed,
        );
        let perturbation = 1.0 + self.config.noise_amplitude * (2.0 * noise - 1.0);
        let effective = base_strength * category.weight() * perturbation;

        let current = self.cells[self.index(cx, cy, category)];
        let kind = if category.forms_highways() && current > self.config.highway_threshold {
            self.spread_highway(cx, cy, category, effective);
            tracing::debug!(cx, cy, current, effective, "Highway reinforced");
            DepositKind::Highway
        } else {
            self.spread_normal(cx, cy, category, effective);
            DepositKind::Normal
        };

        let event = DepositEvent {
            category,
            cell: (cx, cy),
            strength: effective,
            time: self.now,
            kind,
        };
        self.log.push_back(event);
        while self.log.len() > self.config.log_capacity {
            self.log.pop_front();
        }
        Some(event)
    }

    /// Applies buffered deposits in order. Returns how many landed.
    pub fn apply_deposits<I>(&mut self, deposits: I) -> usize
    where
        I: IntoIterator<Item = PheromoneDeposit>,
    {
        deposits
            .into_iter()
            .filter_map(|d| self.add_signal(d.category, d.x, d.y, d.strength))
            .count()
    }

    /// Linear falloff reaching zero at the spread radius.
    fn spread_normal(&mut self, cx: usize, cy: usize, category: SignalCategory, amount: f64) {
        let radius = self.config.spread_radius as f64;
        self.spread(cx, cy, category, self.config.spread_radius, |d| {
            1.0 - d / radius
        }, amount);
    }

    /// Square neighbourhood, half-rate falloff, then a capped boost on the core.
    fn spread_highway(&mut self, cx: usize, cy: usize, category: SignalCategory, amount: f64) {
        let reach = 2.0 * self.config.highway_radius as f64;
        self.spread(cx, cy, category, self.config.highway_radius, |d| {
            1.0 - d / reach
        }, amount);

        let idx = self.index(cx, cy, category);
        let core = self.cells[idx];
        let boost = (core * (self.config.highway_boost - 1.0)).min(self.config.highway_boost_cap);
        self.cells[idx] = (core + boost).min(self.config.max_intensity);
    }

    fn spread<F>(
        &mut self,
        cx: usize,
        cy: usize,
        category: SignalCategory,
        radius: usize,
        falloff: F,
        amount: f64,
    ) where
        F: Fn(f64) -> f64,
    {
        let r = radius as isize;
        let max = self.config.max_intensity;
        for dx in -r..=r {
            for dy in -r..=r {
                let nx = cx as isize + dx;
                let ny = cy as isize + dy;
                if nx < 0 || ny < 0 || nx >= self.resolution as isize || ny >= self.resolution as isize {
                    continue;
                }
                let d = ((dx * dx + dy * dy) as f64).sqrt();
                let f = falloff(d);
                if f <= 0.0 {
                    continue;
                }
                let idx = self.index(nx as usize, ny as usize, category);
                self.cells[idx] = (self.cells[idx] + amount * f).min(max);
            }
        }
    }

    /// Advances the field clock and, at most once per update interval, runs
    /// diffusion, decay and log cleanup. Returns whether a tick ran.
    pub fn update(&mut self, current_time: f64) -> bool {
        self.now = current_time;
        if let Some(last) = self.last_update {
            if current_time - last < self.config.update_interval {
                return false;
            }
        }
        self.last_update = Some(current_time);

        self.diffuse();
        self.decay();
        self.prune_log();
        true
    }

    fn diffuse(&mut self) {
        if self.config.diffusion_rate <= 0.0 {
            return;
        }
        self.back_buffer.copy_from_slice(&self.cells);
        let r = self.resolution as isize;
        for x in 0..self.resolution {
            for y in 0..self.resolution {
                let noise = self.diffusion_noise[x * self.resolution + y];
                for category in SignalCategory::ALL {
                    let src = self.index(x, y, category);
                    let value = self.back_buffer[src];
                    if value <= self.config.diffusion_threshold {
                        continue;
                    }
                    let amount = value * self.config.diffusion_rate * noise;
                    if amount <= 0.0 {
                        continue;
                    }
                    let share = amount / NEIGHBORS_8.len() as f64;
                    self.cells[src] -= amount;
                    for (dx, dy) in NEIGHBORS_8 {
                        let nx = x as isize + dx;
                        let ny = y as isize + dy;
                        // Shares leaving the grid are lost.
                        if nx < 0 || ny < 0 || nx >= r || ny >= r {
                            continue;
                        }
                        let dst = self.index(nx as usize, ny as usize, category);
                        self.cells[dst] += share;
                    }
                }
            }
        }
        let max = self.config.max_intensity;
        for v in &mut self.cells {
            *v = v.clamp(0.0, max);
        }
    }

    fn decay(&mut self) {
        let keep = 1.0 - self.config.decay_rate;
        let threshold = self.config.cleanup_threshold;
        for v in &mut self.cells {
            *v *= keep;
            if *v < threshold {
                *v = 0.0;
            }
        }
    }

    fn prune_log(&mut self) {
        let now = self.now;
        let max_age = self.config.log_max_age;
        self.log.retain(|e| now - e.time <= max_age);
    }

    /// Intensity at a world position; 0 outside the grid.
    pub fn intensity_at(&self, x: f64, y: f64, category: SignalCategory) -> f64 {
        match self.cell_for(x, y) {
            Some((cx, cy)) => self.cells[self.index(cx, cy, category)],
            None => 0.0,
        }
    }

    /// Unit direction of increasing intensity, from central differences over
    /// the 4-neighbourhood (one-sided at the grid edge).
    ///
    /// `None` means "no usable direction", not "stand still".
    pub fn gradient_at(&self, x: f64, y: f64, category: SignalCategory) -> Option<(f64, f64)> {
        let (cx, cy) = self.cell_for(x, y)?;
        let last = self.resolution - 1;

        let (x0, x1) = (cx.saturating_sub(1), (cx + 1).min(last));
        let (y0, y1) = (cy.saturating_sub(1), (cy + 1).min(last));

        let gx = if x1 > x0 {
            (self.cell_value(x1, cy, category) - self.cell_value(x0, cy, category))
                / (x1 - x0) as f64
        } else {
            0.0
        };
        let gy = if y1 > y0 {
            (self.cell_value(cx, y1, category) - self.cell_value(cx, y0, category))
                / (y1 - y0) as f64
        } else {
            0.0
        };

        let floor = self.config.gradient_floor;
        if gx.abs() < floor && gy.abs() < floor {
            return None;
        }
        let len = gx.hypot(gy);
        Some((gx / len, gy / len))
    }

    /// Sum of one channel over the whole grid.
    pub fn total_intensity(&self, category: SignalCategory) -> f64 {
        self.cells
            .iter()
            .skip(category.index())
            .step_by(SignalCategory::COUNT)
            .sum()
    }

    /// Cells whose highway-forming channels exceed `threshold`.
    pub fn highway_cells(&self, threshold: f64) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for x in 0..self.resolution {
            for y in 0..self.resolution {
                let hot = SignalCategory::ALL
                    .iter()
                    .filter(|c| c.forms_highways())
                    .any(|&c| self.cells[self.index(x, y, c)] > threshold);
                if hot {
                    cells.push((x, y));
                }
            }
        }
        cells
    }

    /// Deposit records still inside the max-age window, oldest first.
    pub fn recent_deposits(&self) -> impl Iterator<Item = &DepositEvent> {
        self.log.iter()
    }

    /// Zeroes every channel and drops the log; the clock is kept.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|v| *v = 0.0);
        self.log.clear();
    }
}
