//! Headless host for the Wayfarer navigation engines.
//!
//! [`app::App`] owns a generated voxel world, the pheromone field and a
//! population of agents, and steps them tick by tick through
//! [`wayfarer_core::Navigator`].

pub mod app;

pub use app::{Agent, App, TickSummary};
pub use wayfarer_core::config::AppConfig;
