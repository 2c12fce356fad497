//! Plain data types shared by the Wayfarer engines.
//!
//! Everything here is inert: layout and identity only. Behaviour lives in
//! `wayfarer_core` behind the `*Logic` traits.

pub mod data;

pub use data::genome::{ActivationKind, Genome, LayoutError};
pub use data::signal::SignalCategory;
pub use data::species::{Locomotion, SpeciesProfile};
pub use data::voxel::{CellCoord, Direction, Material, Voxel, VoxelLayer};
