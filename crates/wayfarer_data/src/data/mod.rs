//! Core data structures for the Wayfarer navigation core.

pub mod genome;
pub mod signal;
pub mod species;
pub mod voxel;
