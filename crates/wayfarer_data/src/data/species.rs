use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Movement capabilities of a species.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct Locomotion {
    pub walks: bool,
    pub climbs: bool,
    pub swims: bool,
    pub burrows: bool,
    pub flies: bool,
}

impl Locomotion {
    pub const WALKER: Locomotion = Locomotion {
        walks: true,
        climbs: false,
        swims: false,
        burrows: false,
        flies: false,
    };
}

/// Identity and movement traits of a species, as handed over by the
/// population bookkeeping.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct SpeciesProfile {
    pub id: Uuid,
    pub name: String,
    pub locomotion: Locomotion,
    /// Relative body size; 1.0 is a typical forager.
    pub body_size: f32,
}

impl SpeciesProfile {
    pub fn new(id: Uuid, name: impl Into<String>, locomotion: Locomotion) -> Self {
        Self {
            id,
            name: name.into(),
            locomotion,
            body_size: 1.0,
        }
    }

    #[must_use]
    pub fn with_body_size(mut self, body_size: f32) -> Self {
        self.body_size = body_size;
        self
    }
}
