use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};

/// Stigmergic message types agents can leave in the field.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub enum SignalCategory {
    /// "Predator or hazard here"
    Danger,
    /// "I am starving / injured"
    Distress,
    /// "Food is here"
    FoodFound,
    /// "This route paid off"; the only category that forms highways
    Success,
    /// Mating call
    Mating,
    /// Territorial marking
    Territory,
}

impl SignalCategory {
    pub const ALL: [SignalCategory; 6] = [
        SignalCategory::Danger,
        SignalCategory::Distress,
        SignalCategory::FoodFound,
        SignalCategory::Success,
        SignalCategory::Mating,
        SignalCategory::Territory,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Channel index inside a field cell.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            SignalCategory::Danger => 0,
            SignalCategory::Distress => 1,
            SignalCategory::FoodFound => 2,
            SignalCategory::Success => 3,
            SignalCategory::Mating => 4,
            SignalCategory::Territory => 5,
        }
    }
}
