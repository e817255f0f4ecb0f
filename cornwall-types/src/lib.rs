//! # cornwall-types
//!
//! Shared data model for Cornwall: the project, track, effects-chain and mix
//! documents persisted by cornwall-core, plus the effect catalog. This crate
//! does no I/O.

pub mod catalog;
pub mod effect;
pub mod mix;
mod param;
pub mod project;
pub mod track;

pub use catalog::{lookup_effect, EffectSpec, ParamSpec, EFFECT_CATALOG};
pub use effect::{Effect, EffectsChains};
pub use mix::{MixSettings, OutputFormat};
pub use param::{parse_params, ParamParseError, ParamValue, Params};
pub use project::{Project, TimeSignature};
pub use track::{Track, TrackType, TrackUpdate, UnknownTrackType};

/// Unique identifier for a track. Ids start at 1; the next id is one past
/// the highest existing id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct TrackId(u32);

impl TrackId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Next id after the highest id in `existing`, or 1 for an empty set.
    /// `None` when the highest id is already `u32::MAX`.
    pub fn next_after<I>(existing: I) -> Option<Self>
    where
        I: IntoIterator<Item = TrackId>,
    {
        match existing.into_iter().max() {
            Some(max) => max.0.checked_add(1).map(Self),
            None => Some(Self(1)),
        }
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TrackId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_after_empty_is_one() {
        assert_eq!(TrackId::next_after(Vec::new()), Some(TrackId::new(1)));
    }

    #[test]
    fn next_after_uses_max_not_count() {
        let ids = vec![TrackId::new(1), TrackId::new(7), TrackId::new(3)];
        assert_eq!(TrackId::next_after(ids), Some(TrackId::new(8)));
    }

    #[test]
    fn next_after_max_id_is_none() {
        let ids = vec![TrackId::new(2), TrackId::new(u32::MAX)];
        assert_eq!(TrackId::next_after(ids), None);
    }

    #[test]
    fn track_id_serializes_transparently() {
        let json = serde_json::to_string(&TrackId::new(4)).unwrap();
        assert_eq!(json, "4");
    }
}
