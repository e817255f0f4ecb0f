//! Track document entries.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TrackId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    #[default]
    Audio,
    Midi,
    Synth,
}

impl TrackType {
    pub const ALL: [TrackType; 3] = [TrackType::Audio, TrackType::Midi, TrackType::Synth];

    pub fn name(&self) -> &'static str {
        match self {
            TrackType::Audio => "audio",
            TrackType::Midi => "midi",
            TrackType::Synth => "synth",
        }
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTrackType(pub String);

impl fmt::Display for UnknownTrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track type must be audio, midi, or synth (got '{}')", self.0)
    }
}

impl std::error::Error for UnknownTrackType {}

impl FromStr for TrackType {
    type Err = UnknownTrackType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrackType::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| UnknownTrackType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    #[serde(rename = "type")]
    pub track_type: TrackType,
    /// Imported audio, relative to the project directory. `None` until imported.
    pub source: Option<PathBuf>,
    /// Linear gain, 1.0 = unity. Intended range 0.0-2.0, not enforced.
    pub volume: f32,
    /// -1.0 (left) to 1.0 (right). Stored only; rendering ignores it.
    pub pan: f32,
    pub mute: bool,
    pub solo: bool,
}

impl Track {
    pub fn new(id: TrackId, name: &str, track_type: TrackType) -> Self {
        Self {
            id,
            name: name.to_string(),
            track_type,
            source: None,
            volume: 1.0,
            pan: 0.0,
            mute: false,
            solo: false,
        }
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn apply(&mut self, update: &TrackUpdate) {
        match update {
            TrackUpdate::Name(name) => self.name = name.clone(),
            TrackUpdate::Volume(v) => self.volume = *v,
            TrackUpdate::Pan(p) => self.pan = *p,
            TrackUpdate::Mute(m) => self.mute = *m,
            TrackUpdate::Solo(s) => self.solo = *s,
            TrackUpdate::Source(path) => self.source = Some(path.clone()),
        }
    }
}

/// A single-field change to a track.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackUpdate {
    Name(String),
    Volume(f32),
    Pan(f32),
    Mute(bool),
    Solo(bool),
    Source(PathBuf),
}
