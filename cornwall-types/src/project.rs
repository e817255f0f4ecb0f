//! Project document.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BPM: u32 = 120;
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_TIME_SIG: &str = "4/4";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub bpm: u32,
    pub sample_rate: u32,
    pub time_sig: String,
    pub created: DateTime<Utc>,
    /// Directory name under `projects/`. Fixed at creation, so renaming the
    /// project does not move its assets.
    pub project_dir: String,
}

impl Project {
    pub fn new(name: &str, bpm: u32, sample_rate: u32, time_sig: TimeSignature) -> Self {
        Self {
            name: name.to_string(),
            bpm,
            sample_rate,
            time_sig: time_sig.to_string(),
            created: Utc::now().trunc_subsecs(0),
            project_dir: name.to_string(),
        }
    }
}

/// A validated `N/D` time signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    pub beats: u8,
    pub unit: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self { beats: 4, unit: 4 }
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats, self.unit)
    }
}

impl FromStr for TimeSignature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (beats, unit) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| format!("time signature must be N/D, got '{}'", s))?;
        let beats: u8 = beats
            .parse()
            .map_err(|_| format!("bad beat count in '{}'", s))?;
        let unit: u8 = unit
            .parse()
            .map_err(|_| format!("bad beat unit in '{}'", s))?;
        if beats == 0 || unit == 0 {
            return Err(format!("time signature parts must be positive, got '{}'", s));
        }
        Ok(Self { beats, unit })
    }
}
