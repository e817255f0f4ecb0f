use std::path::PathBuf;

use cornwall_audio::EngineError;
use cornwall_types::TrackId;

pub type Result<T> = std::result::Result<T, CornwallError>;

#[derive(Debug, thiserror::Error)]
pub enum CornwallError {
    #[error("no project loaded. Run 'cornwall project create <name>' first")]
    NoProjectLoaded,

    #[error("track {0} not found")]
    TrackNotFound(TrackId),

    #[error("invalid track type '{0}': must be audio, midi, or synth")]
    InvalidType(String),

    #[error("file not found: {}", .0.display())]
    SourceFileNotFound(PathBuf),

    #[error("nothing to render: no active tracks with audio sources")]
    NothingToRender,

    #[error("unknown effect '{0}'. Run 'cornwall fx catalog' to list effects")]
    UnknownEffect(String),

    #[error("audio engine rejected the parameters: {0}")]
    EngineRejectedParameters(String),

    #[error("track {0} has no audio source. Use 'cornwall track import {0} <file>' first")]
    NoAudioSource(TrackId),

    #[error("project '{name}' not found. {}", fmt_available(.available))]
    ProjectNotFound {
        name: String,
        available: Vec<String>,
    },

    #[error("unknown project key '{0}'. Valid keys: name, bpm, sample-rate, time-sig")]
    InvalidProjectKey(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("effect index {index} out of range (track has {len} effects)")]
    EffectIndexOutOfRange { index: usize, len: usize },

    #[error("{0}")]
    EngineUnavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed state document: {0}")]
    Json(#[from] serde_json::Error),
}

impl CornwallError {
    pub fn invalid_value(key: &str, value: impl std::fmt::Display) -> Self {
        CornwallError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

fn fmt_available(available: &[String]) -> String {
    if available.is_empty() {
        "No projects exist yet.".to_string()
    } else {
        format!("Available projects: {}", available.join(", "))
    }
}

impl From<EngineError> for CornwallError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Io(io) => CornwallError::Io(io),
            rejected @ EngineError::Rejected { .. } => {
                CornwallError::EngineRejectedParameters(rejected.to_string())
            }
            unavailable @ EngineError::Unavailable { .. } => {
                CornwallError::EngineUnavailable(unavailable.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_onto_taxonomy() {
        let rejected: CornwallError = EngineError::Rejected {
            program: "sox".into(),
            status: "exit status: 2".into(),
            stderr: "echo: gain-out must be positive".into(),
        }
        .into();
        assert!(matches!(rejected, CornwallError::EngineRejectedParameters(ref m) if m.contains("gain-out")));

        let missing: CornwallError = EngineError::Unavailable {
            program: "play".into(),
        }
        .into();
        assert!(matches!(missing, CornwallError::EngineUnavailable(_)));
    }

    #[test]
    fn project_not_found_lists_alternatives() {
        let err = CornwallError::ProjectNotFound {
            name: "jig".into(),
            available: vec!["reel".into(), "waltz".into()],
        };
        assert_eq!(
            err.to_string(),
            "project 'jig' not found. Available projects: reel, waltz"
        );
        let none = CornwallError::ProjectNotFound {
            name: "jig".into(),
            available: vec![],
        };
        assert!(none.to_string().ends_with("No projects exist yet."));
    }
}
