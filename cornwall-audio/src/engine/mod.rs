//! Audio engine trait: the three things Cornwall asks of an engine.
//!
//! `AudioEngine` says what the core wants done (render these inputs, play
//! this file, loop this file in the background), not how. [`sox::SoxEngine`]
//! turns requests into SoX command lines.

pub mod sox;
pub mod test_engine;

use std::path::{Path, PathBuf};

pub type EngineResult<T = ()> = Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("'{program}' not found. Install SoX (e.g. 'brew install sox' or 'apt install sox')")]
    Unavailable { program: String },

    #[error("{program} rejected the request ({status}){}", fmt_stderr(.stderr))]
    Rejected {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn fmt_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

/// One stage of an effects chain in engine terms: an effect name followed
/// by positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectDirective {
    pub name: String,
    pub args: Vec<String>,
}

impl EffectDirective {
    pub fn new(name: &str, args: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            args,
        }
    }
}

/// Flatten directives into a single argument list, in chain order.
pub fn directive_args(effects: &[EffectDirective]) -> Vec<String> {
    effects
        .iter()
        .flat_map(|d| std::iter::once(d.name.clone()).chain(d.args.iter().cloned()))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderInput {
    pub source: PathBuf,
    pub gain: f32,
    pub effects: Vec<EffectDirective>,
}

impl RenderInput {
    pub fn new(source: impl Into<PathBuf>, gain: f32) -> Self {
        Self {
            source: source.into(),
            gain,
            effects: Vec::new(),
        }
    }

    pub fn with_effects(mut self, effects: Vec<EffectDirective>) -> Self {
        self.effects = effects;
        self
    }
}

/// Render request. A single input is processed (gain, then effects); two or
/// more inputs are summed with equal weight and no loudness compensation.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub inputs: Vec<RenderInput>,
    pub output: PathBuf,
}

impl RenderJob {
    pub fn single(input: RenderInput, output: impl Into<PathBuf>) -> Self {
        Self {
            inputs: vec![input],
            output: output.into(),
        }
    }

    /// Unity-gain sum of already-processed files.
    pub fn sum<I, P>(sources: I, output: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            inputs: sources
                .into_iter()
                .map(|s| RenderInput::new(s, 1.0))
                .collect(),
            output: output.into(),
        }
    }

    pub fn is_mix(&self) -> bool {
        self.inputs.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayRequest {
    pub source: PathBuf,
    pub gain: f32,
    pub effects: Vec<EffectDirective>,
    /// Start offset in seconds.
    pub start: Option<f64>,
    /// Seconds to play from `start`.
    pub duration: Option<f64>,
}

impl PlayRequest {
    pub fn file(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            gain: 1.0,
            effects: Vec::new(),
            start: None,
            duration: None,
        }
    }
}

/// Semantic-level audio engine.
///
/// Implementations must be shareable across threads: the playback actor
/// holds one behind an `Arc`.
pub trait AudioEngine: Send + Sync {
    /// Produce `job.output` from the job's inputs.
    fn render(&self, job: &RenderJob) -> EngineResult;

    /// Play to the live output device. Blocks until playback ends.
    fn play(&self, request: &PlayRequest) -> EngineResult;

    /// Start repeating playback of `source` in a detached process group and
    /// return the leader's pid. Does not wait.
    fn play_looping(&self, source: &Path) -> EngineResult<u32>;

    /// Regex matched against full command lines to find loop processes this
    /// engine may have started.
    fn loop_signature(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_args_flatten_in_order() {
        let effects = vec![
            EffectDirective::new("bass", vec!["6".into()]),
            EffectDirective::new("flanger", vec![]),
            EffectDirective::new("echo", vec!["0.8".into(), "0.9".into()]),
        ];
        assert_eq!(
            directive_args(&effects),
            ["bass", "6", "flanger", "echo", "0.8", "0.9"]
        );
    }

    #[test]
    fn sum_job_is_unity_gain() {
        let job = RenderJob::sum(["a.wav", "b.wav"], "out.wav");
        assert!(job.is_mix());
        assert!(job.inputs.iter().all(|i| i.gain == 1.0 && i.effects.is_empty()));
    }

    #[test]
    fn rejected_message_includes_stderr_when_present() {
        let err = EngineError::Rejected {
            program: "sox".into(),
            status: "exit status: 2".into(),
            stderr: "sox FAIL echo: usage\n".into(),
        };
        assert_eq!(
            err.to_string(),
            "sox rejected the request (exit status: 2): sox FAIL echo: usage"
        );
        let quiet = EngineError::Rejected {
            program: "play".into(),
            status: "exit status: 1".into(),
            stderr: String::new(),
        };
        assert_eq!(quiet.to_string(), "play rejected the request (exit status: 1)");
    }
}
