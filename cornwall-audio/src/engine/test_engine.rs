//! In-process engine for tests.
//!
//! Records every request. Rendering is performed on WAV files with hound:
//! a single input gets its gain applied, several inputs are summed sample by
//! sample (clipping at full scale). Effect directives are recorded but not
//! applied. Background loops are `sleep` processes in their own process
//! group, so supervisors can be exercised against real pids.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use super::{AudioEngine, EngineError, EngineResult, PlayRequest, RenderJob};

static NEXT_MARKER: AtomicU64 = AtomicU64::new(1);

/// An operation recorded by `TestEngine` for assertion in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOp {
    Render(RenderJob),
    Play(PlayRequest),
    Loop { source: PathBuf, pid: u32 },
}

pub struct TestEngine {
    ops: Mutex<Vec<EngineOp>>,
    /// Effect name that makes render/play fail as if the engine rejected it.
    reject_effect: Option<String>,
    /// Unique `sleep` argument identifying this engine's loop processes.
    loop_marker: String,
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEngine {
    pub fn new() -> Self {
        let unique = NEXT_MARKER.fetch_add(1, Ordering::Relaxed);
        Self {
            ops: Mutex::new(Vec::new()),
            reject_effect: None,
            loop_marker: format!("86400.{}{:04}", std::process::id(), unique),
        }
    }

    pub fn rejecting_effect(mut self, name: &str) -> Self {
        self.reject_effect = Some(name.to_string());
        self
    }

    pub fn operations(&self) -> Vec<EngineOp> {
        self.ops.lock().map(|ops| ops.clone()).unwrap_or_default()
    }

    pub fn renders(&self) -> Vec<RenderJob> {
        self.operations()
            .into_iter()
            .filter_map(|op| match op {
                EngineOp::Render(job) => Some(job),
                _ => None,
            })
            .collect()
    }

    pub fn plays(&self) -> Vec<PlayRequest> {
        self.operations()
            .into_iter()
            .filter_map(|op| match op {
                EngineOp::Play(req) => Some(req),
                _ => None,
            })
            .collect()
    }

    pub fn loop_pids(&self) -> Vec<u32> {
        self.operations()
            .into_iter()
            .filter_map(|op| match op {
                EngineOp::Loop { pid, .. } => Some(pid),
                _ => None,
            })
            .collect()
    }

    fn record(&self, op: EngineOp) {
        if let Ok(mut ops) = self.ops.lock() {
            ops.push(op);
        }
    }

    fn check_effects<'a, I>(&self, names: I) -> EngineResult
    where
        I: IntoIterator<Item = &'a str>,
    {
        if let Some(rejected) = &self.reject_effect {
            if names.into_iter().any(|n| n == rejected) {
                return Err(EngineError::Rejected {
                    program: "test-engine".to_string(),
                    status: "exit status: 2".to_string(),
                    stderr: format!("{}: parameter out of range", rejected),
                });
            }
        }
        Ok(())
    }
}

impl AudioEngine for TestEngine {
    fn render(&self, job: &RenderJob) -> EngineResult {
        self.record(EngineOp::Render(job.clone()));
        self.check_effects(
            job.inputs
                .iter()
                .flat_map(|i| i.effects.iter().map(|d| d.name.as_str())),
        )?;

        let mut spec = None;
        let mut mixed: Vec<f32> = Vec::new();
        for input in &job.inputs {
            let (input_spec, samples) = read_normalized(&input.source)?;
            spec.get_or_insert(input_spec);
            if mixed.len() < samples.len() {
                mixed.resize(samples.len(), 0.0);
            }
            for (acc, s) in mixed.iter_mut().zip(samples) {
                *acc += s * input.gain;
            }
        }
        let spec = spec.ok_or_else(|| EngineError::Rejected {
            program: "test-engine".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "no inputs".to_string(),
        })?;
        write_normalized(&job.output, spec, &mixed)
    }

    fn play(&self, request: &PlayRequest) -> EngineResult {
        self.record(EngineOp::Play(request.clone()));
        self.check_effects(request.effects.iter().map(|d| d.name.as_str()))?;
        if !request.source.exists() {
            return Err(EngineError::Rejected {
                program: "test-engine".to_string(),
                status: "exit status: 2".to_string(),
                stderr: format!("can't open input file `{}'", request.source.display()),
            });
        }
        Ok(())
    }

    fn play_looping(&self, source: &Path) -> EngineResult<u32> {
        let mut cmd = Command::new("sleep");
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        let child = cmd
            .arg(&self.loop_marker)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        let pid = child.id();
        self.record(EngineOp::Loop {
            source: source.to_path_buf(),
            pid,
        });
        Ok(pid)
    }

    fn loop_signature(&self) -> String {
        format!(r"^(\S*/)?sleep {}$", regex::escape(&self.loop_marker))
    }
}

fn hound_err(e: hound::Error) -> EngineError {
    match e {
        hound::Error::IoError(io) => EngineError::Io(io),
        other => EngineError::Rejected {
            program: "test-engine".to_string(),
            status: "exit status: 2".to_string(),
            stderr: other.to_string(),
        },
    }
}

fn read_normalized(path: &Path) -> EngineResult<(hound::WavSpec, Vec<f32>)> {
    let mut reader = hound::WavReader::open(path).map_err(hound_err)?;
    let spec = reader.spec();
    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(hound_err)?,
        hound::SampleFormat::Int => {
            let scale = full_scale(spec.bits_per_sample);
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()
                .map_err(hound_err)?
        }
    };
    Ok((spec, samples))
}

fn write_normalized(path: &Path, spec: hound::WavSpec, samples: &[f32]) -> EngineResult {
    let mut writer = hound::WavWriter::create(path, spec).map_err(hound_err)?;
    match spec.sample_format {
        hound::SampleFormat::Float => {
            for s in samples {
                writer.write_sample(s.clamp(-1.0, 1.0)).map_err(hound_err)?;
            }
        }
        hound::SampleFormat::Int => {
            let scale = full_scale(spec.bits_per_sample);
            for s in samples {
                let v = (s * scale).round().clamp(-scale, scale - 1.0) as i32;
                match spec.bits_per_sample {
                    8 => writer.write_sample(v as i8),
                    16 => writer.write_sample(v as i16),
                    _ => writer.write_sample(v),
                }
                .map_err(hound_err)?;
            }
        }
    }
    writer.finalize().map_err(hound_err)
}

fn full_scale(bits: u16) -> f32 {
    (1u64 << (bits.saturating_sub(1))) as f32
}
