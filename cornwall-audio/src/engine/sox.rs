//! SoX-backed engine: `sox` for offline rendering, `play` for live output.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Output, Stdio};

use super::{directive_args, AudioEngine, EngineError, EngineResult, PlayRequest, RenderJob};

/// Install locations tried after the bare program name.
const SEARCH_DIRS: &[&str] = &["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin"];

pub const DEFAULT_LOOP_REPEAT: u32 = 999;

#[derive(Debug, Clone)]
pub struct SoxEngine {
    sox: String,
    play: String,
    loop_repeat: u32,
}

impl Default for SoxEngine {
    fn default() -> Self {
        Self::new("sox", "play")
    }
}

impl SoxEngine {
    pub fn new(sox: &str, play: &str) -> Self {
        Self {
            sox: sox.to_string(),
            play: play.to_string(),
            loop_repeat: DEFAULT_LOOP_REPEAT,
        }
    }

    pub fn with_loop_repeat(mut self, count: u32) -> Self {
        self.loop_repeat = count.max(1);
        self
    }

    pub(crate) fn render_args(job: &RenderJob) -> Vec<String> {
        let mut args = Vec::new();
        match job.inputs.as_slice() {
            [input] => {
                args.push(path_arg(&input.source));
                args.push(path_arg(&job.output));
                args.push("vol".to_string());
                args.push(input.gain.to_string());
                args.extend(directive_args(&input.effects));
            }
            inputs => {
                // Without -v, -m scales every input by 1/n.
                args.push("-m".to_string());
                for input in inputs {
                    args.push("-v".to_string());
                    args.push(input.gain.to_string());
                    args.push(path_arg(&input.source));
                }
                args.push(path_arg(&job.output));
            }
        }
        args
    }

    pub(crate) fn play_args(request: &PlayRequest) -> Vec<String> {
        let mut args = vec![path_arg(&request.source)];
        if request.gain != 1.0 {
            args.push("vol".to_string());
            args.push(request.gain.to_string());
        }
        args.extend(directive_args(&request.effects));
        if request.start.is_some() || request.duration.is_some() {
            args.push("trim".to_string());
            args.push(request.start.unwrap_or(0.0).to_string());
            if let Some(duration) = request.duration {
                args.push(duration.to_string());
            }
        }
        args
    }

    pub(crate) fn loop_args(&self, source: &Path) -> Vec<String> {
        vec![
            path_arg(source),
            "repeat".to_string(),
            self.loop_repeat.to_string(),
        ]
    }

    fn output(&self, program: &str, args: &[String]) -> EngineResult<Output> {
        log::debug!(target: "engine", "{} {}", program, args.join(" "));
        run_first(program, |cmd| {
            cmd.args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .output()
        })
    }

    fn status(&self, program: &str, args: &[String]) -> EngineResult<ExitStatus> {
        log::debug!(target: "engine", "{} {}", program, args.join(" "));
        run_first(program, |cmd| cmd.args(args).stdin(Stdio::null()).status())
    }

    fn spawn_detached(&self, program: &str, args: &[String]) -> EngineResult<Child> {
        log::debug!(target: "engine", "{} {} (background)", program, args.join(" "));
        run_first(program, |cmd| {
            #[cfg(unix)]
            {
                use std::os::unix::process::CommandExt;
                cmd.process_group(0);
            }
            cmd.args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
        })
    }
}

impl AudioEngine for SoxEngine {
    fn render(&self, job: &RenderJob) -> EngineResult {
        let args = Self::render_args(job);
        let output = self.output(&self.sox, &args)?;
        if !output.status.success() {
            return Err(EngineError::Rejected {
                program: self.sox.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }

    fn play(&self, request: &PlayRequest) -> EngineResult {
        let args = Self::play_args(request);
        let status = self.status(&self.play, &args)?;
        if !status.success() {
            return Err(EngineError::Rejected {
                program: self.play.clone(),
                status: status.to_string(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    fn play_looping(&self, source: &Path) -> EngineResult<u32> {
        let args = self.loop_args(source);
        let child = self.spawn_detached(&self.play, &args)?;
        // Not waited on: the loop outlives this process.
        Ok(child.id())
    }

    fn loop_signature(&self) -> String {
        let program = Path::new(&self.play)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.play.clone());
        format!(r"^(\S*/)?{}\s.*\srepeat\s", regex::escape(&program))
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn candidates(program: &str) -> Vec<PathBuf> {
    let mut out = vec![PathBuf::from(program)];
    if !program.contains('/') {
        out.extend(SEARCH_DIRS.iter().map(|dir| Path::new(dir).join(program)));
    }
    out
}

/// Run `f` against each candidate location of `program` until one exists.
fn run_first<T, F>(program: &str, mut f: F) -> EngineResult<T>
where
    F: FnMut(&mut Command) -> io::Result<T>,
{
    for path in candidates(program) {
        let mut cmd = Command::new(&path);
        match f(&mut cmd) {
            Ok(value) => return Ok(value),
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(EngineError::Io(e)),
        }
    }
    Err(EngineError::Unavailable {
        program: program.to_string(),
    })
}
