use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use regex::Regex;

use cornwall_audio::{process, AudioEngine, PlayRequest};
use cornwall_types::TrackId;

use super::session::{PlaybackSession, PlaybackTarget};
use crate::effects;
use crate::render::{render_project, RenderOutcome};
use crate::store::{read_opt, write_atomic, FileLock, ProjectHandle, StateLayout};
use crate::{CornwallError, Result};

/// How long `stop` waits for a signalled loop to exit.
const STOP_GRACE: Duration = Duration::from_secs(2);
const STOP_POLL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing(PlaybackSession),
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// The recorded loop was signalled.
    Stopped(PlaybackSession),
    /// The recorded loop had already exited; the record was cleared.
    Stale(PlaybackSession),
    /// Nothing was recorded, but unrecorded loops were found and signalled.
    Strays(Vec<u32>),
    NothingPlaying,
}

/// Foreground playback, rendering, and the single background loop.
///
/// The loop is tracked by a session record under `state/`. Every operation
/// that reads or replaces it holds `state/.playback.lock`, so concurrent
/// invocations cannot both start a loop.
pub struct Supervisor {
    engine: Arc<dyn AudioEngine>,
    layout: StateLayout,
}

impl Supervisor {
    pub fn new(engine: Arc<dyn AudioEngine>, layout: StateLayout) -> Self {
        Self { engine, layout }
    }

    pub fn engine(&self) -> &dyn AudioEngine {
        self.engine.as_ref()
    }

    /// Play one track with its volume and effects. Blocks until done.
    pub fn play_track(
        &self,
        project: &ProjectHandle,
        id: TrackId,
        start: Option<f64>,
        duration: Option<f64>,
    ) -> Result<()> {
        let track = project.track(id)?;
        let source = project
            .source_path(&track)
            .ok_or(CornwallError::NoAudioSource(id))?;
        if !source.is_file() {
            return Err(CornwallError::SourceFileNotFound(source));
        }
        let chain = project.effects(id)?;

        let mut request = PlayRequest::file(source);
        request.gain = track.volume;
        request.effects = effects::compile(&chain)?;
        request.start = start;
        request.duration = duration;

        log::info!(target: "playback", "playing track {} '{}'", id, track.name);
        self.engine.play(&request)?;
        Ok(())
    }

    pub fn render(&self, project: &ProjectHandle, output: Option<&Path>) -> Result<RenderOutcome> {
        render_project(self.engine.as_ref(), project, output)
    }

    /// Render the mix, then play it from `start`. Blocks until done.
    pub fn play_mix(
        &self,
        project: &ProjectHandle,
        output: Option<&Path>,
        start: Option<f64>,
    ) -> Result<RenderOutcome> {
        let outcome = self.render(project, output)?;
        let mut request = PlayRequest::file(&outcome.output);
        request.start = start;
        log::info!(target: "playback", "playing mix {}", outcome.output.display());
        self.engine.play(&request)?;
        Ok(outcome)
    }

    /// Play any audio file. Needs no project.
    pub fn play_file(&self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(CornwallError::SourceFileNotFound(path.to_path_buf()));
        }
        log::info!(target: "playback", "playing file {}", path.display());
        self.engine.play(&PlayRequest::file(path))?;
        Ok(())
    }

    /// Replace whatever is looping with `target`. Renders first for `Mix`.
    /// The previous loop is stopped before the new file is resolved, so a
    /// failed render leaves nothing playing.
    pub fn start_loop(
        &self,
        project: &ProjectHandle,
        target: PlaybackTarget,
    ) -> Result<PlaybackSession> {
        let _lock = FileLock::exclusive(&self.layout.playback_lock_file())?;

        match self.stop_locked() {
            StopOutcome::Stopped(old) => {
                log::info!(target: "playback", "replacing loop pid {} ({})", old.pid, old.target)
            }
            StopOutcome::Strays(pids) => {
                log::warn!(target: "playback", "stopped unrecorded loops {:?}", pids)
            }
            StopOutcome::Stale(_) | StopOutcome::NothingPlaying => {}
        }

        let file = self.loop_file(project, &target)?;
        let pid = self.engine.play_looping(&file)?;
        let session = PlaybackSession { pid, target };
        write_atomic(&self.layout.session_file(), &session)?;
        log::info!(target: "playback", "looping {} (pid {})", file.display(), pid);
        Ok(session)
    }

    /// Stop the background loop. Never fails; problems are logged.
    pub fn stop(&self) -> StopOutcome {
        let _lock = self.playback_lock();
        self.stop_locked()
    }

    /// `Playing` only if the recorded loop is still alive. A stale record is
    /// cleared.
    pub fn status(&self) -> PlaybackStatus {
        let _lock = self.playback_lock();
        match self.read_session() {
            Some(session) if process::is_alive(session.pid) => PlaybackStatus::Playing(session),
            Some(session) => {
                log::debug!(target: "playback", "clearing stale session pid {}", session.pid);
                self.clear_session();
                PlaybackStatus::Idle
            }
            None => PlaybackStatus::Idle,
        }
    }

    fn loop_file(&self, project: &ProjectHandle, target: &PlaybackTarget) -> Result<PathBuf> {
        let file = match target {
            PlaybackTarget::Mix => self.render(project, None)?.output,
            PlaybackTarget::Track(id) => {
                let track = project.track(*id)?;
                project
                    .source_path(&track)
                    .ok_or(CornwallError::NoAudioSource(*id))?
            }
            PlaybackTarget::File(path) => path.clone(),
        };
        if !file.is_file() {
            return Err(CornwallError::SourceFileNotFound(file));
        }
        Ok(file)
    }

    fn stop_locked(&self) -> StopOutcome {
        let Some(session) = self.read_session() else {
            return self.stop_strays();
        };
        self.clear_session();

        if !process::is_alive(session.pid) {
            log::debug!(target: "playback", "session pid {} already gone", session.pid);
            return StopOutcome::Stale(session);
        }
        process::terminate(session.pid);
        if !wait_for_exit(session.pid) {
            log::warn!(target: "playback", "pid {} still alive after SIGTERM", session.pid);
        }
        StopOutcome::Stopped(session)
    }

    fn stop_strays(&self) -> StopOutcome {
        let pattern = match Regex::new(&self.engine.loop_signature()) {
            Ok(re) => re,
            Err(e) => {
                log::warn!(target: "playback", "bad loop signature: {}", e);
                return StopOutcome::NothingPlaying;
            }
        };
        let pids: Vec<u32> = process::find_processes(&pattern)
            .into_iter()
            .filter(|pid| process::terminate(*pid))
            .collect();
        if pids.is_empty() {
            return StopOutcome::NothingPlaying;
        }
        for pid in &pids {
            wait_for_exit(*pid);
        }
        StopOutcome::Strays(pids)
    }

    fn read_session(&self) -> Option<PlaybackSession> {
        let path = self.layout.session_file();
        match read_opt::<PlaybackSession>(&path) {
            Ok(session) => session,
            Err(e) => {
                log::warn!(target: "playback", "discarding unreadable {}: {}", path.display(), e);
                self.clear_session();
                None
            }
        }
    }

    fn clear_session(&self) {
        let path = self.layout.session_file();
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!(target: "playback", "could not remove {}: {}", path.display(), e);
            }
        }
    }

    fn playback_lock(&self) -> Option<FileLock> {
        FileLock::exclusive(&self.layout.playback_lock_file())
            .map_err(|e| log::warn!(target: "playback", "playback lock unavailable: {}", e))
            .ok()
    }
}

fn wait_for_exit(pid: u32) -> bool {
    let deadline = Instant::now() + STOP_GRACE;
    while process::is_alive(pid) {
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(STOP_POLL);
    }
    true
}
