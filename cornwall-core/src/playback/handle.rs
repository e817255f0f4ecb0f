//! Channel front-end for the playback supervisor.
//!
//! The supervisor runs on its own thread and owns the engine; callers send
//! [`PlaybackCmd`]s and wait on a per-request reply channel. Requests are
//! handled one at a time in arrival order.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender as CrossbeamSender;

use cornwall_types::TrackId;

use super::session::{PlaybackSession, PlaybackTarget};
use super::supervisor::{PlaybackStatus, StopOutcome, Supervisor};
use crate::render::RenderOutcome;
use crate::store::ProjectHandle;
use crate::{CornwallError, Result};

#[derive(Debug)]
pub enum PlaybackCmd {
    PlayTrack {
        project: ProjectHandle,
        id: TrackId,
        start: Option<f64>,
        duration: Option<f64>,
        reply: Sender<Result<()>>,
    },
    PlayMix {
        project: ProjectHandle,
        output: Option<PathBuf>,
        start: Option<f64>,
        reply: Sender<Result<RenderOutcome>>,
    },
    Render {
        project: ProjectHandle,
        output: Option<PathBuf>,
        reply: Sender<Result<RenderOutcome>>,
    },
    PlayFile {
        path: PathBuf,
        reply: Sender<Result<()>>,
    },
    Loop {
        project: ProjectHandle,
        target: PlaybackTarget,
        reply: Sender<Result<PlaybackSession>>,
    },
    Stop {
        reply: Sender<StopOutcome>,
    },
    Status {
        reply: Sender<PlaybackStatus>,
    },
    Shutdown,
}

pub struct PlaybackHandle {
    cmd_tx: CrossbeamSender<PlaybackCmd>,
    join_handle: Option<JoinHandle<()>>,
}

impl PlaybackHandle {
    pub fn spawn(supervisor: Supervisor) -> Self {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded::<PlaybackCmd>();
        let join_handle = thread::Builder::new()
            .name("playback".to_string())
            .spawn(move || {
                for cmd in cmd_rx {
                    if !handle_cmd(&supervisor, cmd) {
                        break;
                    }
                }
                log::debug!(target: "playback", "playback thread exiting");
            })
            .map_err(|e| log::error!(target: "playback", "could not start playback thread: {}", e))
            .ok();
        Self {
            cmd_tx,
            join_handle,
        }
    }

    pub fn play_track(
        &self,
        project: &ProjectHandle,
        id: TrackId,
        start: Option<f64>,
        duration: Option<f64>,
    ) -> Result<()> {
        self.request(|reply| PlaybackCmd::PlayTrack {
            project: project.clone(),
            id,
            start,
            duration,
            reply,
        })?
    }

    pub fn play_mix(
        &self,
        project: &ProjectHandle,
        output: Option<&Path>,
        start: Option<f64>,
    ) -> Result<RenderOutcome> {
        self.request(|reply| PlaybackCmd::PlayMix {
            project: project.clone(),
            output: output.map(Path::to_path_buf),
            start,
            reply,
        })?
    }

    pub fn render(&self, project: &ProjectHandle, output: Option<&Path>) -> Result<RenderOutcome> {
        self.request(|reply| PlaybackCmd::Render {
            project: project.clone(),
            output: output.map(Path::to_path_buf),
            reply,
        })?
    }

    pub fn play_file(&self, path: &Path) -> Result<()> {
        self.request(|reply| PlaybackCmd::PlayFile {
            path: path.to_path_buf(),
            reply,
        })?
    }

    pub fn start_loop(
        &self,
        project: &ProjectHandle,
        target: PlaybackTarget,
    ) -> Result<PlaybackSession> {
        self.request(|reply| PlaybackCmd::Loop {
            project: project.clone(),
            target,
            reply,
        })?
    }

    /// Never fails: a dead playback thread reads as nothing playing.
    pub fn stop(&self) -> StopOutcome {
        self.request(|reply| PlaybackCmd::Stop { reply })
            .unwrap_or(StopOutcome::NothingPlaying)
    }

    pub fn status(&self) -> PlaybackStatus {
        self.request(|reply| PlaybackCmd::Status { reply })
            .unwrap_or(PlaybackStatus::Idle)
    }

    fn request<T, F>(&self, make: F) -> Result<T>
    where
        F: FnOnce(Sender<T>) -> PlaybackCmd,
    {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.cmd_tx
            .send(make(reply_tx))
            .map_err(|_| thread_gone())?;
        reply_rx.recv().map_err(|_| thread_gone())
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(PlaybackCmd::Shutdown);
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}

fn thread_gone() -> CornwallError {
    CornwallError::Io(io::Error::new(
        io::ErrorKind::BrokenPipe,
        "playback thread is not running",
    ))
}

/// Returns false on shutdown.
fn handle_cmd(supervisor: &Supervisor, cmd: PlaybackCmd) -> bool {
    match cmd {
        PlaybackCmd::PlayTrack {
            project,
            id,
            start,
            duration,
            reply,
        } => {
            let _ = reply.send(supervisor.play_track(&project, id, start, duration));
        }
        PlaybackCmd::PlayMix {
            project,
            output,
            start,
            reply,
        } => {
            let _ = reply.send(supervisor.play_mix(&project, output.as_deref(), start));
        }
        PlaybackCmd::Render {
            project,
            output,
            reply,
        } => {
            let _ = reply.send(supervisor.render(&project, output.as_deref()));
        }
        PlaybackCmd::PlayFile { path, reply } => {
            let _ = reply.send(supervisor.play_file(&path));
        }
        PlaybackCmd::Loop {
            project,
            target,
            reply,
        } => {
            let _ = reply.send(supervisor.start_loop(&project, target));
        }
        PlaybackCmd::Stop { reply } => {
            let _ = reply.send(supervisor.stop());
        }
        PlaybackCmd::Status { reply } => {
            let _ = reply.send(supervisor.status());
        }
        PlaybackCmd::Shutdown => return false,
    }
    true
}
