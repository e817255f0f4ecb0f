use cornwall_audio::probe;
use cornwall_core::playback::{PlaybackStatus, StopOutcome};
use cornwall_core::Result;

use super::Context;
use crate::args::PlayCmd;
use crate::report;

pub fn run(ctx: &Context, cmd: PlayCmd) -> Result<()> {
    let playback = ctx.playback();
    match cmd {
        PlayCmd::Track { id, range } => {
            let project = ctx.project()?;
            println!("Playing track {}...", id);
            playback.play_track(&project, id, range.start, range.duration)?;
        }
        PlayCmd::Mix {
            output,
            no_play,
            start,
        } => {
            let project = ctx.project()?;
            let outcome = if no_play {
                playback.render(&project, output.as_deref())?
            } else {
                playback.play_mix(&project, output.as_deref(), start)?
            };
            println!(
                "{}",
                report::rendered(&outcome, probe::wav_duration(&outcome.output))
            );
        }
        PlayCmd::Render { output } => {
            let project = ctx.project()?;
            let outcome = playback.render(&project, output.as_deref())?;
            println!(
                "{}",
                report::rendered(&outcome, probe::wav_duration(&outcome.output))
            );
        }
        PlayCmd::Loop { target } => {
            let project = ctx.project()?;
            let session = playback.start_loop(&project, target)?;
            println!(
                "Looping {} (pid {}). Stop with 'cornwall play stop'",
                session.target, session.pid
            );
        }
        PlayCmd::Stop => match playback.stop() {
            StopOutcome::Stopped(session) => {
                println!("Stopped playback (pid {})", session.pid)
            }
            StopOutcome::Strays(pids) => {
                let pids: Vec<String> = pids.iter().map(u32::to_string).collect();
                println!("Stopped unrecorded playback (pid {})", pids.join(", "))
            }
            StopOutcome::Stale(_) | StopOutcome::NothingPlaying => println!("Nothing playing"),
        },
        PlayCmd::Status => match playback.status() {
            PlaybackStatus::Playing(session) => {
                println!("Playing (pid {}): {}", session.pid, session.target)
            }
            PlaybackStatus::Idle => println!("Not playing"),
        },
        PlayCmd::File { path } => {
            println!("Playing {}...", path.display());
            playback.play_file(&path)?;
        }
    }
    Ok(())
}
