//! Offline mixdown.
//!
//! One active track is rendered straight to the output with its gain and
//! nothing else. Several active tracks are each rendered with gain and
//! effects into a scratch directory, then summed at equal weight with no
//! loudness compensation, so overlapping material can clip. The scratch
//! directory is removed on every exit path.

use std::path::{Path, PathBuf};

use cornwall_audio::{AudioEngine, RenderInput, RenderJob};
use cornwall_types::{EffectsChains, MixSettings, Track, TrackId};

use crate::effects;
use crate::mix::resolve;
use crate::store::ProjectHandle;
use crate::{CornwallError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    pub output: PathBuf,
    /// Tracks that went into the output, in render order.
    pub tracks: Vec<TrackId>,
}

impl RenderOutcome {
    pub fn is_mix(&self) -> bool {
        self.tracks.len() > 1
    }
}

/// Render the project's current mix to `output`, or to the mix settings'
/// output file. Reads state only.
pub fn render_project(
    engine: &dyn AudioEngine,
    project: &ProjectHandle,
    output: Option<&Path>,
) -> Result<RenderOutcome> {
    let (tracks, chains, mix) = project.snapshot()?;
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => project.mix_output(&mix),
    };
    render_tracks(engine, project, &tracks, &chains, &mix, &output)
}

pub fn render_tracks(
    engine: &dyn AudioEngine,
    project: &ProjectHandle,
    tracks: &[Track],
    chains: &EffectsChains,
    mix: &MixSettings,
    output: &Path,
) -> Result<RenderOutcome> {
    let active = resolve(tracks)?;

    let mut sources = Vec::with_capacity(active.len());
    for track in &active {
        let source = project
            .source_path(track)
            .ok_or(CornwallError::NoAudioSource(track.id))?;
        if !source.is_file() {
            return Err(CornwallError::SourceFileNotFound(source));
        }
        sources.push(source);
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let ids: Vec<TrackId> = active.iter().map(|t| t.id).collect();

    if let ([track], [source]) = (active.as_slice(), sources.as_slice()) {
        log::info!(target: "render", "track {} -> {}", track.id, output.display());
        let input = RenderInput::new(source, track.volume * mix.master_volume);
        engine.render(&RenderJob::single(input, output))?;
        return Ok(RenderOutcome {
            output: output.to_path_buf(),
            tracks: ids,
        });
    }

    // Compile every chain before the engine is asked to do anything.
    let mut inputs = Vec::with_capacity(active.len());
    for (track, source) in active.iter().zip(&sources) {
        let directives = effects::compile(chains.chain(track.id))?;
        inputs.push(
            RenderInput::new(source, track.volume * mix.master_volume).with_effects(directives),
        );
    }

    let scratch = tempfile::Builder::new().prefix("cornwall-mix").tempdir()?;
    let mut stems = Vec::with_capacity(inputs.len());
    for (track, input) in active.iter().zip(inputs) {
        let stem = scratch.path().join(format!("track_{}.wav", track.id));
        log::debug!(target: "render", "track {} -> {}", track.id, stem.display());
        engine.render(&RenderJob::single(input, &stem))?;
        stems.push(stem);
    }

    log::info!(target: "render", "mixing {} tracks -> {}", stems.len(), output.display());
    engine.render(&RenderJob::sum(stems, output))?;

    Ok(RenderOutcome {
        output: output.to_path_buf(),
        tracks: ids,
    })
}
