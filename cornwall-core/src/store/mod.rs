//! File-backed project state.
//!
//! Four JSON documents live under `<home>/state/`: the project, the track
//! list, the effects chains keyed by track id, and the mix settings. Every
//! mutation is a read-modify-write performed under an exclusive advisory
//! lock on `state/.lock`, with each document replaced atomically. Readers
//! take the same lock shared, so a track and its effects chain are always
//! observed together.
//!
//! [`StateStore`] finds or creates the project; everything else goes
//! through the [`ProjectHandle`] it returns.

mod json;
mod layout;
mod lock;

pub use layout::StateLayout;
pub use lock::FileLock;

pub(crate) use json::{read_opt, write_atomic};

use std::path::{Path, PathBuf};

use cornwall_types::{
    Effect, EffectsChains, MixSettings, Params, Project, Track, TrackId, TrackType, TrackUpdate,
};

use crate::config::ProjectDefaults;
use crate::{CornwallError, Result};

/// Subdirectory of a project directory holding imported sources.
pub const AUDIO_DIR: &str = "audio";

#[derive(Debug, Clone)]
pub struct StateStore {
    layout: StateLayout,
}

impl StateStore {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            layout: StateLayout::new(home),
        }
    }

    pub fn layout(&self) -> &StateLayout {
        &self.layout
    }

    /// Start a new project, replacing the current one. Tracks, effects and
    /// mix settings are reset.
    pub fn create_project(&self, name: &str, settings: ProjectDefaults) -> Result<ProjectHandle> {
        let name = name.trim();
        if name.is_empty() || name.contains(&['/', '\\'][..]) || name == "." || name == ".." {
            return Err(CornwallError::invalid_value("name", name));
        }
        self.layout.ensure_dirs()?;
        let _lock = FileLock::exclusive(&self.layout.lock_file())?;

        let project = Project::new(name, settings.bpm, settings.sample_rate, settings.time_sig);
        let project_dir = self.layout.project_dir(&project.project_dir);
        std::fs::create_dir_all(project_dir.join(AUDIO_DIR))?;

        write_atomic(&self.layout.project_file(), &project)?;
        write_atomic(&self.layout.tracks_file(), &Vec::<Track>::new())?;
        write_atomic(&self.layout.effects_file(), &EffectsChains::new())?;
        write_atomic(&self.layout.mix_file(), &MixSettings::default())?;

        log::info!(target: "store", "created project '{}' in {}", name, project_dir.display());
        Ok(ProjectHandle {
            layout: self.layout.clone(),
            project,
        })
    }

    /// Handle on the current project.
    pub fn open(&self) -> Result<ProjectHandle> {
        let _lock = self.shared_lock()?;
        let project: Project =
            read_opt(&self.layout.project_file())?.ok_or(CornwallError::NoProjectLoaded)?;
        Ok(ProjectHandle {
            layout: self.layout.clone(),
            project,
        })
    }

    /// Check that a project directory called `name` exists, then return the
    /// current project. State is not switched: the documents under `state/`
    /// always describe the most recently created project.
    pub fn open_project(&self, name: &str) -> Result<ProjectHandle> {
        if name.is_empty() || !self.layout.project_dir(name).is_dir() {
            return Err(CornwallError::ProjectNotFound {
                name: name.to_string(),
                available: self.list_projects()?,
            });
        }
        self.open()
    }

    /// Names of the directories under `projects/`, sorted.
    pub fn list_projects(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(self.layout.projects_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn shared_lock(&self) -> Result<Option<FileLock>> {
        // Nothing to lock against before the first project exists.
        if !self.layout.state_dir().is_dir() {
            return Ok(None);
        }
        Ok(Some(FileLock::shared(&self.layout.lock_file())?))
    }
}

/// The loaded project. All track, effect and mix operations go through it.
#[derive(Debug, Clone)]
pub struct ProjectHandle {
    layout: StateLayout,
    project: Project,
}

impl ProjectHandle {
    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn layout(&self) -> &StateLayout {
        &self.layout
    }

    pub fn project_dir(&self) -> PathBuf {
        self.layout.project_dir(&self.project.project_dir)
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.project_dir().join(AUDIO_DIR)
    }

    /// Absolute location of a project-relative path.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir().join(path)
        }
    }

    /// Absolute location of a track's source, if it has one.
    pub fn source_path(&self, track: &Track) -> Option<PathBuf> {
        track.source.as_deref().map(|s| self.resolve_path(s))
    }

    /// Default render destination from the mix settings.
    pub fn mix_output(&self, mix: &MixSettings) -> PathBuf {
        self.resolve_path(&mix.output_file)
    }

    // --- Project ---

    /// Change one project setting. Keys: `name`, `bpm`, `sample-rate`,
    /// `time-sig`. The change is applied to the document as it is on disk,
    /// and this handle's copy is refreshed from it.
    pub fn set_project_field(&mut self, key: &str, value: &str) -> Result<()> {
        let _lock = self.write_lock()?;
        let mut project: Project =
            read_opt(&self.layout.project_file())?.ok_or(CornwallError::NoProjectLoaded)?;
        match key {
            "name" => {
                let name = value.trim();
                if name.is_empty() {
                    return Err(CornwallError::invalid_value(key, value));
                }
                project.name = name.to_string();
            }
            "bpm" => project.bpm = parse_positive(key, value)?,
            "sample-rate" => project.sample_rate = parse_positive(key, value)?,
            "time-sig" => {
                let sig: cornwall_types::TimeSignature = value
                    .parse()
                    .map_err(|_| CornwallError::invalid_value(key, value))?;
                project.time_sig = sig.to_string();
            }
            other => return Err(CornwallError::InvalidProjectKey(other.to_string())),
        }

        write_atomic(&self.layout.project_file(), &project)?;
        log::debug!(target: "store", "project {} = {}", key, value);
        self.project = project;
        Ok(())
    }

    // --- Tracks ---

    pub fn tracks(&self) -> Result<Vec<Track>> {
        let _lock = self.read_lock()?;
        self.load_tracks()
    }

    pub fn track(&self, id: TrackId) -> Result<Track> {
        let _lock = self.read_lock()?;
        find(&self.load_tracks()?, id).cloned()
    }

    /// Append a track with the next id and an empty effects chain.
    pub fn add_track(&self, name: &str, track_type: &str) -> Result<Track> {
        let track_type: TrackType = track_type
            .parse()
            .map_err(|_| CornwallError::InvalidType(track_type.to_string()))?;

        let _lock = self.write_lock()?;
        let mut tracks = self.load_tracks()?;
        let mut chains = self.load_chains()?;

        let highest = tracks.iter().map(|t| t.id).max();
        let id = TrackId::next_after(highest).ok_or_else(|| {
            CornwallError::invalid_value("track id", format!("no id after {}", u32::MAX))
        })?;
        let track = Track::new(id, name, track_type);
        tracks.push(track.clone());
        chains.insert_empty(id);

        // Chain first: an interrupted add can only leave an unused chain.
        write_atomic(&self.layout.effects_file(), &chains)?;
        write_atomic(&self.layout.tracks_file(), &tracks)?;
        log::info!(target: "store", "added track {} '{}' ({})", id, name, track_type);
        Ok(track)
    }

    /// Delete a track together with its effects chain.
    pub fn remove_track(&self, id: TrackId) -> Result<Track> {
        let _lock = self.write_lock()?;
        let mut tracks = self.load_tracks()?;
        let index = tracks
            .iter()
            .position(|t| t.id == id)
            .ok_or(CornwallError::TrackNotFound(id))?;
        let removed = tracks.remove(index);

        let mut chains = self.load_chains()?;
        chains.remove(id);

        // Track first: an interrupted remove can only leave an unused chain.
        write_atomic(&self.layout.tracks_file(), &tracks)?;
        write_atomic(&self.layout.effects_file(), &chains)?;
        log::info!(target: "store", "removed track {} '{}'", id, removed.name);
        Ok(removed)
    }

    /// Set one track field. Volume and pan are stored as given.
    pub fn update_track(&self, id: TrackId, update: TrackUpdate) -> Result<Track> {
        let _lock = self.write_lock()?;
        let mut tracks = self.load_tracks()?;
        let track = tracks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(CornwallError::TrackNotFound(id))?;
        track.apply(&update);
        let updated = track.clone();

        write_atomic(&self.layout.tracks_file(), &tracks)?;
        log::debug!(target: "store", "track {}: {:?}", id, update);
        Ok(updated)
    }

    /// Copy `file` into the project's audio directory and make the copy the
    /// track's source. A different file already stored under the same name
    /// is kept; the new copy gets a numbered name (`take-2.wav`).
    pub fn import_source(&self, id: TrackId, file: &Path) -> Result<Track> {
        let _lock = self.write_lock()?;
        let mut tracks = self.load_tracks()?;
        let track = tracks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(CornwallError::TrackNotFound(id))?;

        if !file.is_file() {
            return Err(CornwallError::SourceFileNotFound(file.to_path_buf()));
        }
        let audio_dir = self.audio_dir();
        std::fs::create_dir_all(&audio_dir)?;
        let dest = import_destination(&audio_dir, file)?;
        if !dest.exists() {
            std::fs::copy(file, &dest)?;
        }

        let stored_name = dest
            .file_name()
            .ok_or_else(|| CornwallError::SourceFileNotFound(dest.clone()))?;
        let relative = Path::new(AUDIO_DIR).join(stored_name);
        track.apply(&TrackUpdate::Source(relative));
        let updated = track.clone();

        write_atomic(&self.layout.tracks_file(), &tracks)?;
        log::info!(target: "store", "imported {} into track {}", file.display(), id);
        Ok(updated)
    }

    // --- Effects ---

    pub fn effects_chains(&self) -> Result<EffectsChains> {
        let _lock = self.read_lock()?;
        self.load_chains()
    }

    pub fn effects(&self, id: TrackId) -> Result<Vec<Effect>> {
        let _lock = self.read_lock()?;
        find(&self.load_tracks()?, id)?;
        Ok(self.load_chains()?.chain(id).to_vec())
    }

    /// Append to the end of the track's chain. Names are not checked here;
    /// unknown effects fail when the chain is compiled.
    pub fn add_effect(&self, id: TrackId, name: &str, params: Params) -> Result<Effect> {
        let _lock = self.write_lock()?;
        find(&self.load_tracks()?, id)?;
        let mut chains = self.load_chains()?;
        let effect = Effect::new(name, params);
        chains.chain_mut(id).push(effect.clone());

        write_atomic(&self.layout.effects_file(), &chains)?;
        log::debug!(target: "store", "track {}: added effect {}", id, name);
        Ok(effect)
    }

    pub fn remove_effect(&self, id: TrackId, index: usize) -> Result<Effect> {
        let _lock = self.write_lock()?;
        find(&self.load_tracks()?, id)?;
        let mut chains = self.load_chains()?;
        let chain = chains.chain_mut(id);
        if index >= chain.len() {
            return Err(CornwallError::EffectIndexOutOfRange {
                index,
                len: chain.len(),
            });
        }
        let removed = chain.remove(index);

        write_atomic(&self.layout.effects_file(), &chains)?;
        log::debug!(target: "store", "track {}: removed effect [{}] {}", id, index, removed.name);
        Ok(removed)
    }

    pub fn clear_effects(&self, id: TrackId) -> Result<()> {
        let _lock = self.write_lock()?;
        find(&self.load_tracks()?, id)?;
        let mut chains = self.load_chains()?;
        chains.chain_mut(id).clear();
        write_atomic(&self.layout.effects_file(), &chains)
    }

    // --- Mix ---

    pub fn mix_settings(&self) -> Result<MixSettings> {
        let _lock = self.read_lock()?;
        json::read_or_default(&self.layout.mix_file())
    }

    pub fn update_mix<F>(&self, f: F) -> Result<MixSettings>
    where
        F: FnOnce(&mut MixSettings),
    {
        let _lock = self.write_lock()?;
        let mut mix: MixSettings = json::read_or_default(&self.layout.mix_file())?;
        f(&mut mix);
        write_atomic(&self.layout.mix_file(), &mix)?;
        Ok(mix)
    }

    /// Tracks, chains and mix settings read under one lock.
    pub fn snapshot(&self) -> Result<(Vec<Track>, EffectsChains, MixSettings)> {
        let _lock = self.read_lock()?;
        Ok((
            self.load_tracks()?,
            self.load_chains()?,
            json::read_or_default(&self.layout.mix_file())?,
        ))
    }

    fn load_tracks(&self) -> Result<Vec<Track>> {
        json::read_or_default(&self.layout.tracks_file())
    }

    fn load_chains(&self) -> Result<EffectsChains> {
        json::read_or_default(&self.layout.effects_file())
    }

    fn read_lock(&self) -> Result<FileLock> {
        let lock = FileLock::shared(&self.layout.lock_file())?;
        self.require_project()?;
        Ok(lock)
    }

    fn write_lock(&self) -> Result<FileLock> {
        let lock = FileLock::exclusive(&self.layout.lock_file())?;
        self.require_project()?;
        Ok(lock)
    }

    fn require_project(&self) -> Result<()> {
        if self.layout.project_file().is_file() {
            Ok(())
        } else {
            Err(CornwallError::NoProjectLoaded)
        }
    }
}

fn find(tracks: &[Track], id: TrackId) -> Result<&Track> {
    tracks
        .iter()
        .find(|t| t.id == id)
        .ok_or(CornwallError::TrackNotFound(id))
}

fn parse_positive(key: &str, value: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CornwallError::invalid_value(key, value)),
    }
}

/// Where an import of `file` lands in `audio_dir`: the plain file name if
/// that is free or already holds the same file or identical bytes,
/// otherwise the first free `<stem>-N.<ext>`.
fn import_destination(audio_dir: &Path, file: &Path) -> Result<PathBuf> {
    let file_name = file
        .file_name()
        .ok_or_else(|| CornwallError::SourceFileNotFound(file.to_path_buf()))?;
    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = name.extension().map(|e| e.to_string_lossy().into_owned());

    let mut n = 1u32;
    loop {
        let candidate = if n == 1 {
            audio_dir.join(name)
        } else {
            match &ext {
                Some(ext) => audio_dir.join(format!("{}-{}.{}", stem, n, ext)),
                None => audio_dir.join(format!("{}-{}", stem, n)),
            }
        };
        if !candidate.exists() || same_file(file, &candidate) || same_contents(file, &candidate)? {
            return Ok(candidate);
        }
        n += 1;
    }
}

fn same_contents(a: &Path, b: &Path) -> Result<bool> {
    if std::fs::metadata(a)?.len() != std::fs::metadata(b)?.len() {
        return Ok(false);
    }
    Ok(std::fs::read(a)? == std::fs::read(b)?)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, StateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path());
        (dir, store)
    }

    fn defaults() -> ProjectDefaults {
        ProjectDefaults {
            bpm: 110,
            sample_rate: 48000,
            time_sig: "3/4".parse().unwrap(),
        }
    }

    #[test]
    fn open_without_project_fails() {
        let (_dir, store) = store();
        assert!(matches!(store.open(), Err(CornwallError::NoProjectLoaded)));
    }

    #[test]
    fn create_writes_all_documents() {
        let (dir, store) = store();
        let handle = store.create_project("folk-session", defaults()).unwrap();
        assert_eq!(handle.project().bpm, 110);
        assert!(handle.audio_dir().is_dir());

        let reopened = store.open().unwrap();
        assert_eq!(reopened.project(), handle.project());
        assert!(reopened.tracks().unwrap().is_empty());
        assert!(reopened.effects_chains().unwrap().is_empty());
        assert_eq!(reopened.mix_settings().unwrap(), MixSettings::default());
        assert!(dir.path().join("state/mix.json").is_file());
    }

    #[test]
    fn create_rejects_path_like_names() {
        let (_dir, store) = store();
        for bad in ["", "  ", "a/b", ".."] {
            assert!(matches!(
                store.create_project(bad, defaults()),
                Err(CornwallError::InvalidValue { .. })
            ));
        }
    }

    #[test]
    fn set_project_fields() {
        let (_dir, store) = store();
        let mut handle = store.create_project("reel", defaults()).unwrap();

        handle.set_project_field("bpm", "140").unwrap();
        handle.set_project_field("time-sig", "6/8").unwrap();
        handle.set_project_field("name", "reel-2").unwrap();

        let project = store.open().unwrap().project().clone();
        assert_eq!(project.bpm, 140);
        assert_eq!(project.time_sig, "6/8");
        assert_eq!(project.name, "reel-2");
        // assets stay where they were created
        assert_eq!(project.project_dir, "reel");
    }

    #[test]
    fn set_project_field_validation() {
        let (_dir, store) = store();
        let mut handle = store.create_project("reel", defaults()).unwrap();
        assert!(matches!(
            handle.set_project_field("tempo", "1"),
            Err(CornwallError::InvalidProjectKey(_))
        ));
        assert!(matches!(
            handle.set_project_field("bpm", "fast"),
            Err(CornwallError::InvalidValue { .. })
        ));
        assert!(matches!(
            handle.set_project_field("time-sig", "4"),
            Err(CornwallError::InvalidValue { .. })
        ));
        assert_eq!(handle.project().bpm, 110);
    }

    #[test]
    fn add_track_rejects_unknown_type() {
        let (_dir, store) = store();
        let handle = store.create_project("p", defaults()).unwrap();
        assert!(matches!(
            handle.add_track("drums", "sampler"),
            Err(CornwallError::InvalidType(t)) if t == "sampler"
        ));
        assert!(handle.tracks().unwrap().is_empty());
    }

    #[test]
    fn missing_track_is_named() {
        let (_dir, store) = store();
        let handle = store.create_project("p", defaults()).unwrap();
        let id = TrackId::new(9);
        for result in [
            handle.track(id).map(|_| ()),
            handle.update_track(id, TrackUpdate::Mute(true)).map(|_| ()),
            handle.remove_track(id).map(|_| ()),
            handle.add_effect(id, "reverb", Params::new()).map(|_| ()),
            handle.clear_effects(id),
        ] {
            assert!(matches!(result, Err(CornwallError::TrackNotFound(t)) if t == id));
        }
    }

    #[test]
    fn effect_index_out_of_range() {
        let (_dir, store) = store();
        let handle = store.create_project("p", defaults()).unwrap();
        let id = handle.add_track("fiddle", "audio").unwrap().id;
        handle.add_effect(id, "reverb", Params::new()).unwrap();
        assert!(matches!(
            handle.remove_effect(id, 1),
            Err(CornwallError::EffectIndexOutOfRange { index: 1, len: 1 })
        ));
    }

    #[test]
    fn deleted_project_document_fails_mutations() {
        let (dir, store) = store();
        let handle = store.create_project("p", defaults()).unwrap();
        std::fs::remove_file(dir.path().join("state/project.json")).unwrap();
        assert!(matches!(
            handle.add_track("x", "audio"),
            Err(CornwallError::NoProjectLoaded)
        ));
    }

    #[test]
    fn open_project_checks_directory() {
        let (_dir, store) = store();
        store.create_project("reel", defaults()).unwrap();
        assert_eq!(store.open_project("reel").unwrap().project().name, "reel");
        match store.open_project("jig") {
            Err(CornwallError::ProjectNotFound { name, available }) => {
                assert_eq!(name, "jig");
                assert_eq!(available, ["reel"]);
            }
            other => panic!("expected ProjectNotFound, got {:?}", other.map(|h| h.project().clone())),
        }
    }

    #[test]
    fn mix_settings_update() {
        let (_dir, store) = store();
        let handle = store.create_project("p", defaults()).unwrap();
        handle
            .update_mix(|mix| {
                mix.master_volume = 0.8;
                mix.set_format(cornwall_types::OutputFormat::Flac);
            })
            .unwrap();
        let mix = handle.mix_settings().unwrap();
        assert_eq!(mix.master_volume, 0.8);
        assert_eq!(mix.output_file, PathBuf::from("mix.flac"));
        assert_eq!(handle.mix_output(&mix), handle.project_dir().join("mix.flac"));
    }
}
