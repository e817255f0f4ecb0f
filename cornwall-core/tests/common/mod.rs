#![allow(dead_code)]
//! Fixtures for cornwall-core integration tests.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use cornwall_core::config::ProjectDefaults;
use cornwall_core::store::{ProjectHandle, StateStore};
use cornwall_types::Track;
use tempfile::TempDir;

pub struct Fixture {
    pub home: TempDir,
    /// Stands in for files outside the project (recordings to import).
    pub outside: TempDir,
    pub store: StateStore,
    pub project: ProjectHandle,
}

pub fn defaults() -> ProjectDefaults {
    ProjectDefaults {
        bpm: 120,
        sample_rate: 8000,
        time_sig: Default::default(),
    }
}

/// Fresh home with a project called `session`.
pub fn project() -> Fixture {
    let home = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();
    let store = StateStore::new(home.path());
    let project = store.create_project("session", defaults()).unwrap();
    Fixture {
        home,
        outside,
        store,
        project,
    }
}

impl Fixture {
    /// Write a mono 16-bit WAV outside the project.
    pub fn recording(&self, name: &str, samples: &[i16]) -> PathBuf {
        let path = self.outside.path().join(name);
        write_wav(&path, samples);
        path
    }

    /// Add an audio track and import a recording of `samples` into it.
    pub fn audio_track(&self, name: &str, samples: &[i16]) -> Track {
        let track = self.project.add_track(name, "audio").unwrap();
        let file = self.recording(&format!("{}.wav", name), samples);
        self.project.import_source(track.id, &file).unwrap()
    }

    pub fn mix_path(&self) -> PathBuf {
        self.project.project_dir().join("mix.wav")
    }
}

pub fn write_wav(path: &Path, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for s in samples {
        writer.write_sample(*s).unwrap();
    }
    writer.finalize().unwrap();
}

pub fn read_wav(path: &Path) -> Vec<i16> {
    hound::WavReader::open(path)
        .unwrap()
        .samples::<i16>()
        .map(|s| s.unwrap())
        .collect()
}

pub fn wait_until(timeout: Duration, mut f: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if f() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    f()
}
