use std::path::{Path, PathBuf};

use serde::Deserialize;

use cornwall_audio::SoxEngine;
use cornwall_types::project::{DEFAULT_BPM, DEFAULT_SAMPLE_RATE};
use cornwall_types::TimeSignature;

use crate::paths;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    defaults: DefaultsConfig,
    #[serde(default)]
    engine: EngineConfig,
    #[serde(default)]
    paths: PathsConfig,
}

#[derive(Deserialize, Default)]
struct DefaultsConfig {
    bpm: Option<u32>,
    sample_rate: Option<u32>,
    time_sig: Option<String>,
}

#[derive(Deserialize, Default)]
struct EngineConfig {
    sox: Option<String>,
    play: Option<String>,
    loop_repeat: Option<u32>,
}

#[derive(Deserialize, Default)]
struct PathsConfig {
    home: Option<String>,
}

/// Settings applied to newly created projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectDefaults {
    pub bpm: u32,
    pub sample_rate: u32,
    pub time_sig: TimeSignature,
}

pub struct Config {
    defaults: DefaultsConfig,
    engine: EngineConfig,
    paths: PathsConfig,
}

impl Config {
    /// Embedded defaults overlaid with the user's config file, if any.
    pub fn load() -> Self {
        Self::load_from(paths::user_config_path().as_deref())
    }

    pub fn load_from(user_path: Option<&Path>) -> Self {
        let mut base: ConfigFile = toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|e| {
            log::error!(target: "config", "embedded config.toml is invalid: {}", e);
            ConfigFile::default()
        });

        if let Some(path) = user_path {
            if path.exists() {
                match std::fs::read_to_string(path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => {
                            merge_defaults(&mut base.defaults, user.defaults);
                            merge_engine(&mut base.engine, user.engine);
                            if user.paths.home.is_some() {
                                base.paths.home = user.paths.home;
                            }
                        }
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        Config {
            defaults: base.defaults,
            engine: base.engine,
            paths: base.paths,
        }
    }

    pub fn project_defaults(&self) -> ProjectDefaults {
        let time_sig = match self.defaults.time_sig.as_deref() {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                log::warn!(target: "config", "ignoring defaults.time_sig: {}", e);
                TimeSignature::default()
            }),
            None => TimeSignature::default(),
        };
        ProjectDefaults {
            bpm: self.defaults.bpm.unwrap_or(DEFAULT_BPM),
            sample_rate: self.defaults.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE),
            time_sig,
        }
    }

    pub fn engine(&self) -> SoxEngine {
        let engine = SoxEngine::new(
            self.engine.sox.as_deref().unwrap_or("sox"),
            self.engine.play.as_deref().unwrap_or("play"),
        );
        match self.engine.loop_repeat {
            Some(count) => engine.with_loop_repeat(count),
            None => engine,
        }
    }

    /// `[paths].home`, with a leading `~` expanded.
    pub fn home(&self) -> Option<PathBuf> {
        self.paths.home.as_deref().map(paths::expand_tilde)
    }
}

fn merge_defaults(base: &mut DefaultsConfig, user: DefaultsConfig) {
    if user.bpm.is_some() {
        base.bpm = user.bpm;
    }
    if user.sample_rate.is_some() {
        base.sample_rate = user.sample_rate;
    }
    if user.time_sig.is_some() {
        base.time_sig = user.time_sig;
    }
}

fn merge_engine(base: &mut EngineConfig, user: EngineConfig) {
    if user.sox.is_some() {
        base.sox = user.sox;
    }
    if user.play.is_some() {
        base.play = user.play;
    }
    if user.loop_repeat.is_some() {
        base.loop_repeat = user.loop_repeat;
    }
}
