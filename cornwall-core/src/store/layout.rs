use std::path::{Path, PathBuf};

/// Well-known file locations under a Cornwall home directory.
#[derive(Debug, Clone)]
pub struct StateLayout {
    home: PathBuf,
}

impl StateLayout {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn state_dir(&self) -> PathBuf {
        self.home.join("state")
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.home.join("projects")
    }

    pub fn project_file(&self) -> PathBuf {
        self.state_dir().join("project.json")
    }

    pub fn tracks_file(&self) -> PathBuf {
        self.state_dir().join("tracks.json")
    }

    pub fn effects_file(&self) -> PathBuf {
        self.state_dir().join("effects.json")
    }

    pub fn mix_file(&self) -> PathBuf {
        self.state_dir().join("mix.json")
    }

    /// Background playback session record.
    pub fn session_file(&self) -> PathBuf {
        self.state_dir().join(".playback.json")
    }

    pub fn lock_file(&self) -> PathBuf {
        self.state_dir().join(".lock")
    }

    pub fn playback_lock_file(&self) -> PathBuf {
        self.state_dir().join(".playback.lock")
    }

    pub fn project_dir(&self, dir_name: &str) -> PathBuf {
        self.projects_dir().join(dir_name)
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.state_dir())?;
        std::fs::create_dir_all(self.projects_dir())
    }
}
