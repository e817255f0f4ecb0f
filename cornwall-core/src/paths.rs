use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Environment override for the Cornwall home directory.
pub const HOME_ENV: &str = "CORNWALL_HOME";

/// `~/.config/cornwall` (or the platform equivalent).
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cornwall")
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cornwall").join("config.toml"))
}

pub fn log_path() -> PathBuf {
    config_dir().join("cornwall.log")
}

/// Root holding `state/` and `projects/`.
///
/// Fallback chain:
/// 1. `--home` flag
/// 2. `CORNWALL_HOME` env var
/// 3. `[paths].home` in config
/// 4. `<data_dir>/cornwall`
/// 5. `./cornwall`
pub fn resolve_home(flag: Option<&Path>, config: &Config) -> PathBuf {
    resolve_home_with(flag, std::env::var_os(HOME_ENV), config.home())
}

fn resolve_home_with(
    flag: Option<&Path>,
    env: Option<OsString>,
    configured: Option<PathBuf>,
) -> PathBuf {
    if let Some(flag) = flag {
        return flag.to_path_buf();
    }
    if let Some(env) = env.filter(|v| !v.is_empty()) {
        return PathBuf::from(env);
    }
    if let Some(configured) = configured {
        return configured;
    }
    dirs::data_dir()
        .map(|d| d.join("cornwall"))
        .unwrap_or_else(|| PathBuf::from("cornwall"))
}

pub fn expand_tilde(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_everything() {
        let home = resolve_home_with(
            Some(Path::new("/flag")),
            Some("/env".into()),
            Some(PathBuf::from("/cfg")),
        );
        assert_eq!(home, PathBuf::from("/flag"));
    }

    #[test]
    fn env_then_config() {
        assert_eq!(
            resolve_home_with(None, Some("/env".into()), Some(PathBuf::from("/cfg"))),
            PathBuf::from("/env")
        );
        assert_eq!(
            resolve_home_with(None, Some("".into()), Some(PathBuf::from("/cfg"))),
            PathBuf::from("/cfg")
        );
    }

    #[test]
    fn falls_back_to_data_dir() {
        let home = resolve_home_with(None, None, None);
        assert!(home.ends_with("cornwall"));
    }

    #[test]
    fn tilde_expansion() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/music"), home.join("music"));
        }
        assert_eq!(expand_tilde("~user/x"), PathBuf::from("~user/x"));
    }
}
