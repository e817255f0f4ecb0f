//! # cornwall-core
//!
//! Project state and mix rendering for Cornwall.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cornwall_core::config::Config;
//! use cornwall_core::playback::{PlaybackHandle, PlaybackTarget, Supervisor};
//! use cornwall_core::store::StateStore;
//!
//! let config = Config::load();
//! let store = StateStore::new(cornwall_core::paths::resolve_home(None, &config));
//! let project = store.create_project("folk-session", config.project_defaults())?;
//! let track = project.add_track("fiddle", "audio")?;
//! project.import_source(track.id, "takes/fiddle.wav".as_ref())?;
//!
//! let playback = PlaybackHandle::spawn(Supervisor::new(
//!     Arc::new(config.engine()),
//!     store.layout().clone(),
//! ));
//! playback.start_loop(&project, PlaybackTarget::Mix)?;
//! ```
//!
//! ## Module Overview
//!
//! - [`store`]: the JSON documents (`StateStore`, `ProjectHandle`)
//! - [`mix`]: mute/solo resolution
//! - [`effects`]: effects chains to engine directives
//! - [`render`]: single-track and multi-track mixdown
//! - [`playback`]: foreground play and the background loop supervisor
//! - [`config`]: embedded and user TOML settings
//! - [`paths`]: home, config and log locations

pub mod config;
pub mod effects;
pub mod error;
pub mod mix;
pub mod paths;
pub mod playback;
pub mod render;
pub mod store;

pub use error::{CornwallError, Result};
