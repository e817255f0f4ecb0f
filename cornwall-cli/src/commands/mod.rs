mod fx;
mod play;
mod project;
mod track;

use std::sync::Arc;

use cornwall_core::config::Config;
use cornwall_core::playback::{PlaybackHandle, Supervisor};
use cornwall_core::store::{ProjectHandle, StateStore};
use cornwall_core::Result;

use crate::args::Command;

pub struct Context {
    pub config: Config,
    pub store: StateStore,
}

impl Context {
    pub fn new(config: Config, store: StateStore) -> Self {
        Self { config, store }
    }

    pub fn project(&self) -> Result<ProjectHandle> {
        self.store.open()
    }

    pub fn playback(&self) -> PlaybackHandle {
        let engine = Arc::new(self.config.engine());
        PlaybackHandle::spawn(Supervisor::new(engine, self.store.layout().clone()))
    }
}

pub fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Project(cmd) => project::run(ctx, cmd),
        Command::Track(cmd) => track::run(ctx, cmd),
        Command::Fx(cmd) => fx::run(ctx, cmd),
        Command::Play(cmd) => play::run(ctx, cmd),
    }
}

pub(crate) fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
