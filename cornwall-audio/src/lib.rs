//! # cornwall-audio
//!
//! The audio engine seam. Cornwall never touches samples itself: rendering,
//! live playback and background looping are delegated to an [`AudioEngine`].
//! [`SoxEngine`] drives the external SoX tools; [`TestEngine`] performs the
//! gain/sum subset on WAV files in-process and records every request.

pub mod engine;
pub mod probe;
pub mod process;

pub use engine::sox::SoxEngine;
pub use engine::test_engine::{EngineOp, TestEngine};
pub use engine::{
    AudioEngine, EffectDirective, EngineError, EngineResult, PlayRequest, RenderInput, RenderJob,
};
