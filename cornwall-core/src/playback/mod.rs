//! Playback: foreground play, rendering on request, and supervision of the
//! single background loop.

mod handle;
mod session;
mod supervisor;

pub use handle::{PlaybackCmd, PlaybackHandle};
pub use session::{PlaybackSession, PlaybackTarget};
pub use supervisor::{PlaybackStatus, StopOutcome, Supervisor};
