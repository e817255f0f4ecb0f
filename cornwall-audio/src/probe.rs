//! Header inspection for rendered files.

use std::path::Path;
use std::time::Duration;

/// Length of a WAV file from its header. `None` for anything hound cannot
/// open (other formats, missing or truncated files).
pub fn wav_duration(path: &Path) -> Option<Duration> {
    let reader = hound::WavReader::open(path).ok()?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return None;
    }
    // duration() is in frames (samples per channel)
    let frames = reader.duration() as f64;
    Some(Duration::from_secs_f64(frames / spec.sample_rate as f64))
}
