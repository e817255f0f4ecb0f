//! Which tracks are heard.

use cornwall_types::Track;

use crate::{CornwallError, Result};

/// Tracks to render, in input order.
///
/// Tracks without a source are dropped. If any remaining track is soloed,
/// exactly the soloed tracks are returned, muted or not. Otherwise every
/// unmuted track is returned.
pub fn resolve(tracks: &[Track]) -> Result<Vec<&Track>> {
    let renderable = tracks.iter().filter(|t| t.has_source());

    let active: Vec<&Track> = if tracks.iter().any(|t| t.has_source() && t.solo) {
        renderable.filter(|t| t.solo).collect()
    } else {
        renderable.filter(|t| !t.mute).collect()
    };

    if active.is_empty() {
        return Err(CornwallError::NothingToRender);
    }
    Ok(active)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cornwall_types::{TrackId, TrackType};

    fn track(id: u32, source: Option<&str>, mute: bool, solo: bool) -> Track {
        let mut t = Track::new(TrackId::new(id), &format!("t{}", id), TrackType::Audio);
        t.source = source.map(Into::into);
        t.mute = mute;
        t.solo = solo;
        t
    }

    fn ids(tracks: &[&Track]) -> Vec<u32> {
        tracks.iter().map(|t| t.id.get()).collect()
    }

    #[test]
    fn solo_overrides_mute() {
        let tracks = [
            track(1, Some("a"), true, true),
            track(2, Some("b"), false, false),
        ];
        assert_eq!(ids(&resolve(&tracks).unwrap()), [1]);
    }

    #[test]
    fn mute_without_solo() {
        let tracks = [
            track(1, Some("a"), true, false),
            track(2, Some("b"), false, false),
        ];
        assert_eq!(ids(&resolve(&tracks).unwrap()), [2]);
    }

    #[test]
    fn solo_on_sourceless_track_is_ignored() {
        let tracks = [
            track(1, None, false, true),
            track(2, Some("b"), false, false),
            track(3, Some("c"), true, false),
        ];
        assert_eq!(ids(&resolve(&tracks).unwrap()), [2]);
    }

    #[test]
    fn preserves_input_order() {
        let tracks = [
            track(5, Some("e"), false, true),
            track(2, Some("b"), false, false),
            track(3, Some("c"), true, true),
        ];
        assert_eq!(ids(&resolve(&tracks).unwrap()), [5, 3]);
    }

    #[test]
    fn nothing_to_render() {
        let all_muted = [track(1, Some("a"), true, false)];
        assert!(matches!(resolve(&all_muted), Err(CornwallError::NothingToRender)));

        let no_sources = [track(1, None, false, false), track(2, None, false, true)];
        assert!(matches!(resolve(&no_sources), Err(CornwallError::NothingToRender)));

        assert!(matches!(resolve(&[]), Err(CornwallError::NothingToRender)));
    }
}
