use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use cornwall_types::TrackId;

/// What a background loop is playing. Persisted as a track id number, the
/// string `"mix"`, or a file path string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackTarget {
    Track(TrackId),
    Mix,
    File(PathBuf),
}

impl fmt::Display for PlaybackTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackTarget::Track(id) => write!(f, "track {}", id),
            PlaybackTarget::Mix => write!(f, "mix"),
            PlaybackTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// `mix`, a track id, or anything else as a file path.
impl FromStr for PlaybackTarget {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "mix" {
            Ok(PlaybackTarget::Mix)
        } else if let Ok(id) = s.parse::<TrackId>() {
            Ok(PlaybackTarget::Track(id))
        } else {
            Ok(PlaybackTarget::File(PathBuf::from(s)))
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawTarget {
    Id(u32),
    Text(String),
}

impl Serialize for PlaybackTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = match self {
            PlaybackTarget::Track(id) => RawTarget::Id(id.get()),
            PlaybackTarget::Mix => RawTarget::Text("mix".to_string()),
            PlaybackTarget::File(path) => RawTarget::Text(path.to_string_lossy().into_owned()),
        };
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PlaybackTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawTarget::deserialize(deserializer)? {
            RawTarget::Id(id) => PlaybackTarget::Track(TrackId::new(id)),
            RawTarget::Text(text) if text == "mix" => PlaybackTarget::Mix,
            RawTarget::Text(text) => PlaybackTarget::File(PathBuf::from(text)),
        })
    }
}

/// The one supervised background loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSession {
    pub pid: u32,
    pub target: PlaybackTarget,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_document_shapes() {
        let track = PlaybackSession {
            pid: 4242,
            target: PlaybackTarget::Track(TrackId::new(3)),
        };
        assert_eq!(
            serde_json::to_string(&track).unwrap(),
            r#"{"pid":4242,"target":3}"#
        );

        let mix: PlaybackSession = serde_json::from_str(r#"{"pid":1,"target":"mix"}"#).unwrap();
        assert_eq!(mix.target, PlaybackTarget::Mix);

        let file: PlaybackSession =
            serde_json::from_str(r#"{"pid":1,"target":"/tmp/x.wav"}"#).unwrap();
        assert_eq!(file.target, PlaybackTarget::File("/tmp/x.wav".into()));
    }

    #[test]
    fn parse_target() {
        assert_eq!("mix".parse::<PlaybackTarget>(), Ok(PlaybackTarget::Mix));
        assert_eq!("2".parse::<PlaybackTarget>(), Ok(PlaybackTarget::Track(TrackId::new(2))));
        assert_eq!(
            "take.wav".parse::<PlaybackTarget>(),
            Ok(PlaybackTarget::File("take.wav".into()))
        );
    }
}
