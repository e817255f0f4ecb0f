use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use cornwall_core::playback::PlaybackTarget;
use cornwall_types::{OutputFormat, TrackId};

#[derive(Parser, Debug)]
#[command(
    name = "cornwall",
    version,
    about = "Command-line audio production assistant"
)]
pub struct Cli {
    /// Log at debug level (to ~/.config/cornwall/cornwall.log)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding state/ and projects/ (overrides CORNWALL_HOME)
    #[arg(long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create and configure the project
    #[command(subcommand)]
    Project(ProjectCmd),
    /// Manage tracks
    #[command(subcommand)]
    Track(TrackCmd),
    /// Manage per-track effects chains
    #[command(subcommand)]
    Fx(FxCmd),
    /// Playback and rendering
    #[command(subcommand)]
    Play(PlayCmd),
}

#[derive(Args, Debug)]
pub struct JsonFlag {
    /// Output as raw JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCmd {
    /// Create a new project and make it current
    Create {
        name: String,
        /// Tempo in BPM [default: from config, 120]
        #[arg(long)]
        bpm: Option<u32>,
        /// Sample rate in Hz [default: from config, 44100]
        #[arg(long)]
        sample_rate: Option<u32>,
        /// Time signature N/D [default: from config, 4/4]
        #[arg(long)]
        time_sig: Option<String>,
    },
    /// Show current project settings
    Info(JsonFlag),
    /// Change a project setting (name, bpm, sample-rate, time-sig)
    Set { key: String, value: String },
    /// Check that a project exists and show the current project
    Open { name: String },
    /// Show or change mix settings
    Mix {
        /// Master volume applied to every track during render
        #[arg(long, value_parser = parse_finite, allow_negative_numbers = true)]
        master_volume: Option<f32>,
        /// Output format: wav, flac or mp3
        #[arg(long)]
        format: Option<OutputFormat>,
        /// Render destination, relative to the project directory
        #[arg(long)]
        output_file: Option<PathBuf>,
        #[command(flatten)]
        json: JsonFlag,
    },
}

#[derive(Subcommand, Debug)]
pub enum TrackCmd {
    /// Add a new track
    Add {
        name: String,
        /// audio, midi or synth
        #[arg(long = "type", default_value = "audio")]
        track_type: String,
    },
    /// List all tracks
    List(JsonFlag),
    /// Remove a track and its effects chain
    Remove { id: TrackId },
    Solo { id: TrackId },
    Unsolo { id: TrackId },
    Mute { id: TrackId },
    Unmute { id: TrackId },
    /// Set track volume (linear gain, 1.0 = unity)
    Volume {
        id: TrackId,
        #[arg(value_parser = parse_finite, allow_negative_numbers = true)]
        value: f32,
    },
    /// Set track pan (-1.0 left to 1.0 right)
    Pan {
        id: TrackId,
        #[arg(value_parser = parse_finite, allow_negative_numbers = true)]
        value: f32,
    },
    Rename { id: TrackId, name: String },
    /// Show track details and effects chain
    Info {
        id: TrackId,
        #[command(flatten)]
        json: JsonFlag,
    },
    /// Copy an audio file into the project and use it as the track source
    Import { id: TrackId, file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum FxCmd {
    /// Append an effect: fx add <track> <effect> [key=value ...]
    Add {
        track: TrackId,
        effect: String,
        #[arg(allow_hyphen_values = true)]
        params: Vec<String>,
    },
    /// Remove the effect at a chain index
    Remove { track: TrackId, index: usize },
    /// Show a track's effects chain
    List {
        track: TrackId,
        #[command(flatten)]
        json: JsonFlag,
    },
    /// Remove every effect from a track
    Clear { track: TrackId },
    /// Play a track through its effects chain
    Preview {
        track: TrackId,
        #[command(flatten)]
        range: PlayRange,
    },
    /// List available effects and their parameters
    Catalog(JsonFlag),
}

#[derive(Args, Debug)]
pub struct PlayRange {
    /// Start position in seconds
    #[arg(long, value_parser = parse_seconds)]
    pub start: Option<f64>,
    /// Seconds to play
    #[arg(long, value_parser = parse_seconds)]
    pub duration: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum PlayCmd {
    /// Play a single track
    Track {
        id: TrackId,
        #[command(flatten)]
        range: PlayRange,
    },
    /// Render and play the full mix
    Mix {
        /// Output file path
        #[arg(long)]
        output: Option<PathBuf>,
        /// Render only, don't play
        #[arg(long)]
        no_play: bool,
        /// Start position in seconds
        #[arg(long, value_parser = parse_seconds)]
        start: Option<f64>,
    },
    /// Render the mix to a file without playing
    Render {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Loop a track, the mix, or a file in the background
    Loop {
        /// Track id, "mix", or a file path
        target: PlaybackTarget,
    },
    /// Stop background playback
    Stop,
    /// Report background playback
    Status,
    /// Play any audio file
    File { path: PathBuf },
}

fn parse_finite(s: &str) -> Result<f32, String> {
    match s.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("'{}' is not a number", s)),
    }
}

fn parse_seconds(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(format!("'{}' is not a non-negative number of seconds", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("cornwall").chain(args.iter().copied()))
    }

    #[test]
    fn clap_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn negative_pan_is_a_value() {
        let cli = parse(&["track", "pan", "2", "-0.5"]).unwrap();
        match cli.command {
            Command::Track(TrackCmd::Pan { id, value }) => {
                assert_eq!(id, TrackId::new(2));
                assert_eq!(value, -0.5);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn loop_target_forms() {
        let targets: Vec<PlaybackTarget> = ["mix", "3", "take.wav"]
            .iter()
            .map(|t| match parse(&["play", "loop", t]).unwrap().command {
                Command::Play(PlayCmd::Loop { target }) => target,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(
            targets,
            [
                PlaybackTarget::Mix,
                PlaybackTarget::Track(TrackId::new(3)),
                PlaybackTarget::File("take.wav".into()),
            ]
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse(&["track", "volume", "1", "loud"]).is_err());
        assert!(parse(&["track", "volume", "1", "nan"]).is_err());
        assert!(parse(&["track", "solo", "x"]).is_err());
        assert!(parse(&["play", "track", "1", "--start", "-2"]).is_err());
        assert!(parse(&["project", "mix", "--format", "ogg"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["track", "list", "--json", "--home", "/tmp/cw", "-v"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.home, Some(PathBuf::from("/tmp/cw")));
    }

    #[test]
    fn fx_params_are_collected() {
        let cli = parse(&["fx", "add", "1", "pitch", "cents=-200", "x=1"]).unwrap();
        match cli.command {
            Command::Fx(FxCmd::Add { params, .. }) => assert_eq!(params, ["cents=-200", "x=1"]),
            other => panic!("unexpected {:?}", other),
        }
    }
}
