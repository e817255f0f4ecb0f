use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Wav,
    Flac,
    Mp3,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Wav => "wav",
            OutputFormat::Flac => "flac",
            OutputFormat::Mp3 => "mp3",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wav" => Ok(OutputFormat::Wav),
            "flac" => Ok(OutputFormat::Flac),
            "mp3" => Ok(OutputFormat::Mp3),
            other => Err(format!("output format must be wav, flac, or mp3 (got '{}')", other)),
        }
    }
}

/// Mix document. `output_file` is relative to the project directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixSettings {
    pub master_volume: f32,
    pub output_format: OutputFormat,
    pub output_file: PathBuf,
}

impl Default for MixSettings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            output_format: OutputFormat::Wav,
            output_file: PathBuf::from("mix.wav"),
        }
    }
}

impl MixSettings {
    /// Change the format and keep the output file's extension in step.
    pub fn set_format(&mut self, format: OutputFormat) {
        self.output_format = format;
        self.output_file.set_extension(format.extension());
    }
}
