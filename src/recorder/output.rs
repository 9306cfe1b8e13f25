use serde::{Deserialize, Serialize};

use super::device::{AudioEncoder, AudioSource, OutputFormat};

/// Audio encoding preset used for a recording
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Output {
    /// AAC in an MPEG-4 container (.m4a)
    #[default]
    Aac,
    /// AMR narrowband (.amr)
    Amr,
}

/// Fixed device parameters for an output kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputPreset {
    pub source: AudioSource,
    pub format: OutputFormat,
    pub encoder: AudioEncoder,
    pub sample_rate: u32,
    pub bit_rate: u32,
    pub extension: &'static str,
}

impl Output {
    pub const ALL: [Output; 2] = [Output::Aac, Output::Amr];

    pub fn preset(self) -> OutputPreset {
        match self {
            Output::Aac => OutputPreset {
                source: AudioSource::Mic,
                format: OutputFormat::Mpeg4,
                encoder: AudioEncoder::Aac,
                sample_rate: 32000,
                bit_rate: 64000,
                extension: ".m4a",
            },
            Output::Amr => OutputPreset {
                source: AudioSource::Mic,
                format: OutputFormat::AmrNb,
                encoder: AudioEncoder::AmrNb,
                sample_rate: 8000,
                bit_rate: 12200,
                extension: ".amr",
            },
        }
    }

    pub fn extension(self) -> &'static str {
        self.preset().extension
    }
}
