use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::RecorderResult;

/// Where the device captures audio from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioSource {
    /// Default microphone input
    Mic,
    /// Microphone tuned for voice recognition
    VoiceRecognition,
}

/// Container format written by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Mpeg4,
    AmrNb,
}

/// Codec used by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioEncoder {
    Aac,
    AmrNb,
}

/// Platform recording device
///
/// Mirrors the platform recorder API call-for-call. Implementations are
/// expected to reject calls made out of order with
/// [`RecorderError::IllegalState`](crate::error::RecorderError::IllegalState):
/// - audio source before output format
/// - output format before encoder
/// - every configuration call before `prepare`
/// - `start` only after `prepare`
/// - no `release` while recording
pub trait MediaRecorderWrapper: Send {
    fn set_audio_source(&mut self, source: AudioSource) -> RecorderResult<()>;

    fn set_output_format(&mut self, format: OutputFormat) -> RecorderResult<()>;

    fn set_audio_encoder(&mut self, encoder: AudioEncoder) -> RecorderResult<()>;

    fn set_audio_encoding_sample_rate(&mut self, sample_rate: u32) -> RecorderResult<()>;

    fn set_audio_encoding_bit_rate(&mut self, bit_rate: u32) -> RecorderResult<()>;

    /// Path must refer to an already created file
    fn set_output_file(&mut self, path: &Path) -> RecorderResult<()>;

    fn prepare(&mut self) -> RecorderResult<()>;

    fn start(&mut self) -> RecorderResult<()>;

    fn pause(&mut self) -> RecorderResult<()>;

    fn resume(&mut self) -> RecorderResult<()>;

    fn stop(&mut self) -> RecorderResult<()>;

    fn release(&mut self) -> RecorderResult<()>;

    /// Maximum absolute amplitude sampled since the last call
    fn max_amplitude(&mut self) -> i32;
}

impl<W: MediaRecorderWrapper + ?Sized> MediaRecorderWrapper for Box<W> {
    fn set_audio_source(&mut self, source: AudioSource) -> RecorderResult<()> {
        (**self).set_audio_source(source)
    }

    fn set_output_format(&mut self, format: OutputFormat) -> RecorderResult<()> {
        (**self).set_output_format(format)
    }

    fn set_audio_encoder(&mut self, encoder: AudioEncoder) -> RecorderResult<()> {
        (**self).set_audio_encoder(encoder)
    }

    fn set_audio_encoding_sample_rate(&mut self, sample_rate: u32) -> RecorderResult<()> {
        (**self).set_audio_encoding_sample_rate(sample_rate)
    }

    fn set_audio_encoding_bit_rate(&mut self, bit_rate: u32) -> RecorderResult<()> {
        (**self).set_audio_encoding_bit_rate(bit_rate)
    }

    fn set_output_file(&mut self, path: &Path) -> RecorderResult<()> {
        (**self).set_output_file(path)
    }

    fn prepare(&mut self) -> RecorderResult<()> {
        (**self).prepare()
    }

    fn start(&mut self) -> RecorderResult<()> {
        (**self).start()
    }

    fn pause(&mut self) -> RecorderResult<()> {
        (**self).pause()
    }

    fn resume(&mut self) -> RecorderResult<()> {
        (**self).resume()
    }

    fn stop(&mut self) -> RecorderResult<()> {
        (**self).stop()
    }

    fn release(&mut self) -> RecorderResult<()> {
        (**self).release()
    }

    fn max_amplitude(&mut self) -> i32 {
        (**self).max_amplitude()
    }
}

/// Shared microphone resource
///
/// Only one device may hold the microphone at a time. Clones refer to the
/// same microphone.
#[derive(Debug, Clone, Default)]
pub struct Microphone {
    claimed: Arc<AtomicBool>,
}

impl Microphone {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the microphone is already held
    pub fn try_claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn free(&self) {
        self.claimed.store(false, Ordering::SeqCst);
    }

    pub fn in_use(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }
}
