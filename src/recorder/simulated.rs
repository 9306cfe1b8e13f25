//! In-process recording device
//!
//! Follows the platform recorder's state rules exactly, claims the shared
//! microphone while recording, and writes the container signature of the
//! configured format so produced files are recognisable. No audio is captured.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::debug;

use super::device::{AudioEncoder, AudioSource, MediaRecorderWrapper, Microphone, OutputFormat};
use crate::error::{RecorderError, RecorderResult};

pub const AMR_SIGNATURE: &[u8] = b"#!AMR\n";

/// `ftyp` box declaring an M4A file
pub const MPEG4_SIGNATURE: &[u8] = &[
    0x00, 0x00, 0x00, 0x18, b'f', b't', b'y', b'p', b'M', b'4', b'A', b' ', 0x00, 0x00, 0x00, 0x00,
    b'M', b'4', b'A', b' ', b'i', b's', b'o', b'm',
];

#[derive(Debug, Default)]
struct DeviceState {
    audio_source: Option<AudioSource>,
    output_format: Option<OutputFormat>,
    audio_encoder: Option<AudioEncoder>,
    sample_rate: Option<u32>,
    bit_rate: Option<u32>,
    file: Option<PathBuf>,
    prepared: bool,
    started: bool,
    paused: bool,
    released: bool,
    amplitude: Option<i32>,
    started_at: Option<Instant>,
}

impl DeviceState {
    fn check_configurable(&self) -> RecorderResult<()> {
        if self.released {
            return Err(RecorderError::illegal_state("Device already released"));
        }
        if self.prepared {
            return Err(RecorderError::illegal_state("Device already prepared"));
        }
        Ok(())
    }
}

/// Level reported by a device with no injected amplitude: a sawtooth stepping
/// by 1000 every 100 ms and wrapping at 32 steps, for any recording length.
pub fn synthetic_amplitude(elapsed: Duration) -> i32 {
    let step = (elapsed.as_millis() / 100) % 32;
    step as i32 * 1000
}

fn lock(state: &Mutex<DeviceState>) -> MutexGuard<'_, DeviceState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Simulated platform recorder
pub struct SimulatedMediaRecorder {
    microphone: Microphone,
    state: Arc<Mutex<DeviceState>>,
}

impl SimulatedMediaRecorder {
    pub fn new(microphone: Microphone) -> Self {
        Self {
            microphone,
            state: Arc::new(Mutex::new(DeviceState::default())),
        }
    }

    /// Handle for inspecting this device after it has been handed off
    pub fn probe(&self) -> DeviceProbe {
        DeviceProbe {
            state: Arc::clone(&self.state),
        }
    }
}

impl MediaRecorderWrapper for SimulatedMediaRecorder {
    fn set_audio_source(&mut self, source: AudioSource) -> RecorderResult<()> {
        let mut state = lock(&self.state);
        state.check_configurable()?;

        if state.output_format.is_some() {
            return Err(RecorderError::illegal_state(
                "Audio source must be set before the output format",
            ));
        }

        state.audio_source = Some(source);
        Ok(())
    }

    fn set_output_format(&mut self, format: OutputFormat) -> RecorderResult<()> {
        let mut state = lock(&self.state);
        state.check_configurable()?;

        if state.audio_source.is_none() {
            return Err(RecorderError::illegal_state(
                "Audio source must be set before the output format",
            ));
        }

        state.output_format = Some(format);
        Ok(())
    }

    fn set_audio_encoder(&mut self, encoder: AudioEncoder) -> RecorderResult<()> {
        let mut state = lock(&self.state);
        state.check_configurable()?;

        if state.output_format.is_none() {
            return Err(RecorderError::illegal_state(
                "Output format must be set before the encoder",
            ));
        }

        state.audio_encoder = Some(encoder);
        Ok(())
    }

    fn set_audio_encoding_sample_rate(&mut self, sample_rate: u32) -> RecorderResult<()> {
        let mut state = lock(&self.state);
        state.check_configurable()?;
        state.sample_rate = Some(sample_rate);
        Ok(())
    }

    fn set_audio_encoding_bit_rate(&mut self, bit_rate: u32) -> RecorderResult<()> {
        let mut state = lock(&self.state);
        state.check_configurable()?;
        state.bit_rate = Some(bit_rate);
        Ok(())
    }

    fn set_output_file(&mut self, path: &Path) -> RecorderResult<()> {
        let mut state = lock(&self.state);
        state.check_configurable()?;

        if !path.is_file() {
            return Err(RecorderError::IllegalArgument(format!(
                "{} does not refer to a created file",
                path.display()
            )));
        }

        state.file = Some(path.to_path_buf());
        Ok(())
    }

    fn prepare(&mut self) -> RecorderResult<()> {
        let mut state = lock(&self.state);
        state.check_configurable()?;

        if state.output_format.is_none() || state.file.is_none() {
            return Err(RecorderError::illegal_state(
                "Output format and output file are required before prepare",
            ));
        }

        state.prepared = true;
        Ok(())
    }

    fn start(&mut self) -> RecorderResult<()> {
        let mut state = lock(&self.state);

        if state.released {
            return Err(RecorderError::illegal_state("Device already released"));
        }
        if !state.prepared {
            return Err(RecorderError::illegal_state("Device not prepared"));
        }
        if state.started {
            return Err(RecorderError::illegal_state("Device already started"));
        }

        if !self.microphone.try_claim() {
            return Err(RecorderError::MicInUse);
        }

        let signature = match state.output_format {
            Some(OutputFormat::AmrNb) => AMR_SIGNATURE,
            _ => MPEG4_SIGNATURE,
        };

        let written = state
            .file
            .as_deref()
            .ok_or_else(|| RecorderError::illegal_state("No output file"))
            .and_then(|path| {
                let mut file = File::create(path)?;
                file.write_all(signature)?;
                Ok(())
            });

        if let Err(e) = written {
            self.microphone.free();
            return Err(e);
        }

        state.started = true;
        state.started_at = Some(Instant::now());
        debug!("Simulated device started");

        Ok(())
    }

    fn pause(&mut self) -> RecorderResult<()> {
        let mut state = lock(&self.state);

        if !state.started || state.paused {
            return Err(RecorderError::illegal_state("Can only pause while recording"));
        }

        state.paused = true;
        Ok(())
    }

    fn resume(&mut self) -> RecorderResult<()> {
        let mut state = lock(&self.state);

        if !state.paused {
            return Err(RecorderError::illegal_state("Can only resume while paused"));
        }

        state.paused = false;
        Ok(())
    }

    fn stop(&mut self) -> RecorderResult<()> {
        let mut state = lock(&self.state);

        if !state.started {
            return Err(RecorderError::illegal_state("Device not started"));
        }

        state.started = false;
        state.paused = false;
        self.microphone.free();
        debug!("Simulated device stopped");

        Ok(())
    }

    fn release(&mut self) -> RecorderResult<()> {
        let mut state = lock(&self.state);

        if state.started {
            return Err(RecorderError::illegal_state(
                "Cannot release while recording, call stop first",
            ));
        }

        state.released = true;
        Ok(())
    }

    fn max_amplitude(&mut self) -> i32 {
        let state = lock(&self.state);

        if !state.started || state.paused {
            return 0;
        }

        if let Some(amplitude) = state.amplitude {
            return amplitude;
        }

        state
            .started_at
            .map(|t| synthetic_amplitude(t.elapsed()))
            .unwrap_or(0)
    }
}

/// Read-only view of a [`SimulatedMediaRecorder`] plus amplitude injection
#[derive(Clone)]
pub struct DeviceProbe {
    state: Arc<Mutex<DeviceState>>,
}

impl DeviceProbe {
    pub fn audio_source(&self) -> Option<AudioSource> {
        lock(&self.state).audio_source
    }

    pub fn output_format(&self) -> Option<OutputFormat> {
        lock(&self.state).output_format
    }

    pub fn audio_encoder(&self) -> Option<AudioEncoder> {
        lock(&self.state).audio_encoder
    }

    pub fn sample_rate(&self) -> Option<u32> {
        lock(&self.state).sample_rate
    }

    pub fn bit_rate(&self) -> Option<u32> {
        lock(&self.state).bit_rate
    }

    pub fn output_file(&self) -> Option<PathBuf> {
        lock(&self.state).file.clone()
    }

    pub fn has_started(&self) -> bool {
        lock(&self.state).started
    }

    pub fn is_paused(&self) -> bool {
        lock(&self.state).paused
    }

    pub fn is_released(&self) -> bool {
        lock(&self.state).released
    }

    /// Fix the amplitude reported while recording
    pub fn set_amplitude(&self, amplitude: i32) {
        lock(&self.state).amplitude = Some(amplitude);
    }
}
