use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::device::MediaRecorderWrapper;
use super::output::{Output, OutputPreset};
use crate::error::{RecorderError, RecorderResult};

/// Lifecycle phase of a recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing configured yet
    Idle,
    /// Source, format, encoder, rates and output file applied
    Configured,
    Prepared,
    Recording,
    Paused,
    /// Finished normally, output file retained
    Stopped,
    /// Device released after a cancel or a failed start
    Released,
}

/// A single-session audio recorder
///
/// Each `start` begins a new session; a session ends with `stop` (file kept)
/// or `cancel` (file deleted).
pub trait Recorder: Send {
    fn start(&mut self, output: Output) -> RecorderResult<()>;

    fn pause(&mut self) -> RecorderResult<()>;

    fn resume(&mut self) -> RecorderResult<()>;

    /// Finish the session and return the recorded file. On failure the
    /// session ends anyway and its file is deleted.
    fn stop(&mut self) -> RecorderResult<PathBuf>;

    /// Abandon the session and delete its file. Safe in any phase.
    fn cancel(&mut self);

    fn is_recording(&self) -> bool;

    fn amplitude(&mut self) -> i32;
}

struct ActiveSession<W> {
    device: W,
    file: PathBuf,
    output: Output,
}

/// Recording session guard over a platform device
///
/// A fresh device is obtained from `factory` for every session. The guard
/// applies the output preset in the order the platform requires and tracks
/// the session phase so out-of-order calls fail instead of reaching the
/// device.
pub struct MediaRecorderRecorder<W, F>
where
    W: MediaRecorderWrapper,
    F: FnMut() -> W + Send,
{
    cache_dir: PathBuf,
    factory: F,
    phase: Phase,
    active: Option<ActiveSession<W>>,
}

impl<W, F> MediaRecorderRecorder<W, F>
where
    W: MediaRecorderWrapper,
    F: FnMut() -> W + Send,
{
    pub fn new(cache_dir: impl Into<PathBuf>, factory: F) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            factory,
            phase: Phase::Idle,
            active: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Output file of the live session, if any
    pub fn output_file(&self) -> Option<&Path> {
        self.active.as_ref().map(|s| s.file.as_path())
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn transition(&mut self, from: Phase, to: Phase) -> RecorderResult<()> {
        if self.phase != from {
            return Err(RecorderError::illegal_state(format!(
                "Cannot move to {:?} from {:?} (expected {:?})",
                to, self.phase, from
            )));
        }

        debug!("Recorder phase {:?} -> {:?}", from, to);
        self.phase = to;
        Ok(())
    }

    fn create_output_file(&self, extension: &str) -> RecorderResult<PathBuf> {
        fs::create_dir_all(&self.cache_dir)?;

        let (_, path) = tempfile::Builder::new()
            .prefix("recording")
            .suffix(extension)
            .tempfile_in(&self.cache_dir)?
            .keep()
            .map_err(|e| RecorderError::from(e.error))?;

        Ok(path)
    }

    fn bring_up(&mut self, device: &mut W, preset: &OutputPreset, file: &Path) -> RecorderResult<()> {
        device.set_audio_source(preset.source)?;
        device.set_output_format(preset.format)?;
        device.set_audio_encoder(preset.encoder)?;
        device.set_audio_encoding_sample_rate(preset.sample_rate)?;
        device.set_audio_encoding_bit_rate(preset.bit_rate)?;
        device.set_output_file(file)?;
        self.transition(Phase::Idle, Phase::Configured)?;

        device.prepare()?;
        self.transition(Phase::Configured, Phase::Prepared)?;

        device.start()?;
        self.transition(Phase::Prepared, Phase::Recording)
    }
}

impl<W, F> Recorder for MediaRecorderRecorder<W, F>
where
    W: MediaRecorderWrapper,
    F: FnMut() -> W + Send,
{
    fn start(&mut self, output: Output) -> RecorderResult<()> {
        if self.is_recording() {
            return Err(RecorderError::illegal_state(
                "Already recording, stop or cancel the current session first",
            ));
        }

        let preset = output.preset();
        let file = self.create_output_file(preset.extension)?;
        let mut device = (self.factory)();

        self.phase = Phase::Idle;
        if let Err(e) = self.bring_up(&mut device, &preset, &file) {
            warn!("Failed to start {:?} recording: {}", output, e);

            if let Err(release_err) = device.release() {
                warn!("Failed to release device after failed start: {}", release_err);
            }
            remove_output_file(&file);
            self.phase = Phase::Released;

            return Err(e);
        }

        info!("Recording {:?} to {}", output, file.display());

        self.active = Some(ActiveSession {
            device,
            file,
            output,
        });

        Ok(())
    }

    fn pause(&mut self) -> RecorderResult<()> {
        self.transition(Phase::Recording, Phase::Paused)?;

        if let Some(session) = &mut self.active {
            if let Err(e) = session.device.pause() {
                self.phase = Phase::Recording;
                return Err(e);
            }
        }

        Ok(())
    }

    fn resume(&mut self) -> RecorderResult<()> {
        self.transition(Phase::Paused, Phase::Recording)?;

        if let Some(session) = &mut self.active {
            if let Err(e) = session.device.resume() {
                self.phase = Phase::Paused;
                return Err(e);
            }
        }

        Ok(())
    }

    fn stop(&mut self) -> RecorderResult<PathBuf> {
        if !self.is_recording() {
            return Err(RecorderError::illegal_state(format!(
                "Cannot stop while {:?}",
                self.phase
            )));
        }

        let mut session = self
            .active
            .take()
            .ok_or_else(|| RecorderError::illegal_state("No active session"))?;

        let stopped = session.device.stop();
        let released = session.device.release();

        if let Err(e) = stopped.and(released) {
            warn!("Failed to stop {:?} recording: {}", session.output, e);

            // Nothing usable was finalized; no session is left owning the file
            remove_output_file(&session.file);
            self.phase = Phase::Released;

            return Err(e);
        }

        self.phase = Phase::Stopped;

        info!(
            "Recording {:?} finished: {}",
            session.output,
            session.file.display()
        );

        Ok(session.file)
    }

    fn cancel(&mut self) {
        let Some(mut session) = self.active.take() else {
            debug!("Cancel with no active session");
            return;
        };

        if self.is_recording() {
            if let Err(e) = session.device.stop() {
                warn!("Failed to stop device on cancel: {}", e);
            }
        }

        if let Err(e) = session.device.release() {
            warn!("Failed to release device on cancel: {}", e);
        }

        remove_output_file(&session.file);
        self.phase = Phase::Released;

        info!("Recording {:?} cancelled", session.output);
    }

    fn is_recording(&self) -> bool {
        matches!(self.phase, Phase::Recording | Phase::Paused)
    }

    fn amplitude(&mut self) -> i32 {
        match (&mut self.active, self.phase) {
            (Some(session), Phase::Recording) => session.device.max_amplitude(),
            _ => 0,
        }
    }
}

fn remove_output_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("Deleted {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to delete {}: {}", path.display(), e),
    }
}
