// Shared test doubles for recorder tests
#![allow(dead_code)]

use audiorecorder::recorder::{
    DeviceProbe, MediaRecorderRecorder, Microphone, Output, Recorder, SimulatedMediaRecorder,
};
use audiorecorder::{RecorderError, RecorderResult};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub type DeviceFactory = Box<dyn FnMut() -> SimulatedMediaRecorder + Send>;

/// Guard over simulated devices, keeping a probe for every device it creates
pub struct GuardHarness {
    pub recorder: MediaRecorderRecorder<SimulatedMediaRecorder, DeviceFactory>,
    pub microphone: Microphone,
    probes: Arc<Mutex<Vec<DeviceProbe>>>,
}

impl GuardHarness {
    pub fn new(cache_dir: &Path) -> Self {
        Self::with_microphone(cache_dir, Microphone::new())
    }

    pub fn with_microphone(cache_dir: &Path, microphone: Microphone) -> Self {
        let probes = Arc::new(Mutex::new(Vec::new()));

        let factory_probes = Arc::clone(&probes);
        let factory_mic = microphone.clone();
        let factory: DeviceFactory = Box::new(move || {
            let device = SimulatedMediaRecorder::new(factory_mic.clone());
            factory_probes.lock().unwrap().push(device.probe());
            device
        });

        Self {
            recorder: MediaRecorderRecorder::new(cache_dir, factory),
            microphone,
            probes,
        }
    }

    /// Probe of the most recently created device
    pub fn device(&self) -> DeviceProbe {
        self.probes
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no device created yet")
    }

    pub fn devices_created(&self) -> usize {
        self.probes.lock().unwrap().len()
    }
}

#[derive(Debug, Default)]
struct FakeState {
    output: Option<Output>,
    amplitude: i32,
    recording: bool,
    paused: bool,
    cancelled: bool,
    fail_on_start: Option<RecorderError>,
    fail_on_stop: Option<RecorderError>,
}

/// Recorder that records nothing and reports what it was asked to do
#[derive(Clone, Default)]
pub struct FakeRecorder {
    state: Arc<Mutex<FakeState>>,
}

impl FakeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> Option<Output> {
        self.state.lock().unwrap().output
    }

    pub fn set_amplitude(&self, amplitude: i32) {
        self.state.lock().unwrap().amplitude = amplitude;
    }

    pub fn fail_on_start(&self, error: RecorderError) {
        self.state.lock().unwrap().fail_on_start = Some(error);
    }

    /// Make the next stop end the session with `error`
    pub fn fail_on_stop(&self, error: RecorderError) {
        self.state.lock().unwrap().fail_on_stop = Some(error);
    }

    pub fn was_cancelled(&self) -> bool {
        self.state.lock().unwrap().cancelled
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().unwrap().paused
    }

    pub fn file_for(output: Output) -> PathBuf {
        PathBuf::from(format!("fake-recording{}", output.extension()))
    }
}

impl Recorder for FakeRecorder {
    fn start(&mut self, output: Output) -> RecorderResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(e) = state.fail_on_start.clone() {
            return Err(e);
        }

        state.output = Some(output);
        state.recording = true;
        state.cancelled = false;
        Ok(())
    }

    fn pause(&mut self) -> RecorderResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state.recording || state.paused {
            return Err(RecorderError::illegal_state("not recording"));
        }
        state.paused = true;
        Ok(())
    }

    fn resume(&mut self) -> RecorderResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state.paused {
            return Err(RecorderError::illegal_state("not paused"));
        }
        state.paused = false;
        Ok(())
    }

    fn stop(&mut self) -> RecorderResult<PathBuf> {
        let mut state = self.state.lock().unwrap();
        let output = state
            .output
            .filter(|_| state.recording)
            .ok_or_else(|| RecorderError::illegal_state("not recording"))?;

        state.recording = false;
        state.paused = false;
        if let Some(e) = state.fail_on_stop.take() {
            return Err(e);
        }
        Ok(Self::file_for(output))
    }

    fn cancel(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.recording = false;
        state.paused = false;
        state.cancelled = true;
    }

    fn is_recording(&self) -> bool {
        self.state.lock().unwrap().recording
    }

    fn amplitude(&mut self) -> i32 {
        self.state.lock().unwrap().amplitude
    }
}
