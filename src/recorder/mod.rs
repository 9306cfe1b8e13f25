pub mod append;
pub mod device;
pub mod guard;
pub mod output;
pub mod simulated;

pub use append::append_amr;
pub use device::{AudioEncoder, AudioSource, MediaRecorderWrapper, Microphone, OutputFormat};
pub use guard::{MediaRecorderRecorder, Phase, Recorder};
pub use output::{Output, OutputPreset};
pub use simulated::{synthetic_amplitude, DeviceProbe, SimulatedMediaRecorder};
