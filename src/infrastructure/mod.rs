//! 基础设施层：持有稀缺资源（音频输入设备、标准输入），只暴露能力

pub mod audio_input;
pub mod line_input;
#[cfg(feature = "microphone")]
pub mod microphone;

pub use audio_input::{
    AudioInput, CapturedChunk, ChunkSink, DeviceHandle, SessionId, UnavailableInput,
};
pub use line_input::LineInput;
#[cfg(feature = "microphone")]
pub use microphone::MicrophoneInput;
