pub mod recording;
pub mod validators;

pub use recording::{PumpOutcome, RecordingController, RecordingStatus, StopReason};
pub use validators::validate;
