pub mod alert;
pub mod calibrator;
pub mod classifier;
pub mod session;

pub use alert::{AlertEvent, AlertGate};
pub use calibrator::{
    CalibrationPhaseResult, CalibrationState, Calibrator, Envelope, Envelopes, Progress,
};
pub use classifier::{classify, Verdict};
pub use session::{CalibrationStatus, FrameReport, PostureSession, SkipReason};
