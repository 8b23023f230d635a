pub mod keypoint;
pub mod source;

pub use keypoint::{Keypoint, LandmarkIndex, Pose};
pub use source::{JsonLinesSource, LandmarkFrame, LandmarkSource};
