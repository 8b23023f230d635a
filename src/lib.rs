pub mod config;
pub mod error;
pub mod geometry;
pub mod pose;
pub mod posture;

pub use error::{PostureError, Result};
