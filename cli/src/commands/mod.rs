pub mod config;
pub mod steps;

pub use steps::StepTask;
