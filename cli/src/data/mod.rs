pub mod aggregator;
pub mod bucketing;
pub mod presentation;

pub use aggregator::StepAggregator;
pub use bucketing::DateBucketing;
pub use presentation::{DayList, HourList};
