//! Tower Layer implementations for A2A protocol

pub mod stats;
pub mod validation;

pub use stats::{StatsLayer, StatsService};
pub use validation::{A2AValidationLayer, A2AValidationService};
