pub mod config;
pub mod observability;
pub mod pipeline;
pub mod readings;
pub mod report;
pub mod sinks;
pub mod sources;
pub mod transform;

pub use pipeline::{Envelope, Pipeline};
pub use readings::load_readings;
