// Domain layer - Simulation engine types and algorithms
pub mod channel;
pub mod dashboard;
pub mod gauge;
pub mod generator;
pub mod labels;
pub mod stats;
pub mod telemetry;
pub mod window;
