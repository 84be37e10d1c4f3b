// Application layer - Use cases driving the simulation
pub mod channel_controller;
pub mod clock;
pub mod dashboard_service;
pub mod frame_renderer;
pub mod scheduler;
