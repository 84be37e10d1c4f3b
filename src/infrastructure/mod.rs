// Infrastructure layer - Configuration, clocks and renderers
pub mod config;
pub mod frame_mapper;
pub mod json_renderer;
pub mod log_renderer;
pub mod system_clock;
