//! Built-in health checks for the input router

pub mod adapter;
pub mod config;
pub mod pipeline;
pub mod scene;

pub use adapter::AdapterCheck;
pub use config::ConfigCheck;
pub use pipeline::PipelineCheck;
pub use scene::SceneCheck;
