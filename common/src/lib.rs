pub mod clock;
pub mod env_config;
pub mod error;
pub mod misc;
