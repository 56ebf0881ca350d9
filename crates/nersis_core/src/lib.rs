//! Nersis Core
//!
//! Small shared vocabulary for the runtime crates:
//! - Normalized RGBA color
//! - Frame clock

pub mod color;
pub mod time;

pub use color::Color;
pub use glam;

/// Runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
