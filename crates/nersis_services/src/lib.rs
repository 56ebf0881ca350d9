//! Nersis Services Layer
//!
//! Host-side platform services. For now that is settings loading.

pub mod settings;

pub use settings::{Settings, SettingsError};
