//! Input events
//!
//! Events live for exactly one frame: the window backend produces them, the
//! runtime drains them in `update()`, and nothing keeps them afterwards.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// The window was closed or the platform asked the process to stop.
    Quit,
    /// Cursor movement in window coordinates.
    MouseMotion {
        /// Milliseconds since the window was created.
        timestamp: u64,
        device_id: u64,
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
    },
    /// Anything the runtime does not interpret.
    Unknown,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Quit => "quit",
            Event::MouseMotion { .. } => "mousemotion",
            Event::Unknown => "unknown",
        }
    }
}

/// Receives every non-quit event drained during `update()`.
pub trait EventObserver {
    fn on_event(&mut self, event: &Event);
}

impl<F> EventObserver for F
where
    F: FnMut(&Event),
{
    fn on_event(&mut self, event: &Event) {
        self(event)
    }
}

/// What happens to events when no observer is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnobservedEvents {
    /// Log at debug level, then drop.
    #[default]
    Log,
    /// Drop silently.
    Discard,
}
