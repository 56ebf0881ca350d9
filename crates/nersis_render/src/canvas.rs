//! Shared per-frame drawing state
//!
//! Scripts never touch a backend directly. Their bindings write into the
//! canvas, and the runtime reads it when it issues the frame's clear. The
//! canvas is `Rc`-shared, so it stays on the render thread with the runtime.

use std::cell::RefCell;
use std::rc::Rc;

use nersis_core::Color;

use crate::DeviceCapabilities;

pub type SharedCanvas = Rc<RefCell<Canvas>>;

/// Counters maintained by the runtime, one increment per occurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    pub clears: u64,
    pub presents: u64,
    pub events_dispatched: u64,
    pub events_discarded: u64,
}

impl FrameStats {
    /// Counter by its script-facing name.
    pub fn get(&self, name: &str) -> Option<u64> {
        match name {
            "frames" => Some(self.frames),
            "clears" => Some(self.clears),
            "presents" => Some(self.presents),
            "eventsdispatched" => Some(self.events_dispatched),
            "eventsdiscarded" => Some(self.events_discarded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Canvas {
    background: Color,
    requested_clear: Option<Color>,
    size: (u32, u32),
    capabilities: Option<DeviceCapabilities>,
    stats: FrameStats,
}

impl Canvas {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            ..Default::default()
        }
    }

    pub fn shared(background: Color) -> SharedCanvas {
        Rc::new(RefCell::new(Self::new(background)))
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Clear color for the next frame only.
    pub fn request_clear(&mut self, color: Color) {
        self.requested_clear = Some(color);
    }

    pub fn requested_clear(&self) -> Option<Color> {
        self.requested_clear
    }

    /// Color for the frame being issued now; consumes any per-frame request.
    pub fn take_clear_color(&mut self) -> Color {
        self.requested_clear.take().unwrap_or(self.background)
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn set_size(&mut self, size: (u32, u32)) {
        self.size = size;
    }

    pub fn capabilities(&self) -> Option<&DeviceCapabilities> {
        self.capabilities.as_ref()
    }

    pub fn set_capabilities(&mut self, capabilities: Option<DeviceCapabilities>) {
        self.capabilities = capabilities;
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn stats_mut(&mut self) -> &mut FrameStats {
        &mut self.stats
    }
}
