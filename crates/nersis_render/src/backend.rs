//! Rendering backend abstraction
//!
//! The runtime only ever talks to these two traits. A graphics backend is
//! generic over the surface its window backend hands it, which is how the
//! headless and windowed variants share one lifecycle without branching.

use nersis_core::Color;

use crate::error::RenderError;
use crate::event::Event;
use crate::window::WindowConfig;
use crate::DeviceCapabilities;

/// A graphics-API context that can clear and present.
///
/// `S` is the surface produced by the paired [`WindowBackend`]; `()` for
/// headless rendering.
pub trait GraphicsBackend<S> {
    /// Create the context and resolve API entry points. `size` is the
    /// requested drawable size; a windowed backend may prefer the real one.
    fn initialize(&mut self, surface: S, size: (u32, u32)) -> Result<DeviceCapabilities, RenderError>;

    /// Clear the current target to `color`.
    fn clear(&mut self, color: Color) -> Result<(), RenderError>;

    /// Present whatever was drawn this frame.
    fn present(&mut self) -> Result<(), RenderError>;

    /// Current drawable size in physical pixels.
    fn size(&self) -> (u32, u32);

    /// The window's drawable size changed. Zero in either axis means the
    /// window is minimized; the runtime draws nothing until it grows again.
    /// Fixed-size targets ignore it.
    fn resize(&mut self, _size: (u32, u32)) {}

    /// Drop the context. Called at most once per successful `initialize`.
    fn release(&mut self);
}

/// A window plus the input source attached to it.
pub trait WindowBackend {
    /// Handed to the graphics backend so it can render into the window.
    type Surface;

    fn create(&mut self, config: &WindowConfig) -> Result<Self::Surface, RenderError>;

    /// Append every currently pending event to `queue`. Never blocks.
    fn poll_events(&mut self, queue: &mut Vec<Event>);

    /// Latest drawable size reported since the last call, if it changed.
    fn take_resize(&mut self) -> Option<(u32, u32)> {
        None
    }

    /// Tell the windowing system a frame is about to be presented.
    fn swap_buffers(&mut self) -> Result<(), RenderError>;

    fn release(&mut self);
}

/// Window backend for graphics-only builds: no window, no events.
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl WindowBackend for Headless {
    type Surface = ();

    fn create(&mut self, config: &WindowConfig) -> Result<(), RenderError> {
        tracing::debug!(width = config.width, height = config.height, "headless target, no window");
        Ok(())
    }

    fn poll_events(&mut self, _queue: &mut Vec<Event>) {}

    fn swap_buffers(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn release(&mut self) {}
}
