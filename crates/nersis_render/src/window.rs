//! Window management
//!
//! Cross-platform window creation via winit. The event loop is pumped
//! rather than run, so the host keeps ownership of the frame loop and each
//! poll only drains what is already queued.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use winit::event::{DeviceId, WindowEvent};

use crate::event::Event;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Nersis".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Create window attributes from config
pub fn window_attributes(config: &WindowConfig) -> winit::window::WindowAttributes {
    winit::window::Window::default_attributes()
        .with_title(config.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height))
}

/// What one winit window event means to the runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Translated {
    Event(Event),
    /// New drawable size in physical pixels; 0 in either axis when minimized.
    Resized(u32, u32),
    Ignored,
}

/// Map a winit window event. `cursor` is the last known cursor position,
/// used for motion deltas and forgotten when the cursor leaves the window.
pub(crate) fn translate(
    cursor: &mut Option<(f64, f64)>,
    timestamp: u64,
    event: WindowEvent,
) -> Translated {
    match event {
        WindowEvent::CloseRequested | WindowEvent::Destroyed => Translated::Event(Event::Quit),
        WindowEvent::CursorMoved {
            device_id,
            position,
        } => {
            let (dx, dy) = match *cursor {
                Some((px, py)) => (position.x - px, position.y - py),
                None => (0.0, 0.0),
            };
            *cursor = Some((position.x, position.y));
            Translated::Event(Event::MouseMotion {
                timestamp,
                device_id: device_key(device_id),
                x: position.x,
                y: position.y,
                dx,
                dy,
            })
        }
        WindowEvent::CursorLeft { .. } => {
            *cursor = None;
            Translated::Event(Event::Unknown)
        }
        WindowEvent::Resized(size) => Translated::Resized(size.width, size.height),
        // Frames are driven by the host, not by redraw requests.
        WindowEvent::RedrawRequested => Translated::Ignored,
        _ => Translated::Event(Event::Unknown),
    }
}

fn device_key(id: DeviceId) -> u64 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    hasher.finish()
}

#[cfg(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "android"
))]
pub use pumped::WinitWindow;

#[cfg(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "android"
))]
mod pumped {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use winit::application::ApplicationHandler;
    use winit::event::WindowEvent;
    use winit::event_loop::{ActiveEventLoop, EventLoop};
    use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
    use winit::window::{Window, WindowAttributes, WindowId};

    use super::{translate, window_attributes, Translated, WindowConfig};
    use crate::backend::WindowBackend;
    use crate::error::{InitStage, RenderError};
    use crate::event::Event;

    /// Upper bound on pumps while waiting for winit to deliver `resumed`.
    /// Desktop platforms resume on the first pump.
    const MAX_RESUME_PUMPS: usize = 16;

    /// Window backend over a pumped winit event loop.
    #[derive(Default)]
    pub struct WinitWindow {
        event_loop: Option<EventLoop<()>>,
        handler: PumpHandler,
    }

    impl WinitWindow {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn window(&self) -> Option<&Arc<Window>> {
            self.handler.window.as_ref()
        }
    }

    #[derive(Default)]
    struct PumpHandler {
        attributes: Option<WindowAttributes>,
        window: Option<Arc<Window>>,
        create_error: Option<String>,
        pending: Vec<Event>,
        created_at: Option<Instant>,
        cursor: Option<(f64, f64)>,
        resized: Option<(u32, u32)>,
    }

    impl PumpHandler {
        fn timestamp(&self) -> u64 {
            self.created_at
                .map(|t| t.elapsed().as_millis() as u64)
                .unwrap_or(0)
        }
    }

    impl ApplicationHandler for PumpHandler {
        fn resumed(&mut self, event_loop: &ActiveEventLoop) {
            if self.window.is_some() {
                return;
            }
            let Some(attributes) = self.attributes.take() else {
                return;
            };
            match event_loop.create_window(attributes) {
                Ok(window) => {
                    self.window = Some(Arc::new(window));
                    self.created_at = Some(Instant::now());
                }
                Err(e) => self.create_error = Some(e.to_string()),
            }
        }

        fn window_event(
            &mut self,
            _event_loop: &ActiveEventLoop,
            _window_id: WindowId,
            event: WindowEvent,
        ) {
            let timestamp = self.timestamp();
            match translate(&mut self.cursor, timestamp, event) {
                Translated::Event(event) => self.pending.push(event),
                Translated::Resized(width, height) => {
                    self.resized = Some((width, height));
                    self.pending.push(Event::Unknown);
                }
                Translated::Ignored => {}
            }
        }
    }

    impl WindowBackend for WinitWindow {
        type Surface = Arc<Window>;

        fn create(&mut self, config: &WindowConfig) -> Result<Arc<Window>, RenderError> {
            let mut event_loop =
                EventLoop::new().map_err(|e| RenderError::fatal(InitStage::Window, e))?;
            self.handler.attributes = Some(window_attributes(config));

            for _ in 0..MAX_RESUME_PUMPS {
                let status = event_loop.pump_app_events(Some(Duration::ZERO), &mut self.handler);
                if let Some(reason) = self.handler.create_error.take() {
                    return Err(RenderError::fatal(InitStage::Window, reason));
                }
                if let Some(window) = &self.handler.window {
                    let window = Arc::clone(window);
                    tracing::info!(
                        title = %config.title,
                        width = config.width,
                        height = config.height,
                        "window created"
                    );
                    self.event_loop = Some(event_loop);
                    return Ok(window);
                }
                if let PumpStatus::Exit(code) = status {
                    return Err(RenderError::fatal(
                        InitStage::Window,
                        format!("event loop exited during window creation (code {code})"),
                    ));
                }
            }

            Err(RenderError::fatal(
                InitStage::Window,
                "event loop never resumed, no window created",
            ))
        }

        fn poll_events(&mut self, queue: &mut Vec<Event>) {
            if let Some(event_loop) = self.event_loop.as_mut() {
                if let PumpStatus::Exit(_) =
                    event_loop.pump_app_events(Some(Duration::ZERO), &mut self.handler)
                {
                    self.handler.pending.push(Event::Quit);
                }
            }
            queue.append(&mut self.handler.pending);
        }

        fn take_resize(&mut self) -> Option<(u32, u32)> {
            self.handler.resized.take()
        }

        fn swap_buffers(&mut self) -> Result<(), RenderError> {
            if let Some(window) = &self.handler.window {
                window.pre_present_notify();
            }
            Ok(())
        }

        fn release(&mut self) {
            self.handler.window = None;
            self.handler.pending.clear();
            self.handler.cursor = None;
            self.handler.resized = None;
            self.event_loop = None;
            tracing::debug!("window released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::{PhysicalPosition, PhysicalSize};

    fn moved(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved {
            // SAFETY: only used as an opaque id, never handed back to a platform.
            device_id: unsafe { DeviceId::dummy() },
            position: PhysicalPosition::new(x, y),
        }
    }

    #[test]
    fn close_and_destroy_quit() {
        let mut cursor = None;
        assert_eq!(
            translate(&mut cursor, 0, WindowEvent::CloseRequested),
            Translated::Event(Event::Quit)
        );
        assert_eq!(
            translate(&mut cursor, 0, WindowEvent::Destroyed),
            Translated::Event(Event::Quit)
        );
    }

    #[test]
    fn motion_deltas_follow_the_cursor() {
        let mut cursor = None;
        let Translated::Event(Event::MouseMotion { timestamp, x, y, dx, dy, .. }) =
            translate(&mut cursor, 5, moved(10.0, 20.0))
        else {
            panic!("expected motion");
        };
        assert_eq!((timestamp, x, y, dx, dy), (5, 10.0, 20.0, 0.0, 0.0));

        let Translated::Event(Event::MouseMotion { x, y, dx, dy, .. }) =
            translate(&mut cursor, 6, moved(13.0, 16.0))
        else {
            panic!("expected motion");
        };
        assert_eq!((x, y, dx, dy), (13.0, 16.0, 3.0, -4.0));
        assert_eq!(cursor, Some((13.0, 16.0)));
    }

    #[test]
    fn leaving_the_window_resets_the_delta() {
        let mut cursor = None;
        translate(&mut cursor, 0, moved(10.0, 10.0));
        let left = WindowEvent::CursorLeft {
            // SAFETY: see `moved`.
            device_id: unsafe { DeviceId::dummy() },
        };
        assert_eq!(translate(&mut cursor, 0, left), Translated::Event(Event::Unknown));
        assert_eq!(cursor, None);

        let Translated::Event(Event::MouseMotion { dx, dy, .. }) =
            translate(&mut cursor, 0, moved(50.0, 50.0))
        else {
            panic!("expected motion");
        };
        assert_eq!((dx, dy), (0.0, 0.0));
    }

    #[test]
    fn resize_and_redraw() {
        let mut cursor = None;
        assert_eq!(
            translate(&mut cursor, 0, WindowEvent::Resized(PhysicalSize::new(800, 0))),
            Translated::Resized(800, 0)
        );
        assert_eq!(
            translate(&mut cursor, 0, WindowEvent::RedrawRequested),
            Translated::Ignored
        );
        assert_eq!(
            translate(&mut cursor, 0, WindowEvent::Focused(true)),
            Translated::Event(Event::Unknown)
        );
    }

    #[test]
    fn config_fills_missing_fields() {
        let config: WindowConfig = serde_json::from_str(r#"{"title":"demo"}"#).unwrap();
        assert_eq!(config.title, "demo");
        assert_eq!((config.width, config.height), (1280, 720));
    }
}
