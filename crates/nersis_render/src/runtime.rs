//! Render runtime lifecycle
//!
//! `Uninitialized → Initialized → Running → Terminated`, strictly forward.
//! The same state machine drives every backend pairing; what differs between
//! a headless and a windowed build is only the `G`/`W` type parameters.

use std::fmt;

use nersis_core::Color;

use crate::backend::{GraphicsBackend, WindowBackend};
use crate::canvas::{Canvas, SharedCanvas};
use crate::error::{InitStage, RenderError};
use crate::event::{Event, EventObserver, UnobservedEvents};
use crate::thread::RenderThread;
use crate::window::WindowConfig;
use crate::DeviceCapabilities;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    Uninitialized,
    Initialized,
    Running,
    Terminated,
}

impl RuntimeState {
    /// The graphics context exists exactly in these states.
    pub fn has_context(&self) -> bool {
        matches!(self, RuntimeState::Initialized | RuntimeState::Running)
    }
}

impl fmt::Display for RuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RuntimeState::Uninitialized => "uninitialized",
            RuntimeState::Initialized => "initialized",
            RuntimeState::Running => "running",
            RuntimeState::Terminated => "terminated",
        })
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub window: WindowConfig,
    pub background: Color,
    pub unobserved: UnobservedEvents,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            background: Color::BLACK,
            unobserved: UnobservedEvents::Log,
        }
    }
}

/// Owns one graphics backend and one window backend for their whole life.
///
/// Not `Send`: after `initialize` the runtime is pinned to the thread that
/// called it.
pub struct RenderRuntime<G, W>
where
    W: WindowBackend,
    G: GraphicsBackend<W::Surface>,
{
    state: RuntimeState,
    config: RuntimeConfig,
    graphics: G,
    window: W,
    thread: Option<RenderThread>,
    events: Vec<Event>,
    observer: Option<Box<dyn EventObserver>>,
    canvas: SharedCanvas,
    minimized: bool,
}

impl<G, W> RenderRuntime<G, W>
where
    W: WindowBackend,
    G: GraphicsBackend<W::Surface>,
{
    pub fn new(config: RuntimeConfig, graphics: G, window: W) -> Self {
        let canvas = Canvas::shared(config.background);
        Self {
            state: RuntimeState::Uninitialized,
            config,
            graphics,
            window,
            thread: None,
            events: Vec::new(),
            observer: None,
            canvas,
            minimized: false,
        }
    }

    pub fn state(&self) -> RuntimeState {
        self.state
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Shared drawing state; this is what the script bindings hold on to.
    pub fn canvas(&self) -> SharedCanvas {
        SharedCanvas::clone(&self.canvas)
    }

    /// Events polled by the most recent `update()`.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn graphics(&self) -> &G {
        &self.graphics
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn set_observer(&mut self, observer: Box<dyn EventObserver>) {
        self.observer = Some(observer);
    }

    /// Bring up window and graphics context.
    ///
    /// Any failure is fatal: whatever was acquired is released again and the
    /// runtime ends up `Terminated`, never half-initialized.
    pub fn initialize(&mut self) -> Result<DeviceCapabilities, RenderError> {
        if self.state != RuntimeState::Uninitialized {
            return Err(RenderError::InvalidState {
                op: "initialize",
                state: self.state,
            });
        }

        let WindowConfig { width, height, .. } = self.config.window;
        if width == 0 || height == 0 {
            self.state = RuntimeState::Terminated;
            return Err(RenderError::fatal(
                InitStage::Config,
                format!("window size must be non-zero, got {width}x{height}"),
            ));
        }

        let thread = RenderThread::bind();

        let surface = match self.window.create(&self.config.window) {
            Ok(surface) => surface,
            Err(e) => {
                tracing::error!("window creation failed: {e}");
                self.state = RuntimeState::Terminated;
                return Err(e);
            }
        };

        let capabilities = match self.graphics.initialize(surface, (width, height)) {
            Ok(caps) => caps,
            Err(e) => {
                tracing::error!("graphics initialization failed: {e}");
                self.window.release();
                self.state = RuntimeState::Terminated;
                return Err(e);
            }
        };

        tracing::info!(
            adapter = %capabilities.adapter_name,
            backend = capabilities.backend.as_str(),
            vendor = ?capabilities.vendor,
            max_texture_size = capabilities.max_texture_size,
            "graphics context ready"
        );

        {
            let mut canvas = self.canvas.borrow_mut();
            canvas.set_size(self.graphics.size());
            canvas.set_capabilities(Some(capabilities.clone()));
        }

        self.thread = Some(thread);
        self.state = RuntimeState::Initialized;
        Ok(capabilities)
    }

    /// Run one frame: drain events, dispatch them, clear, present.
    ///
    /// Returns `Ok(false)` when a quit was polled; graphics state is left
    /// untouched for that frame and the caller decides when to terminate.
    /// While the window is minimized events are still dispatched but nothing
    /// is drawn.
    pub fn update(&mut self) -> Result<bool, RenderError> {
        if !self.state.has_context() {
            return Err(RenderError::InvalidState {
                op: "update",
                state: self.state,
            });
        }
        debug_assert!(
            self.thread.as_ref().is_some_and(RenderThread::is_current),
            "render runtime used off its bound thread"
        );

        if self.state == RuntimeState::Initialized {
            tracing::info!("render runtime running");
            self.state = RuntimeState::Running;
        }

        self.events.clear();
        self.window.poll_events(&mut self.events);
        if let Some(size) = self.window.take_resize() {
            self.apply_resize(size);
        }

        let quit = self.dispatch_events();
        if quit {
            tracing::info!("quit requested");
            return Ok(false);
        }
        if self.minimized {
            return Ok(true);
        }

        self.render_frame()?;
        Ok(true)
    }

    /// Release context then window. A no-op once `Terminated`.
    pub fn terminate(&mut self) {
        if self.state == RuntimeState::Terminated {
            return;
        }

        if self.state.has_context() {
            self.graphics.release();
            self.window.release();
            self.canvas.borrow_mut().set_capabilities(None);
        }

        self.events.clear();
        self.thread = None;
        self.minimized = false;
        tracing::info!(from = %self.state, "render runtime terminated");
        self.state = RuntimeState::Terminated;
    }

    fn apply_resize(&mut self, size: (u32, u32)) {
        self.graphics.resize(size);
        let minimized = size.0 == 0 || size.1 == 0;
        if minimized != self.minimized {
            tracing::debug!(minimized, "window visibility changed");
            self.minimized = minimized;
        }
        if !minimized {
            self.canvas.borrow_mut().set_size(self.graphics.size());
        }
    }

    fn dispatch_events(&mut self) -> bool {
        let mut quit = false;
        // Observers may call back into the canvas, so no borrow is held
        // across `on_event`.
        for event in &self.events {
            match event {
                Event::Quit => quit = true,
                event => match self.observer.as_mut() {
                    Some(observer) => {
                        observer.on_event(event);
                        self.canvas.borrow_mut().stats_mut().events_dispatched += 1;
                    }
                    None => {
                        if self.config.unobserved == UnobservedEvents::Log {
                            tracing::debug!(?event, "no observer, discarding event");
                        }
                        self.canvas.borrow_mut().stats_mut().events_discarded += 1;
                    }
                },
            }
        }
        quit
    }

    fn render_frame(&mut self) -> Result<(), RenderError> {
        let color = self.canvas.borrow_mut().take_clear_color();

        if let Err(e) = self.graphics.clear(color) {
            tracing::warn!("{e}");
            return Err(e);
        }
        self.canvas.borrow_mut().stats_mut().clears += 1;

        if let Err(e) = self.window.swap_buffers().and_then(|_| self.graphics.present()) {
            tracing::warn!("{e}");
            return Err(e);
        }

        let size = self.graphics.size();
        let mut canvas = self.canvas.borrow_mut();
        canvas.set_size(size);
        let stats = canvas.stats_mut();
        stats.presents += 1;
        stats.frames += 1;
        Ok(())
    }
}

impl<G, W> Drop for RenderRuntime<G, W>
where
    W: WindowBackend,
    G: GraphicsBackend<W::Surface>,
{
    fn drop(&mut self) {
        self.terminate();
    }
}
