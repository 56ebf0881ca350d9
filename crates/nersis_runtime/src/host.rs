//! Frame loop
//!
//! Generic over the backend pairing so the headless and windowed builds
//! share every line of it.

use std::rc::Rc;

use anyhow::{Context, Result};
use nersis_core::time::FrameClock;
use nersis_render::backend::{GraphicsBackend, WindowBackend};
use nersis_render::RenderRuntime;
use nersis_script::bindings::standard_registry;
use nersis_script::observer::EVENT_HOOK;
use nersis_script::{HookArg, ScriptBridge, ScriptObserver, ScriptRuntime};
use nersis_services::settings::Settings;

/// Consecutive failed frames tolerated before the host gives up.
const MAX_FRAME_FAILURES: u32 = 8;

pub fn run<G, W>(settings: &Settings, graphics: G, window: W) -> Result<()>
where
    W: WindowBackend,
    G: GraphicsBackend<W::Surface>,
{
    let mut runtime = RenderRuntime::new(settings.runtime_config(), graphics, window);

    let script = Rc::new(ScriptRuntime::new().context("failed to start script engine")?);
    let registry = standard_registry(runtime.canvas()).context("failed to build script bindings")?;
    ScriptBridge::new(registry)
        .install(&script)
        .context("failed to install script bindings")?;

    runtime
        .initialize()
        .context("graphics bring-up failed, cannot start")?;

    if let Some(entry) = &settings.script.entry {
        script
            .execute_file(entry)
            .with_context(|| format!("failed to run {}", entry.display()))?;
        if script.has_function(EVENT_HOOK) {
            runtime.set_observer(Box::new(ScriptObserver::new(Rc::clone(&script))));
        }
        if let Err(e) = script.call_hook("load", HookArg::None) {
            tracing::warn!("load() failed: {e}");
        }
    } else {
        tracing::info!("no script configured, running an empty frame loop");
    }

    let result = frame_loop(settings, &mut runtime, &script);
    runtime.terminate();

    let stats = runtime.canvas().borrow().stats();
    tracing::info!(
        frames = stats.frames,
        events_dispatched = stats.events_dispatched,
        events_discarded = stats.events_discarded,
        "shutdown complete"
    );
    result
}

fn frame_loop<G, W>(
    settings: &Settings,
    runtime: &mut RenderRuntime<G, W>,
    script: &ScriptRuntime,
) -> Result<()>
where
    W: WindowBackend,
    G: GraphicsBackend<W::Surface>,
{
    let mut clock = FrameClock::new();
    let mut failures = 0;

    let result = loop {
        if settings
            .script
            .max_frames
            .is_some_and(|max| clock.frame_count() >= max)
        {
            tracing::info!(frames = clock.frame_count(), "frame limit reached");
            break Ok(());
        }

        let dt = clock.tick();
        if let Err(e) = script.call_hook("update", HookArg::Number(dt.as_secs_f64())) {
            tracing::warn!("update() failed: {e}");
        }

        match runtime.update() {
            Ok(true) => failures = 0,
            Ok(false) => break Ok(()),
            Err(e) if e.is_fatal() => break Err(e.into()),
            Err(e) => {
                failures += 1;
                tracing::warn!(failures, "skipping frame: {e}");
                if failures >= MAX_FRAME_FAILURES {
                    break Err(e).context("too many consecutive frame failures");
                }
            }
        }
    };

    tracing::debug!(
        frames = clock.frame_count(),
        elapsed = ?clock.total_time(),
        "frame loop finished"
    );
    result
}
