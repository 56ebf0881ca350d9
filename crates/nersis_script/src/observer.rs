//! Event forwarding into script
//!
//! Registered on the render runtime as its event observer. Each non-quit
//! event becomes a call to the script's global `onEvent(event)`, if it has
//! one. Script exceptions are logged here and go no further.

use std::rc::Rc;

use nersis_render::{Event, EventObserver};

use crate::runtime::{HookArg, ScriptRuntime};

pub const EVENT_HOOK: &str = "onEvent";

pub struct ScriptObserver {
    script: Rc<ScriptRuntime>,
}

impl ScriptObserver {
    pub fn new(script: Rc<ScriptRuntime>) -> Self {
        Self { script }
    }
}

impl EventObserver for ScriptObserver {
    fn on_event(&mut self, event: &Event) {
        match self.script.call_hook(EVENT_HOOK, HookArg::Event(*event)) {
            Ok(true) => {}
            Ok(false) => tracing::trace!(event = event.name(), "script has no {EVENT_HOOK}"),
            Err(e) => tracing::warn!(event = event.name(), "{EVENT_HOOK} failed: {e}"),
        }
    }
}
