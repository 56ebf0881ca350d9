//! Script runtime management
//!
//! Owns the QuickJS runtime and its single context. Script-defined hooks
//! (`load`, `update`, `onEvent`) are looked up by name and are all optional.

use std::path::Path;

use nersis_render::Event;
use rquickjs::{Context, Ctx, Function, Object, Runtime};

use crate::ScriptError;

/// Argument passed to a script hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HookArg {
    None,
    Number(f64),
    Event(Event),
}

/// Script execution context
pub struct ScriptRuntime {
    #[allow(dead_code)] // Kept alive for context lifetime
    runtime: Runtime,
    pub context: Context,
}

impl ScriptRuntime {
    pub fn new() -> Result<Self, ScriptError> {
        let runtime = Runtime::new()?;
        let context = Context::full(&runtime)?;

        Ok(Self { runtime, context })
    }

    pub fn execute_file(&self, path: &Path) -> Result<(), ScriptError> {
        let source = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "loading script");
        self.execute(&source)
    }

    pub fn execute(&self, source: &str) -> Result<(), ScriptError> {
        self.context.with(|ctx| {
            ctx.eval::<(), _>(source)
                .map_err(|e| exception(&ctx, e, "script body"))
        })
    }

    /// Evaluate an expression and return its value converted to `T`.
    pub fn eval<T>(&self, source: &str) -> Result<T, ScriptError>
    where
        T: for<'js> rquickjs::FromJs<'js>,
    {
        self.context.with(|ctx| {
            ctx.eval::<T, _>(source)
                .map_err(|e| exception(&ctx, e, "expression"))
        })
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.context.with(|ctx| {
            matches!(ctx.globals().get::<_, Option<Function>>(name), Ok(Some(_)))
        })
    }

    /// Call the global function `name` if the script defines one.
    ///
    /// Returns `Ok(false)` when no such function exists.
    pub fn call_hook(&self, name: &str, arg: HookArg) -> Result<bool, ScriptError> {
        self.context.with(|ctx| {
            let hook: Option<Function> = ctx
                .globals()
                .get(name)
                .map_err(|e| exception(&ctx, e, name))?;
            let Some(hook) = hook else {
                return Ok(false);
            };

            let result = match arg {
                HookArg::None => hook.call::<_, ()>(()),
                HookArg::Number(n) => hook.call::<_, ()>((n,)),
                HookArg::Event(event) => {
                    event_object(&ctx, &event).and_then(|obj| hook.call::<_, ()>((obj,)))
                }
            };
            result.map_err(|e| exception(&ctx, e, name))?;
            Ok(true)
        })
    }
}

/// Script view of an event: `{ type, ... }` with camelCase fields.
pub fn event_object<'js>(ctx: &Ctx<'js>, event: &Event) -> rquickjs::Result<Object<'js>> {
    let obj = Object::new(ctx.clone())?;
    obj.set("type", event.name())?;
    if let Event::MouseMotion {
        timestamp,
        device_id,
        x,
        y,
        dx,
        dy,
    } = *event
    {
        obj.set("timestamp", timestamp as f64)?;
        // Device ids are opaque hashes; a string keeps all 64 bits.
        obj.set("deviceId", device_id.to_string())?;
        obj.set("x", x)?;
        obj.set("y", y)?;
        obj.set("dx", dx)?;
        obj.set("dy", dy)?;
    }
    Ok(obj)
}

/// Pull the pending exception out of the context so its message survives.
fn exception(ctx: &Ctx<'_>, err: rquickjs::Error, context: &str) -> ScriptError {
    if !matches!(err, rquickjs::Error::Exception) {
        return ScriptError::Engine(err);
    }
    let caught = ctx.catch();
    let message = match caught.as_exception() {
        Some(ex) => ex.to_string(),
        None => match caught.as_string().and_then(|s| s.to_string().ok()) {
            Some(s) => s,
            None => format!("{caught:?}"),
        },
    };
    ScriptError::Exception {
        context: context.to_string(),
        message,
    }
}
