//! Script bridge
//!
//! Installs a frozen [`BridgeRegistry`] into the script's global namespace.
//! Each global is a thin shim: copy the arguments out of the engine, hand
//! them to [`ScriptBinding::invoke`], and turn its outcome into either a
//! script value or a thrown error.

use std::rc::Rc;

use rquickjs::function::Rest;
use rquickjs::{Ctx, Exception, Function, IntoJs, Value};

use crate::guard::{BindingError, ReturnValue};
use crate::registry::{BridgeRegistry, ScriptBinding};
use crate::runtime::ScriptRuntime;
use crate::value::ScriptValue;
use crate::ScriptError;

pub struct ScriptBridge {
    registry: BridgeRegistry,
}

impl ScriptBridge {
    pub fn new(registry: BridgeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &BridgeRegistry {
        &self.registry
    }

    /// Define every binding as a global function.
    pub fn install(&self, script: &ScriptRuntime) -> Result<(), ScriptError> {
        script.context.with(|ctx| {
            for binding in self.registry.iter() {
                install_binding(&ctx, Rc::clone(binding))?;
            }
            Ok::<_, ScriptError>(())
        })?;
        tracing::info!(
            count = self.registry.len(),
            "script bindings installed: {}",
            self.registry.names().collect::<Vec<_>>().join(", ")
        );
        Ok(())
    }
}

fn install_binding<'js>(ctx: &Ctx<'js>, binding: Rc<ScriptBinding>) -> rquickjs::Result<()> {
    let name = binding.name();
    let func = Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>, args: Rest<Value<'js>>| -> rquickjs::Result<Value<'js>> {
            let values = args.0.iter().map(ScriptValue::from_js).collect();
            match binding.invoke(values) {
                Ok(ret) => return_value(&ctx, ret),
                Err(e) => Err(throw(&ctx, &e)),
            }
        },
    )?
    .with_name(name)?;
    ctx.globals().set(name, func)
}

fn return_value<'js>(ctx: &Ctx<'js>, ret: ReturnValue) -> rquickjs::Result<Value<'js>> {
    match ret {
        ReturnValue::Nothing => Ok(Value::new_undefined(ctx.clone())),
        ReturnValue::Number(n) => n.into_js(ctx),
        ReturnValue::String(s) => s.as_str().into_js(ctx),
    }
}

fn throw(ctx: &Ctx<'_>, err: &BindingError) -> rquickjs::Error {
    let message = err.to_string();
    match err {
        BindingError::ArityMismatch { .. } => Exception::throw_range(ctx, &message),
        BindingError::TypeMismatch { .. } => Exception::throw_type(ctx, &message),
        BindingError::Handler { .. } => Exception::throw_internal(ctx, &message),
    }
}
