//! Binding registry
//!
//! Bindings are declared on a [`RegistryBuilder`] and frozen into a
//! [`BridgeRegistry`] once; the frozen registry has no way to add or remove
//! entries.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::guard::{self, ArgSpec, BindingError, NativeArg, ReturnValue};
use crate::value::ScriptValue;
use crate::ScriptError;

/// Native side of a binding. Only ever sees validated arguments.
pub type Handler = Rc<dyn Fn(&Args) -> Result<ReturnValue, String>>;

/// Validated arguments, one per declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Args(Vec<NativeArg>);

impl Args {
    pub fn as_slice(&self) -> &[NativeArg] {
        &self.0
    }

    pub fn number(&self, index: usize) -> Result<f64, String> {
        match self.0.get(index) {
            Some(NativeArg::Number(n)) => Ok(*n),
            other => Err(format!("argument {index} is not a number: {other:?}")),
        }
    }

    pub fn string(&self, index: usize) -> Result<&str, String> {
        match self.0.get(index) {
            Some(NativeArg::Str(s)) => Ok(s),
            other => Err(format!("argument {index} is not a string: {other:?}")),
        }
    }

    pub fn color(&self, index: usize) -> Result<nersis_core::Color, String> {
        match self.0.get(index) {
            Some(NativeArg::Color(c)) => Ok(*c),
            other => Err(format!("argument {index} is not a color: {other:?}")),
        }
    }
}

pub struct ScriptBinding {
    name: &'static str,
    params: Vec<ArgSpec>,
    handler: Handler,
}

impl ScriptBinding {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn params(&self) -> &[ArgSpec] {
        &self.params
    }

    /// `(min, max)` accepted argument count.
    pub fn arity(&self) -> (usize, usize) {
        guard::arity(&self.params)
    }

    /// Validate `args` and, only if they pass, run the handler.
    pub fn invoke(&self, args: Vec<ScriptValue>) -> Result<ReturnValue, BindingError> {
        let native = guard::validate(self.name, &self.params, args).inspect_err(|e| {
            tracing::warn!(binding = self.name, index = ?e.index(), "rejected script call: {e}");
        })?;

        (self.handler)(&Args(native)).map_err(|reason| {
            tracing::warn!(binding = self.name, "binding failed: {reason}");
            BindingError::Handler {
                binding: self.name,
                reason,
            }
        })
    }
}

impl std::fmt::Debug for ScriptBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptBinding")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    bindings: Vec<ScriptBinding>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind<F>(mut self, name: &'static str, params: Vec<ArgSpec>, handler: F) -> Self
    where
        F: Fn(&Args) -> Result<ReturnValue, String> + 'static,
    {
        self.bindings.push(ScriptBinding {
            name,
            params,
            handler: Rc::new(handler),
        });
        self
    }

    pub fn build(self) -> Result<BridgeRegistry, ScriptError> {
        let mut bindings = BTreeMap::new();
        for binding in self.bindings {
            let name = binding.name;
            if bindings.insert(name, Rc::new(binding)).is_some() {
                return Err(ScriptError::DuplicateBinding(name));
            }
        }
        Ok(BridgeRegistry { bindings })
    }
}

/// Name → binding, read-only after [`RegistryBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct BridgeRegistry {
    bindings: BTreeMap<&'static str, Rc<ScriptBinding>>,
}

impl BridgeRegistry {
    pub fn get(&self, name: &str) -> Option<&Rc<ScriptBinding>> {
        self.bindings.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.bindings.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<ScriptBinding>> {
        self.bindings.values()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
