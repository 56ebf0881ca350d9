//! Nersis Scripting System
//!
//! JavaScript execution via QuickJS, plus the bridge that exposes the
//! renderer to it.
//!
//! ## Architecture
//!
//! - **Runtime:** one QuickJS context per process, living on the render thread
//! - **Guard:** every binding validates its arguments against a declared spec
//!   before native code runs ([`guard`])
//! - **Registry:** bindings are declared once and frozen ([`registry`])
//! - **Bridge:** installs the frozen registry as script globals and turns
//!   guard failures into catchable `TypeError` / `RangeError` ([`bridge`])

pub mod bindings;
pub mod bridge;
pub mod guard;
pub mod observer;
pub mod registry;
pub mod runtime;
pub mod value;

use std::path::PathBuf;

use thiserror::Error;

pub use bridge::ScriptBridge;
pub use guard::{ArgKind, ArgSpec, BindingError, NativeArg, ReturnValue};
pub use observer::ScriptObserver;
pub use registry::{BridgeRegistry, RegistryBuilder, ScriptBinding};
pub use runtime::{HookArg, ScriptRuntime};
pub use value::ScriptValue;

pub use rquickjs;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script engine error: {0}")]
    Engine(#[from] rquickjs::Error),

    #[error("failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("uncaught exception in {context}: {message}")]
    Exception { context: String, message: String },

    #[error("binding `{0}` registered twice")]
    DuplicateBinding(&'static str),
}
