//! Render thread binding
//!
//! Graphics drivers tie context ownership to one native thread. A
//! [`RenderThread`] records that thread and is neither `Send` nor `Sync`, so
//! whatever owns it (the runtime) cannot leave the thread it was bound on.

use std::marker::PhantomData;
use std::thread::{self, ThreadId};

#[derive(Debug)]
pub struct RenderThread {
    id: ThreadId,
    name: Option<String>,
    _not_send: PhantomData<*const ()>,
}

impl RenderThread {
    /// Bind to the calling thread.
    pub fn bind() -> Self {
        let current = thread::current();
        let binding = Self {
            id: current.id(),
            name: current.name().map(str::to_owned),
            _not_send: PhantomData,
        };
        tracing::debug!(thread = ?binding.id, name = ?binding.name, "bound render thread");
        binding
    }

    pub fn id(&self) -> ThreadId {
        self.id
    }

    pub fn is_current(&self) -> bool {
        thread::current().id() == self.id
    }
}
