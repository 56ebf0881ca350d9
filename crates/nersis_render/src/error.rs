//! Render errors
//!
//! Init failures are fatal: the platform's graphics stack is unusable and
//! there is no half-initialized state to fall back to. Frame failures are
//! recoverable and leave the retry decision to the host.

use std::fmt;

use thiserror::Error;

use crate::runtime::RuntimeState;

/// Which part of bring-up failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStage {
    Config,
    Window,
    Context,
    EntryPoints,
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InitStage::Config => "config",
            InitStage::Window => "window",
            InitStage::Context => "context",
            InitStage::EntryPoints => "entry points",
        })
    }
}

/// Which part of a frame failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStage {
    Clear,
    SwapBuffers,
    Present,
}

impl fmt::Display for FrameStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FrameStage::Clear => "clear",
            FrameStage::SwapBuffers => "swap buffers",
            FrameStage::Present => "present",
        })
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("fatal init failure ({stage}): {reason}")]
    FatalInit { stage: InitStage, reason: String },

    #[error("frame failed during {stage}: {reason}")]
    TransientFrame { stage: FrameStage, reason: String },

    #[error("`{op}` is not valid while the runtime is {state}")]
    InvalidState { op: &'static str, state: RuntimeState },
}

impl RenderError {
    pub fn fatal(stage: InitStage, reason: impl fmt::Display) -> Self {
        RenderError::FatalInit {
            stage,
            reason: reason.to_string(),
        }
    }

    pub fn frame(stage: FrameStage, reason: impl fmt::Display) -> Self {
        RenderError::TransientFrame {
            stage,
            reason: reason.to_string(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, RenderError::FatalInit { .. })
    }
}
