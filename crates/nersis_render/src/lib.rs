//! Nersis Render System
//!
//! Backend bring-up and the per-frame lifecycle:
//! - [`backend`]: capability traits every graphics/window backend implements
//! - [`runtime`]: the lifecycle state machine shared by every variant
//! - [`gpu`] / [`window`]: the wgpu and winit backends
//!
//! A headless build pairs [`gpu::WgpuBackend`] with [`backend::Headless`];
//! a windowed build pairs it with [`window::WinitWindow`]. Both run through
//! the same [`runtime::RenderRuntime`].

pub mod backend;
pub mod canvas;
pub mod error;
pub mod event;
pub mod gpu;
pub mod runtime;
pub mod thread;
pub mod window;

pub use canvas::{Canvas, FrameStats, SharedCanvas};
pub use error::{FrameStage, InitStage, RenderError};
pub use event::{Event, EventObserver, UnobservedEvents};
pub use nersis_core::Color;
pub use runtime::{RenderRuntime, RuntimeConfig, RuntimeState};
pub use window::WindowConfig;

pub use wgpu;
pub use winit;

/// Rendering backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Metal (macOS, iOS)
    Metal,
    /// DirectX 12 (Windows)
    DirectX12,
    /// Vulkan (cross-platform)
    Vulkan,
    /// OpenGL / GLES (cross-platform, fallback)
    OpenGL,
    /// WebGPU (web)
    WebGpu,
    /// Software rasterizer or no real device
    Software,
}

impl BackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::Metal => "metal",
            BackendType::DirectX12 => "dx12",
            BackendType::Vulkan => "vulkan",
            BackendType::OpenGL => "opengl",
            BackendType::WebGpu => "webgpu",
            BackendType::Software => "software",
        }
    }
}

/// GPU vendor, classified from the adapter's PCI id or name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    Amd,
    Nvidia,
    Intel,
    MesaSoftware,
    Apple,
    Microsoft,
    Imagination,
    Arm,
    Qualcomm,
    Broadcom,
    Vivante,
    Unknown,
}

impl Vendor {
    /// Classify a vendor. The PCI id wins when it is recognized; otherwise
    /// the adapter/driver name is searched.
    pub fn classify(vendor_id: u32, name: &str) -> Self {
        match vendor_id {
            0x1002 | 0x1022 => return Vendor::Amd,
            0x10de => return Vendor::Nvidia,
            0x8086 => return Vendor::Intel,
            0x106b => return Vendor::Apple,
            0x1414 => return Vendor::Microsoft,
            0x1010 => return Vendor::Imagination,
            0x13b5 => return Vendor::Arm,
            0x5143 => return Vendor::Qualcomm,
            0x14e4 => return Vendor::Broadcom,
            _ => {}
        }

        const NAMES: &[(&str, Vendor)] = &[
            ("ATI Technologies", Vendor::Amd),
            ("AMD", Vendor::Amd),
            ("NVIDIA", Vendor::Nvidia),
            ("Intel", Vendor::Intel),
            ("Mesa", Vendor::MesaSoftware),
            ("llvmpipe", Vendor::MesaSoftware),
            ("Apple", Vendor::Apple),
            ("Microsoft", Vendor::Microsoft),
            ("Imagination", Vendor::Imagination),
            ("PowerVR", Vendor::Imagination),
            ("ARM", Vendor::Arm),
            ("Mali", Vendor::Arm),
            ("Qualcomm", Vendor::Qualcomm),
            ("Adreno", Vendor::Qualcomm),
            ("Broadcom", Vendor::Broadcom),
            ("Vivante", Vendor::Vivante),
        ];

        NAMES
            .iter()
            .find(|(needle, _)| name.contains(needle))
            .map(|(_, vendor)| *vendor)
            .unwrap_or(Vendor::Unknown)
    }
}

/// Capability probe result, filled in once the graphics context exists.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCapabilities {
    pub backend: BackendType,
    pub vendor: Vendor,
    pub adapter_name: String,
    pub max_texture_size: u32,
    pub max_color_attachments: u32,
    pub max_samples: u32,
}

impl DeviceCapabilities {
    /// Human-readable one-liner, also what scripts see from `getRendererInfo`.
    pub fn describe(&self) -> String {
        format!("{} ({:?}, {})", self.adapter_name, self.vendor, self.backend.as_str())
    }

    /// Limit by its script-facing name: `texturesize`, `multicanvas`
    /// (simultaneous color targets) or `canvasmsaa` (max sample count).
    pub fn limit(&self, name: &str) -> Option<u32> {
        match name {
            "texturesize" => Some(self.max_texture_size),
            "multicanvas" => Some(self.max_color_attachments),
            "canvasmsaa" => Some(self.max_samples),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_prefers_pci_id() {
        assert_eq!(Vendor::classify(0x10de, "Mesa Intel"), Vendor::Nvidia);
        assert_eq!(Vendor::classify(0x8086, ""), Vendor::Intel);
    }

    #[test]
    fn vendor_falls_back_to_name() {
        assert_eq!(Vendor::classify(0, "llvmpipe (LLVM 17.0.6, 256 bits)"), Vendor::MesaSoftware);
        assert_eq!(Vendor::classify(0, "Mali-G78"), Vendor::Arm);
        assert_eq!(Vendor::classify(0, "Some Card"), Vendor::Unknown);
    }

    #[test]
    fn limits_by_name() {
        let caps = DeviceCapabilities {
            backend: BackendType::OpenGL,
            vendor: Vendor::Intel,
            adapter_name: "HD 620".into(),
            max_texture_size: 8192,
            max_color_attachments: 8,
            max_samples: 4,
        };
        assert_eq!(caps.limit("texturesize"), Some(8192));
        assert_eq!(caps.limit("multicanvas"), Some(8));
        assert_eq!(caps.limit("canvasmsaa"), Some(4));
        assert_eq!(caps.limit("pointsize"), None);
    }
}
