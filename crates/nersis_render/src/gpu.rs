//! wgpu graphics backend
//!
//! One [`WgpuBackend`] serves both variants: rendering into an offscreen
//! texture when paired with [`crate::backend::Headless`], or into a window
//! surface when paired with a winit window.

use std::sync::Arc;

use nersis_core::Color;
use winit::window::Window;

use crate::backend::GraphicsBackend;
use crate::error::{FrameStage, InitStage, RenderError};
use crate::{BackendType, DeviceCapabilities, Vendor};

const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

#[derive(Debug, Clone)]
pub struct GpuOptions {
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,
    /// Ask for a software adapter (CI and machines without a GPU).
    pub force_fallback_adapter: bool,
    pub vsync: bool,
}

impl Default for GpuOptions {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
            vsync: true,
        }
    }
}

#[derive(Default)]
pub struct WgpuBackend {
    options: GpuOptions,
    context: Option<GpuContext>,
}

struct GpuContext {
    // Field order is drop order: the target (and its surface) goes before
    // the device it was configured with.
    target: Target,
    device: wgpu::Device,
    queue: wgpu::Queue,
    _adapter: wgpu::Adapter,
    _instance: wgpu::Instance,
}

enum Target {
    Offscreen {
        texture: wgpu::Texture,
        view: wgpu::TextureView,
    },
    Surface {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
        frame: Option<wgpu::SurfaceTexture>,
        window: Arc<Window>,
    },
}

impl WgpuBackend {
    pub fn new(options: GpuOptions) -> Self {
        Self {
            options,
            context: None,
        }
    }

    fn context_mut(&mut self, stage: FrameStage) -> Result<&mut GpuContext, RenderError> {
        self.context
            .as_mut()
            .ok_or_else(|| RenderError::frame(stage, "no graphics context"))
    }

    fn request_device(
        &self,
        instance: &wgpu::Instance,
        surface: Option<&wgpu::Surface<'static>>,
    ) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue), RenderError> {
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: self.options.power_preference,
            compatible_surface: surface,
            force_fallback_adapter: self.options.force_fallback_adapter,
        }))
        .ok_or_else(|| RenderError::fatal(InitStage::Context, "no suitable GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("nersis device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        ))
        .map_err(|e| RenderError::fatal(InitStage::EntryPoints, e))?;

        Ok((adapter, device, queue))
    }

    fn instance(&self) -> wgpu::Instance {
        wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: self.options.backends,
            ..Default::default()
        })
    }
}

fn probe(adapter: &wgpu::Adapter, format: wgpu::TextureFormat) -> DeviceCapabilities {
    let info = adapter.get_info();
    let limits = adapter.limits();

    let backend = match (info.device_type, info.backend) {
        (wgpu::DeviceType::Cpu, _) => BackendType::Software,
        (_, wgpu::Backend::Vulkan) => BackendType::Vulkan,
        (_, wgpu::Backend::Metal) => BackendType::Metal,
        (_, wgpu::Backend::Dx12) => BackendType::DirectX12,
        (_, wgpu::Backend::Gl) => BackendType::OpenGL,
        (_, wgpu::Backend::BrowserWebGpu) => BackendType::WebGpu,
        (_, wgpu::Backend::Empty) => BackendType::Software,
    };

    let flags = adapter.get_texture_format_features(format).flags;
    let max_samples = [16, 8, 4, 2]
        .into_iter()
        .find(|&count| flags.sample_count_supported(count))
        .unwrap_or(1);

    let vendor = Vendor::classify(info.vendor, &format!("{} {}", info.name, info.driver));

    DeviceCapabilities {
        backend,
        vendor,
        adapter_name: info.name,
        max_texture_size: limits.max_texture_dimension_2d,
        max_color_attachments: limits.max_color_attachments,
        max_samples,
    }
}

fn to_wgpu(color: Color) -> wgpu::Color {
    wgpu::Color {
        r: color.r() as f64,
        g: color.g() as f64,
        b: color.b() as f64,
        a: color.a() as f64,
    }
}

fn clear_view(device: &wgpu::Device, queue: &wgpu::Queue, view: &wgpu::TextureView, color: Color) {
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("nersis clear encoder"),
    });
    {
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("nersis clear pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(to_wgpu(color)),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }
    queue.submit(std::iter::once(encoder.finish()));
}

impl GraphicsBackend<()> for WgpuBackend {
    fn initialize(&mut self, _surface: (), size: (u32, u32)) -> Result<DeviceCapabilities, RenderError> {
        let instance = self.instance();
        let (adapter, device, queue) = self.request_device(&instance, None)?;

        let limit = adapter.limits().max_texture_dimension_2d;
        if size.0 > limit || size.1 > limit {
            return Err(RenderError::fatal(
                InitStage::Context,
                format!("offscreen target {}x{} exceeds max texture size {limit}", size.0, size.1),
            ));
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("nersis offscreen target"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let capabilities = probe(&adapter, OFFSCREEN_FORMAT);
        self.context = Some(GpuContext {
            target: Target::Offscreen { texture, view },
            device,
            queue,
            _adapter: adapter,
            _instance: instance,
        });
        Ok(capabilities)
    }

    fn clear(&mut self, color: Color) -> Result<(), RenderError> {
        GpuContext::clear(self.context_mut(FrameStage::Clear)?, color)
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.context_mut(FrameStage::Present)?.present()
    }

    fn size(&self) -> (u32, u32) {
        self.context.as_ref().map(GpuContext::size).unwrap_or((0, 0))
    }

    fn release(&mut self) {
        if self.context.take().is_some() {
            tracing::debug!("graphics context released");
        }
    }
}

impl GraphicsBackend<Arc<Window>> for WgpuBackend {
    fn initialize(
        &mut self,
        window: Arc<Window>,
        size: (u32, u32),
    ) -> Result<DeviceCapabilities, RenderError> {
        let instance = self.instance();
        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(|e| RenderError::fatal(InitStage::Context, e))?;
        let (adapter, device, queue) = self.request_device(&instance, Some(&surface))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| RenderError::fatal(InitStage::Context, "surface reports no formats"))?;

        let present_mode = if self.options.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        // Prefer the real drawable size; it differs from the logical request
        // on scaled displays.
        let physical = window.inner_size();
        let (width, height) = if physical.width > 0 && physical.height > 0 {
            (physical.width, physical.height)
        } else {
            size
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let capabilities = probe(&adapter, format);
        self.context = Some(GpuContext {
            target: Target::Surface {
                surface,
                config,
                frame: None,
                window,
            },
            device,
            queue,
            _adapter: adapter,
            _instance: instance,
        });
        Ok(capabilities)
    }

    fn clear(&mut self, color: Color) -> Result<(), RenderError> {
        GpuContext::clear(self.context_mut(FrameStage::Clear)?, color)
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.context_mut(FrameStage::Present)?.present()
    }

    fn size(&self) -> (u32, u32) {
        self.context.as_ref().map(GpuContext::size).unwrap_or((0, 0))
    }

    fn resize(&mut self, size: (u32, u32)) {
        if let Some(context) = self.context.as_mut() {
            context.resize(size);
        }
    }

    fn release(&mut self) {
        if self.context.take().is_some() {
            tracing::debug!("graphics context released");
        }
    }
}

impl GpuContext {
    fn size(&self) -> (u32, u32) {
        match &self.target {
            Target::Offscreen { texture, .. } => (texture.width(), texture.height()),
            Target::Surface { config, .. } => (config.width, config.height),
        }
    }

    /// wgpu cannot configure a 0x0 surface; a minimized window keeps the
    /// old configuration until it is restored.
    fn resize(&mut self, (width, height): (u32, u32)) {
        let Target::Surface { surface, config, frame, .. } = &mut self.target else {
            return;
        };
        if width == 0 || height == 0 || (config.width, config.height) == (width, height) {
            return;
        }
        *frame = None;
        config.width = width;
        config.height = height;
        surface.configure(&self.device, config);
        tracing::debug!(width, height, "surface resized");
    }

    fn clear(&mut self, color: Color) -> Result<(), RenderError> {
        match &mut self.target {
            Target::Offscreen { view, .. } => {
                clear_view(&self.device, &self.queue, view, color);
                Ok(())
            }
            Target::Surface {
                surface,
                config,
                frame,
                window,
            } => {
                if frame.is_none() {
                    *frame = Some(acquire(surface, &self.device, config, window, FrameStage::Clear)?);
                }
                if let Some(texture) = frame.as_ref() {
                    let view = texture
                        .texture
                        .create_view(&wgpu::TextureViewDescriptor::default());
                    clear_view(&self.device, &self.queue, &view, color);
                }
                Ok(())
            }
        }
    }

    fn present(&mut self) -> Result<(), RenderError> {
        match &mut self.target {
            Target::Offscreen { .. } => {
                // Nothing to flip; wait for the submitted work instead.
                let _ = self.device.poll(wgpu::Maintain::Wait);
                Ok(())
            }
            Target::Surface {
                surface,
                config,
                frame,
                window,
            } => {
                let texture = match frame.take() {
                    Some(texture) => texture,
                    None => acquire(surface, &self.device, config, window, FrameStage::Present)?,
                };
                texture.present();
                Ok(())
            }
        }
    }
}

fn acquire(
    surface: &wgpu::Surface<'static>,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    window: &Window,
    stage: FrameStage,
) -> Result<wgpu::SurfaceTexture, RenderError> {
    match surface.get_current_texture() {
        Ok(texture) => Ok(texture),
        Err(err @ (wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost)) => {
            let size = window.inner_size();
            if size.width > 0 && size.height > 0 {
                config.width = size.width;
                config.height = size.height;
                surface.configure(device, config);
                tracing::debug!(width = size.width, height = size.height, "surface reconfigured");
            }
            Err(RenderError::frame(stage, err))
        }
        Err(err) => Err(RenderError::frame(stage, err)),
    }
}
