//! Nersis Runtime
//!
//! Host binary: picks the backend pairing, boots the script, drives frames.
//!
//! Usage: `nersis [--config settings.json] [--headless] [script.js]`

mod cli;
mod host;

use anyhow::{Context, Result};
use clap::Parser;
use nersis_render::backend::Headless;
use nersis_render::gpu::{GpuOptions, WgpuBackend};
use nersis_services::settings::{Settings, Variant};
use tracing_subscriber::EnvFilter;

use crate::cli::CliArgs;

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let config = args.config.clone();
    let mut settings = match &config {
        Some(path) => Settings::load(path).context("could not load settings")?,
        None => Settings::default(),
    };
    args.apply(&mut settings);
    settings.validate().context("invalid settings")?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Nersis v{}", nersis_core::VERSION);
    match &config {
        Some(path) => tracing::info!(path = %path.display(), "settings loaded"),
        None => tracing::info!("no settings file, using defaults"),
    }

    let gpu = WgpuBackend::new(GpuOptions {
        vsync: settings.graphics.vsync,
        force_fallback_adapter: settings.graphics.force_fallback_adapter,
        ..GpuOptions::default()
    });

    match settings.graphics.variant {
        Variant::Headless => host::run(&settings, gpu, Headless),
        Variant::Windowed => run_windowed(&settings, gpu),
    }
}

#[cfg(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "android"
))]
fn run_windowed(settings: &Settings, gpu: WgpuBackend) -> Result<()> {
    host::run(settings, gpu, nersis_render::window::WinitWindow::new())
}

#[cfg(not(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "android"
)))]
fn run_windowed(_settings: &Settings, _gpu: WgpuBackend) -> Result<()> {
    anyhow::bail!("the windowed variant is not available on this platform")
}
