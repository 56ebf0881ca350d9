//! Standard bindings
//!
//! The fixed set of globals every script gets. Names, parameters and result
//! kinds here are the script-facing contract; scripts break if they change.

use nersis_render::{Canvas, Color, SharedCanvas};

use crate::guard::{ArgSpec, NativeArg, ReturnValue};
use crate::registry::{Args, BridgeRegistry, RegistryBuilder};
use crate::ScriptError;

/// Graphics bindings over `canvas` plus the utility bindings.
pub fn standard_registry(canvas: SharedCanvas) -> Result<BridgeRegistry, ScriptError> {
    register_utility(register_graphics(RegistryBuilder::new(), canvas)).build()
}

pub fn register_graphics(builder: RegistryBuilder, canvas: SharedCanvas) -> RegistryBuilder {
    let clear_canvas = canvas.clone();
    let background_canvas = canvas.clone();
    let width_canvas = canvas.clone();
    let height_canvas = canvas.clone();
    let frame_canvas = canvas.clone();
    let info_canvas = canvas.clone();
    let limit_canvas = canvas.clone();
    let system_canvas = canvas.clone();
    let stat_canvas = canvas;

    builder
        .bind("clear", vec![ArgSpec::rgba("color")], move |args| {
            let color = args.color(0)?;
            with_canvas(&clear_canvas, |c| c.request_clear(color))?;
            Ok(ReturnValue::Nothing)
        })
        .bind(
            "setBackgroundColor",
            vec![
                ArgSpec::number("r"),
                ArgSpec::number("g"),
                ArgSpec::number("b"),
                ArgSpec::number("a").or(NativeArg::Number(1.0)),
            ],
            move |args| {
                let color = color_from_numbers(args)?;
                with_canvas(&background_canvas, |c| c.set_background(color))?;
                Ok(ReturnValue::Nothing)
            },
        )
        .bind("getWidth", vec![], move |_| {
            with_canvas(&width_canvas, |c| ReturnValue::Number(c.size().0 as f64))
        })
        .bind("getHeight", vec![], move |_| {
            with_canvas(&height_canvas, |c| ReturnValue::Number(c.size().1 as f64))
        })
        .bind("getFrameCount", vec![], move |_| {
            with_canvas(&frame_canvas, |c| ReturnValue::Number(c.stats().frames as f64))
        })
        .bind("getRendererInfo", vec![], move |_| {
            with_canvas(&info_canvas, |c| {
                ReturnValue::String(
                    c.capabilities()
                        .map(|caps| caps.describe())
                        .unwrap_or_default(),
                )
            })
        })
        .bind("getMaxTextureSize", vec![], move |_| {
            with_canvas(&limit_canvas, |c| {
                ReturnValue::Number(c.capabilities().map_or(0.0, |caps| caps.max_texture_size as f64))
            })
        })
        .bind("getSystemLimit", vec![ArgSpec::string("name")], move |args| {
            let name = args.string(0)?;
            with_canvas(&system_canvas, |c| -> Result<ReturnValue, String> {
                let caps = c.capabilities().ok_or("no graphics context")?;
                caps.limit(name)
                    .map(|value| ReturnValue::Number(value as f64))
                    .ok_or_else(|| format!("unknown system limit `{name}`"))
            })?
        })
        .bind("getStat", vec![ArgSpec::string("name")], move |args| {
            let name = args.string(0)?;
            with_canvas(&stat_canvas, |c| {
                c.stats()
                    .get(name)
                    .map(|value| ReturnValue::Number(value as f64))
                    .ok_or_else(|| format!("unknown stat `{name}`"))
            })?
        })
}

pub fn register_utility(builder: RegistryBuilder) -> RegistryBuilder {
    builder.bind("print", vec![ArgSpec::string("message")], |args| {
        let message = args.string(0)?;
        tracing::info!(target: "script", "{message}");
        Ok(ReturnValue::Nothing)
    })
}

fn color_from_numbers(args: &Args) -> Result<Color, String> {
    Ok(Color::new(
        args.number(0)? as f32,
        args.number(1)? as f32,
        args.number(2)? as f32,
        args.number(3)? as f32,
    ))
}

fn with_canvas<R>(canvas: &SharedCanvas, f: impl FnOnce(&mut Canvas) -> R) -> Result<R, String> {
    let mut canvas = canvas
        .try_borrow_mut()
        .map_err(|_| "canvas is busy".to_string())?;
    Ok(f(&mut canvas))
}
