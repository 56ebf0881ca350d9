use std::cell::RefCell;
use std::rc::Rc;

use nersis_render::backend::{GraphicsBackend, Headless};
use nersis_render::{
    BackendType, Canvas, Color, DeviceCapabilities, Event, EventObserver, RenderError,
    RenderRuntime, RuntimeConfig, SharedCanvas, Vendor,
};
use nersis_script::bindings::standard_registry;
use nersis_script::{HookArg, ScriptBridge, ScriptError, ScriptObserver, ScriptRuntime};

fn scripted() -> (SharedCanvas, ScriptRuntime) {
    let canvas = Canvas::shared(Color::BLACK);
    let script = ScriptRuntime::new().unwrap();
    ScriptBridge::new(standard_registry(canvas.clone()).unwrap())
        .install(&script)
        .unwrap();
    (canvas, script)
}

#[test]
fn clear_with_four_numbers_reaches_canvas() {
    let (canvas, script) = scripted();
    script.execute("clear(1, 0, 0, 1);").unwrap();
    assert_eq!(
        canvas.borrow().requested_clear(),
        Some(Color::new(1.0, 0.0, 0.0, 1.0))
    );
}

#[test]
fn clear_with_array_reaches_canvas() {
    let (canvas, script) = scripted();
    script.execute("clear([0, 1, 0, 0.5]);").unwrap();
    assert_eq!(
        canvas.borrow().requested_clear(),
        Some(Color::new(0.0, 1.0, 0.0, 0.5))
    );
}

#[test]
fn clear_null_throws_catchable_type_error() {
    let (canvas, script) = scripted();
    let caught: bool = script
        .eval(
            r#"
            (function () {
                try {
                    clear(null);
                    return false;
                } catch (e) {
                    return e instanceof TypeError
                        && e.message.indexOf("clear") >= 0
                        && e.message.indexOf("argument 0") >= 0;
                }
            })()
            "#,
        )
        .unwrap();
    assert!(caught);
    assert_eq!(canvas.borrow().requested_clear(), None);
}

#[test]
fn wrong_arity_throws_range_error() {
    let (canvas, script) = scripted();
    let caught: bool = script
        .eval(
            r#"
            (function () {
                try {
                    clear();
                    return false;
                } catch (e) {
                    return e instanceof RangeError
                        && e.message.indexOf("clear") >= 0
                        && e.message.indexOf("argument 0") >= 0;
                }
            })()
            "#,
        )
        .unwrap();
    assert!(caught);

    let message: String = script
        .eval("(function () { try { setBackgroundColor(1); } catch (e) { return e.message; } })()")
        .unwrap();
    assert!(message.contains("setBackgroundColor"), "{message}");
    assert!(message.contains("argument 1"), "{message}");

    let caught: bool = script
        .eval("(function () { try { clear(1, 2); return false; } catch (e) { return e instanceof RangeError; } })()")
        .unwrap();
    assert!(caught);
    assert_eq!(canvas.borrow().requested_clear(), None);
}

#[test]
fn wrong_kinds_never_crash_the_host() {
    let (canvas, script) = scripted();
    let rejected: i32 = script
        .eval(
            r#"
            (function () {
                var bad = [
                    function () { clear("red"); },
                    function () { clear({}); },
                    function () { clear([1, 2, 3]); },
                    function () { clear(1, 0, "0", 1); },
                    function () { clear(undefined, undefined, undefined, undefined); },
                    function () { print(42); },
                    function () { print(); },
                    function () { setBackgroundColor(1, 1); },
                    function () { setBackgroundColor(1, null, 1); },
                    function () { getWidth(1); },
                ];
                var n = 0;
                for (var i = 0; i < bad.length; i++) {
                    try { bad[i](); } catch (e) { n++; }
                }
                return n;
            })()
            "#,
        )
        .unwrap();
    assert_eq!(rejected, 10);
    assert_eq!(canvas.borrow().requested_clear(), None);
    assert_eq!(canvas.borrow().background(), Color::BLACK);
}

#[test]
fn uncaught_binding_error_surfaces_as_script_exception() {
    let (_, script) = scripted();
    let err = script.execute("clear(null);").unwrap_err();
    match err {
        ScriptError::Exception { message, .. } => assert!(message.contains("clear")),
        other => panic!("expected exception, got {other:?}"),
    }
}

#[test]
fn queries_return_numbers_and_strings() {
    let (canvas, script) = scripted();
    canvas.borrow_mut().set_size((800, 600));

    let width: f64 = script.eval("getWidth()").unwrap();
    let height: f64 = script.eval("getHeight()").unwrap();
    assert_eq!((width, height), (800.0, 600.0));

    let info: String = script.eval("typeof getRendererInfo()").unwrap();
    assert_eq!(info, "string");
    let nothing: bool = script.eval("print('hello') === undefined").unwrap();
    assert!(nothing);
}

#[test]
fn limits_and_stats_are_queryable_by_name() {
    let (canvas, script) = scripted();
    {
        let mut c = canvas.borrow_mut();
        c.stats_mut().frames = 9;
        c.set_capabilities(Some(DeviceCapabilities {
            backend: BackendType::Vulkan,
            vendor: Vendor::Nvidia,
            adapter_name: "RTX".into(),
            max_texture_size: 32768,
            max_color_attachments: 8,
            max_samples: 8,
        }));
    }

    let msaa: f64 = script.eval("getSystemLimit('canvasmsaa')").unwrap();
    assert_eq!(msaa, 8.0);
    let frames: f64 = script.eval("getStat('frames')").unwrap();
    assert_eq!(frames, 9.0);

    let caught: bool = script
        .eval("(function () { try { getStat('drawcalls'); return false; } catch (e) { return e.message.indexOf('drawcalls') >= 0; } })()")
        .unwrap();
    assert!(caught);
}

#[test]
fn background_alpha_can_be_omitted() {
    let (canvas, script) = scripted();
    script.execute("setBackgroundColor(0.25, 0.5, 0.75);").unwrap();
    assert_eq!(canvas.borrow().background(), Color::new(0.25, 0.5, 0.75, 1.0));
}

#[test]
fn hooks_are_optional_and_errors_are_contained() {
    let (_, script) = scripted();
    assert!(!script.call_hook("update", HookArg::Number(0.016)).unwrap());

    script
        .execute("var ticks = 0; function update(dt) { ticks += 1; } function load() { throw new Error('boom'); }")
        .unwrap();
    assert!(script.call_hook("update", HookArg::Number(0.016)).unwrap());
    let ticks: i32 = script.eval("ticks").unwrap();
    assert_eq!(ticks, 1);

    assert!(matches!(
        script.call_hook("load", HookArg::None),
        Err(ScriptError::Exception { .. })
    ));
}

#[test]
fn observer_forwards_events_to_on_event() {
    let (_, script) = scripted();
    let script = Rc::new(script);
    script
        .execute("var seen = []; function onEvent(e) { seen.push(e.type + ':' + e.x + ',' + e.dy); }")
        .unwrap();

    let mut observer = ScriptObserver::new(script.clone());
    observer.on_event(&Event::MouseMotion {
        timestamp: 10,
        device_id: 3,
        x: 4.0,
        y: 5.0,
        dx: 1.0,
        dy: -2.0,
    });
    observer.on_event(&Event::Unknown);

    let seen: String = script.eval("seen.join('|')").unwrap();
    assert_eq!(seen, "mousemotion:4,-2|unknown:undefined,undefined");
}

#[test]
fn throwing_observer_does_not_stop_dispatch() {
    let (_, script) = scripted();
    let script = Rc::new(script);
    script
        .execute("var calls = 0; function onEvent(e) { calls++; throw new Error('bad handler'); }")
        .unwrap();

    let mut observer = ScriptObserver::new(script.clone());
    observer.on_event(&Event::Unknown);
    observer.on_event(&Event::Unknown);
    let calls: i32 = script.eval("calls").unwrap();
    assert_eq!(calls, 2);
}

struct RecordingGraphics {
    clears: Rc<RefCell<Vec<Color>>>,
}

impl GraphicsBackend<()> for RecordingGraphics {
    fn initialize(&mut self, _: (), _: (u32, u32)) -> Result<DeviceCapabilities, RenderError> {
        Ok(DeviceCapabilities {
            backend: BackendType::Software,
            vendor: Vendor::Unknown,
            adapter_name: "recording".into(),
            max_texture_size: 1024,
            max_color_attachments: 1,
            max_samples: 1,
        })
    }

    fn clear(&mut self, color: Color) -> Result<(), RenderError> {
        self.clears.borrow_mut().push(color);
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        (64, 64)
    }

    fn release(&mut self) {}
}

#[test]
fn script_drives_headless_frames() {
    let clears = Rc::new(RefCell::new(Vec::new()));
    let mut runtime = RenderRuntime::new(
        RuntimeConfig::default(),
        RecordingGraphics {
            clears: clears.clone(),
        },
        Headless,
    );

    let script = Rc::new(ScriptRuntime::new().unwrap());
    ScriptBridge::new(standard_registry(runtime.canvas()).unwrap())
        .install(&script)
        .unwrap();
    runtime.set_observer(Box::new(ScriptObserver::new(script.clone())));
    runtime.initialize().unwrap();

    script
        .execute("function update(dt) { if (getFrameCount() == 1) clear(0, 0, 1, 1); }")
        .unwrap();

    for _ in 0..3 {
        script.call_hook("update", HookArg::Number(0.0)).unwrap();
        assert!(runtime.update().unwrap());
    }

    let blue = Color::new(0.0, 0.0, 1.0, 1.0);
    assert_eq!(*clears.borrow(), vec![Color::BLACK, blue, Color::BLACK]);
    let width: f64 = script.eval("getWidth()").unwrap();
    assert_eq!(width, 64.0);
}
