//! Browser entry point.
//!
//! Binds the scene to a `<canvas id="starbridge">` (one is appended to the
//! body if absent) and streams assets over HTTP from the options'
//! `asset_base`. Engine creation is asynchronous on the web, so the engine
//! slot is filled from a spawned future and frames are skipped until then.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    platform::web::{EventLoopExtWebSys, WindowAttributesExtWebSys},
    window::{Window, WindowId},
};

use crate::{
    assets::HttpFetcher, engine::SceneEngine, error::SceneError,
    gpu::render_context::RenderContext, options::Options,
};

const CANVAS_ID: &str = "starbridge";

fn find_canvas() -> Option<web_sys::HtmlCanvasElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(CANVAS_ID)?
        .dyn_into()
        .ok()
}

struct WebApp {
    window: Option<Arc<Window>>,
    engine: Rc<RefCell<Option<SceneEngine>>>,
    options: Option<Options>,
}

impl ApplicationHandler for WebApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let Some(options) = self.options.take() else {
            return;
        };

        let canvas = find_canvas();
        let attrs = Window::default_attributes()
            .with_title("Starbridge")
            .with_append(canvas.is_none())
            .with_canvas(canvas);
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                return;
            }
        };

        let size = window.inner_size();
        let size = (size.width.max(1), size.height.max(1));
        let fetcher = Box::new(HttpFetcher::new(&options.scene.asset_base));
        let slot = Rc::clone(&self.engine);
        let target = Arc::clone(&window);
        wasm_bindgen_futures::spawn_local(async move {
            let engine = RenderContext::new(Arc::clone(&target), size)
                .await
                .map_err(SceneError::from)
                .and_then(|context| SceneEngine::new(context, options, fetcher));
            match engine {
                Ok(engine) => {
                    *slot.borrow_mut() = Some(engine);
                    target.request_redraw();
                }
                Err(e) => log::error!("Failed to initialize engine: {e}"),
            }
        });

        self.window = Some(window);
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let mut slot = self.engine.borrow_mut();
        let Some(engine) = slot.as_mut() else {
            return;
        };

        match event {
            WindowEvent::Resized(size) => engine.resize(size.width, size.height),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let _ = engine.handle_key(&format!("{code:?}"));
            }
            WindowEvent::RedrawRequested => {
                engine.tick();
                match engine.render() {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                        if let Some(w) = &self.window {
                            let size = w.inner_size();
                            engine.resize(size.width, size.height);
                        }
                    }
                    Err(e) => log::error!("render error: {e:?}"),
                }
                if let Some(w) = &self.window {
                    w.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Module start: install the panic hook and console logger, then hand the
/// scene to the browser's event loop.
///
/// # Errors
///
/// Returns a JS error if the logger or the event loop cannot be created.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let event_loop = EventLoop::new().map_err(|e| JsValue::from_str(&e.to_string()))?;
    event_loop.spawn_app(WebApp {
        window: None,
        engine: Rc::new(RefCell::new(None)),
        options: Some(Options::default()),
    });
    Ok(())
}
