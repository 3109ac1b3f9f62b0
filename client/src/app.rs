use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Element, Event, EventTarget, HtmlButtonElement, HtmlCanvasElement,
    HtmlInputElement, PointerEvent,
};

use sketchsync_shared::ClientMessage;

use crate::capture::{Brush, StrokeBuilder};
use crate::dom::{event_to_point, get_element, read_width, resize_canvas, set_status};
use crate::reconcile::{draw_stroke, Reconciler};
use crate::render::CanvasSurface;
use crate::util::{make_id, now_ms};
use crate::ws::{connect_ws, WsEvent, WsSender};

// Participants are not identified yet; every stroke carries this author.
const AUTHOR_ID: &str = "anonymous";

struct App {
    reconciler: Reconciler,
    surface: CanvasSurface,
    builder: StrokeBuilder,
    sender: Option<Rc<WsSender>>,
}

impl App {
    fn send(&self, message: &ClientMessage) {
        if let Some(sender) = &self.sender {
            sender.send(message);
        }
    }

    fn finish_stroke(&mut self) {
        let Some(stroke) = self.builder.finish() else {
            return;
        };
        if let Some(message) = self
            .reconciler
            .on_local_stroke_complete(stroke, &mut self.surface)
        {
            self.send(&message);
        }
    }

    /// Full redraw that keeps an unfinished local stroke visible.
    fn redraw(&mut self) {
        self.reconciler.redraw(&mut self.surface);
        self.repaint_pending();
    }

    fn repaint_pending(&mut self) {
        if let Some(stroke) = self.builder.current() {
            draw_stroke(&mut self.surface, stroke);
        }
    }
}

fn add_listeners(
    target: &EventTarget,
    events: &[&str],
    callback: &Function,
) -> Result<(), JsValue> {
    for event in events {
        target.add_event_listener_with_callback(event, callback)?;
    }
    Ok(())
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;

    let canvas: HtmlCanvasElement = get_element(&document, "board")?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Missing canvas context"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    let color_input: HtmlInputElement = get_element(&document, "color")?;
    let size_input: HtmlInputElement = get_element(&document, "size")?;
    let undo_button: HtmlButtonElement = get_element(&document, "undo")?;
    let clear_button: HtmlButtonElement = get_element(&document, "clear")?;
    let status_el: Element = get_element(&document, "status")?;

    let app = Rc::new(RefCell::new(App {
        reconciler: Reconciler::new(),
        surface: CanvasSurface::new(ctx),
        builder: StrokeBuilder::default(),
        sender: None,
    }));

    {
        let mut app = app.borrow_mut();
        resize_canvas(&window, &canvas, &mut app.surface);
        app.redraw();
    }

    set_status(&status_el, "connecting", "Connecting…");
    let sender = {
        let app = app.clone();
        let status_el = status_el.clone();
        connect_ws(&window, move |event| match event {
            WsEvent::Open => set_status(&status_el, "open", "Live"),
            WsEvent::Close => set_status(&status_el, "closed", "Offline"),
            WsEvent::Error => set_status(&status_el, "error", "Connection error"),
            WsEvent::Message(message) => {
                log::debug!("WS message {}", message.kind());
                let mut app = app.borrow_mut();
                let app = &mut *app;
                app.reconciler
                    .apply_server_message(message, &mut app.surface);
                app.repaint_pending();
            }
        })?
    };
    app.borrow_mut().sender = Some(sender);

    {
        let app = app.clone();
        let canvas_cb = canvas.clone();
        let handler = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if event.button() != 0 {
                return;
            }
            let Some(point) = event_to_point(&canvas_cb, &event) else {
                return;
            };
            event.prevent_default();
            let _ = canvas_cb.set_pointer_capture(event.pointer_id());
            let mut app = app.borrow_mut();
            let app = &mut *app;
            app.builder.begin(
                make_id(),
                AUTHOR_ID,
                Brush::new(color_input.value(), read_width(&size_input)),
                now_ms(),
                point,
                &mut app.surface,
            );
        });
        add_listeners(
            canvas.as_ref(),
            &["pointerdown"],
            handler.as_ref().unchecked_ref(),
        )?;
        handler.forget();
    }

    {
        let app = app.clone();
        let canvas_cb = canvas.clone();
        let handler = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let mut app = app.borrow_mut();
            if !app.builder.is_active() {
                return;
            }
            let Some(point) = event_to_point(&canvas_cb, &event) else {
                return;
            };
            let app = &mut *app;
            app.builder.extend(point, &mut app.surface);
        });
        add_listeners(
            canvas.as_ref(),
            &["pointermove"],
            handler.as_ref().unchecked_ref(),
        )?;
        handler.forget();
    }

    {
        let app = app.clone();
        let handler = Closure::<dyn FnMut(PointerEvent)>::new(move |_: PointerEvent| {
            app.borrow_mut().finish_stroke();
        });
        add_listeners(
            canvas.as_ref(),
            &["pointerup", "pointercancel", "lostpointercapture"],
            handler.as_ref().unchecked_ref(),
        )?;
        handler.forget();
    }

    {
        let app = app.clone();
        let handler = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            let app = app.borrow();
            let message = app.reconciler.on_undo_requested();
            app.send(&message);
        });
        add_listeners(undo_button.as_ref(), &["click"], handler.as_ref().unchecked_ref())?;
        handler.forget();
    }

    {
        let app = app.clone();
        let handler = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            let mut app = app.borrow_mut();
            let app = &mut *app;
            let message = app.reconciler.on_clear_requested(&mut app.surface);
            app.send(&message);
        });
        add_listeners(clear_button.as_ref(), &["click"], handler.as_ref().unchecked_ref())?;
        handler.forget();
    }

    {
        let app = app.clone();
        let window_cb = window.clone();
        let handler = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            let mut app = app.borrow_mut();
            resize_canvas(&window_cb, &canvas, &mut app.surface);
            app.redraw();
            app.send(&ClientMessage::RequestSync);
        });
        add_listeners(window.as_ref(), &["resize"], handler.as_ref().unchecked_ref())?;
        handler.forget();
    }

    log::info!("whiteboard ready");
    Ok(())
}
