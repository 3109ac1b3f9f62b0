use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlCanvasElement, HtmlInputElement, PointerEvent, Window};

use sketchsync_shared::Point;

use crate::capture::{sanitize_width, DEFAULT_WIDTH};
use crate::render::CanvasSurface;

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

pub fn set_status(status_el: &Element, state: &str, text: &str) {
    let _ = status_el.set_attribute("data-state", state);
    status_el.set_text_content(Some(text));
}

pub fn read_width(input: &HtmlInputElement) -> f32 {
    sanitize_width(input.value().parse().unwrap_or(DEFAULT_WIDTH))
}

/// Matches the backing store to the element size and device pixel ratio.
pub fn resize_canvas(window: &Window, canvas: &HtmlCanvasElement, surface: &mut CanvasSurface) {
    let rect = canvas.get_bounding_client_rect();
    let dpr = window.device_pixel_ratio();
    canvas.set_width((rect.width() * dpr) as u32);
    canvas.set_height((rect.height() * dpr) as u32);
    let _ = surface.ctx().set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
    // Resizing resets context state.
    surface.ctx().set_line_cap("round");
    surface.ctx().set_line_join("round");
    surface.set_size(rect.width(), rect.height());
    log::debug!("canvas resized to {}x{} @{dpr}", rect.width(), rect.height());
}

pub fn event_to_point(canvas: &HtmlCanvasElement, event: &PointerEvent) -> Option<Point> {
    let rect = canvas.get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let point = Point::new(
        (event.client_x() as f64 - rect.left()) as f32,
        (event.client_y() as f64 - rect.top()) as f32,
    );
    point.is_finite().then_some(point)
}
