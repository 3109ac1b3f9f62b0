//! Keeps the client's view of the board in step with the server.
//!
//! `Reconciler` owns the ordered list of strokes this client renders. Strokes
//! drawn here and strokes relayed from other clients are appended as they
//! arrive; a `canvas:sync` from the server replaces the whole list, which is
//! the only point where the local order is guaranteed to match the server's.

use sketchsync_shared::{ClientMessage, ServerMessage, Stroke};

/// Pixel operations the reconciler needs from whatever it draws on.
pub trait RenderSurface {
    fn draw_single_point(&mut self, x: f32, y: f32, color: &str, width: f32);
    fn draw_segment(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: &str, width: f32);
    fn clear_and_fill_background(&mut self);
}

pub fn draw_stroke<S: RenderSurface + ?Sized>(surface: &mut S, stroke: &Stroke) {
    match stroke.points.as_slice() {
        [] => {}
        [point] => surface.draw_single_point(point.x, point.y, &stroke.color, stroke.width),
        points => {
            for pair in points.windows(2) {
                surface.draw_segment(
                    pair[0].x,
                    pair[0].y,
                    pair[1].x,
                    pair[1].y,
                    &stroke.color,
                    stroke.width,
                );
            }
        }
    }
}

#[derive(Default)]
pub struct Reconciler {
    history: Vec<Stroke>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[Stroke] {
        &self.history
    }

    /// Records a stroke finished on this client and returns the message that
    /// submits it to the server. Empty strokes are discarded.
    ///
    /// The stroke was already painted point by point while it was drawn; it is
    /// painted once more here so it sits above any remote stroke that landed
    /// mid-gesture, matching its position at the end of `history`.
    pub fn on_local_stroke_complete<S: RenderSurface + ?Sized>(
        &mut self,
        stroke: Stroke,
        surface: &mut S,
    ) -> Option<ClientMessage> {
        if stroke.is_empty() {
            return None;
        }
        draw_stroke(surface, &stroke);
        self.history.push(stroke.clone());
        Some(ClientMessage::Draw(stroke))
    }

    pub fn on_remote_stroke<S: RenderSurface + ?Sized>(&mut self, stroke: Stroke, surface: &mut S) {
        if stroke.is_empty() {
            return;
        }
        draw_stroke(surface, &stroke);
        self.history.push(stroke);
    }

    pub fn on_sync<S: RenderSurface + ?Sized>(&mut self, strokes: Vec<Stroke>, surface: &mut S) {
        self.history = strokes;
        self.redraw(surface);
    }

    /// Blanks the local board right away; the server's sync confirms it.
    pub fn on_clear_requested<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> ClientMessage {
        self.history.clear();
        self.redraw(surface);
        ClientMessage::Clear
    }

    // Undo is global, so nothing changes locally until the server syncs.
    pub fn on_undo_requested(&self) -> ClientMessage {
        ClientMessage::Undo
    }

    pub fn apply_server_message<S: RenderSurface + ?Sized>(
        &mut self,
        message: ServerMessage,
        surface: &mut S,
    ) {
        match message {
            ServerMessage::Draw(stroke) => self.on_remote_stroke(stroke, surface),
            ServerMessage::Sync(strokes) => self.on_sync(strokes, surface),
        }
    }

    pub fn redraw<S: RenderSurface + ?Sized>(&self, surface: &mut S) {
        surface.clear_and_fill_background();
        for stroke in &self.history {
            draw_stroke(surface, stroke);
        }
    }
}
