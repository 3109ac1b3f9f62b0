use web_sys::CanvasRenderingContext2d;

use crate::reconcile::RenderSurface;

pub const BACKGROUND: &str = "#ffffff";

/// `RenderSurface` over a 2D canvas context, in CSS pixels.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        Self {
            ctx,
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn ctx(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }
}

impl RenderSurface for CanvasSurface {
    fn draw_single_point(&mut self, x: f32, y: f32, color: &str, width: f32) {
        self.ctx.set_fill_style_str(color);
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            x as f64,
            y as f64,
            width as f64 / 2.0,
            0.0,
            std::f64::consts::PI * 2.0,
        );
        self.ctx.fill();
    }

    fn draw_segment(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: &str, width: f32) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(x0 as f64, y0 as f64);
        self.ctx.line_to(x1 as f64, y1 as f64);
        self.ctx.stroke();
    }

    fn clear_and_fill_background(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
        self.ctx.set_fill_style_str(BACKGROUND);
        self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
    }
}
