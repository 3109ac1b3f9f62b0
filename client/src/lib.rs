mod app;
mod capture;
mod dom;
mod net;
mod reconcile;
mod render;
mod util;
mod ws;

pub use app::run;
pub use capture::StrokeBuilder;
pub use reconcile::{draw_stroke, Reconciler, RenderSurface};
