use sketchsync_shared::{Point, Stroke};

use crate::reconcile::RenderSurface;

pub const DEFAULT_COLOR: &str = "#1f1f1f";
pub const DEFAULT_WIDTH: f32 = 4.0;

pub fn sanitize_color(color: String) -> String {
    if color.is_empty() {
        return DEFAULT_COLOR.to_string();
    }
    color
}

pub fn sanitize_width(width: f32) -> f32 {
    let width = if width.is_finite() { width } else { DEFAULT_WIDTH };
    width.clamp(1.0, 60.0)
}

/// Color and width picked in the toolbar, already sanitized.
#[derive(Clone, Debug, PartialEq)]
pub struct Brush {
    pub color: String,
    pub width: f32,
}

impl Brush {
    pub fn new(color: String, width: f32) -> Self {
        Self {
            color: brush.color,
            width: brush.width,
        }
    }
}

fn normalize_point(point: Point) -> Option<Point> {
    point.is_finite().then_some(point)
}

/// Accumulates the stroke under the pointer, painting each point as it lands.
#[derive(Default)]
pub struct StrokeBuilder {
    current: Option<Stroke>,
}

impl StrokeBuilder {
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Stroke> {
        self.current.as_ref()
    }

    /// Starts a stroke. Any unfinished stroke is discarded.
    pub fn begin<S: RenderSurface + ?Sized>(
        &mut self,
        id: String,
        author_id: &str,
        brush: Brush,
        created_at: u64,
        point: Point,
        surface: &mut S,
    ) {
        let mut stroke = Stroke {
            id,
            author_id: author_id.to_string(),
            color: brush.color,
            width: brush.width,
            points: Vec::new(),
            created_at: Some(created_at),
        };
        if let Some(point) = normalize_point(point) {
            surface.draw_single_point(point.x, point.y, &stroke.color, stroke.width);
            stroke.points.push(point);
        }
        self.current = Some(stroke);
    }

    pub fn extend<S: RenderSurface + ?Sized>(&mut self, point: Point, surface: &mut S) {
        let Some(point) = normalize_point(point) else {
            return;
        };
        let Some(stroke) = self.current.as_mut() else {
            return;
        };
        match stroke.points.last().copied() {
            Some(last) if last == point => return,
            Some(last) => {
                surface.draw_segment(last.x, last.y, point.x, point.y, &stroke.color, stroke.width)
            }
            None => surface.draw_single_point(point.x, point.y, &stroke.color, stroke.width),
        }
        stroke.points.push(point);
    }

    /// Ends the gesture. Returns `None` when nothing was drawn.
    pub fn finish(&mut self) -> Option<Stroke> {
        self.current.take().filter(|stroke| !stroke.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::tests::{DrawCall, RecordingSurface};
    use crate::reconcile::Reconciler;

    #[test]
    fn builds_a_stroke_point_by_point() {
        let mut builder = StrokeBuilder::default();
        let mut surface = RecordingSurface::default();

        let brush = Brush::new("#000".into(), 2.0);
        let start = Point::new(0.0, 0.0);
        builder.begin("s1".into(), "anonymous", brush, 10, start, &mut surface);
        builder.extend(Point::new(5.0, 5.0), &mut surface);
        builder.extend(Point::new(5.0, 5.0), &mut surface);
        builder.extend(Point::new(8.0, 1.0), &mut surface);
        let stroke = builder.finish().unwrap();

        assert!(!builder.is_active());
        assert_eq!(stroke.id, "s1");
        assert_eq!(stroke.created_at, Some(10));
        assert_eq!(
            stroke.points,
            vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0), Point::new(8.0, 1.0)]
        );
        assert!(matches!(surface.calls[0], DrawCall::Point { .. }));
        assert_eq!(surface.segments(), 2);
    }

    #[test]
    fn stroke_without_points_is_not_produced() {
        let mut builder = StrokeBuilder::default();
        let mut surface = RecordingSurface::default();

        let brush = Brush::new("#000".into(), 2.0);
        let start = Point::new(f32::NAN, 0.0);
        builder.begin("s1".into(), "anonymous", brush, 10, start, &mut surface);
        assert!(builder.is_active());
        assert_eq!(builder.finish(), None);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn moves_without_a_gesture_are_ignored() {
        let mut builder = StrokeBuilder::default();
        let mut surface = RecordingSurface::default();
        builder.extend(Point::new(1.0, 1.0), &mut surface);
        assert!(surface.calls.is_empty());
        assert_eq!(builder.finish(), None);
    }

    #[test]
    fn finished_stroke_is_repainted_above_remote_strokes() {
        let mut builder = StrokeBuilder::default();
        let mut reconciler = Reconciler::new();
        let mut surface = RecordingSurface::default();

        let brush = Brush::new("#111".into(), 3.0);
        let start = Point::new(0.0, 0.0);
        builder.begin("mine".into(), "anonymous", brush, 1, start, &mut surface);
        builder.extend(Point::new(5.0, 5.0), &mut surface);
        let theirs = Stroke {
            id: "theirs".into(),
            author_id: "anonymous".into(),
            color: "#999".into(),
            width: 3.0,
            points: vec![Point::new(0.0, 5.0), Point::new(5.0, 0.0)],
            created_at: Some(2),
        };
        reconciler.on_remote_stroke(theirs, &mut surface);
        let mine = builder.finish().unwrap();
        surface.take();

        reconciler.on_local_stroke_complete(mine, &mut surface);

        assert_eq!(
            surface.take(),
            vec![DrawCall::Segment {
                from: (0.0, 0.0),
                to: (5.0, 5.0),
                color: "#111".into(),
                width: 3.0,
            }]
        );
        let ids: Vec<_> = reconciler
            .history()
            .iter()
            .map(|stroke| stroke.id.as_str())
            .collect();
        assert_eq!(ids, ["theirs", "mine"]);
    }

    #[test]
    fn style_is_sanitized() {
        assert_eq!(sanitize_color(String::new()), DEFAULT_COLOR);
        assert_eq!(sanitize_width(f32::NAN), DEFAULT_WIDTH);
        assert_eq!(sanitize_width(0.0), 1.0);
        assert_eq!(sanitize_width(500.0), 60.0);
        assert_eq!(
            Brush::new(String::new(), f32::INFINITY),
            Brush {
                color: DEFAULT_COLOR.into(),
                width: DEFAULT_WIDTH,
            }
        );
    }
}
