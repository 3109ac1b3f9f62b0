use std::time::{SystemTime, UNIX_EPOCH};

use sketchsync_shared::Stroke;
use thiserror::Error;

/// Source of `createdAt` values for strokes that arrive without one.
pub type Clock = fn() -> u64;

pub fn system_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RejectReason {
    #[error("stroke has no points")]
    EmptyPoints,
    #[error("stroke has no id")]
    MissingId,
    #[error("stroke has no color")]
    EmptyColor,
    #[error("stroke width must be a positive number")]
    InvalidWidth,
    #[error("stroke contains a non-finite coordinate")]
    NonFinitePoint,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AppendOutcome {
    Accepted(Stroke),
    Rejected(RejectReason),
}

impl AppendOutcome {
    pub fn accepted(self) -> Option<Stroke> {
        match self {
            AppendOutcome::Accepted(stroke) => Some(stroke),
            AppendOutcome::Rejected(_) => None,
        }
    }
}

/// The authoritative, ordered record of every stroke currently on the board.
///
/// Append-only apart from `remove_last` and `clear`. Nothing is persisted.
pub struct StrokeLog {
    strokes: Vec<Stroke>,
    clock: Clock,
}

impl Default for StrokeLog {
    fn default() -> Self {
        Self::new()
    }
}

impl StrokeLog {
    pub fn new() -> Self {
        Self::with_clock(system_clock)
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            strokes: Vec::new(),
            clock,
        }
    }

    /// Appends `stroke` and returns the canonical copy that should be broadcast.
    pub fn append(&mut self, mut stroke: Stroke) -> AppendOutcome {
        if let Err(reason) = validate(&stroke) {
            return AppendOutcome::Rejected(reason);
        }
        if stroke.created_at.is_none() {
            stroke.created_at = Some((self.clock)());
        }
        self.strokes.push(stroke.clone());
        AppendOutcome::Accepted(stroke)
    }

    pub fn remove_last(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn size(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn snapshot(&self) -> Vec<Stroke> {
        self.strokes.clone()
    }
}

fn validate(stroke: &Stroke) -> Result<(), RejectReason> {
    if stroke.points.is_empty() {
        return Err(RejectReason::EmptyPoints);
    }
    if stroke.id.is_empty() {
        return Err(RejectReason::MissingId);
    }
    if stroke.color.is_empty() {
        return Err(RejectReason::EmptyColor);
    }
    if !(stroke.width.is_finite() && stroke.width > 0.0) {
        return Err(RejectReason::InvalidWidth);
    }
    if !stroke.points.iter().all(|point| point.is_finite()) {
        return Err(RejectReason::NonFinitePoint);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchsync_shared::Point;

    fn fixed_clock() -> u64 {
        1_700_000_000_000
    }

    fn stroke(id: &str) -> Stroke {
        Stroke {
            id: id.to_string(),
            author_id: "anonymous".into(),
            color: "#000".into(),
            width: 2.0,
            points: vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)],
            created_at: Some(1),
        }
    }

    #[test]
    fn rejects_strokes_without_points() {
        let mut log = StrokeLog::new();
        log.append(stroke("a"));
        let mut empty = stroke("b");
        empty.points.clear();

        assert_eq!(
            log.append(empty),
            AppendOutcome::Rejected(RejectReason::EmptyPoints)
        );
        assert_eq!(log.size(), 1);
    }

    #[test]
    fn rejects_other_malformed_strokes_without_mutation() {
        let mut log = StrokeLog::new();

        let no_id = stroke("");
        let mut no_color = stroke("c");
        no_color.color.clear();
        let mut flat = stroke("w");
        flat.width = 0.0;
        let mut nan = stroke("n");
        nan.points.push(Point::new(f32::NAN, 1.0));

        assert_eq!(log.append(no_id).accepted(), None);
        assert_eq!(log.append(no_color).accepted(), None);
        assert_eq!(
            log.append(flat),
            AppendOutcome::Rejected(RejectReason::InvalidWidth)
        );
        assert_eq!(
            log.append(nan),
            AppendOutcome::Rejected(RejectReason::NonFinitePoint)
        );
        assert!(log.is_empty());
    }

    #[test]
    fn appends_grow_by_one_in_call_order() {
        let mut log = StrokeLog::new();
        for (index, id) in ["a", "b", "c", "d"].iter().enumerate() {
            log.append(stroke(id));
            assert_eq!(log.size(), index + 1);
        }
        let ids: Vec<_> = log.snapshot().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, ["a", "b", "c", "d"]);
    }

    #[test]
    fn fills_missing_timestamp_and_keeps_present_one() {
        let mut log = StrokeLog::with_clock(fixed_clock);
        let mut untimed = stroke("a");
        untimed.created_at = None;

        let canonical = log.append(untimed).accepted().unwrap();
        assert_eq!(canonical.created_at, Some(fixed_clock()));

        let timed = log.append(stroke("b")).accepted().unwrap();
        assert_eq!(timed.created_at, Some(1));
        assert_eq!(log.snapshot()[0].created_at, Some(fixed_clock()));
    }

    #[test]
    fn remove_last_undoes_the_latest_append() {
        let mut log = StrokeLog::new();
        log.append(stroke("a"));
        log.append(stroke("b"));
        let before = log.snapshot();

        log.append(stroke("c"));
        let removed = log.remove_last().unwrap();

        assert_eq!(removed.id, "c");
        assert_eq!(log.snapshot(), before);
    }

    #[test]
    fn remove_last_on_empty_is_a_no_op() {
        let mut log = StrokeLog::new();
        assert_eq!(log.remove_last(), None);
        assert_eq!(log.size(), 0);
    }

    #[test]
    fn repeated_undo_keeps_popping() {
        let mut log = StrokeLog::new();
        log.append(stroke("a"));
        log.append(stroke("b"));
        assert_eq!(log.remove_last().map(|s| s.id), Some("b".to_string()));
        assert_eq!(log.remove_last().map(|s| s.id), Some("a".to_string()));
        assert_eq!(log.remove_last(), None);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut log = StrokeLog::new();
        log.append(stroke("a"));
        log.clear();
        let once = log.snapshot();
        log.clear();
        assert_eq!(log.snapshot(), once);
        assert!(once.is_empty());
    }

    #[test]
    fn snapshot_is_isolated_from_the_log() {
        let mut log = StrokeLog::new();
        log.append(stroke("a"));

        let mut copy = log.snapshot();
        copy.clear();
        copy.push(stroke("intruder"));

        let ids: Vec<_> = log.snapshot().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, ["a"]);
    }
}
