//! Path following
//!
//! Expands a [`Path`] into a sequence of per-segment moves. Each segment
//! gets a share of the duration proportional to its length. With
//! autorotation the owner is first turned to face along the path, and
//! at every interior vertex the turn is spawned alongside the next segment.

use cadence_core::geometry::turn_angle;
use cadence_core::{Path, PathKind, Point};

use crate::action::Action;

/// Default time for a full 360° turn at a path vertex
pub const DEFAULT_MAX_ROTATION_DURATION: f32 = 0.5;

/// How a path is followed
#[derive(Clone, Debug, PartialEq)]
pub struct PathOptions {
    /// Turn the owner to face along each segment (on by default)
    pub autorotate: bool,
    /// Seconds a full turn takes; smaller turns take proportionally less
    pub max_rotation_duration: f32,
}

impl PathOptions {
    pub fn new() -> Self {
        Self {
            autorotate: true,
            max_rotation_duration: DEFAULT_MAX_ROTATION_DURATION,
        }
    }

    pub fn with_autorotate(mut self, autorotate: bool) -> Self {
        self.autorotate = autorotate;
        self
    }

    pub fn with_max_rotation_duration(mut self, seconds: f32) -> Self {
        self.max_rotation_duration = seconds;
        self
    }
}

impl Default for PathOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl Action {
    /// Walk `path` in `duration` seconds
    ///
    /// Paths with fewer than two points produce an empty sequence, apart
    /// from placing the owner on the single point of an absolute path.
    pub fn move_along_path(duration: f32, path: &Path, options: &PathOptions) -> Action {
        move_along_path(duration, path, options)
    }
}

fn segment_move(kind: PathKind, from: Point, to: Point, duration: f32) -> Action {
    match kind {
        PathKind::Absolute => Action::move_to(duration, to),
        PathKind::Relative => Action::move_by(duration, to - from),
    }
}

/// Build the sequence walking `path`
pub fn move_along_path(duration: f32, path: &Path, options: &PathOptions) -> Action {
    let points = path.points();
    let kind = path.kind();
    let mut steps = Vec::with_capacity(points.len() * 2);

    if let (PathKind::Absolute, Some(first)) = (kind, points.first()) {
        steps.push(Action::place(*first));
    }
    if points.len() < 2 {
        return Action::sequence(steps);
    }

    if options.autorotate {
        steps.push(Action::orient((points[1] - points[0]).heading()));
    }

    let total = path.length();
    let mut turn: Option<Action> = None;
    for (index, pair) in points.windows(2).enumerate() {
        let (from, to) = (pair[0], pair[1]);
        let share = if total > 0.0 {
            from.distance(to) / total * duration
        } else {
            0.0
        };
        let segment = segment_move(kind, from, to, share);

        steps.push(match turn.take() {
            Some(rotation) => Action::spawn([rotation, segment]),
            None => segment,
        });

        if options.autorotate {
            if let Some(next) = points.get(index + 2) {
                let angle = turn_angle((from, to), (to, *next));
                if angle != 0.0 {
                    let seconds = angle.abs() / 360.0 * options.max_rotation_duration;
                    turn = Some(Action::rotate_by(seconds, angle));
                }
            }
        }
    }

    Action::sequence(steps)
}
