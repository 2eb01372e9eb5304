//! Transition timing policy for a step change.
//!
//! A change runs in two phases: the viewport (perspective and scale) and
//! then the canvas (translate and rotate). When zooming in the viewport
//! waits for the canvas; when zooming out the canvas waits for the viewport.
//! The very first selection snaps into place without animation.

use serde::Serialize;

use crate::pose::Pose;
use crate::style::{Animation, CssTime, Timing};

/// Timing decided for both phases of one selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionPlan {
    /// Target scale is at least the current one.
    pub zooming_in: bool,
    /// No step was active before this selection.
    pub first: bool,
    /// Timing of the viewport phase.
    pub viewport: Timing,
    /// Timing of the canvas phase.
    pub canvas: Timing,
}

impl TransitionPlan {
    /// Plan the move from the `current` camera pose to `target`.
    #[must_use]
    pub fn new(animation: &Animation, current: &Pose, target: &Pose, first: bool) -> Self {
        let zooming_in = target.scale.x >= current.scale.x;
        let configured = animation.timing();

        let mut viewport = configured;
        if !zooming_in {
            viewport.delay = CssTime::ZERO;
        }

        let mut canvas = configured;
        if zooming_in {
            canvas.delay = CssTime::ZERO;
        }

        if first {
            viewport = Timing::SNAP;
            canvas = Timing::SNAP;
        }

        Self {
            zooming_in,
            first,
            viewport,
            canvas,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Vec3;

    fn scaled(factor: f64) -> Pose {
        Pose {
            scale: Vec3::new(factor, factor, 1.0),
            ..Pose::identity()
        }
    }

    #[test]
    fn test_zoom_in_delays_viewport_only() {
        let plan = TransitionPlan::new(&Animation::default(), &scaled(1.0), &scaled(2.0), false);
        assert!(plan.zooming_in);
        assert_eq!(plan.viewport.delay, CssTime::from_millis(500));
        assert_eq!(plan.canvas.delay, CssTime::ZERO);
        assert_eq!(plan.canvas.duration, CssTime::from_millis(1000));
    }

    #[test]
    fn test_zoom_out_delays_canvas_only() {
        let plan = TransitionPlan::new(&Animation::default(), &scaled(2.0), &scaled(0.5), false);
        assert!(!plan.zooming_in);
        assert_eq!(plan.viewport.delay, CssTime::ZERO);
        assert_eq!(plan.viewport.duration, CssTime::from_millis(1000));
        assert_eq!(plan.canvas.delay, CssTime::from_millis(500));
    }

    #[test]
    fn test_equal_scale_counts_as_zooming_in() {
        let plan = TransitionPlan::new(&Animation::default(), &scaled(1.0), &scaled(1.0), false);
        assert!(plan.zooming_in);
    }

    #[test]
    fn test_first_selection_snaps() {
        let animation = Animation {
            transition_duration: CssTime::from_millis(3000),
            ..Animation::default()
        };
        let plan = TransitionPlan::new(&animation, &scaled(1.0), &scaled(0.25), true);
        assert_eq!(plan.viewport, Timing::SNAP);
        assert_eq!(plan.canvas, Timing::SNAP);
    }
}
