//! Positional fallback for hosts without transform support.
//!
//! Translation is approximated by animating absolute `top`/`left`,
//! centred on the element's measured size. Rotation and scale are ignored.

use std::time::Duration;

use crate::surface::{ElementRef, Surface};

use super::{BackendType, TransformBackend, TransformEffect};

/// Fixed length of positional animations.
pub const FALLBACK_DURATION: Duration = Duration::from_millis(1000);

/// Backend that moves elements by position only.
#[derive(Debug, Clone, Copy)]
pub struct FallbackBackend {
    duration: Duration,
}

impl FallbackBackend {
    /// Create a fallback backend with the fixed animation duration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            duration: FALLBACK_DURATION,
        }
    }
}

impl Default for FallbackBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformBackend for FallbackBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Fallback
    }

    fn transform_string(&self, _effect: &TransformEffect) -> Option<String> {
        None
    }

    fn apply(
        &self,
        surface: &mut dyn Surface,
        target: &ElementRef,
        effect: &TransformEffect,
    ) -> bool {
        if let Some(translate) = effect.translate {
            let (width, height) = surface.measure(target);
            let top = translate.y - height / 2.0;
            let left = translate.x - width / 2.0;
            tracing::trace!("animate {target} to top={top} left={left}");
            surface.animate_position(target, top, left, self.duration);
        }
        true
    }
}
