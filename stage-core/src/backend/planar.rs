//! 2D tier: the same composition restricted to the screen plane.
//!
//! Z translation, X/Y rotation and Z scale are dropped.

use crate::pose::{css_number, Rotation, Vec3};
use crate::surface::{ElementRef, Surface};

use super::{apply_transform, compose, AxisFormat, BackendType, TransformBackend, TransformEffect};

/// Backend for hosts with only CSS 2D transform support.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarBackend;

impl AxisFormat for PlanarBackend {
    fn translate(&self, t: &Vec3) -> String {
        format!("translate({}px,{}px)", css_number(t.x), css_number(t.y))
    }

    fn rotate(&self, r: &Rotation) -> String {
        format!("rotate({}deg)", css_number(r.z))
    }

    fn scale(&self, s: &Vec3) -> String {
        format!("scaleX({}) scaleY({})", css_number(s.x), css_number(s.y))
    }
}

impl TransformBackend for PlanarBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Planar
    }

    fn transform_string(&self, effect: &TransformEffect) -> Option<String> {
        Some(compose(self, effect))
    }

    fn apply(
        &self,
        surface: &mut dyn Surface,
        target: &ElementRef,
        effect: &TransformEffect,
    ) -> bool {
        apply_transform(surface, target, effect, compose(self, effect));
        true
    }
}
