//! Full 3D tier: `translate3d`, three-axis rotation and scale.

use crate::pose::{css_number, Rotation, Vec3};
use crate::surface::{ElementRef, Surface};

use super::{apply_transform, compose, AxisFormat, BackendType, TransformBackend, TransformEffect};

/// Backend for hosts with CSS 3D transform support.
#[derive(Debug, Clone, Copy, Default)]
pub struct Full3dBackend;

impl AxisFormat for Full3dBackend {
    fn translate(&self, t: &Vec3) -> String {
        format!(
            "translate3d({}px,{}px,{}px)",
            css_number(t.x),
            css_number(t.y),
            css_number(t.z)
        )
    }

    fn rotate(&self, r: &Rotation) -> String {
        let x = format!("rotateX({}deg)", css_number(r.x));
        let y = format!("rotateY({}deg)", css_number(r.y));
        let z = format!("rotateZ({}deg)", css_number(r.z));
        // undoing a rotation reverses the axis order
        if r.revert {
            format!("{z} {y} {x}")
        } else {
            format!("{x} {y} {z}")
        }
    }

    fn scale(&self, s: &Vec3) -> String {
        format!(
            "scaleX({}) scaleY({}) scaleZ({})",
            css_number(s.x),
            css_number(s.y),
            css_number(s.z)
        )
    }
}

impl TransformBackend for Full3dBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Full3d
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleMap;
    use crate::surface::RecordingSurface;

    #[test]
    fn test_forward_rotation_order() {
        let effect = TransformEffect::new().with_rotate(Rotation::new(10.0, 20.0, 30.0));
        assert_eq!(
            Full3dBackend.transform_string(&effect).as_deref(),
            Some("rotateX(10deg) rotateY(20deg) rotateZ(30deg)")
        );
    }

    #[test]
    fn test_reverted_rotation_order_and_precedence() {
        let rotate = Rotation::new(10.0, 20.0, 30.0).negated().reverted();
        let effect = TransformEffect::new()
            .with_translate(Vec3::new(-100.0, 0.0, 0.0))
            .with_rotate(rotate);
        assert_eq!(
            Full3dBackend.transform_string(&effect).as_deref(),
            Some("rotateZ(-30deg) rotateY(-20deg) rotateX(-10deg) translate3d(-100px,0px,0px)")
        );
    }

    #[test]
    fn test_full_composition() {
        let effect = TransformEffect::new()
            .with_prepend("translate(-50%,-50%)")
            .with_translate(Vec3::new(1.0, 2.0, 3.0))
            .with_rotate(Rotation::new(0.0, 0.0, 90.0))
            .with_scale(Vec3::new(2.0, 2.0, 1.0));
        assert_eq!(
            Full3dBackend.transform_string(&effect).as_deref(),
            Some(
                "translate(-50%,-50%) translate3d(1px,2px,3px) \
                 rotateX(0deg) rotateY(0deg) rotateZ(90deg) scaleX(2) scaleY(2) scaleZ(1)"
            )
        );
    }

    #[test]
    fn test_apply_writes_transform_with_extra_style() {
        let mut surface = RecordingSurface::new();
        let effect = TransformEffect::new()
            .with_scale(Vec3::new(0.5, 0.5, 1.0))
            .with_style(StyleMap::new().with("transition-delay", "0s"));

        assert!(Full3dBackend.apply(&mut surface, &ElementRef::Root, &effect));
        assert_eq!(
            surface.last_style(&ElementRef::Root, "transform"),
            Some("scaleX(0.5) scaleY(0.5) scaleZ(1)")
        );
        assert_eq!(
            surface.last_style(&ElementRef::Root, "transition-delay"),
            Some("0s")
        );
    }
}
