//! Transform backends.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            TransformBackend                 │
//! ├─────────────┬─────────────┬─────────────────┤
//! │ Full3d      │ Planar      │ Fallback        │
//! │ (3D CSS)    │ (2D CSS)    │ (top/left)      │
//! └─────────────┴─────────────┴─────────────────┘
//! ```
//!
//! The tier is chosen once from host capabilities and never switched.
//! Choosing a lower tier only reduces fidelity; no tier can fail.

pub mod fallback;
pub mod full3d;
pub mod planar;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pose::{Rotation, Vec3};
use crate::style::StyleMap;
use crate::surface::{ElementRef, Surface};
use crate::{StageError, StageResult};

/// A transform to apply to one element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformEffect {
    /// Raw transform emitted first.
    pub prepend: Option<String>,
    /// Translation.
    pub translate: Option<Vec3>,
    /// Rotation; `revert` swaps the order relative to translation and axes.
    pub rotate: Option<Rotation>,
    /// Scale.
    pub scale: Option<Vec3>,
    /// Extra style written together with the transform.
    pub style: StyleMap,
}

impl TransformEffect {
    /// Create an empty effect.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prepended transform.
    #[must_use]
    pub fn with_prepend(mut self, prepend: impl Into<String>) -> Self {
        self.prepend = Some(prepend.into());
        self
    }

    /// Set the translation.
    #[must_use]
    pub fn with_translate(mut self, translate: Vec3) -> Self {
        self.translate = Some(translate);
        self
    }

    /// Set the rotation.
    #[must_use]
    pub fn with_rotate(mut self, rotate: Rotation) -> Self {
        self.rotate = Some(rotate);
        self
    }

    /// Set the scale.
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Set the extra style.
    #[must_use]
    pub fn with_style(mut self, style: StyleMap) -> Self {
        self.style = style;
        self
    }
}

/// Available transform tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// Independent X/Y/Z translate, rotate and scale.
    Full3d,
    /// X/Y translate and scale, Z rotation only.
    Planar,
    /// Positional animation, no rotation or scale.
    Fallback,
}

impl BackendType {
    /// Pick the best tier the host supports.
    #[must_use]
    pub fn detect(capabilities: Capabilities) -> Self {
        if capabilities.perspective {
            Self::Full3d
        } else if capabilities.transform {
            Self::Planar
        } else {
            Self::Fallback
        }
    }

    /// Check if this tier lacks transform support.
    #[must_use]
    pub fn is_degraded(self) -> bool {
        self == Self::Fallback
    }

    /// The tier's name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full3d => "full3d",
            Self::Planar => "planar",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendType {
    type Err = StageError;

    fn from_str(s: &str) -> StageResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full3d" | "3d" => Ok(Self::Full3d),
            "planar" | "2d" => Ok(Self::Planar),
            "fallback" => Ok(Self::Fallback),
            other => Err(StageError::UnknownBackend(other.to_string())),
        }
    }
}

/// Host capabilities reported by feature probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// CSS `perspective` (and therefore 3D transforms) is available.
    pub perspective: bool,
    /// CSS 2D `transform` is available.
    pub transform: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            perspective: true,
            transform: true,
        }
    }
}

/// Trait for transform backends.
pub trait TransformBackend {
    /// Get the backend type.
    fn backend_type(&self) -> BackendType;

    /// The composed transform string for an effect, if this tier composes one.
    fn transform_string(&self, effect: &TransformEffect) -> Option<String>;

    /// Apply an effect to an element. Always succeeds.
    fn apply(&self, surface: &mut dyn Surface, target: &ElementRef, effect: &TransformEffect)
        -> bool;
}

/// Create the backend for a tier.
#[must_use]
pub fn create_backend(backend: BackendType) -> Box<dyn TransformBackend> {
    match backend {
        BackendType::Full3d => Box::new(full3d::Full3dBackend),
        BackendType::Planar => Box::new(planar::PlanarBackend),
        BackendType::Fallback => Box::new(fallback::FallbackBackend::new()),
    }
}

/// Per-tier rendering of the individual transform functions.
pub(crate) trait AxisFormat {
    fn translate(&self, t: &Vec3) -> String;
    fn rotate(&self, r: &Rotation) -> String;
    fn scale(&self, s: &Vec3) -> String;
}

/// Compose `prepend`, translate/rotate (rotate first when reverting) and scale.
pub(crate) fn compose(format: &dyn AxisFormat, effect: &TransformEffect) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(prepend) = effect.prepend.as_deref().filter(|p| !p.is_empty()) {
        parts.push(prepend.to_string());
    }

    let translate = effect.translate.as_ref().map(|t| format.translate(t));
    let rotate = effect.rotate.as_ref().map(|r| format.rotate(r));
    let reverting = effect.rotate.is_some_and(|r| r.revert);
    if reverting {
        parts.extend(rotate);
        parts.extend(translate);
    } else {
        parts.extend(translate);
        parts.extend(rotate);
    }

    parts.extend(effect.scale.as_ref().map(|s| format.scale(s)));
    parts.join(" ")
}

/// Write the composed transform and the effect's extra style in one go.
pub(crate) fn apply_transform(
    surface: &mut dyn Surface,
    target: &ElementRef,
    effect: &TransformEffect,
    transform: String,
) {
    tracing::trace!("transform {target}: {transform}");
    let mut style = StyleMap::new().with("transform", transform);
    style.extend(&effect.style);
    surface.set_style(target, &style);
}
