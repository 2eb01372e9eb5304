//! Rendering surface abstraction.
//!
//! The engine never touches a document directly. Hosts implement [`Surface`]
//! over whatever they render into (a browser DOM, a test double, a log).
//! [`RecordingSurface`] keeps every operation as a serializable
//! [`SurfaceOp`] so another process can replay it.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::step::StepId;
use crate::style::StyleMap;

/// An element the engine can address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "element", content = "id", rename_all = "lowercase")]
pub enum ElementRef {
    /// The presentation container (the viewport).
    Root,
    /// The wrapper around every step, moved by the camera.
    Canvas,
    /// A single step.
    Step(StepId),
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("root"),
            Self::Canvas => f.write_str("canvas"),
            Self::Step(id) => write!(f, "#{id}"),
        }
    }
}

/// Operations the engine needs from a document.
pub trait Surface {
    /// Apply style properties to an element.
    fn set_style(&mut self, target: &ElementRef, style: &StyleMap);

    /// Animate absolute `top`/`left` position over `duration`.
    fn animate_position(&mut self, target: &ElementRef, top: f64, left: f64, duration: Duration);

    /// Measured `(width, height)` of an element in pixels.
    fn measure(&self, target: &ElementRef) -> (f64, f64);

    /// Add a class to an element.
    fn add_class(&mut self, target: &ElementRef, class: &str);

    /// Remove a class from an element.
    fn remove_class(&mut self, target: &ElementRef, class: &str);

    /// Move the root's children into a new canvas element with `class`.
    fn wrap_in_canvas(&mut self, class: &str);

    /// Reset any page scroll offset to the origin.
    fn scroll_to_origin(&mut self);

    /// Current location hash including the leading `#`, or empty.
    fn location_hash(&self) -> String;

    /// Replace the location hash.
    fn set_location_hash(&mut self, hash: &str);

    /// Load external content from `source` into an element.
    fn load_content(&mut self, target: &ElementRef, source: &str);
}

/// A single recorded surface operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SurfaceOp {
    /// Style applied to an element.
    Style {
        /// Element styled.
        target: ElementRef,
        /// Properties set.
        style: StyleMap,
    },
    /// Positional animation.
    Animate {
        /// Element moved.
        target: ElementRef,
        /// Target `top` in pixels.
        top: f64,
        /// Target `left` in pixels.
        left: f64,
        /// Animation length in milliseconds.
        duration_ms: u64,
    },
    /// Class added.
    AddClass {
        /// Element changed.
        target: ElementRef,
        /// Class name.
        class: String,
    },
    /// Class removed.
    RemoveClass {
        /// Element changed.
        target: ElementRef,
        /// Class name.
        class: String,
    },
    /// Canvas wrapper created.
    WrapCanvas {
        /// Class given to the canvas.
        class: String,
    },
    /// Page scroll reset.
    ScrollToOrigin,
    /// Location hash replaced.
    SetHash {
        /// New hash.
        hash: String,
    },
    /// Content load requested.
    LoadContent {
        /// Element receiving the content.
        target: ElementRef,
        /// Content source.
        source: String,
    },
}

/// Default measured size for elements without an explicit size.
const DEFAULT_SIZE: (f64, f64) = (0.0, 0.0);

/// A surface that records operations instead of rendering them.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    ops: Vec<SurfaceOp>,
    classes: HashMap<ElementRef, BTreeSet<String>>,
    sizes: HashMap<ElementRef, (f64, f64)>,
    hash: String,
}

impl RecordingSurface {
    /// Create an empty surface with no location hash.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given location hash.
    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }

    /// Set the size [`Surface::measure`] reports for an element.
    pub fn set_size(&mut self, target: ElementRef, width: f64, height: f64) {
        self.sizes.insert(target, (width, height));
    }

    /// All operations recorded so far.
    #[must_use]
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Take the recorded operations, leaving the log empty.
    pub fn drain(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    /// Classes currently carried by an element.
    #[must_use]
    pub fn classes(&self, target: &ElementRef) -> Vec<&str> {
        self.classes
            .get(target)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Check if an element carries a class.
    #[must_use]
    pub fn has_class(&self, target: &ElementRef, class: &str) -> bool {
        self.classes
            .get(target)
            .is_some_and(|set| set.contains(class))
    }

    /// Every style map applied to an element, oldest first.
    pub fn styles_for<'a>(&'a self, target: &'a ElementRef) -> impl Iterator<Item = &'a StyleMap> {
        self.ops.iter().filter_map(move |op| match op {
            SurfaceOp::Style { target: t, style } if t == target => Some(style),
            _ => None,
        })
    }

    /// The most recent value of a style property on an element.
    #[must_use]
    pub fn last_style(&self, target: &ElementRef, property: &str) -> Option<&str> {
        self.ops.iter().rev().find_map(|op| match op {
            SurfaceOp::Style { target: t, style } if t == target => style.get(property),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn set_style(&mut self, target: &ElementRef, style: &StyleMap) {
        self.ops.push(SurfaceOp::Style {
            target: target.clone(),
            style: style.clone(),
        });
    }

    fn animate_position(&mut self, target: &ElementRef, top: f64, left: f64, duration: Duration) {
        self.ops.push(SurfaceOp::Animate {
            target: target.clone(),
            top,
            left,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        });
    }

    fn measure(&self, target: &ElementRef) -> (f64, f64) {
        self.sizes.get(target).copied().unwrap_or(DEFAULT_SIZE)
    }

    fn add_class(&mut self, target: &ElementRef, class: &str) {
        self.classes
            .entry(target.clone())
            .or_default()
            .insert(class.to_string());
        self.ops.push(SurfaceOp::AddClass {
            target: target.clone(),
            class: class.to_string(),
        });
    }

    fn remove_class(&mut self, target: &ElementRef, class: &str) {
        if let Some(set) = self.classes.get_mut(target) {
            set.remove(class);
        }
        self.ops.push(SurfaceOp::RemoveClass {
            target: target.clone(),
            class: class.to_string(),
        });
    }

    fn wrap_in_canvas(&mut self, class: &str) {
        self.classes
            .entry(ElementRef::Canvas)
            .or_default()
            .insert(class.to_string());
        self.ops.push(SurfaceOp::WrapCanvas {
            class: class.to_string(),
        });
    }

    fn scroll_to_origin(&mut self) {
        self.ops.push(SurfaceOp::ScrollToOrigin);
    }

    fn location_hash(&self) -> String {
        self.hash.clone()
    }

    fn set_location_hash(&mut self, hash: &str) {
        self.hash = hash.to_string();
        self.ops.push(SurfaceOp::SetHash {
            hash: hash.to_string(),
        });
    }

    fn load_content(&mut self, target: &ElementRef, source: &str) {
        self.ops.push(SurfaceOp::LoadContent {
            target: target.clone(),
            source: source.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_tracks_classes() {
        let mut surface = RecordingSurface::new();
        let step = ElementRef::Step(StepId::from("intro"));

        surface.add_class(&step, "active");
        assert!(surface.has_class(&step, "active"));

        surface.remove_class(&step, "active");
        assert!(!surface.has_class(&step, "active"));
        assert_eq!(surface.ops().len(), 2);
    }

    #[test]
    fn test_last_style_returns_latest_value() {
        let mut surface = RecordingSurface::new();
        surface.set_style(&ElementRef::Root, &StyleMap::new().with("top", "0"));
        surface.set_style(&ElementRef::Canvas, &StyleMap::new().with("top", "5px"));
        surface.set_style(&ElementRef::Root, &StyleMap::new().with("top", "50%"));

        assert_eq!(surface.last_style(&ElementRef::Root, "top"), Some("50%"));
        assert_eq!(surface.styles_for(&ElementRef::Root).count(), 2);
    }

    #[test]
    fn test_last_style_outlives_target() {
        let mut surface = RecordingSurface::new();
        let step = ElementRef::Step(StepId::from("a"));
        surface.set_style(&step, &StyleMap::new().with("z-index", "1"));
        surface.set_style(&step, &StyleMap::new().with("opacity", "0"));

        let z = surface.last_style(&ElementRef::Step(StepId::from("a")), "z-index");
        assert_eq!(z, Some("1"));
        assert_eq!(surface.last_style(&step, "top"), None);
    }

    #[test]
    fn test_drain_empties_log() {
        let mut surface = RecordingSurface::new().with_hash("#/a");
        surface.set_location_hash("#/b");
        assert_eq!(surface.location_hash(), "#/b");
        assert_eq!(surface.drain().len(), 1);
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_ops_serialize_with_tag() {
        let op = SurfaceOp::AddClass {
            target: ElementRef::Step(StepId::from("a")),
            class: "loaded".to_string(),
        };
        let json = serde_json::to_value(&op).expect("serialize");
        assert_eq!(json["op"], "add_class");
        assert_eq!(json["target"]["element"], "step");
        assert_eq!(json["target"]["id"], "a");
    }
}
