//! Style records applied to surface elements.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{StageError, StageResult};

/// An ordered set of CSS property/value pairs (kebab-case property names).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMap(BTreeMap<String, String>);

impl StyleMap {
    /// Create an empty style map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing any previous value.
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(property.into(), value.into());
        self
    }

    /// Builder form of [`StyleMap::set`].
    #[must_use]
    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }

    /// Copy every property of `other` over this map.
    pub fn extend(&mut self, other: &StyleMap) {
        for (property, value) in &other.0 {
            self.0.insert(property.clone(), value.clone());
        }
    }

    /// Look up a property value.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.0.get(property).map(String::as_str)
    }

    /// Iterate over properties in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Check if the map has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// A CSS `<time>` value such as `1s` or `500ms`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CssTime(Duration);

impl CssTime {
    /// Zero time.
    pub const ZERO: Self = Self(Duration::ZERO);

    /// Create from milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }
}

impl FromStr for CssTime {
    type Err = StageError;

    fn from_str(s: &str) -> StageResult<Self> {
        let text = s.trim();
        let invalid = || StageError::InvalidTime(s.to_string());

        let (number, scale) = if let Some(ms) = text.strip_suffix("ms") {
            (ms, 1.0)
        } else if let Some(secs) = text.strip_suffix('s') {
            (secs, 1000.0)
        } else if text.parse::<f64>().is_ok_and(|v| v == 0.0) {
            // unitless zero is the only bare number CSS accepts
            (text, 1.0)
        } else {
            return Err(invalid());
        };

        let value: f64 = number.trim().parse().map_err(|_| invalid())?;
        let nanos = (value * scale * 1_000_000.0).round();
        if !nanos.is_finite() || nanos < 0.0 || nanos >= u64::MAX as f64 {
            return Err(invalid());
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let nanos = nanos as u64;
        Ok(Self(Duration::from_nanos(nanos)))
    }
}

impl TryFrom<String> for CssTime {
    type Error = StageError;

    fn try_from(value: String) -> StageResult<Self> {
        value.parse()
    }
}

impl From<CssTime> for String {
    fn from(value: CssTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for CssTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.0.as_nanos();
        if nanos % 1_000_000_000 == 0 {
            write!(f, "{}s", nanos / 1_000_000_000)
        } else if nanos % 1_000_000 == 0 {
            write!(f, "{}ms", nanos / 1_000_000)
        } else {
            let fraction = format!("{:06}", nanos % 1_000_000);
            write!(f, "{}.{}ms", nanos / 1_000_000, fraction.trim_end_matches('0'))
        }
    }
}

/// Transition timing for one phase of a step change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timing {
    /// `transition-duration`.
    pub duration: CssTime,
    /// `transition-delay`.
    pub delay: CssTime,
}

impl Timing {
    /// No animation at all.
    pub const SNAP: Self = Self {
        duration: CssTime::ZERO,
        delay: CssTime::ZERO,
    };
}

/// Transition and transform style shared by the viewport and the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Animation {
    /// `transform-origin`.
    pub transform_origin: String,
    /// `transition-property`.
    pub transition_property: String,
    /// `transition-duration`.
    pub transition_duration: CssTime,
    /// `transition-delay`.
    pub transition_delay: CssTime,
    /// `transition-timing-function`.
    pub transition_timing_function: String,
    /// `transform-style`.
    pub transform_style: String,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            transform_origin: "top left".to_string(),
            transition_property: "all".to_string(),
            transition_duration: CssTime::from_millis(1000),
            transition_delay: CssTime::from_millis(500),
            transition_timing_function: "ease-in-out".to_string(),
            transform_style: "preserve-3d".to_string(),
        }
    }
}

impl Animation {
    /// The configured duration and delay.
    #[must_use]
    pub fn timing(&self) -> Timing {
        Timing {
            duration: self.transition_duration,
            delay: self.transition_delay,
        }
    }

    /// Render as a style map, overriding duration and delay with `timing`.
    #[must_use]
    pub fn to_style(&self, timing: Timing) -> StyleMap {
        StyleMap::new()
            .with("transform-origin", self.transform_origin.as_str())
            .with("transition-property", self.transition_property.as_str())
            .with("transition-duration", timing.duration.to_string())
            .with("transition-delay", timing.delay.to_string())
            .with(
                "transition-timing-function",
                self.transition_timing_function.as_str(),
            )
            .with("transform-style", self.transform_style.as_str())
    }
}
