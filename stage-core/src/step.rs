//! Steps and the ordered step registry.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pose::{Pose, Rotation, Vec3};
use crate::{StageError, StageResult};

/// Transform prepended to every step so it is centred on its own footprint.
pub const STEP_PREPEND: &str = "translate(-50%,-50%)";

/// Dataset attributes of a step, keyed by camelCase name.
pub type Attributes = BTreeMap<String, String>;

/// Stable identifier of a step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    /// Create an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier generated for the step at `index` (zero-based) when the
    /// source has none.
    #[must_use]
    pub fn generated(index: usize) -> Self {
        Self(format!("step-{}", index + 1))
    }

    /// Parse a reference such as `intro` or `#intro`.
    #[must_use]
    pub fn from_ref(reference: &str) -> Self {
        Self::new(reference.trim().trim_start_matches('#'))
    }

    /// The identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StepId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declarative description of a step, as collected by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepSource {
    /// Explicit identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Dataset attributes (`x`, `rotateZ`, `scale`, `src`, ...).
    #[serde(default)]
    pub data: Attributes,
    /// Link target of the step element.
    #[serde(default)]
    pub href: Option<String>,
    /// Key of the parent element; steps sharing it are siblings.
    #[serde(default)]
    pub parent: Option<String>,
}

impl StepSource {
    /// Build a source from raw element attributes.
    ///
    /// `data-*` names become camelCase dataset keys (`data-rotate-x` is
    /// `rotateX`); `id` and `href` are picked up as-is.
    pub fn from_attributes<'a>(attributes: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut source = Self::default();
        for (name, value) in attributes {
            match name {
                "id" if !value.is_empty() => source.id = Some(value.to_string()),
                "href" if !value.is_empty() => source.href = Some(value.to_string()),
                _ => {
                    if let Some(key) = name.strip_prefix("data-") {
                        source.data.insert(camel_case(key), value.to_string());
                    }
                }
            }
        }
        source
    }

    /// Set the identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set a dataset attribute.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Set the link target.
    #[must_use]
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    /// Set the parent key.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, part) in name.split('-').enumerate() {
        let mut chars = part.chars();
        match chars.next() {
            Some(first) if i > 0 => {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
            _ => out.push_str(part),
        }
    }
    out
}

/// Per-step data visible to hooks; `initStep` subscribers may modify it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepData {
    /// The step's own pose.
    pub pose: Pose,
    /// Transform emitted before the pose.
    pub prepend: String,
    /// External content to load lazily, if any.
    pub content_source: Option<String>,
}

/// A registered step.
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    /// Stable identifier.
    pub id: StepId,
    /// Pose and derived data.
    pub data: StepData,
    /// Caller-supplied dataset attributes.
    pub attributes: Attributes,
    /// Link target of the step element.
    pub href: Option<String>,
    /// Parent key for sibling lookups.
    pub parent: Option<String>,
    loaded: bool,
}

impl Step {
    /// Check if lazy content has been loaded for this step.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub(crate) fn mark_loaded(&mut self) {
        self.loaded = true;
    }
}

/// Parse the pose of a step from its dataset attributes.
///
/// Each axis falls back independently: `rotateZ` to `rotate`,
/// `scaleX`/`scaleY` to `scale`, then to `defaults`.
///
/// # Errors
///
/// Returns [`StageError::InvalidAttribute`] for a non-numeric value.
pub fn parse_pose(step: &StepId, data: &Attributes, defaults: &Pose) -> StageResult<Pose> {
    let lookup = |keys: &[&str], fallback: f64| -> StageResult<f64> {
        for key in keys {
            match data.get(*key).map(|v| v.trim()) {
                Some(value) if !value.is_empty() => {
                    return value.parse().map_err(|_| StageError::InvalidAttribute {
                        step: step.to_string(),
                        name: (*key).to_string(),
                        value: value.to_string(),
                    });
                }
                _ => {}
            }
        }
        Ok(fallback)
    };

    Ok(Pose {
        translate: Vec3::new(
            lookup(&["x"], defaults.translate.x)?,
            lookup(&["y"], defaults.translate.y)?,
            lookup(&["z"], defaults.translate.z)?,
        ),
        rotate: Rotation::new(
            lookup(&["rotateX"], defaults.rotate.x)?,
            lookup(&["rotateY"], defaults.rotate.y)?,
            lookup(&["rotateZ", "rotate"], defaults.rotate.z)?,
        ),
        scale: Vec3::new(
            lookup(&["scaleX", "scale"], defaults.scale.x)?,
            lookup(&["scaleY", "scale"], defaults.scale.y)?,
            lookup(&["scaleZ"], defaults.scale.z)?,
        ),
    })
}

/// Ordered collection of steps, built once at initialization.
///
/// Order is declaration order and drives next/previous navigation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StepRegistry {
    steps: Vec<Step>,
}

impl StepRegistry {
    /// Build the registry from raw sources.
    ///
    /// Sources without an id get `step-<n>` with `n` the 1-based position.
    ///
    /// # Errors
    ///
    /// Returns an error if a pose attribute is not numeric.
    pub fn build(sources: Vec<StepSource>, defaults: &Pose) -> StageResult<Self> {
        let mut steps = Vec::with_capacity(sources.len());
        for (index, source) in sources.into_iter().enumerate() {
            let id = source
                .id
                .filter(|id| !id.is_empty())
                .map_or_else(|| StepId::generated(index), StepId::new);
            let pose = parse_pose(&id, &source.data, defaults)?;
            steps.push(Step {
                id,
                data: StepData {
                    pose,
                    prepend: STEP_PREPEND.to_string(),
                    content_source: None,
                },
                attributes: source.data,
                href: source.href,
                parent: source.parent,
                loaded: false,
            });
        }
        Ok(Self { steps })
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the registry has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterate in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    /// Step at a registry position.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub(crate) fn at_mut(&mut self, index: usize) -> Option<&mut Step> {
        self.steps.get_mut(index)
    }

    /// Position of a step.
    #[must_use]
    pub fn index_of(&self, id: &StepId) -> Option<usize> {
        self.steps.iter().position(|step| &step.id == id)
    }

    /// Look up a step by id.
    #[must_use]
    pub fn get(&self, id: &StepId) -> Option<&Step> {
        self.steps.iter().find(|step| &step.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &StepId) -> Option<&mut Step> {
        self.steps.iter_mut().find(|step| &step.id == id)
    }

    /// First step.
    #[must_use]
    pub fn first(&self) -> Option<&Step> {
        self.steps.first()
    }

    /// Last step.
    #[must_use]
    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// The step after `id`, wrapping to the first.
    #[must_use]
    pub fn next_after(&self, id: &StepId) -> Option<&Step> {
        let index = self.index_of(id)?;
        self.steps.get(index + 1).or_else(|| self.first())
    }

    /// The step before `id`, wrapping to the last.
    #[must_use]
    pub fn prev_before(&self, id: &StepId) -> Option<&Step> {
        let index = self.index_of(id)?;
        match index.checked_sub(1) {
            Some(prev) => self.steps.get(prev),
            None => self.last(),
        }
    }

    /// Steps sharing `id`'s parent, in registry order, excluding `id` itself.
    #[must_use]
    pub fn siblings_of(&self, id: &StepId) -> Vec<StepId> {
        let Some(step) = self.get(id) else {
            return Vec::new();
        };
        self.steps
            .iter()
            .filter(|other| other.parent == step.parent && &other.id != id)
            .map(|other| other.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(sources: Vec<StepSource>) -> StepRegistry {
        StepRegistry::build(sources, &Pose::identity()).expect("valid sources")
    }

    #[test]
    fn test_generated_id_uses_one_based_index() {
        let steps = registry(vec![
            StepSource::default().with_id("intro"),
            StepSource::default(),
            StepSource::default().with_id(""),
        ]);
        let ids: Vec<_> = steps.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["intro", "step-2", "step-3"]);
    }

    #[test]
    fn test_pose_defaults_per_axis() {
        let steps = registry(vec![StepSource::default()
            .with_data("x", "100")
            .with_data("rotate", "45")
            .with_data("scale", "2")
            .with_data("scaleY", "3")]);
        let pose = steps.at(0).expect("step").data.pose;

        assert_eq!(pose.translate, Vec3::new(100.0, 0.0, 0.0));
        assert!((pose.rotate.z - 45.0).abs() < f64::EPSILON);
        assert!((pose.scale.x - 2.0).abs() < f64::EPSILON);
        assert!((pose.scale.y - 3.0).abs() < f64::EPSILON);
        assert!((pose.scale.z - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rotate_z_wins_over_shorthand() {
        let steps = registry(vec![StepSource::default()
            .with_data("rotate", "45")
            .with_data("rotateZ", "90")]);
        let pose = steps.at(0).expect("step").data.pose;
        assert!((pose.rotate.z - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_attribute_counts_as_absent() {
        let steps = registry(vec![StepSource::default().with_data("scale", "")]);
        assert_eq!(steps.at(0).expect("step").data.pose.scale, Vec3::ONE);
    }

    #[test]
    fn test_non_numeric_attribute_is_rejected() {
        let result = StepRegistry::build(
            vec![StepSource::default().with_data("y", "north")],
            &Pose::identity(),
        );
        assert!(matches!(
            result,
            Err(StageError::InvalidAttribute { ref name, .. }) if name == "y"
        ));
    }

    #[test]
    fn test_every_step_gets_prepend() {
        let steps = registry(vec![StepSource::default(), StepSource::default()]);
        assert!(steps.iter().all(|s| s.data.prepend == STEP_PREPEND));
    }

    #[test]
    fn test_circular_neighbours() {
        let steps = registry(vec![
            StepSource::default().with_id("a"),
            StepSource::default().with_id("b"),
            StepSource::default().with_id("c"),
        ]);
        let next = |id: &str| steps.next_after(&StepId::from(id)).map(|s| s.id.to_string());
        let prev = |id: &str| steps.prev_before(&StepId::from(id)).map(|s| s.id.to_string());

        assert_eq!(next("a").as_deref(), Some("b"));
        assert_eq!(next("c").as_deref(), Some("a"));
        assert_eq!(prev("a").as_deref(), Some("c"));
        assert_eq!(prev("b").as_deref(), Some("a"));
        assert!(next("missing").is_none());
    }

    #[test]
    fn test_siblings_share_parent() {
        let steps = registry(vec![
            StepSource::default().with_id("a").with_parent("one"),
            StepSource::default().with_id("b").with_parent("two"),
            StepSource::default().with_id("c").with_parent("one"),
        ]);
        assert_eq!(steps.siblings_of(&StepId::from("a")), vec![StepId::from("c")]);
        assert!(steps.siblings_of(&StepId::from("b")).is_empty());
    }

    #[test]
    fn test_from_attributes_camel_cases_dataset() {
        let source = StepSource::from_attributes([
            ("id", "title"),
            ("class", "step"),
            ("data-rotate-x", "30"),
            ("data-scale", "4"),
            ("href", "slides/title.html"),
        ]);
        assert_eq!(source.id.as_deref(), Some("title"));
        assert_eq!(source.href.as_deref(), Some("slides/title.html"));
        assert_eq!(source.data.get("rotateX").map(String::as_str), Some("30"));
        assert_eq!(source.data.get("scale").map(String::as_str), Some("4"));
        assert!(!source.data.contains_key("class"));
    }

    #[test]
    fn test_step_ref_strips_hash() {
        assert_eq!(StepId::from_ref("#intro"), StepId::from("intro"));
        assert_eq!(StepId::from_ref("intro"), StepId::from("intro"));
    }
}
