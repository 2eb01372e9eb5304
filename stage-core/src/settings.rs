//! Presentation settings merged from defaults and caller overrides.

use serde::{Deserialize, Serialize};

use crate::style::Animation;
use crate::StageResult;

/// Flat configuration record, immutable once a presentation is initialized.
///
/// Every field is optional in serialized form; missing fields (including
/// nested animation fields) keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Selector the host uses to collect step elements into
    /// [`StepSource`](crate::StepSource)s. The engine itself never queries
    /// the document; sibling grouping follows `StepSource::parent`.
    pub step_selector: String,
    /// Class of the canvas element wrapped around the steps.
    pub canvas_class: String,
    /// Class marking a root whose host lacks transform support.
    pub not_supported_class: String,
    /// Class added to steps whose content has been loaded.
    pub loaded_class: String,
    /// Class carried by the active step.
    pub active_class: String,
    /// Keep the location hash in sync with the active step.
    pub use_hash: bool,
    /// Transition style for the viewport and canvas.
    pub animation: Animation,
    /// Allow internal operations to be invoked by name.
    pub test: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            step_selector: ".step".to_string(),
            canvas_class: "canvas".to_string(),
            not_supported_class: "not-supported".to_string(),
            loaded_class: "loaded".to_string(),
            active_class: "active".to_string(),
            use_hash: true,
            animation: Animation::default(),
            test: false,
        }
    }
}

impl Settings {
    /// Parse settings overrides from JSON, filling gaps with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value has the wrong type.
    pub fn from_json(json: &str) -> StageResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Merge a JSON object of overrides onto these settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged record does not deserialize.
    pub fn merged(&self, overrides: &serde_json::Value) -> StageResult<Self> {
        let mut base = serde_json::to_value(self)?;
        merge_json(&mut base, overrides);
        Ok(serde_json::from_value(base)?)
    }
}

fn merge_json(base: &mut serde_json::Value, overrides: &serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overrides) => *base = overrides.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::CssTime;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.step_selector, ".step");
        assert_eq!(settings.canvas_class, "canvas");
        assert!(settings.use_hash);
        assert!(!settings.test);
        assert_eq!(
            settings.animation.transition_duration,
            CssTime::from_millis(1000)
        );
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let settings = Settings::from_json(r#"{"useHash":false,"loadedClass":"ready"}"#)
            .expect("valid settings");
        assert!(!settings.use_hash);
        assert_eq!(settings.loaded_class, "ready");
        assert_eq!(settings.active_class, "active");
    }

    #[test]
    fn test_merged_overrides_nested_animation_field() {
        let base = Settings {
            test: true,
            ..Settings::default()
        };
        let merged = base
            .merged(&serde_json::json!({"animation": {"transitionDelay": "0"}}))
            .expect("merge");
        assert!(merged.test);
        assert_eq!(merged.animation.transition_delay, CssTime::ZERO);
        assert_eq!(merged.animation.transition_property, "all");
    }

    #[test]
    fn test_from_json_rejects_bad_time() {
        let result = Settings::from_json(r#"{"animation":{"transitionDuration":"soon"}}"#);
        assert!(result.is_err());
    }
}
