//! Location hash deep-linking.
//!
//! The active step is mirrored into the hash as `#/<id>`; the slash form
//! keeps browsers from scrolling to the element with that id. Both `#id`
//! and `#/id` are accepted when reading.
//!
//! Writing the hash makes the host report a change back to us. The plugin
//! queues every hash it writes until the host echoes it. A notification
//! matching a queued write is swallowed together with any older writes the
//! host skipped; anything else is an external change.

use std::collections::VecDeque;

use crate::hooks::{HookContext, HookEvent, HookName, HookResult, Plugin};
use crate::step::{StepId, StepRegistry};

/// Keeps the location hash and the active step in sync.
#[derive(Debug, Clone, Default)]
pub struct HashSync {
    pending: VecDeque<String>,
}

impl HashSync {
    /// Create the plugin with no unechoed writes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash written for a step.
    #[must_use]
    pub fn hash_for(id: &StepId) -> String {
        format!("#/{id}")
    }

    /// Step id named by a hash, if any.
    #[must_use]
    pub fn step_from_hash(hash: &str) -> Option<StepId> {
        let id = hash.strip_prefix('#').unwrap_or(hash);
        let id = id.strip_prefix('/').unwrap_or(id);
        (!id.is_empty()).then(|| StepId::new(id))
    }

    fn existing_step(hash: &str, steps: &StepRegistry) -> Option<StepId> {
        Self::step_from_hash(hash).filter(|id| steps.get(id).is_some())
    }
}

impl Plugin for HashSync {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn hooks(&self) -> &'static [HookName] {
        &[HookName::SelectInitialStep, HookName::SetActive]
    }

    fn handle(&mut self, ctx: &mut HookContext<'_>, event: &mut HookEvent<'_>) -> HookResult {
        if !ctx.settings.use_hash {
            return Ok(None);
        }
        match event {
            HookEvent::SelectInitialStep { steps } => {
                Ok(Self::existing_step(&ctx.surface.location_hash(), *steps))
            }
            HookEvent::SetActive { step, .. } => {
                let hash = Self::hash_for(&step.id);
                if ctx.surface.location_hash() != hash {
                    ctx.surface.set_location_hash(&hash);
                    self.pending.push_back(hash);
                }
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn location_changed(
        &mut self,
        ctx: &mut HookContext<'_>,
        hash: &str,
        steps: &StepRegistry,
    ) -> HookResult {
        if !ctx.settings.use_hash {
            return Ok(None);
        }
        if let Some(pos) = self.pending.iter().position(|written| written == hash) {
            self.pending.drain(..=pos);
            tracing::trace!("ignoring self-caused hash change {hash}");
            return Ok(None);
        }
        Ok(Self::existing_step(hash, steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Pose;
    use crate::settings::Settings;
    use crate::step::StepSource;
    use crate::surface::RecordingSurface;

    fn steps() -> StepRegistry {
        StepRegistry::build(
            vec![
                StepSource::default().with_id("intro"),
                StepSource::default().with_id("outro"),
            ],
            &Pose::identity(),
        )
        .expect("steps")
    }

    #[test]
    fn test_step_from_hash_forms() {
        assert_eq!(HashSync::step_from_hash("#/intro"), Some(StepId::from("intro")));
        assert_eq!(HashSync::step_from_hash("#intro"), Some(StepId::from("intro")));
        assert_eq!(HashSync::step_from_hash("#/"), None);
        assert_eq!(HashSync::step_from_hash(""), None);
    }

    #[test]
    fn test_self_caused_change_is_ignored_once() {
        let settings = Settings::default();
        let current = Pose::identity();
        let mut surface = RecordingSurface::new();
        let steps = steps();
        let mut plugin = HashSync::new();
        let mut ctx = HookContext {
            settings: &settings,
            current: &current,
            surface: &mut surface,
        };

        let outro = steps.get(&StepId::from("outro")).expect("outro");
        plugin
            .handle(
                &mut ctx,
                &mut HookEvent::SetActive {
                    step: outro,
                    target: &current,
                },
            )
            .expect("set active");
        assert_eq!(ctx.surface.location_hash(), "#/outro");

        let echoed = plugin
            .location_changed(&mut ctx, "#/outro", &steps)
            .expect("echo");
        assert_eq!(echoed, None);

        let external = plugin
            .location_changed(&mut ctx, "#/outro", &steps)
            .expect("external");
        assert_eq!(external, Some(StepId::from("outro")));
    }

    #[test]
    fn test_queued_writes_are_each_ignored() {
        let settings = Settings::default();
        let current = Pose::identity();
        let mut surface = RecordingSurface::new();
        let steps = steps();
        let mut plugin = HashSync::new();
        let mut ctx = HookContext {
            settings: &settings,
            current: &current,
            surface: &mut surface,
        };

        for id in ["outro", "intro"] {
            let step = steps.get(&StepId::from(id)).expect("step");
            plugin
                .handle(
                    &mut ctx,
                    &mut HookEvent::SetActive {
                        step,
                        target: &current,
                    },
                )
                .expect("set active");
        }

        for hash in ["#/outro", "#/intro"] {
            let echoed = plugin
                .location_changed(&mut ctx, hash, &steps)
                .expect("echo");
            assert_eq!(echoed, None);
        }
        assert!(plugin.pending.is_empty());
    }

    #[test]
    fn test_echo_drops_older_unechoed_writes() {
        let settings = Settings::default();
        let current = Pose::identity();
        let mut surface = RecordingSurface::new();
        let steps = steps();
        let mut plugin = HashSync::new();
        let mut ctx = HookContext {
            settings: &settings,
            current: &current,
            surface: &mut surface,
        };
        plugin.pending.extend(["#/outro".to_string(), "#/intro".to_string()]);

        // the host coalesced both writes into one notification
        let echoed = plugin
            .location_changed(&mut ctx, "#/intro", &steps)
            .expect("echo");
        assert_eq!(echoed, None);

        let external = plugin
            .location_changed(&mut ctx, "#/outro", &steps)
            .expect("external");
        assert_eq!(external, Some(StepId::from("outro")));
    }

    #[test]
    fn test_unknown_step_in_hash_is_ignored() {
        let settings = Settings::default();
        let current = Pose::identity();
        let mut surface = RecordingSurface::new();
        let mut ctx = HookContext {
            settings: &settings,
            current: &current,
            surface: &mut surface,
        };
        let result = HashSync::new()
            .location_changed(&mut ctx, "#/nowhere", &steps())
            .expect("change");
        assert_eq!(result, None);
    }

    #[test]
    fn test_disabled_hash_does_nothing() {
        let settings = Settings {
            use_hash: false,
            ..Settings::default()
        };
        let current = Pose::identity();
        let mut surface = RecordingSurface::new().with_hash("#/outro");
        let steps = steps();
        let mut ctx = HookContext {
            settings: &settings,
            current: &current,
            surface: &mut surface,
        };
        let initial = HashSync::new()
            .handle(&mut ctx, &mut HookEvent::SelectInitialStep { steps: &steps })
            .expect("initial");
        assert_eq!(initial, None);
    }
}
