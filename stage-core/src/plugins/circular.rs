//! Registry-order navigation that wraps around at both ends.

use crate::hooks::{HookContext, HookEvent, HookName, HookResult, Plugin};

/// Starts at the first step; next after the last is the first, previous
/// before the first is the last.
#[derive(Debug, Clone, Copy, Default)]
pub struct CircularStepping;

impl Plugin for CircularStepping {
    fn name(&self) -> &'static str {
        "circular"
    }

    fn hooks(&self) -> &'static [HookName] {
        &[
            HookName::SelectInitialStep,
            HookName::SelectPrev,
            HookName::SelectNext,
        ]
    }

    fn handle(&mut self, _ctx: &mut HookContext<'_>, event: &mut HookEvent<'_>) -> HookResult {
        let target = match event {
            HookEvent::SelectInitialStep { steps } => steps.first(),
            HookEvent::SelectNext {
                step: Some(step),
                steps,
            } => steps.next_after(&step.id),
            HookEvent::SelectPrev {
                step: Some(step),
                steps,
            } => steps.prev_before(&step.id),
            _ => None,
        };
        Ok(target.map(|step| step.id.clone()))
    }
}
