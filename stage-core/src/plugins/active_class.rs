//! Keeps the active class on the selected step.

use crate::hooks::{HookContext, HookEvent, HookName, HookResult, Plugin};
use crate::surface::ElementRef;

/// Moves `settings.active_class` from the outgoing to the incoming step.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveClass;

impl Plugin for ActiveClass {
    fn name(&self) -> &'static str {
        "active-class"
    }

    fn hooks(&self) -> &'static [HookName] {
        &[HookName::SetInactive, HookName::SetActive]
    }

    fn handle(&mut self, ctx: &mut HookContext<'_>, event: &mut HookEvent<'_>) -> HookResult {
        let class = ctx.settings.active_class.as_str();
        match event {
            HookEvent::SetInactive { step, .. } => {
                ctx.surface
                    .remove_class(&ElementRef::Step(step.id.clone()), class);
            }
            HookEvent::SetActive { step, .. } => {
                ctx.surface.add_class(&ElementRef::Step(step.id.clone()), class);
            }
            _ => {}
        }
        Ok(None)
    }
}
