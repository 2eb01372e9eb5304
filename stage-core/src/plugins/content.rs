//! Lazy content loading for steps that link to external content.

use crate::hooks::{HookContext, HookEvent, HookName, HookResult, Plugin};
use crate::surface::ElementRef;

/// Records each step's content source (its `href`, else its `src`
/// attribute) and asks the surface to load it when the step comes near.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentLoader;

impl Plugin for ContentLoader {
    fn name(&self) -> &'static str {
        "content-loader"
    }

    fn hooks(&self) -> &'static [HookName] {
        &[HookName::InitStep, HookName::LoadStep]
    }

    fn handle(&mut self, ctx: &mut HookContext<'_>, event: &mut HookEvent<'_>) -> HookResult {
        match event {
            HookEvent::InitStep {
                data,
                href,
                step_data,
                ..
            } => {
                step_data.content_source = href
                    .map(str::to_string)
                    .or_else(|| data.get("src").cloned())
                    .filter(|source| !source.is_empty());
            }
            HookEvent::LoadStep { step } => {
                if let Some(source) = &step.data.content_source {
                    tracing::debug!("loading {} from {source}", step.id);
                    ctx.surface
                        .load_content(&ElementRef::Step(step.id.clone()), source);
                }
            }
            _ => {}
        }
        Ok(None)
    }
}
