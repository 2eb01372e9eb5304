//! The presentation session: initializer and selection engine.
//!
//! A [`Presentation`] owns everything one running deck needs: settings, the
//! chosen transform backend, the surface, the hook pipeline, the step
//! registry, and the camera pose with the active step. Several
//! presentations can run side by side.
//!
//! ```text
//! select(step)
//!   ├─ beforeChange ──(cancel)──▶ None
//!   ├─ same step? ──────────────▶ step (no-op)
//!   ├─ setInactive(old) / setActive(new)
//!   ├─ viewport: perspective + scale        (timing per TransitionPlan)
//!   ├─ canvas:   rotate(revert) + translate (timing per TransitionPlan)
//!   ├─ z-order, commit camera + active step
//!   └─ loadStep for the step and its siblings (once each)
//! ```

use crate::backend::{create_backend, BackendType, Capabilities, TransformBackend, TransformEffect};
use crate::hooks::{
    Cancellation, CallbackPipeline, HookContext, HookEvent, HookName, HookResult, Plugin,
};
use crate::input::Navigation;
use crate::plugins::default_plugins;
use crate::pose::{css_number, Pose};
use crate::settings::Settings;
use crate::step::{Step, StepId, StepRegistry, StepSource};
use crate::style::{StyleMap, Timing};
use crate::surface::{ElementRef, Surface};
use crate::transition::TransitionPlan;
use crate::{StageError, StageResult};

/// Stacking order of inactive steps.
const INACTIVE_Z_INDEX: &str = "9";
/// Stacking order of the active step.
const ACTIVE_Z_INDEX: &str = "10";
/// Perspective distance per unit of step scale.
const PERSPECTIVE_PER_SCALE: f64 = 1000.0;

type BoxedCallback = Box<dyn FnMut(&mut HookContext<'_>, &mut HookEvent<'_>) -> HookResult>;

/// Configures and starts a [`Presentation`].
pub struct PresentationBuilder {
    settings: Settings,
    backend: BackendType,
    default_plugins: bool,
    plugins: Vec<Box<dyn Plugin>>,
    callbacks: Vec<(HookName, BoxedCallback)>,
}

impl PresentationBuilder {
    /// Start from the given settings with the full 3D backend and the
    /// default plugins.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            backend: BackendType::Full3d,
            default_plugins: true,
            plugins: Vec::new(),
            callbacks: Vec::new(),
        }
    }

    /// Use a specific transform tier.
    #[must_use]
    pub fn backend(mut self, backend: BackendType) -> Self {
        self.backend = backend;
        self
    }

    /// Pick the transform tier from probed host capabilities.
    #[must_use]
    pub fn capabilities(self, capabilities: Capabilities) -> Self {
        self.backend(BackendType::detect(capabilities))
    }

    /// Skip the bundled plugins.
    #[must_use]
    pub fn without_default_plugins(mut self) -> Self {
        self.default_plugins = false;
        self
    }

    /// Append a plugin after the default ones.
    #[must_use]
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Append a closure subscriber under a hook, after all plugins.
    #[must_use]
    pub fn on<F>(mut self, hook: HookName, callback: F) -> Self
    where
        F: FnMut(&mut HookContext<'_>, &mut HookEvent<'_>) -> HookResult + 'static,
    {
        self.callbacks.push((hook, Box::new(callback)));
        self
    }

    /// Build the step registry, apply every step's pose and select the
    /// initial step.
    ///
    /// # Errors
    ///
    /// Returns an error if a step attribute is malformed or a subscriber
    /// fails during initialization.
    pub fn init<S: Surface>(self, surface: S, sources: Vec<StepSource>) -> StageResult<Presentation<S>> {
        let mut pipeline = CallbackPipeline::new();
        if self.default_plugins {
            for plugin in default_plugins() {
                pipeline.add_plugin(plugin);
            }
        }
        for plugin in self.plugins {
            pipeline.add_plugin(plugin);
        }
        for (hook, callback) in self.callbacks {
            pipeline.register(hook, callback);
        }

        let steps = StepRegistry::build(sources, &Pose::identity())?;
        let mut presentation = Presentation {
            settings: self.settings,
            backend: create_backend(self.backend),
            surface,
            pipeline,
            steps,
            camera: Pose::identity(),
            active: None,
        };
        presentation.start()?;
        Ok(presentation)
    }
}

/// A running presentation.
pub struct Presentation<S> {
    settings: Settings,
    backend: Box<dyn TransformBackend>,
    surface: S,
    pipeline: CallbackPipeline,
    steps: StepRegistry,
    camera: Pose,
    active: Option<StepId>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for Presentation<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presentation")
            .field("backend", &self.backend.backend_type())
            .field("steps", &self.steps.len())
            .field("camera", &self.camera)
            .field("active", &self.active)
            .field("pipeline", &self.pipeline)
            .field("surface", &self.surface)
            .finish_non_exhaustive()
    }
}

/// Run a hook with the presentation's context.
fn emit<S: Surface>(
    pipeline: &mut CallbackPipeline,
    settings: &Settings,
    current: &Pose,
    surface: &mut S,
    event: &mut HookEvent<'_>,
) -> StageResult<Option<StepId>> {
    let mut ctx = HookContext {
        settings,
        current,
        surface,
    };
    pipeline.dispatch(&mut ctx, event)
}

impl<S: Surface> Presentation<S> {
    fn start(&mut self) -> StageResult<()> {
        let backend = self.backend.backend_type();
        if backend.is_degraded() {
            tracing::warn!("transforms unsupported, using positional fallback");
            self.surface
                .add_class(&ElementRef::Root, &self.settings.not_supported_class);
        }

        self.surface.wrap_in_canvas(&self.settings.canvas_class);

        let mut base = self.settings.animation.to_style(self.settings.animation.timing());
        base.set("position", "absolute");
        base.set("transition-duration", "0s");
        self.surface.set_style(&ElementRef::Root, &base);
        self.surface.set_style(
            &ElementRef::Root,
            &StyleMap::new()
                .with("top", "50%")
                .with("left", "50%")
                .with("perspective", "1000px"),
        );
        self.surface.set_style(&ElementRef::Canvas, &base);

        self.camera = Pose::identity();

        for index in 0..self.steps.len() {
            self.init_step(index)?;
        }

        tracing::info!(
            "presentation ready: {} steps, {:?} backend",
            self.steps.len(),
            backend
        );

        let initial = emit(
            &mut self.pipeline,
            &self.settings,
            &self.camera,
            &mut self.surface,
            &mut HookEvent::SelectInitialStep { steps: &self.steps },
        )?;
        if let Some(id) = initial {
            self.select(&id)?;
        }
        Ok(())
    }

    fn init_step(&mut self, index: usize) -> StageResult<()> {
        let Some(step) = self.steps.at_mut(index) else {
            return Ok(());
        };
        let Step {
            id,
            data,
            attributes,
            href,
            ..
        } = step;

        emit(
            &mut self.pipeline,
            &self.settings,
            &self.camera,
            &mut self.surface,
            &mut HookEvent::InitStep {
                step_id: &*id,
                data: &*attributes,
                href: href.as_deref(),
                step_data: &mut *data,
            },
        )?;

        let target = ElementRef::Step(id.clone());
        self.surface.set_style(
            &target,
            &StyleMap::new()
                .with("position", "absolute")
                .with("transform-style", "preserve-3d"),
        );

        emit(
            &mut self.pipeline,
            &self.settings,
            &self.camera,
            &mut self.surface,
            &mut HookEvent::ApplyStep {
                step_id: &*id,
                data: &*attributes,
                step_data: &*data,
            },
        )?;

        let effect = TransformEffect::new()
            .with_prepend(data.prepend.as_str())
            .with_translate(data.pose.translate)
            .with_rotate(data.pose.rotate)
            .with_scale(data.pose.scale);
        self.backend.apply(&mut self.surface, &target, &effect);
        Ok(())
    }

    /// Select a step, moving the camera to it.
    ///
    /// Returns the selected step, or `None` when the step does not exist or
    /// a `beforeChange` subscriber cancelled. Selecting the active step
    /// again changes nothing.
    ///
    /// # Errors
    ///
    /// A failing subscriber aborts the selection; state mutated before the
    /// failure is kept.
    pub fn select(&mut self, target: &StepId) -> StageResult<Option<StepId>> {
        let Some(step) = self.steps.get(target) else {
            tracing::debug!("select rejected: no step {target}");
            return Ok(None);
        };

        self.surface.scroll_to_origin();

        let mut goal = step.data.pose.inverse();

        let cancel = Cancellation::new();
        emit(
            &mut self.pipeline,
            &self.settings,
            &self.camera,
            &mut self.surface,
            &mut HookEvent::BeforeChange {
                step,
                cancel: &cancel,
            },
        )?;
        if cancel.is_cancelled() {
            tracing::debug!("select of {target} cancelled");
            return Ok(None);
        }

        let previous = match &self.active {
            Some(active) if active == target => {
                tracing::debug!("{target} already active");
                return Ok(Some(target.clone()));
            }
            Some(active) => self.steps.get(active),
            None => None,
        };

        if let Some(previous) = previous {
            emit(
                &mut self.pipeline,
                &self.settings,
                &self.camera,
                &mut self.surface,
                &mut HookEvent::SetInactive {
                    step: previous,
                    target: &goal,
                    next_step: step,
                },
            )?;
        }
        emit(
            &mut self.pipeline,
            &self.settings,
            &self.camera,
            &mut self.surface,
            &mut HookEvent::SetActive {
                step,
                target: &goal,
            },
        )?;

        if let Some(active) = &self.active {
            self.surface
                .remove_class(&ElementRef::Root, &format!("step-{active}"));
        }
        self.surface
            .add_class(&ElementRef::Root, &format!("step-{target}"));

        let plan = TransitionPlan::new(
            &self.settings.animation,
            &self.camera,
            &goal,
            self.active.is_none(),
        );
        tracing::debug!(
            "select {target}: zooming_in={} first={}",
            plan.zooming_in,
            plan.first
        );

        let mut viewport = self.phase_style(plan.viewport);
        viewport.set(
            "perspective",
            format!("{}px", css_number(step.data.pose.scale.x * PERSPECTIVE_PER_SCALE)),
        );
        self.surface.set_style(&ElementRef::Root, &viewport);
        self.backend.apply(
            &mut self.surface,
            &ElementRef::Root,
            &TransformEffect::new().with_scale(goal.scale),
        );

        goal.rotate = goal.rotate.reverted();
        let canvas = TransformEffect::new()
            .with_translate(goal.translate)
            .with_rotate(goal.rotate)
            .with_style(self.phase_style(plan.canvas));
        self.backend
            .apply(&mut self.surface, &ElementRef::Canvas, &canvas);

        let z_inactive = StyleMap::new().with("z-index", INACTIVE_Z_INDEX);
        for other in self.steps.iter() {
            self.surface
                .set_style(&ElementRef::Step(other.id.clone()), &z_inactive);
        }
        self.surface.set_style(
            &ElementRef::Step(target.clone()),
            &StyleMap::new().with("z-index", ACTIVE_Z_INDEX),
        );

        self.camera = goal;
        self.active = Some(target.clone());

        self.load_siblings()?;
        Ok(Some(target.clone()))
    }

    fn phase_style(&self, timing: Timing) -> StyleMap {
        self.settings.animation.to_style(timing)
    }

    /// Select a step by reference (`id` or `#id`).
    ///
    /// # Errors
    ///
    /// See [`Presentation::select`].
    pub fn select_ref(&mut self, reference: &str) -> StageResult<Option<StepId>> {
        self.select(&StepId::from_ref(reference))
    }

    /// Alias for [`Presentation::select`].
    ///
    /// # Errors
    ///
    /// See [`Presentation::select`].
    pub fn go_to(&mut self, target: &StepId) -> StageResult<Option<StepId>> {
        self.select(target)
    }

    /// Select the step the `selectNext` subscribers choose.
    ///
    /// # Errors
    ///
    /// See [`Presentation::select`].
    pub fn next(&mut self) -> StageResult<Option<StepId>> {
        match self.get_next()? {
            Some(id) => self.select(&id),
            None => Ok(None),
        }
    }

    /// Select the step the `selectPrev` subscribers choose.
    ///
    /// # Errors
    ///
    /// See [`Presentation::select`].
    pub fn prev(&mut self) -> StageResult<Option<StepId>> {
        match self.get_prev()? {
            Some(id) => self.select(&id),
            None => Ok(None),
        }
    }

    /// Ask the `selectNext` subscribers which step follows the active one.
    ///
    /// # Errors
    ///
    /// Returns an error if a subscriber fails.
    pub fn get_next(&mut self) -> StageResult<Option<StepId>> {
        let step = self.active.as_ref().and_then(|id| self.steps.get(id));
        emit(
            &mut self.pipeline,
            &self.settings,
            &self.camera,
            &mut self.surface,
            &mut HookEvent::SelectNext {
                step,
                steps: &self.steps,
            },
        )
    }

    /// Ask the `selectPrev` subscribers which step precedes the active one.
    ///
    /// # Errors
    ///
    /// Returns an error if a subscriber fails.
    pub fn get_prev(&mut self) -> StageResult<Option<StepId>> {
        let step = self.active.as_ref().and_then(|id| self.steps.get(id));
        emit(
            &mut self.pipeline,
            &self.settings,
            &self.camera,
            &mut self.surface,
            &mut HookEvent::SelectPrev {
                step,
                steps: &self.steps,
            },
        )
    }

    /// Fire `loadStep` for the active step's siblings and then the step
    /// itself, skipping any already loaded. Loaded steps stay loaded.
    fn load_siblings(&mut self) -> StageResult<()> {
        let Some(active) = self.active.clone() else {
            return Ok(());
        };
        let mut pending = self.steps.siblings_of(&active);
        pending.push(active);

        for id in pending {
            let Some(step) = self.steps.get(&id) else {
                continue;
            };
            if step.is_loaded() {
                continue;
            }
            emit(
                &mut self.pipeline,
                &self.settings,
                &self.camera,
                &mut self.surface,
                &mut HookEvent::LoadStep { step },
            )?;
            self.surface
                .add_class(&ElementRef::Step(id.clone()), &self.settings.loaded_class);
            if let Some(step) = self.steps.get_mut(&id) {
                step.mark_loaded();
            }
        }
        Ok(())
    }

    /// Handle a location hash change reported by the host.
    ///
    /// Plugins decide whether the change names a step to select; changes
    /// the presentation caused itself are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if a plugin or the resulting selection fails.
    pub fn location_changed(&mut self, hash: &str) -> StageResult<Option<StepId>> {
        let mut ctx = HookContext {
            settings: &self.settings,
            current: &self.camera,
            surface: &mut self.surface,
        };
        match self.pipeline.location_changed(&mut ctx, hash, &self.steps)? {
            Some(id) => self.select(&id),
            None => Ok(None),
        }
    }

    /// Handle a key press given as a legacy `keyCode`.
    ///
    /// Returns `true` when the key drove navigation and the host should
    /// suppress its default action.
    ///
    /// # Errors
    ///
    /// See [`Presentation::select`].
    pub fn handle_key_code(&mut self, code: u32) -> StageResult<bool> {
        self.navigate(Navigation::from_key_code(code))
    }

    /// Handle a key press given as a `KeyboardEvent.key` name.
    ///
    /// # Errors
    ///
    /// See [`Presentation::select`].
    pub fn handle_key(&mut self, key: &str) -> StageResult<bool> {
        self.navigate(Navigation::from_key(key))
    }

    fn navigate(&mut self, navigation: Option<Navigation>) -> StageResult<bool> {
        match navigation {
            Some(Navigation::Next) => self.next()?,
            Some(Navigation::Prev) => self.prev()?,
            None => return Ok(false),
        };
        Ok(true)
    }

    /// Invoke an operation by name.
    ///
    /// Public operations are `select`, `goTo`, `next`, `prev`, `getNext`
    /// and `getPrev`. Names starting with `_` are internal and need
    /// `settings.test`.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::UnknownOperation`] or
    /// [`StageError::ProtectedOperation`] for bad names,
    /// [`StageError::MissingArgument`] when `select`/`goTo` lack a target,
    /// and otherwise whatever the operation returns.
    pub fn invoke(&mut self, operation: &str, argument: Option<&str>) -> StageResult<Option<StepId>> {
        const INTERNAL: &[&str] = &["_loadSiblings"];
        if INTERNAL.contains(&operation) && !self.settings.test {
            return Err(StageError::ProtectedOperation(operation.to_string()));
        }

        match operation {
            "select" | "goTo" => {
                let reference =
                    argument.ok_or_else(|| StageError::MissingArgument(operation.to_string()))?;
                self.select_ref(reference)
            }
            "next" => self.next(),
            "prev" => self.prev(),
            "getNext" => self.get_next(),
            "getPrev" => self.get_prev(),
            "_loadSiblings" => {
                self.load_siblings()?;
                Ok(self.active.clone())
            }
            _ => Err(StageError::UnknownOperation(operation.to_string())),
        }
    }

    /// Append a closure subscriber under a hook.
    pub fn register<F>(&mut self, hook: HookName, callback: F)
    where
        F: FnMut(&mut HookContext<'_>, &mut HookEvent<'_>) -> HookResult + 'static,
    {
        self.pipeline.register(hook, callback);
    }

    /// Append a closure subscriber under a hook given by name.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::UnknownHook`] if the name is not a hook.
    pub fn register_named<F>(&mut self, hook: &str, callback: F) -> StageResult<()>
    where
        F: FnMut(&mut HookContext<'_>, &mut HookEvent<'_>) -> HookResult + 'static,
    {
        let hook: HookName = hook.parse()?;
        self.pipeline.register(hook, callback);
        Ok(())
    }

    /// Apply arbitrary style to the canvas.
    pub fn style_canvas(&mut self, style: &StyleMap) {
        self.surface.set_style(&ElementRef::Canvas, style);
    }

    /// The camera pose: the inverse of the active step's pose, or identity.
    #[must_use]
    pub fn camera(&self) -> &Pose {
        &self.camera
    }

    /// The active step id.
    #[must_use]
    pub fn active(&self) -> Option<&StepId> {
        self.active.as_ref()
    }

    /// The active step.
    #[must_use]
    pub fn active_step(&self) -> Option<&Step> {
        self.active.as_ref().and_then(|id| self.steps.get(id))
    }

    /// All steps in registry order.
    #[must_use]
    pub fn steps(&self) -> &StepRegistry {
        &self.steps
    }

    /// The settings in effect.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The transform tier in use.
    #[must_use]
    pub fn backend_type(&self) -> BackendType {
        self.backend.backend_type()
    }

    /// The rendering surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the rendering surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Stop the presentation, returning its surface.
    #[must_use]
    pub fn into_surface(self) -> S {
        self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    fn sources() -> Vec<StepSource> {
        vec![
            StepSource::default().with_id("a"),
            StepSource::default()
                .with_id("b")
                .with_data("x", "1000")
                .with_data("scale", "2"),
        ]
    }

    #[test]
    fn test_init_selects_first_step_by_default() {
        let presentation = PresentationBuilder::new(Settings::default())
            .init(RecordingSurface::new(), sources())
            .expect("init");
        assert_eq!(presentation.active(), Some(&StepId::from("a")));
        assert!(presentation
            .surface()
            .has_class(&ElementRef::Root, "step-a"));
    }

    #[test]
    fn test_root_state_class_follows_selection() {
        let mut presentation = PresentationBuilder::new(Settings::default())
            .init(RecordingSurface::new(), sources())
            .expect("init");
        presentation.select(&StepId::from("b")).expect("select");

        let surface = presentation.surface();
        assert!(surface.has_class(&ElementRef::Root, "step-b"));
        assert!(!surface.has_class(&ElementRef::Root, "step-a"));
    }

    #[test]
    fn test_viewport_perspective_scales_with_step() {
        let mut presentation = PresentationBuilder::new(Settings::default())
            .init(RecordingSurface::new(), sources())
            .expect("init");
        presentation.select(&StepId::from("b")).expect("select");
        assert_eq!(
            presentation
                .surface()
                .last_style(&ElementRef::Root, "perspective"),
            Some("2000px")
        );
    }

    #[test]
    fn test_without_default_plugins_nothing_is_selected() {
        let presentation = PresentationBuilder::new(Settings::default())
            .without_default_plugins()
            .init(RecordingSurface::new(), sources())
            .expect("init");
        assert!(presentation.active().is_none());
        assert_eq!(*presentation.camera(), Pose::identity());
    }

    #[test]
    fn test_fallback_marks_root_unsupported() {
        let presentation = PresentationBuilder::new(Settings::default())
            .capabilities(Capabilities {
                perspective: false,
                transform: false,
            })
            .init(RecordingSurface::new(), sources())
            .expect("init");
        assert_eq!(presentation.backend_type(), BackendType::Fallback);
        assert!(presentation
            .surface()
            .has_class(&ElementRef::Root, "not-supported"));
    }
}
