//! Lifecycle hooks and the callback pipeline.
//!
//! Each hook has its own [`HookEvent`] variant carrying exactly the fields
//! that hook receives. Subscribers are either [`Plugin`] objects (one object,
//! several hooks, shared state) or plain closures registered per hook.
//! Within a hook they run in registration order, and the pipeline returns the
//! last non-empty value any of them produced.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pose::Pose;
use crate::settings::Settings;
use crate::step::{Attributes, Step, StepData, StepId, StepRegistry};
use crate::surface::Surface;
use crate::{StageError, StageResult};

/// The closed set of lifecycle hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookName {
    /// Before a selection; subscribers may cancel it.
    BeforeChange,
    /// While a step is being registered; subscribers may amend its data.
    InitStep,
    /// After a step is registered, before its pose is applied.
    ApplyStep,
    /// The outgoing step of a selection.
    SetInactive,
    /// The incoming step of a selection.
    SetActive,
    /// Choose the step selected at startup.
    SelectInitialStep,
    /// Choose the step before the active one.
    SelectPrev,
    /// Choose the step after the active one.
    SelectNext,
    /// Load lazy content for a step.
    LoadStep,
}

impl HookName {
    /// Every hook, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::BeforeChange,
        Self::InitStep,
        Self::ApplyStep,
        Self::SetInactive,
        Self::SetActive,
        Self::SelectInitialStep,
        Self::SelectPrev,
        Self::SelectNext,
        Self::LoadStep,
    ];

    /// The hook's public name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BeforeChange => "beforeChange",
            Self::InitStep => "initStep",
            Self::ApplyStep => "applyStep",
            Self::SetInactive => "setInactive",
            Self::SetActive => "setActive",
            Self::SelectInitialStep => "selectInitialStep",
            Self::SelectPrev => "selectPrev",
            Self::SelectNext => "selectNext",
            Self::LoadStep => "loadStep",
        }
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookName {
    type Err = StageError;

    fn from_str(s: &str) -> StageResult<Self> {
        Self::ALL
            .into_iter()
            .find(|hook| hook.as_str() == s)
            .ok_or_else(|| StageError::UnknownHook(s.to_string()))
    }
}

/// Lets `beforeChange` subscribers abort a selection.
#[derive(Debug, Default)]
pub struct Cancellation(Cell<bool>);

impl Cancellation {
    /// Create an uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the selection in progress.
    pub fn cancel(&self) {
        self.0.set(true);
    }

    /// Check if any subscriber cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Payload of a hook dispatch, one variant per hook.
#[derive(Debug)]
pub enum HookEvent<'a> {
    /// See [`HookName::BeforeChange`].
    BeforeChange {
        /// Step about to be selected.
        step: &'a Step,
        /// Cancellation capability.
        cancel: &'a Cancellation,
    },
    /// See [`HookName::InitStep`].
    InitStep {
        /// Step being registered.
        step_id: &'a StepId,
        /// Its dataset attributes.
        data: &'a Attributes,
        /// Its link target.
        href: Option<&'a str>,
        /// Mutable step data.
        step_data: &'a mut StepData,
    },
    /// See [`HookName::ApplyStep`].
    ApplyStep {
        /// Step being registered.
        step_id: &'a StepId,
        /// Its dataset attributes.
        data: &'a Attributes,
        /// Its step data.
        step_data: &'a StepData,
    },
    /// See [`HookName::SetInactive`].
    SetInactive {
        /// Outgoing step.
        step: &'a Step,
        /// Camera pose about to be applied.
        target: &'a Pose,
        /// Incoming step.
        next_step: &'a Step,
    },
    /// See [`HookName::SetActive`].
    SetActive {
        /// Incoming step.
        step: &'a Step,
        /// Camera pose about to be applied.
        target: &'a Pose,
    },
    /// See [`HookName::SelectInitialStep`].
    SelectInitialStep {
        /// All steps.
        steps: &'a StepRegistry,
    },
    /// See [`HookName::SelectPrev`].
    SelectPrev {
        /// The active step, if any.
        step: Option<&'a Step>,
        /// All steps.
        steps: &'a StepRegistry,
    },
    /// See [`HookName::SelectNext`].
    SelectNext {
        /// The active step, if any.
        step: Option<&'a Step>,
        /// All steps.
        steps: &'a StepRegistry,
    },
    /// See [`HookName::LoadStep`].
    LoadStep {
        /// Step whose content should be loaded.
        step: &'a Step,
    },
}

impl HookEvent<'_> {
    /// The hook this event is dispatched under.
    #[must_use]
    pub fn name(&self) -> HookName {
        match self {
            Self::BeforeChange { .. } => HookName::BeforeChange,
            Self::InitStep { .. } => HookName::InitStep,
            Self::ApplyStep { .. } => HookName::ApplyStep,
            Self::SetInactive { .. } => HookName::SetInactive,
            Self::SetActive { .. } => HookName::SetActive,
            Self::SelectInitialStep { .. } => HookName::SelectInitialStep,
            Self::SelectPrev { .. } => HookName::SelectPrev,
            Self::SelectNext { .. } => HookName::SelectNext,
            Self::LoadStep { .. } => HookName::LoadStep,
        }
    }

    /// The step the event is about, if it has one.
    #[must_use]
    pub fn subject(&self) -> Option<&StepId> {
        match self {
            Self::BeforeChange { step, .. }
            | Self::SetInactive { step, .. }
            | Self::SetActive { step, .. }
            | Self::LoadStep { step } => Some(&step.id),
            Self::InitStep { step_id, .. } | Self::ApplyStep { step_id, .. } => Some(*step_id),
            Self::SelectPrev { step, .. } | Self::SelectNext { step, .. } => {
                step.map(|step| &step.id)
            }
            Self::SelectInitialStep { .. } => None,
        }
    }
}

/// Shared context handed to every subscriber.
pub struct HookContext<'a> {
    /// Presentation settings.
    pub settings: &'a Settings,
    /// Camera pose in effect when the hook fired.
    pub current: &'a Pose,
    /// The rendering surface.
    pub surface: &'a mut dyn Surface,
}

/// Error raised by a subscriber.
pub type SubscriberError = Box<dyn std::error::Error + Send + Sync>;

/// What a subscriber returns: optionally a step to select.
pub type HookResult = Result<Option<StepId>, SubscriberError>;

/// A bundle of hook subscribers sharing state.
pub trait Plugin {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Hooks this plugin subscribes to.
    fn hooks(&self) -> &'static [HookName];

    /// Handle one of the subscribed hooks.
    ///
    /// # Errors
    ///
    /// An error aborts the dispatch and the operation that triggered it.
    fn handle(&mut self, ctx: &mut HookContext<'_>, event: &mut HookEvent<'_>) -> HookResult;

    /// React to a location hash change made outside the presentation.
    ///
    /// Returning a step id asks the presentation to select it.
    ///
    /// # Errors
    ///
    /// An error aborts the location change handling.
    fn location_changed(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _hash: &str,
        _steps: &StepRegistry,
    ) -> HookResult {
        Ok(None)
    }
}

type Callback = Box<dyn FnMut(&mut HookContext<'_>, &mut HookEvent<'_>) -> HookResult>;

enum Subscriber {
    Plugin(usize),
    Callback(Callback),
}

/// Ordered, append-only hook subscriptions.
#[derive(Default)]
pub struct CallbackPipeline {
    plugins: Vec<Box<dyn Plugin>>,
    subscribers: BTreeMap<HookName, Vec<Subscriber>>,
}

impl fmt::Debug for CallbackPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plugins: Vec<_> = self.plugins.iter().map(|p| p.name()).collect();
        let counts: BTreeMap<_, _> = self
            .subscribers
            .iter()
            .map(|(hook, subs)| (hook.as_str(), subs.len()))
            .collect();
        f.debug_struct("CallbackPipeline")
            .field("plugins", &plugins)
            .field("subscribers", &counts)
            .finish()
    }
}

impl CallbackPipeline {
    /// Create an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plugin under every hook it subscribes to.
    pub fn add_plugin(&mut self, plugin: Box<dyn Plugin>) {
        let index = self.plugins.len();
        for hook in plugin.hooks() {
            self.subscribers
                .entry(*hook)
                .or_default()
                .push(Subscriber::Plugin(index));
        }
        tracing::debug!("plugin {} subscribed to {:?}", plugin.name(), plugin.hooks());
        self.plugins.push(plugin);
    }

    /// Append a closure under one hook.
    pub fn register<F>(&mut self, hook: HookName, callback: F)
    where
        F: FnMut(&mut HookContext<'_>, &mut HookEvent<'_>) -> HookResult + 'static,
    {
        self.subscribers
            .entry(hook)
            .or_default()
            .push(Subscriber::Callback(Box::new(callback)));
    }

    /// Number of subscribers under a hook.
    #[must_use]
    pub fn subscriber_count(&self, hook: HookName) -> usize {
        self.subscribers.get(&hook).map_or(0, Vec::len)
    }

    /// Run every subscriber of the event's hook in registration order.
    ///
    /// Returns the last non-empty value produced.
    ///
    /// # Errors
    ///
    /// The first subscriber error stops the dispatch and is returned as
    /// [`StageError::Subscriber`].
    pub fn dispatch(
        &mut self,
        ctx: &mut HookContext<'_>,
        event: &mut HookEvent<'_>,
    ) -> StageResult<Option<StepId>> {
        let hook = event.name();
        let Self {
            plugins,
            subscribers,
        } = self;
        let Some(list) = subscribers.get_mut(&hook) else {
            return Ok(None);
        };

        let mut result = None;
        for subscriber in list.iter_mut() {
            let value = match subscriber {
                Subscriber::Plugin(index) => plugins[*index].handle(ctx, event),
                Subscriber::Callback(callback) => callback(ctx, event),
            }
            .map_err(|source| StageError::Subscriber { hook, source })?;
            if value.is_some() {
                result = value;
            }
        }
        Ok(result)
    }

    /// Offer an external location change to every plugin in order.
    ///
    /// Returns the last step any plugin asked for.
    ///
    /// # Errors
    ///
    /// The first plugin error stops the walk and is returned as
    /// [`StageError::Plugin`].
    pub fn location_changed(
        &mut self,
        ctx: &mut HookContext<'_>,
        hash: &str,
        steps: &StepRegistry,
    ) -> StageResult<Option<StepId>> {
        let mut result = None;
        for plugin in &mut self.plugins {
            let value = plugin
                .location_changed(ctx, hash, steps)
                .map_err(|source| StageError::Plugin {
                    plugin: plugin.name(),
                    source,
                })?;
            if value.is_some() {
                result = value;
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    fn dispatch_initial(pipeline: &mut CallbackPipeline) -> StageResult<Option<StepId>> {
        let settings = Settings::default();
        let current = Pose::identity();
        let mut surface = RecordingSurface::new();
        let steps = StepRegistry::default();
        let mut ctx = HookContext {
            settings: &settings,
            current: &current,
            surface: &mut surface,
        };
        pipeline.dispatch(&mut ctx, &mut HookEvent::SelectInitialStep { steps: &steps })
    }

    #[test]
    fn test_hook_names_round_trip() {
        for hook in HookName::ALL {
            assert_eq!(hook.as_str().parse::<HookName>().ok(), Some(hook));
        }
        assert!(matches!(
            "afterChange".parse::<HookName>(),
            Err(StageError::UnknownHook(_))
        ));
    }

    #[test]
    fn test_last_non_empty_value_wins() {
        let mut pipeline = CallbackPipeline::new();
        pipeline.register(HookName::SelectInitialStep, |_, _| Ok(Some(StepId::from("s1"))));
        pipeline.register(HookName::SelectInitialStep, |_, _| Ok(Some(StepId::from("s2"))));
        pipeline.register(HookName::SelectInitialStep, |_, _| Ok(None));

        let result = dispatch_initial(&mut pipeline).expect("dispatch");
        assert_eq!(result, Some(StepId::from("s2")));
    }

    #[test]
    fn test_subscribers_run_in_registration_order() {
        let order = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut pipeline = CallbackPipeline::new();
        for label in ["first", "second", "third"] {
            let order = std::rc::Rc::clone(&order);
            pipeline.register(HookName::SelectInitialStep, move |_, _| {
                order.borrow_mut().push(label);
                Ok(None)
            });
        }

        assert_eq!(dispatch_initial(&mut pipeline).expect("dispatch"), None);
        assert_eq!(*order.borrow(), ["first", "second", "third"]);
    }

    #[test]
    fn test_failing_subscriber_stops_dispatch() {
        let reached = std::rc::Rc::new(Cell::new(false));
        let mut pipeline = CallbackPipeline::new();
        pipeline.register(HookName::SelectInitialStep, |_, _| Err("boom".into()));
        let flag = std::rc::Rc::clone(&reached);
        pipeline.register(HookName::SelectInitialStep, move |_, _| {
            flag.set(true);
            Ok(None)
        });

        let result = dispatch_initial(&mut pipeline);
        assert!(matches!(
            result,
            Err(StageError::Subscriber {
                hook: HookName::SelectInitialStep,
                ..
            })
        ));
        assert!(!reached.get());
    }

    #[test]
    fn test_unsubscribed_hook_yields_nothing() {
        let mut pipeline = CallbackPipeline::new();
        assert_eq!(pipeline.subscriber_count(HookName::LoadStep), 0);
        assert_eq!(dispatch_initial(&mut pipeline).expect("dispatch"), None);
    }

    #[test]
    fn test_cancellation_flag() {
        let cancel = Cancellation::new();
        assert!(!cancel.is_cancelled());
        cancel.cancel();
        assert!(cancel.is_cancelled());
    }
}
