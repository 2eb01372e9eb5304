//! # Saorsa Stage Core
//!
//! Presentation engine for zooming, rotating 3D slide decks.
//! Compiles to WASM for browser hosts.
//!
//! Every step sits somewhere in 3D space with its own pose. Selecting a step
//! moves a virtual camera by applying the inverse of that pose to the canvas
//! holding all steps.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              stage-core.wasm                │
//! ├─────────────────────────────────────────────┤
//! │  Presentation     │  Callback Pipeline      │
//! │  - Initializer    │  - Lifecycle hooks      │
//! │  - Select engine  │  - Bundled plugins      │
//! │  - Camera pose    │  - Hash / keyboard      │
//! ├─────────────────────────────────────────────┤
//! │  Step Registry    │  Transform Backends     │
//! │  - Poses          │  - Full 3D / Planar     │
//! │  - Navigation     │  - Positional fallback  │
//! └─────────────────────────────────────────────┘
//!                      │
//!                      ▼
//!               Surface (DOM / recording)
//! ```

#![cfg_attr(not(feature = "wasm"), forbid(unsafe_code))]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod error;
pub mod hooks;
pub mod input;
pub mod plugins;
pub mod pose;
pub mod presentation;
pub mod settings;
pub mod step;
pub mod style;
pub mod surface;
pub mod transition;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use backend::{create_backend, BackendType, Capabilities, TransformBackend, TransformEffect};
pub use error::{StageError, StageResult};
pub use hooks::{
    CallbackPipeline, Cancellation, HookContext, HookEvent, HookName, HookResult, Plugin,
    SubscriberError,
};
pub use input::Navigation;
pub use plugins::{default_plugins, ActiveClass, CircularStepping, ContentLoader, HashSync};
pub use pose::{Pose, Rotation, Vec3};
pub use presentation::{Presentation, PresentationBuilder};
pub use settings::Settings;
pub use step::{Attributes, Step, StepData, StepId, StepRegistry, StepSource};
pub use style::{Animation, CssTime, StyleMap, Timing};
pub use surface::{ElementRef, RecordingSurface, Surface, SurfaceOp};
pub use transition::TransitionPlan;

/// Stage core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
