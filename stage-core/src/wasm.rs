//! WebAssembly bindings for stage-core.
//!
//! The presentation runs against a [`RecordingSurface`]; the browser side
//! drains the recorded operations as JSON and replays them on the DOM.

use wasm_bindgen::prelude::*;

use crate::{
    BackendType, Presentation, PresentationBuilder, RecordingSurface, Settings, StepId, StepSource,
};

/// Initialize the stage WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Presentation instance for WASM.
#[wasm_bindgen]
pub struct WasmPresentation {
    inner: Presentation<RecordingSurface>,
}

fn id_string(id: Option<StepId>) -> Option<String> {
    id.map(|id| id.as_str().to_string())
}

#[wasm_bindgen]
impl WasmPresentation {
    /// Start a presentation.
    ///
    /// `settings_json` holds settings overrides (may be `{}`), `steps_json`
    /// an array of step sources, `backend` a tier name and `hash` the
    /// current location hash.
    ///
    /// # Errors
    ///
    /// Returns an error string if JSON parsing or initialization fails.
    #[wasm_bindgen(constructor)]
    pub fn new(
        settings_json: &str,
        steps_json: &str,
        backend: &str,
        hash: &str,
    ) -> Result<WasmPresentation, String> {
        let settings = Settings::from_json(settings_json).map_err(|e| e.to_string())?;
        let steps: Vec<StepSource> =
            serde_json::from_str(steps_json).map_err(|e| e.to_string())?;
        let backend: BackendType = backend.parse().map_err(|e: crate::StageError| e.to_string())?;
        let inner = PresentationBuilder::new(settings)
            .backend(backend)
            .init(RecordingSurface::new().with_hash(hash), steps)
            .map_err(|e| e.to_string())?;
        Ok(Self { inner })
    }

    /// Select a step by id or `#id`.
    ///
    /// # Errors
    ///
    /// Returns an error string if a subscriber fails.
    pub fn select(&mut self, reference: &str) -> Result<Option<String>, String> {
        self.inner
            .select_ref(reference)
            .map(id_string)
            .map_err(|e| e.to_string())
    }

    /// Go to the next step.
    ///
    /// # Errors
    ///
    /// Returns an error string if a subscriber fails.
    pub fn next(&mut self) -> Result<Option<String>, String> {
        self.inner.next().map(id_string).map_err(|e| e.to_string())
    }

    /// Go to the previous step.
    ///
    /// # Errors
    ///
    /// Returns an error string if a subscriber fails.
    pub fn prev(&mut self) -> Result<Option<String>, String> {
        self.inner.prev().map(id_string).map_err(|e| e.to_string())
    }

    /// Invoke an operation by name.
    ///
    /// # Errors
    ///
    /// Returns an error string for unknown or protected operations.
    pub fn invoke(&mut self, operation: &str, argument: Option<String>) -> Result<Option<String>, String> {
        self.inner
            .invoke(operation, argument.as_deref())
            .map(id_string)
            .map_err(|e| e.to_string())
    }

    /// Handle a `keydown` by `keyCode`. Returns `true` when the host should
    /// prevent the default action.
    ///
    /// # Errors
    ///
    /// Returns an error string if a subscriber fails.
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, code: u32) -> Result<bool, String> {
        self.inner.handle_key_code(code).map_err(|e| e.to_string())
    }

    /// Handle a `hashchange` event.
    ///
    /// # Errors
    ///
    /// Returns an error string if a plugin or the selection fails.
    #[wasm_bindgen(js_name = hashChanged)]
    pub fn hash_changed(&mut self, hash: &str) -> Result<Option<String>, String> {
        self.inner
            .location_changed(hash)
            .map(id_string)
            .map_err(|e| e.to_string())
    }

    /// Get the camera pose as JSON.
    #[wasm_bindgen(js_name = cameraJson)]
    #[must_use]
    pub fn camera_json(&self) -> String {
        serde_json::to_string(self.inner.camera()).unwrap_or_default()
    }

    /// Get the active step id.
    #[wasm_bindgen(js_name = activeStep)]
    #[must_use]
    pub fn active_step(&self) -> Option<String> {
        self.inner.active().map(|id| id.as_str().to_string())
    }

    /// Get the transform tier in use.
    #[wasm_bindgen(js_name = backendType)]
    #[must_use]
    pub fn backend_type(&self) -> String {
        self.inner.backend_type().to_string()
    }

    /// Take the surface operations recorded since the last call, as JSON.
    #[wasm_bindgen(js_name = drainOps)]
    pub fn drain_ops(&mut self) -> String {
        let ops = self.inner.surface_mut().drain();
        serde_json::to_string(&ops).unwrap_or_else(|_| "[]".to_string())
    }
}
