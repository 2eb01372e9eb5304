//! Replays a script against a deck and collects what happened.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use stage_core::{
    BackendType, Pose, Presentation, PresentationBuilder, RecordingSurface, Settings, StageResult,
    StepId, StepSource, Surface, SurfaceOp,
};

use crate::script::Command;
use crate::RunConfig;

/// A deck document: settings overrides plus step sources.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Deck {
    /// Settings overrides merged over the defaults.
    #[serde(default)]
    pub settings: serde_json::Value,
    /// Steps in declaration order.
    pub steps: Vec<StepSource>,
}

impl Deck {
    /// Parse a deck from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Failed to parse deck JSON")
    }

    /// Load a deck from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read deck {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid deck {}", path.display()))
    }

    /// Resolve the settings overrides against the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an override has the wrong type.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        if self.settings.is_null() {
            return Ok(Settings::default());
        }
        Settings::default()
            .merged(&self.settings)
            .context("Invalid deck settings")
    }
}

/// What a command did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// A selection-type command finished; `step` is what it returned.
    Step {
        /// Returned step, if any.
        step: Option<StepId>,
    },
    /// A key was pressed.
    Key {
        /// Whether the key drove navigation.
        consumed: bool,
    },
    /// The command failed; the presentation keeps running.
    Error {
        /// Error message.
        message: String,
    },
}

impl Outcome {
    fn from_step(result: StageResult<Option<StepId>>) -> Self {
        match result {
            Ok(step) => Self::Step { step },
            Err(e) => Self::Error {
                message: e.to_string(),
            },
        }
    }
}

/// State after one command.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    /// The command, as written in the script (`init` for startup).
    pub command: String,
    /// What it returned.
    pub outcome: Outcome,
    /// Active step afterwards.
    pub active: Option<StepId>,
    /// Camera pose afterwards.
    pub camera: Pose,
    /// Surface operations emitted by the command.
    pub ops: Vec<SurfaceOp>,
}

/// Full result of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Transform tier used.
    pub backend: BackendType,
    /// Number of registered steps.
    pub steps: usize,
    /// Startup followed by one frame per command.
    pub frames: Vec<Frame>,
}

impl Report {
    /// Render as human-readable text.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "backend: {}, steps: {}", self.backend, self.steps);
        for frame in &self.frames {
            let outcome = match &frame.outcome {
                Outcome::Step { step: Some(step) } => format!("-> {step}"),
                Outcome::Step { step: None } => "-> (none)".to_string(),
                Outcome::Key { consumed } => format!("consumed={consumed}"),
                Outcome::Error { message } => format!("error: {message}"),
            };
            let active = frame
                .active
                .as_ref()
                .map_or_else(|| "(none)".to_string(), ToString::to_string);
            let c = &frame.camera;
            let _ = writeln!(
                out,
                "{} {outcome} | active={active} translate=({}, {}, {}) rotate=({}, {}, {}) scale=({}, {}, {}) | {} ops",
                frame.command,
                c.translate.x,
                c.translate.y,
                c.translate.z,
                c.rotate.x,
                c.rotate.y,
                c.rotate.z,
                c.scale.x,
                c.scale.y,
                c.scale.z,
                frame.ops.len()
            );
            for op in &frame.ops {
                let line = serde_json::to_string(op).unwrap_or_default();
                let _ = writeln!(out, "    {line}");
            }
        }
        out
    }
}

fn frame(stage: &mut Presentation<RecordingSurface>, command: String, outcome: Outcome) -> Frame {
    Frame {
        command,
        outcome,
        active: stage.active().cloned(),
        camera: *stage.camera(),
        ops: stage.surface_mut().drain(),
    }
}

fn execute(stage: &mut Presentation<RecordingSurface>, command: &Command) -> Outcome {
    match command {
        Command::Next => Outcome::from_step(stage.next()),
        Command::Prev => Outcome::from_step(stage.prev()),
        Command::Select(reference) => Outcome::from_step(stage.select_ref(reference)),
        Command::GoTo(reference) => {
            Outcome::from_step(stage.invoke("goTo", Some(reference.as_str())))
        }
        Command::Key(code) => match stage.handle_key_code(*code) {
            Ok(consumed) => Outcome::Key { consumed },
            Err(e) => Outcome::Error {
                message: e.to_string(),
            },
        },
        Command::Hash(hash) => {
            stage.surface_mut().set_location_hash(hash);
            Outcome::from_step(stage.location_changed(hash))
        }
        Command::Op { name, argument } => {
            Outcome::from_step(stage.invoke(name, argument.as_deref()))
        }
    }
}

/// Start a presentation for `deck` and replay `commands`.
///
/// Command failures are recorded in the report, not returned.
///
/// # Errors
///
/// Returns an error if the deck is invalid or initialization fails.
pub fn run(deck: &Deck, config: &RunConfig, commands: &[Command]) -> anyhow::Result<Report> {
    let mut settings = deck.settings()?;
    if config.test_mode {
        settings.test = true;
    }

    let surface = RecordingSurface::new().with_hash(config.hash.as_str());
    let mut stage = PresentationBuilder::new(settings)
        .backend(config.backend)
        .init(surface, deck.steps.clone())
        .context("Failed to start presentation")?;

    tracing::info!(
        "deck started with {} steps on {} backend",
        stage.steps().len(),
        stage.backend_type()
    );

    let active = stage.active().cloned();
    let mut frames = vec![frame(
        &mut stage,
        "init".to_string(),
        Outcome::Step { step: active },
    )];

    for command in commands {
        tracing::debug!("running {command}");
        let outcome = execute(&mut stage, command);
        if let Outcome::Error { message } = &outcome {
            tracing::warn!("{command} failed: {message}");
        }
        frames.push(frame(&mut stage, command.to_string(), outcome));
    }

    Ok(Report {
        backend: stage.backend_type(),
        steps: stage.steps().len(),
        frames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;

    const DECK: &str = r#"{
        "settings": { "animation": { "transitionDuration": "2s" } },
        "steps": [
            { "id": "intro" },
            { "id": "detail", "data": { "x": "500", "scale": "2" } }
        ]
    }"#;

    fn config() -> RunConfig {
        RunConfig::default()
    }

    #[test]
    fn test_run_records_init_and_commands() {
        let deck = Deck::from_json(DECK).expect("deck");
        let commands = parse_script("next,next").expect("script");
        let report = run(&deck, &config(), &commands).expect("run");

        assert_eq!(report.steps, 2);
        assert_eq!(report.frames.len(), 3);
        assert_eq!(report.frames[0].command, "init");
        assert_eq!(report.frames[1].active, Some(StepId::from("detail")));
        assert!((report.frames[1].camera.translate.x + 500.0).abs() < f64::EPSILON);
        assert_eq!(report.frames[2].active, Some(StepId::from("intro")));
        assert!(!report.frames[1].ops.is_empty());
    }

    #[test]
    fn test_failed_command_is_reported() {
        let deck = Deck::from_json(DECK).expect("deck");
        let commands = parse_script("op:_loadSiblings").expect("script");
        let report = run(&deck, &config(), &commands).expect("run");
        assert!(matches!(report.frames[1].outcome, Outcome::Error { .. }));
    }

    #[test]
    fn test_missing_settings_use_defaults() {
        let deck = Deck::from_json(r#"{"steps": []}"#).expect("deck");
        assert_eq!(deck.settings().expect("settings"), Settings::default());
    }

    #[test]
    fn test_text_report_lists_frames() {
        let deck = Deck::from_json(DECK).expect("deck");
        let report = run(&deck, &config(), &[Command::Key(39)]).expect("run");
        let text = report.to_text();
        assert!(text.starts_with("backend: full3d, steps: 2"));
        assert!(text.contains("init -> intro"));
        assert!(text.contains("key:39 consumed=true | active=detail"));
    }
}
