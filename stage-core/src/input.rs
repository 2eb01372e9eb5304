//! Keyboard navigation.

use serde::{Deserialize, Serialize};

/// Direction of a keyboard-driven step change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Navigation {
    /// Go to the next step.
    Next,
    /// Go to the previous step.
    Prev,
}

impl Navigation {
    /// Map a legacy `keyCode`.
    ///
    /// Tab, Space, Page Down, Right and Down go forward; Page Up, Left and
    /// Up go back. Every other key is left to the host.
    #[must_use]
    pub fn from_key_code(code: u32) -> Option<Self> {
        match code {
            9 | 32 | 34 | 39 | 40 => Some(Self::Next),
            33 | 37 | 38 => Some(Self::Prev),
            _ => None,
        }
    }

    /// Map a `KeyboardEvent.key` name.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Tab" | " " | "Spacebar" | "PageDown" | "ArrowRight" | "ArrowDown" => Some(Self::Next),
            "PageUp" | "ArrowLeft" | "ArrowUp" => Some(Self::Prev),
            _ => None,
        }
    }
}
