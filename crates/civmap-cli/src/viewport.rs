//! A map stand-in that records positioning commands instead of rendering.

use civmap_core::{MapViewport, ViewportCommand};

#[derive(Debug, Default)]
pub(crate) struct TerminalViewport {
    animated: bool,
    last: Option<ViewportCommand>,
}

impl TerminalViewport {
    pub(crate) fn new(animated: bool) -> Self {
        Self {
            animated,
            last: None,
        }
    }

    /// The most recent command; earlier ones are overwritten.
    pub(crate) fn last_command(&self) -> Option<&ViewportCommand> {
        self.last.as_ref()
    }
}

impl MapViewport for TerminalViewport {
    fn supports_animation(&self) -> bool {
        self.animated
    }

    fn set_viewport(&mut self, command: &ViewportCommand) {
        self.last = Some(*command);
    }
}

/// One-line rendering of a positioning command.
pub(crate) fn describe(command: &ViewportCommand) -> String {
    match command.animation {
        Some(fly) => format!(
            "fly to {} at zoom {} over {} ms (ease linearity {})",
            command.center,
            command.zoom,
            fly.duration.as_millis(),
            fly.ease_linearity
        ),
        None => format!("snap to {} at zoom {}", command.center, command.zoom),
    }
}
