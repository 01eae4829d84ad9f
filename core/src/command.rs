use crate::{backend::ContactForm, event::ChannelEvent, types::EntityId};
use serde::{Deserialize, Serialize};

/// All operator-issued commands.
/// Variants are appended. Never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum OperatorCommand {
    // ── Clock control ─────────────────────────────
    Pause,
    Resume,
    SetSpeed { speed: crate::clock::SimSpeed },

    // ── Emergency control ─────────────────────────
    Trigger,
    /// The demo button: reset when active, trigger otherwise.
    Toggle,
    Reset,

    // ── Alerts and contact ────────────────────────
    AcknowledgeAlert { alert_id: EntityId },
    SubmitContact { form: ContactForm },
}

/// What executing a command produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommandOutcome {
    pub events:  Vec<ChannelEvent>,
    /// User-facing message, for commands that have one.
    pub message: Option<String>,
}

impl CommandOutcome {
    pub fn events(events: Vec<ChannelEvent>) -> Self {
        Self { events, message: None }
    }
}
