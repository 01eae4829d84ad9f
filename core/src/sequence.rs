//! The emergency sequence: a fixed series of delayed steps run once per
//! trigger. For each checkpoint in order: alert the officers, notify
//! drivers, then preempt the signal.
//!
//! With the default spacing:
//!
//!   A  alert 1000 ms, notify 1500 ms, preempt 2000 ms
//!   B  alert 3000 ms, notify 3500 ms, preempt 4000 ms
//!   C  alert 5000 ms, notify 5500 ms, preempt 6000 ms

use crate::{config::SequenceConfig, signal::Checkpoint, types::Millis};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "checkpoint", rename_all = "snake_case")]
pub enum SequenceAction {
    OfficerAlert(Checkpoint),
    DriverNotification(Checkpoint),
    PreemptSignal(Checkpoint),
}

impl SequenceAction {
    pub fn checkpoint(&self) -> Checkpoint {
        match self {
            Self::OfficerAlert(cp)
            | Self::DriverNotification(cp)
            | Self::PreemptSignal(cp) => *cp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceStep {
    /// Delay after the trigger instant.
    pub offset_ms: Millis,
    pub action:    SequenceAction,
}

pub fn emergency_sequence(config: &SequenceConfig) -> Vec<SequenceStep> {
    Checkpoint::ALL
        .iter()
        .enumerate()
        .flat_map(|(i, cp)| {
            let base = config.first_step_ms + i as Millis * config.checkpoint_spacing_ms;
            [
                SequenceAction::OfficerAlert(*cp),
                SequenceAction::DriverNotification(*cp),
                SequenceAction::PreemptSignal(*cp),
            ]
            .into_iter()
            .enumerate()
            .map(move |(j, action)| SequenceStep {
                offset_ms: base + j as Millis * config.step_spacing_ms,
                action,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sequence_matches_schedule() {
        let steps = emergency_sequence(&SequenceConfig::default());
        let offsets: Vec<Millis> = steps.iter().map(|s| s.offset_ms).collect();
        assert_eq!(offsets, vec![1000, 1500, 2000, 3000, 3500, 4000, 5000, 5500, 6000]);
        assert_eq!(steps[0].action, SequenceAction::OfficerAlert(Checkpoint::A));
        assert_eq!(steps[4].action, SequenceAction::DriverNotification(Checkpoint::B));
        assert_eq!(steps[8].action, SequenceAction::PreemptSignal(Checkpoint::C));
    }
}
