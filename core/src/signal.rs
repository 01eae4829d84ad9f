//! Traffic signals at the three named checkpoints and the random
//! preemption heuristic.
//!
//! Preemption here is presentation state only: which checkpoint gets
//! forced to a pass state is drawn at random, with no coupling to the
//! ambulance's progress.

use crate::{
    error::{SimError, SimResult},
    rng::SubsystemRng,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Checkpoint {
    A,
    B,
    C,
}

impl Checkpoint {
    pub const ALL: [Checkpoint; 3] = [Checkpoint::A, Checkpoint::B, Checkpoint::C];

    pub fn id(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Checkpoint {
    type Err = SimError;

    fn from_str(s: &str) -> SimResult<Self> {
        match s.trim() {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            "C" | "c" => Ok(Self::C),
            other => Err(SimError::UnknownCheckpoint { id: other.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    Normal,
    Preempted,
}

impl SignalStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal    => "Normal",
            Self::Preempted => "Preempted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalState {
    pub status:    SignalStatus,
    pub preempted: bool,
}

impl Default for SignalState {
    fn default() -> Self {
        Self { status: SignalStatus::Normal, preempted: false }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalBoard {
    signals: BTreeMap<Checkpoint, SignalState>,
}

impl Default for SignalBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalBoard {
    pub fn new() -> Self {
        Self {
            signals: Checkpoint::ALL
                .iter()
                .map(|cp| (*cp, SignalState::default()))
                .collect(),
        }
    }

    pub fn state(&self, checkpoint: Checkpoint) -> SignalState {
        self.signals.get(&checkpoint).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Checkpoint, SignalState)> + '_ {
        self.signals.iter().map(|(cp, s)| (*cp, *s))
    }

    /// Force a checkpoint to its pass state.
    /// Returns true if the signal was not already preempted.
    pub fn preempt(&mut self, checkpoint: Checkpoint) -> bool {
        let signal = self.signals.entry(checkpoint).or_default();
        let changed = !signal.preempted;
        signal.status = SignalStatus::Preempted;
        signal.preempted = true;
        changed
    }

    pub fn reset(&mut self) {
        for signal in self.signals.values_mut() {
            *signal = SignalState::default();
        }
    }

    pub fn preempted_count(&self) -> usize {
        self.signals.values().filter(|s| s.preempted).count()
    }

    pub fn all_preempted(&self) -> bool {
        self.preempted_count() == Checkpoint::ALL.len()
    }

    /// One roll of the heuristic: with `probability`, pick a checkpoint
    /// uniformly and preempt it. Returns the checkpoint only when its
    /// state actually changed.
    pub fn roll_preemption(
        &mut self,
        rng: &mut SubsystemRng,
        probability: f64,
    ) -> Option<Checkpoint> {
        if !rng.chance(probability) {
            return None;
        }
        let idx = rng.next_u64_below(Checkpoint::ALL.len() as u64) as usize;
        let checkpoint = Checkpoint::ALL[idx];
        if self.preempt(checkpoint) {
            Some(checkpoint)
        } else {
            log::trace!("signals: checkpoint {checkpoint} already preempted");
            None
        }
    }
}
