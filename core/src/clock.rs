//! Simulation clock: virtual milliseconds anchored to a wall-clock
//! instant, plus speed control and pause.

use crate::{
    error::{SimError, SimResult},
    types::{EntityId, Millis},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub started_at: DateTime<Utc>,
    pub now_ms:     Millis,
    pub speed:      SimSpeed,
    pub paused:     bool,
}

impl SimClock {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            now_ms: 0,
            speed: SimSpeed::Normal,
            paused: false,
        }
    }

    /// Move the clock forward to `at`. Never moves backwards.
    pub fn advance_to(&mut self, at: Millis) -> Millis {
        self.now_ms = self.now_ms.max(at);
        self.now_ms
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    pub fn set_speed(&mut self, speed: SimSpeed) {
        self.speed = speed;
    }

    /// Virtual milliseconds that pass per real millisecond when the
    /// runner paces itself against the wall clock.
    pub fn time_scale(&self) -> u64 {
        match self.speed {
            SimSpeed::Normal      => 1,
            SimSpeed::Accelerated => 5,
            SimSpeed::FastForward => 20,
        }
    }

    /// Current wall-clock instant of the simulation.
    pub fn now(&self) -> DateTime<Utc> {
        self.started_at + Duration::milliseconds(self.now_ms as i64)
    }

    /// Integer millisecond timestamp, used as a pseudo-id.
    pub fn stamp_id(&self) -> EntityId {
        self.now().timestamp_millis().max(0) as EntityId
    }

    /// `HH:MM`, 24-hour.
    pub fn display_time(&self) -> String {
        self.now().format("%H:%M").to_string()
    }

    /// `HH:MM:SS`, 24-hour.
    pub fn live_clock(&self) -> String {
        self.now().format("%H:%M:%S").to_string()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SimSpeed {
    Normal,       // real time
    Accelerated,  // 5x
    FastForward,  // 20x
}

impl FromStr for SimSpeed {
    type Err = SimError;

    fn from_str(s: &str) -> SimResult<Self> {
        match s.trim() {
            "normal" | "1x"       => Ok(Self::Normal),
            "accelerated" | "5x"  => Ok(Self::Accelerated),
            "fast_forward" | "20x" => Ok(Self::FastForward),
            other => Err(anyhow::anyhow!("unknown clock speed '{other}'").into()),
        }
    }
}
