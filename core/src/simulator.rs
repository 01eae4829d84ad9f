//! Emergency progress simulator.
//!
//! A single route-progress scalar (percent of the round trip) drives
//! everything else: phase, speed, distance and both ETAs are derived
//! from it on every tick.
//!
//!   progress  0 ..  50   outbound, hospital -> incident
//!   progress 50 .. 100   returning, incident -> hospital
//!   progress       100   mission complete
//!
//! RULES:
//!   - `tick()` is a pure function of the current state, the route
//!     config and the caller's RNG stream. It returns a new state.
//!   - Progress only increases while active.
//!   - `max_speed_kmh` never decreases while active.
//!   - Reset clears every derived field back to `Default`.

use crate::{config::RouteConfig, rng::SubsystemRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress at which the ambulance reaches the incident and turns around.
pub const TURNAROUND_PROGRESS: u32 = 50;

/// Progress at which the round trip is complete.
pub const COMPLETE_PROGRESS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Standby,
    Outbound,
    Returning,
    Complete,
}

impl Phase {
    /// Phase is never stored independently of progress; it is always
    /// recomputed from `(active, progress)`.
    pub fn derive(active: bool, progress: u32) -> Self {
        if !active {
            Self::Standby
        } else if progress >= COMPLETE_PROGRESS {
            Self::Complete
        } else if progress >= TURNAROUND_PROGRESS {
            Self::Returning
        } else {
            Self::Outbound
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Standby   => "Standby",
            Self::Outbound  => "Going to Emergency",
            Self::Returning => "Returning to Hospital",
            Self::Complete  => "Mission Complete",
        }
    }
}

/// Remaining time to a waypoint, or unknown.
///
/// Renders as `M:SS` where the stored value is split as
/// `floor(v / 60) : v % 60`, or `--:--` when unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Eta(Option<u32>);

impl Eta {
    pub const UNKNOWN: Eta = Eta(None);
    pub const ARRIVED: Eta = Eta(Some(0));

    pub fn minutes(minutes: u32) -> Self {
        Eta(Some(minutes))
    }

    /// `round(remaining / step * minutes_per_step)`.
    ///
    /// With the default route (step 2, 2 minutes per step) this is
    /// numerically `remaining`; the division and multiplication are
    /// kept so other step sizes scale the same way.
    pub fn from_remaining(remaining: u32, route: &RouteConfig) -> Self {
        let steps = remaining as f64 / route.progress_step as f64;
        Eta(Some((steps * route.minutes_per_step).round().max(0.0) as u32))
    }

    pub fn value(&self) -> Option<u32> {
        self.0
    }

    pub fn is_known(&self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Display for Eta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(m) => write!(f, "{}:{:02}", m / 60, m % 60),
            None    => f.write_str("--:--"),
        }
    }
}

impl From<Eta> for String {
    fn from(eta: Eta) -> Self {
        eta.to_string()
    }
}

impl TryFrom<String> for Eta {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let s = s.trim();
        if s == "--:--" || s.is_empty() {
            return Ok(Eta::UNKNOWN);
        }
        let (major, minor) = s
            .split_once(':')
            .ok_or_else(|| format!("ETA '{s}' is not M:SS"))?;
        let major: u32 = major.parse().map_err(|_| format!("ETA '{s}' is not M:SS"))?;
        let minor: u32 = minor.parse().map_err(|_| format!("ETA '{s}' is not M:SS"))?;
        if minor >= 60 {
            return Err(format!("ETA '{s}' has seconds >= 60"));
        }
        Ok(Eta(Some(major * 60 + minor)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub active:        bool,
    pub progress:      u32,
    pub phase:         Phase,
    pub speed_kmh:     f64,
    pub max_speed_kmh: f64,
    pub distance_km:   f64,
    pub eta_outbound:  Eta,
    pub eta_return:    Eta,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            active:        false,
            progress:      0,
            phase:         Phase::Standby,
            speed_kmh:     0.0,
            max_speed_kmh: 0.0,
            distance_km:   0.0,
            eta_outbound:  Eta::UNKNOWN,
            eta_return:    Eta::UNKNOWN,
        }
    }
}

impl SimulationState {
    /// Back to standby with every derived field cleared.
    pub fn reset() -> Self {
        Self::default()
    }

    /// Start a mission from the current progress.
    pub fn activate(&self) -> Self {
        let mut next = self.clone();
        next.set_active(true);
        next
    }

    /// Flip the active flag without touching progress.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        self.phase = Phase::derive(active, self.progress);
    }

    /// Overwrite the current speed, keeping the running maximum.
    pub fn record_speed(&mut self, speed_kmh: f64) {
        self.speed_kmh = speed_kmh;
        self.max_speed_kmh = self.max_speed_kmh.max(speed_kmh);
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Position of the map marker in percent of the one-way route:
    /// climbs to 50 on the way out, falls back to 0 on the way home.
    pub fn marker_position(&self) -> u32 {
        if self.progress > TURNAROUND_PROGRESS {
            COMPLETE_PROGRESS.saturating_sub(self.progress)
        } else {
            self.progress
        }
    }

    /// Advance one simulator interval.
    ///
    /// Inactive and completed states are returned unchanged.
    pub fn tick(&self, route: &RouteConfig, rng: &mut SubsystemRng) -> Self {
        if !self.active {
            return self.clone();
        }
        if self.progress >= COMPLETE_PROGRESS {
            return self.completed(route);
        }

        let progress = (self.progress + route.progress_step).min(COMPLETE_PROGRESS);
        let mut next = self.clone();
        next.progress = progress;
        next.phase = Phase::derive(true, progress);

        match next.phase {
            Phase::Outbound => {
                next.record_speed(route.outbound_speed.sample(rng));
                next.distance_km = progress as f64 / 100.0 * route.outbound_km;
                next.eta_outbound = Eta::from_remaining(TURNAROUND_PROGRESS - progress, route);
            }
            Phase::Returning => {
                next.record_speed(route.return_speed.sample(rng));
                let back = (progress - TURNAROUND_PROGRESS) as f64 / TURNAROUND_PROGRESS as f64;
                next.distance_km = route.outbound_km + back * route.outbound_km;
                next.eta_outbound = Eta::ARRIVED;
                next.eta_return = Eta::from_remaining(COMPLETE_PROGRESS - progress, route);
            }
            Phase::Complete | Phase::Standby => return next.completed(route),
        }
        next
    }

    fn completed(&self, route: &RouteConfig) -> Self {
        Self {
            active:        self.active,
            progress:      COMPLETE_PROGRESS,
            phase:         Phase::Complete,
            speed_kmh:     0.0,
            max_speed_kmh: self.max_speed_kmh,
            distance_km:   route.round_trip_km(),
            eta_outbound:  Eta::ARRIVED,
            eta_return:    Eta::ARRIVED,
        }
    }
}
