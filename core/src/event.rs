//! The channel event vocabulary and the in-memory event log.
//!
//! RULE: Everything the engine publishes is a ChannelEvent, and every
//! published or consumed event is appended to the EventLog in order.
//!
//! Wire shape is `{"event": "<name>", "data": <payload>}`.

use crate::{
    alert::{DriverNotification, OfficerAlert},
    analytics::Analytics,
    error::SimResult,
    signal::SignalStatus,
    simulator::SimulationState,
    snapshot::SystemStatus,
    timestamp,
    types::{EntityId, Millis},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every event published or consumed on the live-update channel.
/// Variants are appended. Never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ChannelEvent {
    // ── Connection ─────────────────────────────────
    Connected {
        message: String,
    },

    // ── Whole-status broadcasts ────────────────────
    StatusUpdate(SystemStatus),
    EmergencyTriggered(SystemStatus),
    EmergencyReset(SystemStatus),
    EmergencyComplete(SystemStatus),

    // ── Sequence output ────────────────────────────
    NewAlert(OfficerAlert),
    NewNotification(DriverNotification),
    SignalPreempted {
        signal_id: String,
        status:    SignalStatus,
        #[serde(default, deserialize_with = "timestamp::deserialize_option")]
        timestamp: Option<DateTime<Utc>>,
    },
    AlertAcknowledged {
        alert_id:  EntityId,
        #[serde(default, deserialize_with = "timestamp::deserialize_option")]
        timestamp: Option<DateTime<Utc>>,
    },

    // ── Live telemetry ─────────────────────────────
    AmbulancePositionUpdate {
        position: u32,
        speed:    f64,
    },
    AnalyticsUpdate(Analytics),

    // ── Engine-local timers ────────────────────────
    ClockTick {
        time: String,
    },
    SimulationTick(SimulationState),
}

impl ChannelEvent {
    /// Stable wire name of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. }               => "connected",
            Self::StatusUpdate(_)                => "status_update",
            Self::EmergencyTriggered(_)          => "emergency_triggered",
            Self::EmergencyReset(_)              => "emergency_reset",
            Self::EmergencyComplete(_)           => "emergency_complete",
            Self::NewAlert(_)                    => "new_alert",
            Self::NewNotification(_)             => "new_notification",
            Self::SignalPreempted { .. }         => "signal_preempted",
            Self::AlertAcknowledged { .. }       => "alert_acknowledged",
            Self::AmbulancePositionUpdate { .. } => "ambulance_position_update",
            Self::AnalyticsUpdate(_)             => "analytics_update",
            Self::ClockTick { .. }               => "clock_tick",
            Self::SimulationTick(_)              => "simulation_tick",
        }
    }
}

/// One entry in the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub seq:        u64,
    pub at_ms:      Millis,
    pub source:     String,
    pub event_type: String,
    pub payload:    String, // JSON-serialized ChannelEvent
}

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<EventLogEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, at_ms: Millis, source: &str, event: &ChannelEvent) -> SimResult<()> {
        let entry = EventLogEntry {
            seq:        self.entries.len() as u64,
            at_ms,
            source:     source.to_string(),
            event_type: event.name().to_string(),
            payload:    serde_json::to_string(event)?,
        };
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[EventLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries with `from_ms <= at_ms < to_ms`.
    pub fn between(&self, from_ms: Millis, to_ms: Millis) -> impl Iterator<Item = &EventLogEntry> {
        self.entries
            .iter()
            .filter(move |e| e.at_ms >= from_ms && e.at_ms < to_ms)
    }

    pub fn count_of(&self, event_type: &str) -> usize {
        self.entries.iter().filter(|e| e.event_type == event_type).count()
    }
}
