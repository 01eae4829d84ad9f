//! The whole-status snapshot broadcast as `status_update` and friends.
//!
//! Every field defaults when missing so a partial remote payload can be
//! applied as-is.

use crate::{
    alert::{DriverNotification, OfficerAlert},
    analytics::Analytics,
    signal::SignalBoard,
    simulator::Eta,
};
use serde::{Deserialize, Serialize};

/// Severity code shown while no emergency is running.
pub const SEVERITY_NONE: &str = "--";

/// Severity code assigned to a triggered emergency.
pub const SEVERITY_ACTIVE: &str = "P1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemStatus {
    pub emergency_active:   bool,
    /// Position reported by the backend, if any.
    pub ambulance_position: Option<u32>,
    pub route_progress:     u32,
    pub current_speed:      f64,
    pub eta:                Eta,
    pub severity_code:      String,
    pub alerts:             Vec<OfficerAlert>,
    pub notifications:      Vec<DriverNotification>,
    pub traffic_signals:    SignalBoard,
    pub analytics:          Analytics,
}

impl Default for SystemStatus {
    fn default() -> Self {
        Self {
            emergency_active:   false,
            ambulance_position: None,
            route_progress:     0,
            current_speed:      0.0,
            eta:                Eta::UNKNOWN,
            severity_code:      SEVERITY_NONE.into(),
            alerts:             Vec::new(),
            notifications:      Vec::new(),
            traffic_signals:    SignalBoard::new(),
            analytics:          Analytics::default(),
        }
    }
}
