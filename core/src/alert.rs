//! Officer alerts and driver notifications.
//!
//! Both lists are append-only. Entries are never removed one at a time;
//! an alert can only be marked acknowledged by id match, and reset
//! clears both lists wholesale.

use crate::{
    error::{SimError, SimResult},
    signal::Checkpoint,
    timestamp,
    types::EntityId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Pending,
    Acknowledged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficerAlert {
    pub id:           EntityId,
    pub intersection: Checkpoint,
    pub message:      String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp:    DateTime<Utc>,
    pub status:       AlertStatus,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "timestamp::deserialize_option"
    )]
    pub acknowledged_at: Option<DateTime<Utc>>,
}

impl OfficerAlert {
    pub fn new(id: EntityId, intersection: Checkpoint, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            intersection,
            message: format!(
                "Ambulance approaching Junction {intersection} - Clear left lanes and hold cross traffic"
            ),
            timestamp,
            status: AlertStatus::Pending,
            acknowledged_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == AlertStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverNotification {
    pub id:           EntityId,
    pub intersection: Checkpoint,
    pub message:      String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp:    DateTime<Utc>,
    #[serde(rename = "type", default = "driver_kind")]
    pub kind:         String,
}

fn driver_kind() -> String {
    "driver".into()
}

impl DriverNotification {
    pub fn new(id: EntityId, intersection: Checkpoint, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            intersection,
            message: format!(
                "Emergency vehicle approaching Junction {intersection} - Move left when safe. ETA 2 minutes"
            ),
            timestamp,
            kind: driver_kind(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertLog {
    alerts:        Vec<OfficerAlert>,
    notifications: Vec<DriverNotification>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> &[OfficerAlert] {
        &self.alerts
    }

    pub fn notifications(&self) -> &[DriverNotification] {
        &self.notifications
    }

    pub fn push_alert(&mut self, alert: OfficerAlert) {
        self.alerts.push(alert);
    }

    pub fn push_notification(&mut self, notification: DriverNotification) {
        self.notifications.push(notification);
    }

    /// Mark the first alert carrying `id` as acknowledged.
    pub fn acknowledge(&mut self, id: EntityId, at: DateTime<Utc>) -> SimResult<&OfficerAlert> {
        let alert = self
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(SimError::AlertNotFound { id })?;
        alert.status = AlertStatus::Acknowledged;
        alert.acknowledged_at = Some(at);
        Ok(alert)
    }

    pub fn pending_count(&self) -> usize {
        self.alerts.iter().filter(|a| a.is_pending()).count()
    }

    /// Overwrite both lists with a remote snapshot.
    pub fn replace(&mut self, alerts: Vec<OfficerAlert>, notifications: Vec<DriverNotification>) {
        self.alerts = alerts;
        self.notifications = notifications;
    }

    pub fn clear(&mut self) {
        self.alerts.clear();
        self.notifications.clear();
    }
}
