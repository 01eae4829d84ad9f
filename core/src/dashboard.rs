//! Text projection of engine state.
//!
//! Everything here is a pure function of its inputs: no engine access,
//! no side effects. The runner prints these, the IPC loop serializes them.

use crate::{
    alert::{AlertLog, AlertStatus},
    analytics::Analytics,
    signal::SignalBoard,
    simulator::SimulationState,
};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusPanel {
    pub emergency_status:  String,
    pub current_speed:     String,
    pub max_speed:         String,
    pub distance_traveled: String,
    pub eta:               String,
    pub eta_destination:   String,
    pub severity_code:     String,
    pub route_progress:    String,
    pub phase:             String,
    /// Map marker position, percent of the one-way route.
    pub marker_position:   u32,
}

impl StatusPanel {
    pub fn render(state: &SimulationState, severity_code: &str) -> Self {
        Self {
            emergency_status:  if state.active { "Active" } else { "Inactive" }.into(),
            current_speed:     format!("{:.1} km/h", state.speed_kmh),
            max_speed:         format!("{:.1} km/h", state.max_speed_kmh),
            distance_traveled: format!("{:.1} km", state.distance_km),
            eta:               state.eta_return.to_string(),
            eta_destination:   state.eta_outbound.to_string(),
            severity_code:     severity_code.to_string(),
            route_progress:    format!("{}%", state.progress),
            phase:             state.phase.label().to_string(),
            marker_position:   state.marker_position(),
        }
    }
}

impl fmt::Display for StatusPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  status:      {}", self.emergency_status)?;
        writeln!(f, "  phase:       {}", self.phase)?;
        writeln!(f, "  progress:    {}", self.route_progress)?;
        writeln!(f, "  speed:       {} (max {})", self.current_speed, self.max_speed)?;
        writeln!(f, "  distance:    {}", self.distance_traveled)?;
        writeln!(f, "  eta scene:   {}", self.eta_destination)?;
        writeln!(f, "  eta home:    {}", self.eta)?;
        write!(f, "  severity:    {}", self.severity_code)
    }
}

pub fn signal_lines(board: &SignalBoard) -> Vec<String> {
    board
        .iter()
        .map(|(cp, s)| format!("Junction {cp}: {}", s.status.label()))
        .collect()
}

pub fn alert_lines(log: &AlertLog) -> Vec<String> {
    if log.alerts().is_empty() {
        return vec!["No active alerts".into()];
    }
    log.alerts()
        .iter()
        .map(|a| {
            let state = match a.status {
                AlertStatus::Pending      => "pending",
                AlertStatus::Acknowledged => "acknowledged",
            };
            format!(
                "[{}] Junction {}: {} ({state})",
                a.timestamp.format("%H:%M:%S"),
                a.intersection,
                a.message
            )
        })
        .collect()
}

pub fn notification_lines(log: &AlertLog) -> Vec<String> {
    if log.notifications().is_empty() {
        return vec!["No active notifications".into()];
    }
    log.notifications()
        .iter()
        .map(|n| {
            format!(
                "[{}] Driver Alert - Junction {}: {}",
                n.timestamp.format("%H:%M:%S"),
                n.intersection,
                n.message
            )
        })
        .collect()
}

pub fn analytics_lines(analytics: &Analytics) -> Vec<String> {
    vec![
        format!("Response time: {} min", analytics.response_time),
        format!("Route efficiency: {}%", analytics.route_efficiency),
        format!("Success rate: {}%", analytics.success_rate),
        format!("Officer response: {} min", analytics.officer_response),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        alert::OfficerAlert,
        signal::Checkpoint,
        simulator::{Eta, Phase},
    };
    use chrono::{TimeZone, Utc};

    #[test]
    fn idle_panel() {
        let panel = StatusPanel::render(&SimulationState::default(), "--");
        assert_eq!(panel.emergency_status, "Inactive");
        assert_eq!(panel.current_speed, "0.0 km/h");
        assert_eq!(panel.eta, "--:--");
        assert_eq!(panel.route_progress, "0%");
        assert_eq!(panel.phase, "Standby");
    }

    #[test]
    fn returning_panel() {
        let state = SimulationState {
            active:        true,
            progress:      80,
            phase:         Phase::Returning,
            speed_kmh:     63.24,
            max_speed_kmh: 74.91,
            distance_km:   10.88,
            eta_outbound:  Eta::ARRIVED,
            eta_return:    Eta::minutes(20),
        };
        let panel = StatusPanel::render(&state, "P1");
        assert_eq!(panel.emergency_status, "Active");
        assert_eq!(panel.current_speed, "63.2 km/h");
        assert_eq!(panel.max_speed, "74.9 km/h");
        assert_eq!(panel.distance_traveled, "10.9 km");
        assert_eq!(panel.eta, "0:20");
        assert_eq!(panel.eta_destination, "0:00");
        assert_eq!(panel.phase, "Returning to Hospital");
        assert_eq!(panel.marker_position, 20);
    }

    #[test]
    fn empty_lists_show_placeholders() {
        let log = AlertLog::new();
        assert_eq!(alert_lines(&log), vec!["No active alerts".to_string()]);
        assert_eq!(notification_lines(&log), vec!["No active notifications".to_string()]);
    }

    #[test]
    fn alert_line_shows_time_and_state() {
        let mut log = AlertLog::new();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 14, 3, 22).unwrap();
        log.push_alert(OfficerAlert::new(1, Checkpoint::A, at));
        let lines = alert_lines(&log);
        assert!(lines[0].starts_with("[14:03:22] Junction A:"), "{}", lines[0]);
        assert!(lines[0].ends_with("(pending)"));
    }

    #[test]
    fn signal_lines_cover_all_checkpoints() {
        let mut board = SignalBoard::new();
        board.preempt(Checkpoint::B);
        assert_eq!(
            signal_lines(&board),
            vec!["Junction A: Normal", "Junction B: Preempted", "Junction C: Normal"]
        );
    }
}
