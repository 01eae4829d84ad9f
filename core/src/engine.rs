//! The demo engine: the single state object every handler works on.
//!
//! TIMERS (registered at construction; when due together they fire in
//! this order, never reordered):
//!   1. Clock refresh      every 1 s
//!   2. Simulator tick     every 2 s, no-op unless an emergency is active
//!   3. Analytics refresh  every 30 s
//! Sequence steps are one-shot timers, scheduled on trigger and
//! cancelled on reset.
//!
//! RULES:
//!   - No ambient globals: config, seed, start instant and backend are
//!     injected at construction.
//!   - All randomness flows through the RngBank.
//!   - Every published or consumed event is recorded in the event log.
//!   - A failed backend call is logged and leaves state unchanged.

use crate::{
    alert::{AlertLog, DriverNotification, OfficerAlert},
    analytics::Analytics,
    backend::{self, Backend, ContactForm, OfflineBackend, CONTACT_ERROR_MESSAGE},
    clock::SimClock,
    command::{CommandOutcome, OperatorCommand},
    config::DemoConfig,
    dashboard::StatusPanel,
    error::{SimError, SimResult},
    event::{ChannelEvent, EventLog},
    rng::{RngBank, SubsystemSlot},
    scheduler::{Scheduler, TimerKind},
    sequence::{emergency_sequence, SequenceAction},
    signal::{Checkpoint, SignalBoard, SignalStatus},
    simulator::SimulationState,
    snapshot::{SystemStatus, SEVERITY_ACTIVE, SEVERITY_NONE},
    types::{EntityId, Millis, RunId, Tick},
};
use chrono::{DateTime, Utc};

/// Longest span a single `advance` call covers. Larger requests are
/// clamped so one call fires a bounded number of timers.
pub const MAX_ADVANCE_MS: Millis = 24 * 60 * 60 * 1000;

pub struct DemoEngine {
    pub run_id:        RunId,
    pub clock:         SimClock,
    pub rng_bank:      RngBank,
    config:            DemoConfig,
    scheduler:         Scheduler,
    simulation:        SimulationState,
    signals:           SignalBoard,
    alerts:            AlertLog,
    analytics:         Analytics,
    severity_code:     String,
    reported_position: Option<u32>,
    sim_ticks:         Tick,
    analytics_ticks:   Tick,
    backend:           Box<dyn Backend>,
    log:               EventLog,
}

impl DemoEngine {
    pub fn new(
        run_id: RunId,
        seed: u64,
        started_at: DateTime<Utc>,
        config: DemoConfig,
        backend: Box<dyn Backend>,
    ) -> Self {
        let mut scheduler = Scheduler::new();
        let t = &config.timers;
        // Registration order is the tie-break order. Do not reorder.
        scheduler.every(t.clock_refresh_ms, t.clock_refresh_ms, TimerKind::ClockRefresh);
        scheduler.every(t.simulator_tick_ms, t.simulator_tick_ms, TimerKind::SimulatorTick);
        scheduler.every(t.analytics_refresh_ms, t.analytics_refresh_ms, TimerKind::AnalyticsRefresh);

        Self {
            run_id,
            clock: SimClock::new(started_at),
            rng_bank: RngBank::new(seed),
            config,
            scheduler,
            simulation: SimulationState::default(),
            signals: SignalBoard::new(),
            alerts: AlertLog::new(),
            analytics: Analytics::default(),
            severity_code: SEVERITY_NONE.into(),
            reported_position: None,
            sim_ticks: 0,
            analytics_ticks: 0,
            backend,
            log: EventLog::new(),
        }
    }

    /// Default config, no backend. Used by tests and the headless runner.
    pub fn offline(run_id: RunId, seed: u64, started_at: DateTime<Utc>) -> Self {
        Self::new(run_id, seed, started_at, DemoConfig::default(), Box::new(OfflineBackend))
    }

    // ── Read access ────────────────────────────────────────────

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    pub fn simulation(&self) -> &SimulationState {
        &self.simulation
    }

    pub fn signals(&self) -> &SignalBoard {
        &self.signals
    }

    pub fn alerts(&self) -> &AlertLog {
        &self.alerts
    }

    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }

    pub fn severity_code(&self) -> &str {
        &self.severity_code
    }

    pub fn reported_position(&self) -> Option<u32> {
        self.reported_position
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Sequence steps scheduled but not yet fired.
    pub fn pending_sequence_steps(&self) -> usize {
        self.scheduler.pending(|k| matches!(k, TimerKind::Sequence(_)))
    }

    pub fn status(&self) -> SystemStatus {
        SystemStatus {
            emergency_active:   self.simulation.active,
            ambulance_position: self.reported_position,
            route_progress:     self.simulation.progress,
            current_speed:      self.simulation.speed_kmh,
            eta:                self.simulation.eta_return,
            severity_code:      self.severity_code.clone(),
            alerts:             self.alerts.alerts().to_vec(),
            notifications:      self.alerts.notifications().to_vec(),
            traffic_signals:    self.signals.clone(),
            analytics:          self.analytics.clone(),
        }
    }

    pub fn panel(&self) -> StatusPanel {
        StatusPanel::render(&self.simulation, &self.severity_code)
    }

    // ── Operations ─────────────────────────────────────────────

    /// Greet a new subscriber: `connected`, then a full `status_update`.
    pub fn connect(&mut self) -> SimResult<Vec<ChannelEvent>> {
        let mut out = Vec::new();
        self.publish(
            "engine",
            ChannelEvent::Connected { message: "Connected to ClearPath system".into() },
            &mut out,
        )?;
        let status = self.status();
        self.publish("engine", ChannelEvent::StatusUpdate(status), &mut out)?;
        Ok(out)
    }

    pub fn trigger(&mut self) -> SimResult<Vec<ChannelEvent>> {
        if self.simulation.active {
            return Err(SimError::EmergencyAlreadyActive);
        }
        let response = self.backend.trigger_emergency();
        if backend::settle("trigger emergency", response).is_none() {
            return Ok(Vec::new());
        }

        self.simulation = self.simulation.activate();
        self.severity_code = SEVERITY_ACTIVE.into();

        let now = self.clock.now_ms;
        for step in emergency_sequence(&self.config.sequence) {
            self.scheduler.once(now.saturating_add(step.offset_ms), TimerKind::Sequence(step.action));
        }
        log::info!(
            "t={now}ms engine: emergency triggered via {} backend",
            self.backend.name()
        );

        let mut out = Vec::new();
        let status = self.status();
        self.publish("engine", ChannelEvent::EmergencyTriggered(status), &mut out)?;
        Ok(out)
    }

    /// The demo button: stop a running emergency, or start one.
    pub fn toggle(&mut self) -> SimResult<Vec<ChannelEvent>> {
        if self.simulation.active {
            self.reset()
        } else {
            self.trigger()
        }
    }

    pub fn reset(&mut self) -> SimResult<Vec<ChannelEvent>> {
        let response = self.backend.reset_emergency();
        if backend::settle("reset emergency", response).is_none() {
            return Ok(Vec::new());
        }

        self.clear_mission();

        let mut out = Vec::new();
        let status = self.status();
        self.publish("engine", ChannelEvent::EmergencyReset(status), &mut out)?;
        Ok(out)
    }

    pub fn acknowledge_alert(&mut self, alert_id: EntityId) -> SimResult<Vec<ChannelEvent>> {
        let response = self.backend.acknowledge_alert(alert_id);
        if backend::settle("acknowledge alert", response).is_none() {
            return Ok(Vec::new());
        }

        let now = self.clock.now();
        if let Err(e) = self.alerts.acknowledge(alert_id, now) {
            log::warn!("engine: backend acknowledged alert but {e}");
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        self.publish(
            "engine",
            ChannelEvent::AlertAcknowledged { alert_id, timestamp: Some(now) },
            &mut out,
        )?;
        Ok(out)
    }

    /// Returns the message to show the user.
    pub fn submit_contact(&mut self, form: &ContactForm) -> String {
        let response = self.backend.submit_contact(form);
        match backend::settle("submit contact form", response) {
            Some(response) => response.message.unwrap_or_default(),
            None => CONTACT_ERROR_MESSAGE.into(),
        }
    }

    /// Move virtual time forward by `ms`, firing every timer that comes
    /// due along the way. Returns everything published.
    pub fn advance(&mut self, ms: Millis) -> SimResult<Vec<ChannelEvent>> {
        if self.clock.paused {
            log::debug!("engine: advance({ms}) ignored while paused");
            return Ok(Vec::new());
        }
        if ms > MAX_ADVANCE_MS {
            log::warn!("engine: advance({ms}) clamped to {MAX_ADVANCE_MS} ms");
        }
        let target = self.clock.now_ms.saturating_add(ms.min(MAX_ADVANCE_MS));
        let mut out = Vec::new();
        while let Some((at, kind)) = self.scheduler.pop_due(target) {
            self.clock.advance_to(at);
            self.fire(kind, &mut out)?;
        }
        self.clock.advance_to(target);
        Ok(out)
    }

    /// Apply an event consumed from the live-update channel.
    ///
    /// Payloads are applied as they are, with no validation. Unknown
    /// checkpoint or alert ids are logged and skipped.
    pub fn apply_remote(&mut self, event: &ChannelEvent) -> SimResult<()> {
        self.log.append(self.clock.now_ms, "remote", event)?;

        match event {
            ChannelEvent::StatusUpdate(status) | ChannelEvent::EmergencyTriggered(status) => {
                self.apply_status(status);
            }
            ChannelEvent::EmergencyReset(status) => {
                self.apply_status(status);
                self.clear_mission();
            }
            ChannelEvent::NewAlert(alert) => self.alerts.push_alert(alert.clone()),
            ChannelEvent::NewNotification(notification) => {
                self.alerts.push_notification(notification.clone());
            }
            ChannelEvent::SignalPreempted { signal_id, .. } => {
                match signal_id.parse::<Checkpoint>() {
                    Ok(checkpoint) => {
                        self.signals.preempt(checkpoint);
                    }
                    Err(e) => log::warn!("remote: ignoring signal_preempted, {e}"),
                }
            }
            ChannelEvent::AmbulancePositionUpdate { position, speed } => {
                self.reported_position = Some(*position);
                self.simulation.speed_kmh = *speed;
            }
            ChannelEvent::AnalyticsUpdate(analytics) => self.analytics = analytics.clone(),
            other => log::debug!("remote: no handler for {}", other.name()),
        }
        Ok(())
    }

    pub fn execute(&mut self, command: OperatorCommand) -> SimResult<CommandOutcome> {
        let outcome = match command {
            OperatorCommand::Pause => {
                self.clock.pause();
                CommandOutcome::default()
            }
            OperatorCommand::Resume => {
                self.clock.resume();
                CommandOutcome::default()
            }
            OperatorCommand::SetSpeed { speed } => {
                self.clock.set_speed(speed);
                CommandOutcome::default()
            }
            OperatorCommand::Trigger => CommandOutcome::events(self.trigger()?),
            OperatorCommand::Toggle  => CommandOutcome::events(self.toggle()?),
            OperatorCommand::Reset   => CommandOutcome::events(self.reset()?),
            OperatorCommand::AcknowledgeAlert { alert_id } => {
                CommandOutcome::events(self.acknowledge_alert(alert_id)?)
            }
            OperatorCommand::SubmitContact { form } => CommandOutcome {
                events:  Vec::new(),
                message: Some(self.submit_contact(&form)),
            },
        };
        Ok(outcome)
    }

    // ── Timer handlers ─────────────────────────────────────────

    fn fire(&mut self, kind: TimerKind, out: &mut Vec<ChannelEvent>) -> SimResult<()> {
        match kind {
            TimerKind::ClockRefresh => {
                let time = self.clock.display_time();
                self.publish("clock", ChannelEvent::ClockTick { time }, out)
            }
            TimerKind::SimulatorTick    => self.on_simulator_tick(out),
            TimerKind::AnalyticsRefresh => self.on_analytics_refresh(out),
            TimerKind::Sequence(action) => self.on_sequence_step(action, out),
        }
    }

    fn on_simulator_tick(&mut self, out: &mut Vec<ChannelEvent>) -> SimResult<()> {
        if !self.simulation.active {
            return Ok(());
        }
        self.sim_ticks += 1;
        let tick = self.sim_ticks;

        let was_complete = self.simulation.is_complete();
        let mut rng = self.rng_bank.for_subsystem_at_tick(SubsystemSlot::Simulator, tick);
        self.simulation = self.simulation.tick(&self.config.route, &mut rng);

        if !was_complete {
            log::debug!(
                "tick={tick} simulator: progress={} phase={:?} speed={:.1} distance={:.2}",
                self.simulation.progress,
                self.simulation.phase,
                self.simulation.speed_kmh,
                self.simulation.distance_km
            );
            self.publish("simulator", ChannelEvent::SimulationTick(self.simulation.clone()), out)?;

            if self.simulation.is_complete() {
                log::info!(
                    "tick={tick} simulator: mission complete, {:.1} km, max {:.1} km/h",
                    self.simulation.distance_km,
                    self.simulation.max_speed_kmh
                );
                let status = self.status();
                self.publish("simulator", ChannelEvent::EmergencyComplete(status), out)?;
            }
        }

        let mut rng = self.rng_bank.for_subsystem_at_tick(SubsystemSlot::Signals, tick);
        let probability = self.config.signals.preempt_probability;
        if let Some(checkpoint) = self.signals.roll_preemption(&mut rng, probability) {
            log::debug!("tick={tick} signals: heuristic preempted junction {checkpoint}");
            self.publish_preemption("signals", checkpoint, out)?;
        }
        Ok(())
    }

    fn on_analytics_refresh(&mut self, out: &mut Vec<ChannelEvent>) -> SimResult<()> {
        self.analytics_ticks += 1;
        let mut rng = self
            .rng_bank
            .for_subsystem_at_tick(SubsystemSlot::Analytics, self.analytics_ticks);
        self.analytics = Analytics::refreshed(&mut rng);
        self.publish("analytics", ChannelEvent::AnalyticsUpdate(self.analytics.clone()), out)
    }

    fn on_sequence_step(&mut self, action: SequenceAction, out: &mut Vec<ChannelEvent>) -> SimResult<()> {
        let now = self.clock.now();
        let id = self.clock.stamp_id();
        match action {
            SequenceAction::OfficerAlert(checkpoint) => {
                let alert = OfficerAlert::new(id, checkpoint, now);
                self.alerts.push_alert(alert.clone());
                self.publish("sequence", ChannelEvent::NewAlert(alert), out)
            }
            SequenceAction::DriverNotification(checkpoint) => {
                let notification = DriverNotification::new(id, checkpoint, now);
                self.alerts.push_notification(notification.clone());
                self.publish("sequence", ChannelEvent::NewNotification(notification), out)
            }
            SequenceAction::PreemptSignal(checkpoint) => {
                self.signals.preempt(checkpoint);
                self.publish_preemption("sequence", checkpoint, out)
            }
        }
    }

    // ── Internals ──────────────────────────────────────────────

    fn publish_preemption(
        &mut self,
        source: &str,
        checkpoint: Checkpoint,
        out: &mut Vec<ChannelEvent>,
    ) -> SimResult<()> {
        let event = ChannelEvent::SignalPreempted {
            signal_id: checkpoint.id().into(),
            status:    SignalStatus::Preempted,
            timestamp: Some(self.clock.now()),
        };
        self.publish(source, event, out)
    }

    fn publish(&mut self, source: &str, event: ChannelEvent, out: &mut Vec<ChannelEvent>) -> SimResult<()> {
        self.log.append(self.clock.now_ms, source, &event)?;
        out.push(event);
        Ok(())
    }

    fn apply_status(&mut self, status: &SystemStatus) {
        self.simulation.set_active(status.emergency_active);
        // Remote speeds replace the reading only; the maximum stays local.
        self.simulation.speed_kmh = status.current_speed;
        self.simulation.eta_return = status.eta;
        self.reported_position = status.ambulance_position;
        self.severity_code = status.severity_code.clone();
        self.alerts.replace(status.alerts.clone(), status.notifications.clone());
    }

    fn clear_mission(&mut self) {
        let cancelled = self.scheduler.cancel(|k| matches!(k, TimerKind::Sequence(_)));
        self.simulation = SimulationState::reset();
        self.signals.reset();
        self.alerts.clear();
        self.severity_code = SEVERITY_NONE.into();
        self.reported_position = None;
        log::info!(
            "t={}ms engine: mission cleared, {cancelled} sequence step(s) cancelled",
            self.clock.now_ms
        );
    }
}
