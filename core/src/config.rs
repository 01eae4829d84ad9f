use crate::{rng::SubsystemRng, types::Millis};
use serde::{Deserialize, Serialize};

/// A speed baseline plus uniform jitter on top of it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SpeedBand {
    pub base_kmh:   f64,
    pub jitter_kmh: f64,
}

impl SpeedBand {
    /// Draw `base + uniform(0, jitter)`.
    pub fn sample(&self, rng: &mut SubsystemRng) -> f64 {
        self.base_kmh + rng.next_f64() * self.jitter_kmh
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouteConfig {
    /// One-way distance from the hospital to the incident.
    pub outbound_km: f64,
    /// Progress points gained per simulator tick.
    pub progress_step: u32,
    /// ETA minutes charged per progress step.
    pub minutes_per_step: f64,
    pub outbound_speed: SpeedBand,
    pub return_speed: SpeedBand,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            outbound_km:      6.8,
            progress_step:    2,
            minutes_per_step: 2.0,
            outbound_speed:   SpeedBand { base_kmh: 65.0, jitter_kmh: 10.0 },
            return_speed:     SpeedBand { base_kmh: 60.0, jitter_kmh: 8.0 },
        }
    }
}

impl RouteConfig {
    pub fn round_trip_km(&self) -> f64 {
        self.outbound_km * 2.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimerConfig {
    pub clock_refresh_ms:     Millis,
    pub simulator_tick_ms:    Millis,
    pub analytics_refresh_ms: Millis,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            clock_refresh_ms:     1_000,
            simulator_tick_ms:    2_000,
            analytics_refresh_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SignalConfig {
    /// Chance per simulator tick that one checkpoint gets preempted.
    pub preempt_probability: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self { preempt_probability: 0.3 }
    }
}

/// Offsets of the emergency sequence, relative to the trigger instant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SequenceConfig {
    /// Delay before the first officer alert.
    pub first_step_ms: Millis,
    /// Gap between alert, notification and preemption at one checkpoint.
    pub step_spacing_ms: Millis,
    /// Gap between consecutive checkpoints.
    pub checkpoint_spacing_ms: Millis,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            first_step_ms:         1_000,
            step_spacing_ms:       500,
            checkpoint_spacing_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:5000/api".into() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    pub route:    RouteConfig,
    pub timers:   TimerConfig,
    pub signals:  SignalConfig,
    pub sequence: SequenceConfig,
    pub backend:  BackendConfig,
}

impl DemoConfig {
    /// Load from a JSON file. Missing sections fall back to defaults.
    /// In tests, use DemoConfig::default().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: DemoConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.route.progress_step == 0 {
            anyhow::bail!("route.progress_step must be > 0");
        }
        if self.route.outbound_km.is_nan() || self.route.outbound_km <= 0.0 {
            anyhow::bail!("route.outbound_km must be > 0, got {}", self.route.outbound_km);
        }
        if !(0.0..=1.0).contains(&self.signals.preempt_probability) {
            anyhow::bail!(
                "signals.preempt_probability must be in [0, 1], got {}",
                self.signals.preempt_probability
            );
        }
        let t = &self.timers;
        if t.clock_refresh_ms == 0 || t.simulator_tick_ms == 0 || t.analytics_refresh_ms == 0 {
            anyhow::bail!("timer intervals must be > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        DemoConfig::default().validate().expect("defaults validate");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = DemoConfig::from_json(r#"{ "signals": { "preempt_probability": 0.5 } }"#)
            .expect("parse");
        assert_eq!(config.signals.preempt_probability, 0.5);
        assert_eq!(config.route, RouteConfig::default());
        assert_eq!(config.timers.simulator_tick_ms, 2_000);
    }

    #[test]
    fn zero_step_is_rejected() {
        let err = DemoConfig::from_json(r#"{ "route": { "progress_step": 0 } }"#).unwrap_err();
        assert!(err.to_string().contains("progress_step"), "{err}");
    }

    #[test]
    fn probability_out_of_range_is_rejected() {
        assert!(DemoConfig::from_json(r#"{ "signals": { "preempt_probability": 1.5 } }"#).is_err());
    }
}
