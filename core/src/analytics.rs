use crate::rng::SubsystemRng;
use serde::{Deserialize, Serialize};

/// Headline metrics shown on the analytics cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Analytics {
    /// Minutes.
    pub response_time:    f64,
    /// Percent.
    pub route_efficiency: f64,
    /// Percent.
    pub success_rate:     f64,
    /// Minutes.
    pub officer_response: f64,
}

impl Default for Analytics {
    fn default() -> Self {
        Self {
            response_time:    2.3,
            route_efficiency: 94.0,
            success_rate:     97.0,
            officer_response: 1.8,
        }
    }
}

impl Analytics {
    /// Fresh jittered values around fixed baselines, rounded to one decimal.
    pub fn refreshed(rng: &mut SubsystemRng) -> Self {
        Self {
            response_time:    round1(2.0 + rng.uniform(-0.5, 0.5)),
            route_efficiency: round1(90.0 + rng.uniform(-5.0, 10.0)),
            success_rate:     round1(95.0 + rng.uniform(-3.0, 5.0)),
            officer_response: round1(1.5 + rng.uniform(-0.3, 0.5)),
        }
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, SubsystemSlot};

    #[test]
    fn refreshed_values_stay_in_band() {
        let bank = RngBank::new(31);
        for tick in 0..500 {
            let a = Analytics::refreshed(&mut bank.for_subsystem_at_tick(SubsystemSlot::Analytics, tick));
            assert!((1.5..=2.5).contains(&a.response_time), "{a:?}");
            assert!((85.0..=100.0).contains(&a.route_efficiency), "{a:?}");
            assert!((92.0..=100.0).contains(&a.success_rate), "{a:?}");
            assert!((1.2..=2.0).contains(&a.officer_response), "{a:?}");
            assert_eq!(round1(a.success_rate), a.success_rate);
        }
    }
}
