//! Deterministic random number generation.
//!
//! RULE: Nothing in the engine may call any platform RNG.
//! All randomness flows through SubsystemRng instances derived
//! from the single master seed the engine was built with.
//!
//! Each slot gets its own stream per tick, seeded from
//! (master_seed, slot index, tick). This means:
//!   - Speed jitter never shifts the signal heuristic's draws.
//!   - Any tick can be replayed in isolation from the seed alone.

use crate::types::Tick;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single slot.
pub struct SubsystemRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SubsystemRng {
    /// Create an RNG from the master seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a float in [lo, hi).
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// All slot RNGs for a single run.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Stream for `slot` at `tick`. Same (seed, slot, tick) always
    /// yields the same stream.
    pub fn for_subsystem_at_tick(&self, slot: SubsystemSlot, tick: Tick) -> SubsystemRng {
        let tick_seed = self
            .master_seed
            .wrapping_add(tick.wrapping_mul(0xbf58_476d_1ce4_e5b9));
        SubsystemRng::new(tick_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable slot assignments.
/// NEVER reorder or remove entries. Only append.
/// Reordering changes every slot's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum SubsystemSlot {
    Simulator = 0,
    Signals   = 1,
    Analytics = 2,
}

impl SubsystemSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Simulator => "simulator",
            Self::Signals   => "signals",
            Self::Analytics => "analytics",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_slot_and_tick_give_same_stream() {
        let bank_a = RngBank::new(12345);
        let bank_b = RngBank::new(12345);
        let mut a = bank_a.for_subsystem_at_tick(SubsystemSlot::Simulator, 7);
        let mut b = bank_b.for_subsystem_at_tick(SubsystemSlot::Simulator, 7);
        for _ in 0..16 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn slots_and_ticks_are_independent_streams() {
        let bank = RngBank::new(12345);
        let sim = bank.for_subsystem_at_tick(SubsystemSlot::Simulator, 3).next_f64();
        let sig = bank.for_subsystem_at_tick(SubsystemSlot::Signals, 3).next_f64();
        let later = bank.for_subsystem_at_tick(SubsystemSlot::Simulator, 4).next_f64();
        assert_ne!(sim.to_bits(), sig.to_bits());
        assert_ne!(sim.to_bits(), later.to_bits());
    }

    #[test]
    fn uniform_stays_in_range() {
        let mut rng = RngBank::new(99).for_subsystem_at_tick(SubsystemSlot::Analytics, 1);
        for _ in 0..1000 {
            let x = rng.uniform(-0.5, 0.5);
            assert!((-0.5..0.5).contains(&x), "out of range: {x}");
        }
    }
}
