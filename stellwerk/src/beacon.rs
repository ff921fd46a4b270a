//! Sources of the per-round shared randomness.
//!
//! The protocol needs one fresh integer per round, observed identically
//! by every participant. How the value is produced (the original system
//! measures entangled qubit states) stays outside the consensus core;
//! any source is fine as long as it is unpredictable before the round
//! starts and the coordinator hands the same value to everyone.

use rand::{rngs::StdRng, Rng, SeedableRng};
use stellwerk_ledger::RoundNumber;

/// Yields one shared random value per round.
pub trait BeaconSource {
    /// Produce the beacon for `round`.
    ///
    /// Called once per round; the returned value must be delivered
    /// unchanged to every participant. Values of any size are fine,
    /// leader selection normalizes them by modulo.
    fn next_beacon(&mut self, round: RoundNumber) -> u64;
}

/// A beacon drawn from a pseudo random number generator.
#[derive(Debug)]
pub struct EntropyBeacon {
    rng: StdRng,
}

impl EntropyBeacon {
    /// A beacon seeded from operating system entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// A deterministic beacon for reproducible runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for EntropyBeacon {
    fn default() -> Self {
        Self::new()
    }
}

impl BeaconSource for EntropyBeacon {
    fn next_beacon(&mut self, _round: RoundNumber) -> u64 {
        self.rng.gen()
    }
}

/// A beacon that replays a fixed script, cycling when exhausted.
///
/// Useful to force a specific leader schedule in tests.
#[derive(Debug)]
pub struct ScriptedBeacon {
    values: Vec<u64>,
    next: usize,
}

impl ScriptedBeacon {
    /// Create a scripted beacon. `values` must not be empty.
    #[must_use]
    pub fn new(values: Vec<u64>) -> Self {
        assert!(
            !values.is_empty(),
            "a scripted beacon needs at least one value"
        );
        Self { values, next: 0 }
    }
}

impl BeaconSource for ScriptedBeacon {
    fn next_beacon(&mut self, _round: RoundNumber) -> u64 {
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value
    }
}
