use serde::{Deserialize, Serialize};
use std::{
    fmt,
    ops::{Add, AddAssign},
};

/// The number of a consensus round. Round `0` belongs to the genesis block.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RoundNumber(u64);

impl fmt::Display for RoundNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Add<u64> for RoundNumber {
    type Output = Self;
    fn add(self, other: u64) -> Self {
        Self(self.0 + other)
    }
}

impl AddAssign<u64> for RoundNumber {
    fn add_assign(&mut self, other: u64) {
        self.0 += other;
    }
}

impl From<u64> for RoundNumber {
    fn from(round: u64) -> Self {
        Self(round)
    }
}

impl From<RoundNumber> for u64 {
    fn from(round: RoundNumber) -> Self {
        round.0
    }
}
