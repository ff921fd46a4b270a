//! Drives consensus rounds and audits the outcome.
//!
//! The driver does not wait for finalization explicitly: with a live
//! leader, a round has flushed all its traffic, and therefore
//! finalized everywhere, before the round boundary. A round whose
//! leader never proposes simply leaves every ledger unchanged, which
//! is the only way a stalled round is surfaced.

use crate::{
    beacon::BeaconSource,
    coordinator::Coordinator,
    participant::Participant,
};
use stellwerk_ledger::{BlockHash, ParticipantId, RoundNumber};

/// What happened in a single round.
#[derive(Debug, Clone)]
pub struct RoundReport {
    /// The round that was driven.
    pub round: RoundNumber,
    /// The shared beacon value of the round.
    pub beacon: u64,
    /// The leader elected by the beacon.
    pub leader: ParticipantId,
    /// The finalized block hash, or `None` if the round stalled.
    pub finalized: Option<BlockHash>,
}

/// The cross-participant audit after a run.
#[derive(Debug, Clone)]
pub struct ConvergenceReport {
    /// Ledger height per participant, in roster order.
    pub heights: Vec<u64>,
    /// Whether all ledgers carry the identical hash sequence.
    pub converged: bool,
    /// Whether every finalized block carries a valid proposer signature.
    pub signatures_valid: bool,
}

/// Sequences consensus rounds over a coordinator and a beacon source.
pub struct Simulation<B> {
    coordinator: Coordinator,
    beacon_source: B,
    next_round: RoundNumber,
}

impl<B> Simulation<B>
where
    B: BeaconSource,
{
    /// Create a simulation driving the given network.
    #[must_use]
    pub fn new(coordinator: Coordinator, beacon_source: B) -> Self {
        Self {
            coordinator,
            beacon_source,
            next_round: RoundNumber::from(1),
        }
    }

    /// The coordinator and the participants behind it.
    #[must_use]
    pub const fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Mutable access to the coordinator, e.g. for fault injection.
    pub fn coordinator_mut(&mut self) -> &mut Coordinator {
        &mut self.coordinator
    }

    /// Run a single round and report what happened.
    #[allow(clippy::cast_possible_truncation)]
    pub fn step(&mut self) -> RoundReport {
        let round = self.next_round;
        self.next_round += 1;

        let beacon = self.beacon_source.next_beacon(round);
        let count = self.coordinator.participants().len() as u64;
        let leader = ParticipantId::new((beacon % count) as u32);
        log::info!("Round {}: beacon {}, leader is {}.", round, beacon, leader);

        let heights_before: Vec<u64> = self.heights();
        self.coordinator.run_round(round, beacon);

        let participants = self.coordinator.participants();
        let advanced = participants
            .iter()
            .zip(&heights_before)
            .all(|(participant, before)| participant.ledger().height() == before + 1);
        let finalized = if advanced {
            Some(participants[0].ledger().tip().hash())
        } else {
            log::warn!("Round {}: the ledger height did not advance.", round);
            None
        };

        RoundReport {
            round,
            beacon,
            leader,
            finalized,
        }
    }

    /// Run `rounds` rounds back to back.
    pub fn run(&mut self, rounds: u64) -> Vec<RoundReport> {
        (0..rounds).map(|_| self.step()).collect()
    }

    /// Compare all ledgers and audit the block signatures.
    #[must_use]
    pub fn convergence(&self) -> ConvergenceReport {
        audit(self.coordinator.participants())
    }

    fn heights(&self) -> Vec<u64> {
        self.coordinator
            .participants()
            .iter()
            .map(|participant| participant.ledger().height())
            .collect()
    }
}

/// Audit a set of participants for convergence: equal hash sequences
/// everywhere and a valid proposer signature on every finalized block.
#[must_use]
pub fn audit(participants: &[Participant]) -> ConvergenceReport {
    let heights: Vec<u64> = participants
        .iter()
        .map(|participant| participant.ledger().height())
        .collect();

    let reference = participants[0].ledger().hashes();
    let converged = participants
        .iter()
        .all(|participant| participant.ledger().hashes() == reference);

    let roster = participants[0].roster();
    let signatures_valid = participants.iter().all(|participant| {
        participant
            .ledger()
            .iter()
            .skip(1) // the genesis block is unsigned
            .all(|block| match block.signature() {
                Some(signature) => roster[block.proposer().as_usize()]
                    .verify(&block.hash(), signature)
                    .is_ok(),
                None => false,
            })
    });

    ConvergenceReport {
        heights,
        converged,
        signatures_valid,
    }
}
