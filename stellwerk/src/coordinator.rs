//! The broadcast fabric connecting all participants.
//!
//! The coordinator is the only component with cross-participant
//! visibility. It fans beacon values and consensus messages out to
//! every connected participant, the sender included, and never
//! alters message content. The protocol must stay correct for any
//! delivery order the coordinator picks, so the order is configurable
//! and tests run the same rounds with shuffled sweeps.

use crate::{message::ConsensusMessage, participant::Participant};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::collections::HashSet;
use stellwerk_ledger::{ParticipantId, RoundNumber};

/// The order in which queued messages are delivered.
#[derive(Debug, Copy, Clone)]
pub enum DeliveryOrder {
    /// Deliver messages in the order they were emitted.
    Queued,
    /// Shuffle the queue and the recipients before every sweep,
    /// deterministically from a seed.
    Shuffled(u64),
}

/// Synchronous broadcast hub driving a set of participants.
pub struct Coordinator {
    participants: Vec<Participant>,
    offline: HashSet<ParticipantId>,
    rng: Option<StdRng>,
}

impl Coordinator {
    /// Create a coordinator delivering messages in emission order.
    #[must_use]
    pub fn new(participants: Vec<Participant>) -> Self {
        Self::with_order(participants, DeliveryOrder::Queued)
    }

    /// Create a coordinator with an explicit delivery order.
    #[must_use]
    pub fn with_order(participants: Vec<Participant>, order: DeliveryOrder) -> Self {
        let rng = match order {
            DeliveryOrder::Queued => None,
            DeliveryOrder::Shuffled(seed) => Some(StdRng::seed_from_u64(seed)),
        };
        Self {
            participants,
            offline: HashSet::new(),
            rng,
        }
    }

    /// All participants, in roster order.
    #[must_use]
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Release the participants, e.g. to inspect their ledgers.
    #[must_use]
    pub fn into_participants(self) -> Vec<Participant> {
        self.participants
    }

    /// Take a participant off the network. It receives nothing and its
    /// emissions are lost, which models a crashed node.
    pub fn set_offline(&mut self, id: ParticipantId) {
        self.offline.insert(id);
    }

    /// Reconnect a participant taken offline before.
    pub fn set_online(&mut self, id: ParticipantId) {
        self.offline.remove(&id);
    }

    /// Deliver the shared beacon value to every connected participant.
    pub fn broadcast_beacon(&mut self, value: u64) {
        let offline = &self.offline;
        for participant in self
            .participants
            .iter_mut()
            .filter(|participant| !offline.contains(&participant.id()))
        {
            participant.on_beacon(value);
        }
    }

    /// Broadcast a single message and pump all resulting traffic.
    pub fn broadcast(&mut self, message: ConsensusMessage) {
        self.pump(vec![message]);
    }

    /// Run one full round: beacon fan-out, leader proposal, and the
    /// message pump until no traffic remains.
    pub fn run_round(&mut self, round: RoundNumber, beacon: u64) {
        self.broadcast_beacon(beacon);

        let offline = &self.offline;
        let proposals: Vec<ConsensusMessage> = self
            .participants
            .iter()
            .filter(|participant| !offline.contains(&participant.id()))
            .filter_map(|participant| participant.propose_if_leader(round))
            .collect();

        self.pump(proposals);
    }

    /// Deliver every queued message to every connected participant,
    /// collecting the emitted responses until the queue runs dry.
    fn pump(&mut self, mut queue: Vec<ConsensusMessage>) {
        while !queue.is_empty() {
            if let Some(rng) = &mut self.rng {
                queue.shuffle(rng);
            }

            let mut emitted = Vec::new();
            for message in queue {
                let mut recipients: Vec<usize> = (0..self.participants.len()).collect();
                if let Some(rng) = &mut self.rng {
                    recipients.shuffle(rng);
                }

                for index in recipients {
                    let participant = &mut self.participants[index];
                    if self.offline.contains(&participant.id()) {
                        continue;
                    }
                    if let Some(response) = participant.handle(message.clone()) {
                        emitted.push(response);
                    }
                }
            }
            queue = emitted;
        }
    }
}
