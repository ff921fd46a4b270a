use std::time::SystemTime;
use stellwerk::{
    beacon::ScriptedBeacon,
    coordinator::{Coordinator, DeliveryOrder},
    message::ConsensusMessage,
    network,
    participant::{build_roster, Participant},
    simulation::Simulation,
};
use stellwerk_ledger::{Block, Body, ParticipantId, RoundNumber};

fn init_logger() {
    let _ = pretty_env_logger::try_init();
}

fn named_roster(n: usize) -> Vec<Participant> {
    let names: Vec<String> = (0..n).map(|index| format!("test-{}", index)).collect();
    build_roster(&names)
}

fn assert_chain_linked(participant: &Participant) {
    let blocks: Vec<_> = participant.ledger().iter().collect();
    for pair in blocks.windows(2) {
        assert_eq!(pair[1].body().prev_block_hash, pair[0].hash());
    }
}

/// Four participants, beacon 6: participant 2 leads, everyone finalizes
/// the same block on top of genesis.
#[test]
fn a_single_round_finalizes_everywhere() {
    init_logger();

    let coordinator = Coordinator::new(named_roster(4));
    let mut simulation = Simulation::new(coordinator, ScriptedBeacon::new(vec![6]));

    let report = simulation.step();
    assert_eq!(report.leader, ParticipantId::new(2));
    let finalized = report.finalized.expect("the round must finalize");

    for participant in simulation.coordinator().participants() {
        let ledger = participant.ledger();
        assert_eq!(ledger.height(), 2);
        assert_eq!(ledger.tip().hash(), finalized);
        assert_eq!(ledger.tip().proposer(), ParticipantId::new(2));
        assert_eq!(ledger.tip().round(), RoundNumber::from(1));
        assert_chain_linked(participant);
    }

    let convergence = simulation.convergence();
    assert!(convergence.converged);
    assert!(convergence.signatures_valid);
}

/// A PROPOSE from a non-leader must never produce a vote or an append,
/// on any of the three participants.
#[test]
fn a_forged_proposal_changes_nothing() {
    init_logger();

    let mut coordinator = Coordinator::new(named_roster(3));
    // beacon 1 elects participant 1
    coordinator.broadcast_beacon(1);

    let genesis_hash = coordinator.participants()[0].ledger().tip().hash();
    let forged = Block::new(Body {
        proposer: ParticipantId::new(0),
        round: RoundNumber::from(1),
        prev_block_hash: genesis_hash,
        timestamp: SystemTime::now(),
        transactions: Vec::new(),
    });

    coordinator.broadcast(ConsensusMessage::Propose(forged));

    for participant in coordinator.participants() {
        assert_eq!(participant.ledger().height(), 1);
        assert!(participant.round_state().pending_block().is_none());
    }
}

/// Several rounds in a row: all ledgers grow in lockstep and stay
/// pairwise identical, block for block.
#[test]
fn several_rounds_converge() {
    init_logger();

    let coordinator = Coordinator::new(named_roster(4));
    let mut simulation = Simulation::new(coordinator, ScriptedBeacon::new(vec![6, 3, 11, 2, 9]));

    let reports = simulation.run(5);
    assert!(reports.iter().all(|report| report.finalized.is_some()));

    let convergence = simulation.convergence();
    assert_eq!(convergence.heights, vec![6, 6, 6, 6]);
    assert!(convergence.converged);
    assert!(convergence.signatures_valid);

    for participant in simulation.coordinator().participants() {
        assert_chain_linked(participant);
    }
}

/// The protocol must not depend on the delivery order the broadcast
/// layer picks: shuffled sweeps must converge exactly like ordered
/// ones.
#[test]
fn convergence_survives_shuffled_delivery() {
    init_logger();

    for seed in &[1, 7, 42, 1312] {
        let coordinator =
            Coordinator::with_order(named_roster(4), DeliveryOrder::Shuffled(*seed));
        let mut simulation =
            Simulation::new(coordinator, ScriptedBeacon::new(vec![6, 3, 11, 2]));

        let reports = simulation.run(4);
        assert!(
            reports.iter().all(|report| report.finalized.is_some()),
            "seed {} broke a round",
            seed
        );

        let convergence = simulation.convergence();
        assert!(convergence.converged, "seed {} diverged", seed);
        assert!(convergence.signatures_valid);
    }
}

/// A crashed leader stalls its round: no ledger grows, no error is
/// raised, and the next round with a live leader finalizes on the same
/// chain as if nothing happened.
#[test]
fn a_stalled_round_only_skips_a_round() {
    init_logger();

    let coordinator = Coordinator::new(named_roster(3));
    // beacon 1 elects participant 1, beacon 2 elects participant 2
    let mut simulation = Simulation::new(coordinator, ScriptedBeacon::new(vec![1, 2]));

    simulation
        .coordinator_mut()
        .set_offline(ParticipantId::new(1));
    let stalled = simulation.step();
    assert!(stalled.finalized.is_none());
    for participant in simulation.coordinator().participants() {
        assert_eq!(participant.ledger().height(), 1);
    }

    simulation
        .coordinator_mut()
        .set_online(ParticipantId::new(1));
    let report = simulation.step();
    let finalized = report.finalized.expect("the live round must finalize");

    for participant in simulation.coordinator().participants() {
        let ledger = participant.ledger();
        assert_eq!(ledger.height(), 2);
        assert_eq!(ledger.tip().hash(), finalized);
        // round 1 never made it into the chain
        assert!(ledger.at(RoundNumber::from(1)).is_none());
        assert_eq!(ledger.tip().round(), RoundNumber::from(2));
    }

    let convergence = simulation.convergence();
    assert!(convergence.converged);
    assert!(convergence.signatures_valid);
}

/// The concurrent execution strategy (one task per participant, FIFO
/// inboxes) must reach the same converged chains as the sequential
/// coordinator.
#[tokio::test]
async fn concurrent_participants_converge() {
    init_logger();

    let participants = named_roster(4);
    let beacon = ScriptedBeacon::new(vec![6, 3, 11]);

    let participants = network::run_rounds(participants, beacon, 3)
        .await
        .unwrap();

    let reference = participants[0].ledger().hashes();
    for participant in &participants {
        assert_eq!(participant.ledger().height(), 4);
        assert_eq!(participant.ledger().hashes(), reference);
        assert_chain_linked(participant);
    }

    let report = stellwerk::simulation::audit(&participants);
    assert!(report.converged);
    assert!(report.signatures_valid);
}
