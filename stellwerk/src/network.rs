//! Concurrent execution: every participant runs as its own task.
//!
//! This is the second valid execution strategy next to the sequential
//! [`Coordinator`](crate::coordinator::Coordinator): each participant
//! consumes an inbound message channel, so messages are processed in
//! FIFO order per participant while cross-participant ordering stays
//! unconstrained. No participant ever blocks on another; finalization
//! stays a purely local decision.

use crate::{beacon::BeaconSource, message::ConsensusMessage, participant::Participant};
use err_derive::Error;
use futures::future::join_all;
use std::time::Duration;
use stellwerk_ledger::RoundNumber;
use tokio::{
    sync::{mpsc, oneshot},
    time::timeout,
};

/// How long the driver waits for a round's proposal before declaring
/// the round stalled. This is a driver-boundary observation device,
/// not a liveness recovery mechanism.
const PROPOSAL_TIMEOUT: Duration = Duration::from_secs(1);

/// An error of the concurrent runner.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A participant task went away while the run was still going.
    #[error(display = "A participant task ended early.")]
    TaskEndedEarly,

    /// A participant task panicked or was cancelled.
    #[error(display = "{}", 0)]
    Join(#[error(from)] tokio::task::JoinError),
}

enum Inbound {
    /// Start a round: observe the beacon, then propose if elected.
    Round { round: RoundNumber, beacon: u64 },
    /// A broadcast consensus message.
    Deliver(ConsensusMessage),
    /// Barrier probe: confirm all earlier inbox messages were processed.
    Flush(oneshot::Sender<()>),
}

/// Run `rounds` consensus rounds with every participant as an
/// independent task, then hand the participants back for inspection.
///
/// The hub fans each beacon, the proposal, and every vote out to all
/// inboxes and flushes the round before starting the next one, so
/// round traffic never bleeds across round boundaries.
#[allow(clippy::future_not_send)]
pub async fn run_rounds<B>(
    participants: Vec<Participant>,
    mut beacon_source: B,
    rounds: u64,
) -> Result<Vec<Participant>, Error>
where
    B: BeaconSource,
{
    let (outbox_tx, mut outbox) = mpsc::unbounded_channel();
    let mut inboxes = Vec::new();
    let mut tasks = Vec::new();

    for mut participant in participants {
        let (inbox_tx, mut inbox) = mpsc::unbounded_channel::<Inbound>();
        let outbox = outbox_tx.clone();
        inboxes.push(inbox_tx);

        tasks.push(tokio::spawn(async move {
            while let Some(inbound) = inbox.recv().await {
                match inbound {
                    Inbound::Round { round, beacon } => {
                        participant.on_beacon(beacon);
                        if let Some(message) = participant.propose_if_leader(round) {
                            let _ = outbox.send(message);
                        }
                    }
                    Inbound::Deliver(message) => {
                        if let Some(response) = participant.handle(message) {
                            let _ = outbox.send(response);
                        }
                    }
                    Inbound::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            participant
        }));
    }
    drop(outbox_tx);

    let quorum = inboxes.len();
    for round in 1..=rounds {
        let round = RoundNumber::from(round);
        let beacon = beacon_source.next_beacon(round);
        for inbox in &inboxes {
            inbox
                .send(Inbound::Round { round, beacon })
                .map_err(|_| Error::TaskEndedEarly)?;
        }

        // A fresh round can only produce one message: the proposal.
        let proposal = match timeout(PROPOSAL_TIMEOUT, outbox.recv()).await {
            Ok(Some(message)) => message,
            Ok(None) => return Err(Error::TaskEndedEarly),
            Err(_) => {
                log::warn!("Round {} stalled: no proposal arrived.", round);
                flush(&inboxes).await?;
                continue;
            }
        };
        deliver(&inboxes, &proposal)?;

        // Every participant answers the proposal with one commit vote.
        for _ in 0..quorum {
            match timeout(PROPOSAL_TIMEOUT, outbox.recv()).await {
                Ok(Some(vote)) => deliver(&inboxes, &vote)?,
                Ok(None) => return Err(Error::TaskEndedEarly),
                Err(_) => {
                    log::warn!("Round {} stalled: a vote went missing.", round);
                    break;
                }
            }
        }

        flush(&inboxes).await?;
        // After the barrier, anything left in the outbox is leftover
        // traffic of a stalled round and must not leak into the next.
        while outbox.try_recv().is_ok() {}
    }

    drop(inboxes);
    let mut participants = Vec::with_capacity(quorum);
    for joined in join_all(tasks).await {
        participants.push(joined?);
    }
    Ok(participants)
}

fn deliver(
    inboxes: &[mpsc::UnboundedSender<Inbound>],
    message: &ConsensusMessage,
) -> Result<(), Error> {
    for inbox in inboxes {
        inbox
            .send(Inbound::Deliver(message.clone()))
            .map_err(|_| Error::TaskEndedEarly)?;
    }
    Ok(())
}

/// Wait until every inbox has processed all messages sent so far.
async fn flush(inboxes: &[mpsc::UnboundedSender<Inbound>]) -> Result<(), Error> {
    let mut confirmations = Vec::with_capacity(inboxes.len());
    for inbox in inboxes {
        let (done, confirmed) = oneshot::channel();
        inbox
            .send(Inbound::Flush(done))
            .map_err(|_| Error::TaskEndedEarly)?;
        confirmations.push(confirmed);
    }
    for confirmed in confirmations {
        confirmed.await.map_err(|_| Error::TaskEndedEarly)?;
    }
    Ok(())
}
