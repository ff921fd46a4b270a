#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::similar_names)]

//! Binary driving the stellwerk consensus simulation.
//!
//! Builds a roster of participants, then runs consensus rounds either
//! sequentially through the coordinator or with one task per
//! participant, and reports whether all ledgers converged.

use serde::Deserialize;
use std::{fs, path::PathBuf};
use stellwerk::{
    beacon::EntropyBeacon,
    coordinator::{Coordinator, DeliveryOrder},
    network,
    participant::build_roster,
    simulation::{self, Simulation},
};
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
struct Opt {
    /// The number of participants in the network.
    #[structopt(short = "n", long, default_value = "4")]
    participants: usize,

    /// The number of consensus rounds to run.
    #[structopt(short, long, default_value = "3")]
    rounds: u64,

    /// Seed for the shared beacon (OS entropy when omitted).
    #[structopt(short, long)]
    seed: Option<u64>,

    /// Shuffle message delivery, deterministically from this seed.
    #[structopt(long)]
    shuffle: Option<u64>,

    /// Run every participant as an independent task.
    #[structopt(long)]
    concurrent: bool,

    /// Path to a TOML network configuration file.
    #[structopt(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
struct Config {
    rounds: Option<u64>,
    seed: Option<u64>,
    #[serde(default)]
    participant: Vec<ParticipantConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct ParticipantConfig {
    name: String,
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let opt = Opt::from_args();
    log::debug!("Command line arguments: {:#?}", opt);

    let config = opt.config.as_ref().map(|path| {
        let config_data =
            fs::read_to_string(path).expect("Could not load the configuration file.");
        toml::from_str::<Config>(&config_data).expect("Invalid configuration file.")
    });

    let names: Vec<String> = match &config {
        Some(config) if !config.participant.is_empty() => config
            .participant
            .iter()
            .map(|participant| participant.name.clone())
            .collect(),
        _ => (0..opt.participants)
            .map(|index| format!("participant-{}", index))
            .collect(),
    };
    let rounds = config
        .as_ref()
        .and_then(|config| config.rounds)
        .unwrap_or(opt.rounds);
    let seed = opt
        .seed
        .or_else(|| config.as_ref().and_then(|config| config.seed));
    let beacon = seed.map_or_else(EntropyBeacon::new, EntropyBeacon::seeded);

    let participants = build_roster(&names);
    log::info!("Network created with {} participants.", names.len());

    let report = if opt.concurrent {
        let participants = network::run_rounds(participants, beacon, rounds)
            .await
            .expect("The consensus network died.");
        simulation::audit(&participants)
    } else {
        let order = opt
            .shuffle
            .map_or(DeliveryOrder::Queued, DeliveryOrder::Shuffled);
        let mut simulation = Simulation::new(Coordinator::with_order(participants, order), beacon);
        for round in simulation.run(rounds) {
            match round.finalized {
                Some(hash) => log::info!("Round {} finalized block {:?}.", round.round, hash),
                None => log::warn!("Round {} did not finalize.", round.round),
            }
        }
        simulation.convergence()
    };

    log::info!("Final ledger heights: {:?}", report.heights);
    if report.converged && report.signatures_valid {
        log::info!("All ledgers are identical and every block signature checks out.");
    } else {
        log::error!("The network diverged: {:?}", report);
    }
}
