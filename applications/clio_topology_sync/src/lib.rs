// Copyright 2024. The Tari Project
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! # CLIO topology sync
//!
//! Keeps a Cardano relay connected to the network by running two independent loops until shutdown is signalled:
//! - the [topology fetcher](topology_fetcher::TopologyFetcher) fetches recommended peers from CLIO every hour, merges
//!   them with an optional fixed topology and writes the node's topology file
//! - the [tip updater](tip_updater::TipUpdater) scrapes the node's block number from its prometheus endpoint and reports
//!   it to CLIO, so that other relays are handed this one

pub mod cli;
pub mod clio;
pub mod common_cli_args;
pub mod config;
pub mod error;
pub mod prometheus;
pub mod tip_updater;
pub mod topology;
pub mod topology_fetcher;

use std::sync::Arc;

pub use cli::Cli;
use clio_common::exit_codes::{ExitCode, ExitError};
use clio_shutdown::ShutdownSignal;
use log::*;
use tokio::task;

use crate::{
    clio::{ClioApi, HttpClioApi},
    config::SyncSettings,
    error::ConfigError,
    prometheus::{PrometheusTipSource, TipSource},
    tip_updater::TipUpdater,
    topology_fetcher::TopologyFetcher,
};

const LOG_TARGET: &str = "clio::topology_sync";

/// Runs both loops against CLIO and the node's prometheus endpoint until `shutdown_signal` resolves.
pub async fn run_topology_sync(settings: SyncSettings, shutdown_signal: ShutdownSignal) -> Result<(), ExitError> {
    let api = HttpClioApi::new(settings.clio_api_url.clone(), settings.request_timeout)
        .map_err(ConfigError::HttpClient)?;
    let tip_source = PrometheusTipSource::new(
        settings.prometheus_endpoint_url.clone(),
        settings.block_number_metric.clone(),
        settings.request_timeout,
    )
    .map_err(ConfigError::HttpClient)?;
    info!(
        target: LOG_TARGET,
        "Syncing with CLIO at {}, scraping the tip from {}",
        api.base_url(),
        tip_source.endpoint()
    );

    run_sync_loops(settings, Arc::new(api), tip_source, shutdown_signal).await
}

/// Spawns the topology fetcher and the tip updater and waits for both to stop.
pub async fn run_sync_loops<A, T>(
    settings: SyncSettings,
    api: Arc<A>,
    tip_source: T,
    shutdown_signal: ShutdownSignal,
) -> Result<(), ExitError>
where
    A: ClioApi + ?Sized + 'static,
    T: TipSource + 'static,
{
    let fetcher = TopologyFetcher::new(settings.fetcher, api.clone(), shutdown_signal.clone());
    let tip_updater = TipUpdater::new(settings.tip_updater, api, tip_source, shutdown_signal);

    let (fetcher, tip_updater) = tokio::join!(task::spawn(fetcher.run()), task::spawn(tip_updater.run()));
    for result in [fetcher, tip_updater] {
        result.map_err(|err| ExitError::new(ExitCode::UnknownError, err))?;
    }
    info!(target: LOG_TARGET, "Topology sync stopped");
    Ok(())
}
