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

use std::{sync::Arc, time::Duration};

use clio_shutdown::ShutdownSignal;
use log::*;

use crate::{
    clio::{ClioApi, PeerEndpoint},
    prometheus::TipSource,
};

const LOG_TARGET: &str = "clio::topology_sync::tip_updater";

pub const SCRAPE_FAILURE_DELAY: Duration = Duration::from_secs(60);
pub const REPORT_FAILURE_DELAY: Duration = Duration::from_secs(10 * 60);
pub const REPORT_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipUpdaterConfig {
    pub endpoint: PeerEndpoint,
    pub network_magic: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipUpdateOutcome {
    ScrapeFailed,
    ReportFailed,
    Reported,
}

impl TipUpdateOutcome {
    pub fn next_delay(self) -> Duration {
        match self {
            TipUpdateOutcome::ScrapeFailed => SCRAPE_FAILURE_DELAY,
            TipUpdateOutcome::ReportFailed => REPORT_FAILURE_DELAY,
            TipUpdateOutcome::Reported => REPORT_INTERVAL,
        }
    }
}

/// Reports the tip of the local node to CLIO, so that other relays learn about this one.
pub struct TipUpdater<A: ?Sized, T> {
    config: TipUpdaterConfig,
    api: Arc<A>,
    tip_source: T,
    shutdown_signal: ShutdownSignal,
}

impl<A, T> TipUpdater<A, T>
where
    A: ClioApi + ?Sized,
    T: TipSource,
{
    pub fn new(config: TipUpdaterConfig, api: Arc<A>, tip_source: T, shutdown_signal: ShutdownSignal) -> Self {
        Self {
            config,
            api,
            tip_source,
            shutdown_signal,
        }
    }

    pub async fn run(mut self) {
        info!(
            target: LOG_TARGET,
            "Tip updater started for {} (valency {})", self.config.endpoint, self.config.endpoint.valency
        );
        let mut delay = Duration::ZERO;
        while !self.shutdown_signal.sleep(delay).await.is_cancelled() {
            let outcome = self.update_tip().await;
            delay = outcome.next_delay();
            debug!(target: LOG_TARGET, "{:?}, next tip update in {:.0?}", outcome, delay);
        }
        info!(
            target: LOG_TARGET,
            "Tip updater shutting down because the shutdown signal was received"
        );
    }

    /// Scrapes the tip and reports it, once.
    pub async fn update_tip(&self) -> TipUpdateOutcome {
        debug!(target: LOG_TARGET, "Getting the tip from the node");
        let block_number = match self.tip_source.current_block_number().await {
            Ok(n) => n,
            Err(err) => {
                error!(target: LOG_TARGET, "Getting the tip failed: {}", err);
                return TipUpdateOutcome::ScrapeFailed;
            },
        };
        info!(target: LOG_TARGET, "Fetched the tip {}", block_number);

        match self
            .api
            .update_tip(&self.config.endpoint, block_number, self.config.network_magic)
            .await
        {
            Ok(()) => {
                info!(target: LOG_TARGET, "Reported the tip {} to CLIO", block_number);
                TipUpdateOutcome::Reported
            },
            Err(err) => {
                error!(
                    target: LOG_TARGET,
                    "Reporting the tip failed ({:?}): {}",
                    err.result_class(),
                    err
                );
                TipUpdateOutcome::ReportFailed
            },
        }
    }
}
