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

use std::{
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use clio_shutdown::Shutdown;
use clio_topology_sync::{
    clio::{ClioApi, PeerEndpoint},
    config::SyncSettings,
    error::{ClioApiError, TipScrapeError},
    prometheus::TipSource,
    run_sync_loops,
    tip_updater::TipUpdaterConfig,
    topology::{read_topology_from_file, write_topology_to_file, Producer, Topology},
    topology_fetcher::TopologyFetcherConfig,
};
use tempfile::tempdir;
use tokio::task;
use url::Url;

/// Serves a fixed topology, or fails every fetch when it has none.
struct StaticClioApi {
    topology: Option<Topology>,
    fetches: AtomicUsize,
    tip_reports: AtomicUsize,
}

impl StaticClioApi {
    fn new(topology: Option<Topology>) -> Self {
        Self {
            topology,
            fetches: AtomicUsize::new(0),
            tip_reports: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ClioApi for StaticClioApi {
    async fn fetch_topology(&self, _max_peers: u32, _network_magic: u32) -> Result<Topology, ClioApiError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.topology.clone().ok_or_else(|| ClioApiError::Status {
            code: "503".to_string(),
            message: "service unavailable".to_string(),
        })
    }

    async fn update_tip(&self, _: &PeerEndpoint, _: u64, _: u32) -> Result<(), ClioApiError> {
        self.tip_reports.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FixedTip(u64);

#[async_trait]
impl TipSource for FixedTip {
    async fn current_block_number(&self) -> Result<u64, TipScrapeError> {
        Ok(self.0)
    }
}

fn settings(output_path: &Path, fixed_path: &Path) -> SyncSettings {
    SyncSettings {
        fetcher: TopologyFetcherConfig {
            output_path: output_path.to_path_buf(),
            fixed_path: Some(fixed_path.to_path_buf()),
            max_peers: 10,
            network_magic: 764824073,
        },
        tip_updater: TipUpdaterConfig {
            endpoint: PeerEndpoint {
                hostname: "relay.example.com".to_string(),
                port: 3001,
                valency: 1,
            },
            network_magic: 764824073,
        },
        clio_api_url: Url::parse("https://api.clio.one/htopology/v1/").unwrap(),
        prometheus_endpoint_url: Url::parse("http://127.0.0.1:12798/metrics").unwrap(),
        block_number_metric: "cardano_node_metrics_blockNum_int".to_string(),
        request_timeout: Duration::from_secs(5),
    }
}

/// Runs both loops for `duration` of (paused) time, then shuts them down.
async fn run_for(settings: SyncSettings, api: Arc<StaticClioApi>, duration: Duration) {
    let mut shutdown = Shutdown::new();
    let handle = task::spawn(run_sync_loops(settings, api, FixedTip(123456), shutdown.to_signal()));
    tokio::time::sleep(duration).await;
    shutdown.trigger();
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn an_empty_fixed_topology_keeps_the_fetched_one() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("topology.json");
    let fixed = dir.path().join("fixed.json");
    std::fs::write(&fixed, r#"{"Producers": []}"#).unwrap();
    let fetched = Topology::new(vec![
        Producer::new("b.example", 3001, 1),
        Producer::new("c.example", 3002, 1),
    ]);
    let api = Arc::new(StaticClioApi::new(Some(fetched.clone())));

    run_for(settings(&output, &fixed), api.clone(), Duration::from_secs(60)).await;

    assert_eq!(read_topology_from_file(&output).unwrap(), fetched);
    assert_eq!(api.fetches.load(Ordering::SeqCst), 1);
    assert_eq!(api.tip_reports.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn the_fixed_topology_is_written_when_every_fetch_fails() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("topology.json");
    let fixed = dir.path().join("fixed.json");
    let fixed_topology = Topology::new(vec![Producer::new("a.example", 3001, 1)]);
    write_topology_to_file(&fixed_topology, &fixed).unwrap();
    let api = Arc::new(StaticClioApi::new(None));

    run_for(settings(&output, &fixed), api.clone(), Duration::from_secs(200)).await;

    assert_eq!(api.fetches.load(Ordering::SeqCst), 3);
    assert_eq!(read_topology_from_file(&output).unwrap(), fixed_topology);
}
