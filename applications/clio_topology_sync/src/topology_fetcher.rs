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

//! Keeps the node's topology file in sync with CLIO.
//!
//! Once an hour, the fetcher asks CLIO for a fresh list of peers, retrying up to [`MAX_FETCH_ATTEMPTS`] times with
//! growing pauses (1s, 10s, 100s) in between. The result is merged with the fixed topology, if one is configured, and
//! written to the topology file of the node.

use std::{path::PathBuf, sync::Arc, time::Duration};

use clio_shutdown::ShutdownSignal;
use log::*;
use tokio::time::Instant;

use crate::{
    clio::ClioApi,
    topology::{merge, read_topology_from_file, write_topology_to_file, Topology},
};

const LOG_TARGET: &str = "clio::topology_sync::topology_fetcher";

/// How often the topology is refreshed, measured from the start of one cycle to the start of the next.
pub const SYNC_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const MAX_FETCH_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyFetcherConfig {
    /// The topology file that is written
    pub output_path: PathBuf,
    /// Optional fixed topology, re-read every cycle
    pub fixed_path: Option<PathBuf>,
    pub max_peers: u32,
    pub network_magic: u32,
}

#[derive(Debug)]
pub enum FetchOutcome {
    Fetched(Topology),
    /// Every attempt failed
    Exhausted,
    /// Shutdown was signalled while waiting for the next attempt
    Cancelled,
}

/// The pause before the given (1-based) attempt: 10^(attempt-1) seconds.
pub fn attempt_delay(attempt: u32) -> Duration {
    Duration::from_secs(10u64.saturating_pow(attempt.saturating_sub(1)))
}

/// The pause before the next cycle, given how long the current one took.
pub fn next_cycle_delay(elapsed: Duration) -> Duration {
    SYNC_INTERVAL.saturating_sub(elapsed)
}

pub struct TopologyFetcher<A: ?Sized> {
    config: TopologyFetcherConfig,
    api: Arc<A>,
    shutdown_signal: ShutdownSignal,
}

impl<A> TopologyFetcher<A>
where A: ClioApi + ?Sized
{
    pub fn new(config: TopologyFetcherConfig, api: Arc<A>, shutdown_signal: ShutdownSignal) -> Self {
        Self {
            config,
            api,
            shutdown_signal,
        }
    }

    /// Runs cycles until shutdown is signalled. The first cycle starts immediately.
    pub async fn run(mut self) {
        info!(
            target: LOG_TARGET,
            "Topology fetcher started, writing to '{}'",
            self.config.output_path.display()
        );
        let mut delay = Duration::ZERO;
        loop {
            if self.shutdown_signal.sleep(delay).await.is_cancelled() {
                break;
            }
            match self.run_cycle().await {
                Some(next_delay) => {
                    debug!(target: LOG_TARGET, "Next topology fetch in {:.0?}", next_delay);
                    delay = next_delay;
                },
                None => break,
            }
        }
        info!(
            target: LOG_TARGET,
            "Topology fetcher shutting down because the shutdown signal was received"
        );
    }

    /// Runs a single fetch-merge-persist cycle, returning the delay until the next one, or `None` if shutdown was
    /// signalled during the cycle.
    pub async fn run_cycle(&mut self) -> Option<Duration> {
        let started = Instant::now();
        info!(target: LOG_TARGET, "Fetching topology from the CLIO API");
        let fetched = match self.fetch_with_retry().await {
            FetchOutcome::Fetched(topology) => {
                info!(target: LOG_TARGET, "Fetched a topology of size {}", topology.len());
                Some(topology)
            },
            FetchOutcome::Exhausted => {
                error!(
                    target: LOG_TARGET,
                    "Giving up on fetching the topology after {} attempts", MAX_FETCH_ATTEMPTS
                );
                None
            },
            FetchOutcome::Cancelled => return None,
        };

        if self.config.fixed_path.is_none() && fetched.is_none() {
            warn!(
                target: LOG_TARGET,
                "No topology was fetched, '{}' is left untouched",
                self.config.output_path.display()
            );
        } else {
            let fixed = self.read_fixed_topology();
            let merged = merge(fixed.as_ref(), fetched.as_ref());
            if self.config.fixed_path.is_some() {
                info!(
                    target: LOG_TARGET,
                    "Merged the fetched topology with the fixed one, new size {}",
                    merged.len()
                );
            }
            self.persist(&merged);
        }

        Some(next_cycle_delay(started.elapsed()))
    }

    /// Fetches the topology, pausing before every attempt.
    pub async fn fetch_with_retry(&mut self) -> FetchOutcome {
        for attempt in 1..=MAX_FETCH_ATTEMPTS {
            if self.shutdown_signal.sleep(attempt_delay(attempt)).await.is_cancelled() {
                debug!(target: LOG_TARGET, "Topology fetch cancelled before attempt {}", attempt);
                return FetchOutcome::Cancelled;
            }
            match self
                .api
                .fetch_topology(self.config.max_peers, self.config.network_magic)
                .await
            {
                Ok(topology) => return FetchOutcome::Fetched(topology),
                Err(err) => warn!(
                    target: LOG_TARGET,
                    "Couldn't fetch the topology ({}. attempt, {:?}): {}",
                    attempt,
                    err.result_class(),
                    err
                ),
            }
        }
        FetchOutcome::Exhausted
    }

    fn read_fixed_topology(&self) -> Option<Topology> {
        let path = self.config.fixed_path.as_ref()?;
        match read_topology_from_file(path) {
            Ok(topology) => {
                debug!(target: LOG_TARGET, "Read a fixed topology of size {}", topology.len());
                Some(topology)
            },
            Err(err) => {
                error!(target: LOG_TARGET, "{}", err);
                None
            },
        }
    }

    fn persist(&self, topology: &Topology) {
        match write_topology_to_file(topology, &self.config.output_path) {
            Ok(()) => info!(
                target: LOG_TARGET,
                "Wrote a topology of size {} to '{}'",
                topology.len(),
                self.config.output_path.display()
            ),
            Err(err) => error!(target: LOG_TARGET, "{}", err),
        }
    }
}

#[cfg(test)]
mod test {
    use std::{collections::VecDeque, sync::Mutex};

    use async_trait::async_trait;
    use clio_shutdown::Shutdown;
    use tempfile::tempdir;
    use tokio::task;

    use super::*;
    use crate::{clio::PeerEndpoint, error::ClioApiError, topology::Producer};

    /// Answers fetches from a queue, failing once the queue is empty.
    #[derive(Default)]
    struct MockClioApi {
        responses: Mutex<VecDeque<Topology>>,
        fetches: Mutex<Vec<Instant>>,
    }

    impl MockClioApi {
        fn answering(responses: Vec<Topology>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                fetches: Mutex::default(),
            }
        }

        fn fetch_times(&self, since: Instant) -> Vec<Duration> {
            self.fetches.lock().unwrap().iter().map(|t| *t - since).collect()
        }
    }

    #[async_trait]
    impl ClioApi for MockClioApi {
        async fn fetch_topology(&self, max_peers: u32, network_magic: u32) -> Result<Topology, ClioApiError> {
            assert_eq!(max_peers, 10);
            assert_eq!(network_magic, 764824073);
            self.fetches.lock().unwrap().push(Instant::now());
            self.responses.lock().unwrap().pop_front().ok_or_else(|| ClioApiError::Status {
                code: "503".to_string(),
                message: "service unavailable".to_string(),
            })
        }

        async fn update_tip(&self, _: &PeerEndpoint, _: u64, _: u32) -> Result<(), ClioApiError> {
            unimplemented!()
        }
    }

    fn config(output_path: PathBuf) -> TopologyFetcherConfig {
        TopologyFetcherConfig {
            output_path,
            fixed_path: None,
            max_peers: 10,
            network_magic: 764824073,
        }
    }

    fn assert_close(actual: &[Duration], expected_secs: &[u64]) {
        assert_eq!(actual.len(), expected_secs.len(), "{:?}", actual);
        for (actual, expected) in actual.iter().zip(expected_secs) {
            let expected = Duration::from_secs(*expected);
            let diff = if *actual > expected {
                *actual - expected
            } else {
                expected - *actual
            };
            assert!(diff < Duration::from_millis(10), "{:?} vs {:?}", actual, expected);
        }
    }

    #[test]
    fn attempt_delays_grow_tenfold() {
        assert_eq!(attempt_delay(1), Duration::from_secs(1));
        assert_eq!(attempt_delay(2), Duration::from_secs(10));
        assert_eq!(attempt_delay(3), Duration::from_secs(100));
    }

    #[test]
    fn next_cycle_delay_is_never_negative() {
        assert_eq!(next_cycle_delay(Duration::from_secs(111)), Duration::from_secs(3600 - 111));
        assert_eq!(next_cycle_delay(SYNC_INTERVAL), Duration::ZERO);
        assert_eq!(next_cycle_delay(Duration::from_secs(2 * 3600)), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn it_retries_with_growing_delays() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("topology.json");
        let api = Arc::new(MockClioApi::default());
        let mut shutdown = Shutdown::new();
        let start = Instant::now();

        let fetcher = TopologyFetcher::new(config(output.clone()), api.clone(), shutdown.to_signal());
        let handle = task::spawn(fetcher.run());
        tokio::time::sleep(Duration::from_secs(200)).await;
        shutdown.trigger();
        handle.await.unwrap();

        assert_close(&api.fetch_times(start), &[1, 11, 111]);
        // Neither source produced a topology
        assert!(!output.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn cycles_start_an_hour_apart() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("topology.json");
        let first = Topology::new(vec![Producer::new("a.example", 3001, 1)]);
        let second = Topology::new(vec![Producer::new("b.example", 3001, 1)]);
        let api = Arc::new(MockClioApi::answering(vec![first, second.clone()]));
        let mut shutdown = Shutdown::new();
        let start = Instant::now();

        let fetcher = TopologyFetcher::new(config(output.clone()), api.clone(), shutdown.to_signal());
        let handle = task::spawn(fetcher.run());
        tokio::time::sleep(Duration::from_secs(3700)).await;
        shutdown.trigger();
        handle.await.unwrap();

        assert_close(&api.fetch_times(start), &[1, 3601]);
        assert_eq!(read_topology_from_file(&output).unwrap(), second);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_during_backoff_stops_before_the_next_attempt() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("topology.json");
        let fixed = dir.path().join("fixed.json");
        write_topology_to_file(&Topology::new(vec![Producer::new("a.example", 3001, 1)]), &fixed).unwrap();
        let api = Arc::new(MockClioApi::default());
        let mut shutdown = Shutdown::new();
        let start = Instant::now();

        let mut config = config(output.clone());
        config.fixed_path = Some(fixed);
        let fetcher = TopologyFetcher::new(config, api.clone(), shutdown.to_signal());
        let handle = task::spawn(fetcher.run());
        // The first attempt happens at 1s, the second would happen at 11s
        tokio::time::sleep(Duration::from_secs(5)).await;
        shutdown.trigger();
        handle.await.unwrap();

        assert_close(&api.fetch_times(start), &[1]);
        assert!(!output.exists(), "a cancelled cycle must not write");
    }

    #[tokio::test(start_paused = true)]
    async fn it_does_not_start_after_shutdown() {
        let dir = tempdir().unwrap();
        let api = Arc::new(MockClioApi::default());
        let mut shutdown = Shutdown::new();
        shutdown.trigger();

        TopologyFetcher::new(config(dir.path().join("topology.json")), api.clone(), shutdown.to_signal())
            .run()
            .await;

        assert!(api.fetch_times(Instant::now()).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn an_unreadable_fixed_topology_falls_back_to_the_fetched_one() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("topology.json");
        let fetched = Topology::new(vec![Producer::new("b.example", 3001, 1)]);
        let api = Arc::new(MockClioApi::answering(vec![fetched.clone()]));
        let shutdown = Shutdown::new();

        let mut config = config(output.clone());
        config.fixed_path = Some(dir.path().join("missing.json"));
        let mut fetcher = TopologyFetcher::new(config, api, shutdown.to_signal());
        let next = fetcher.run_cycle().await.unwrap();

        assert_close(&[SYNC_INTERVAL - next], &[1]);
        assert_eq!(read_topology_from_file(&output).unwrap(), fetched);
    }
    #[tokio::test(start_paused = true)]
    async fn an_unreadable_fixed_topology_and_failed_fetches_write_an_empty_topology() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("topology.json");
        write_topology_to_file(&Topology::new(vec![Producer::new("old.example", 1, 1)]), &output).unwrap();
        let api = Arc::new(MockClioApi::default());
        let shutdown = Shutdown::new();

        let mut config = config(output.clone());
        config.fixed_path = Some(dir.path().join("missing.json"));
        let mut fetcher = TopologyFetcher::new(config, api.clone(), shutdown.to_signal());
        assert!(fetcher.run_cycle().await.is_some());

        assert_eq!(api.fetches.lock().unwrap().len(), MAX_FETCH_ATTEMPTS as usize);
        assert!(read_topology_from_file(&output).unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetches_without_a_fixed_topology_leave_the_file_untouched() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("topology.json");
        let previous = Topology::new(vec![Producer::new("old.example", 1, 1)]);
        write_topology_to_file(&previous, &output).unwrap();
        let api = Arc::new(MockClioApi::default());
        let shutdown = Shutdown::new();

        let mut fetcher = TopologyFetcher::new(config(output.clone()), api, shutdown.to_signal());
        assert!(fetcher.run_cycle().await.is_some());

        assert_eq!(read_topology_from_file(&output).unwrap(), previous);
    }
}
