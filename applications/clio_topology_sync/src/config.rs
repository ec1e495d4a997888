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

//! Topology sync specific configuration
//!
//! All options are configured under the `[topology_sync]` section of `config.toml`, and may be overridden by
//! `CLIO_TOPOLOGY_SYNC__<OPTION>` environment variables or command line flags:
//! - hostname, port, valency - the public identity of this relay as registered with CLIO
//! - topology_path - the topology file of the node, which is replaced every hour
//! - fixed_topology_path - optional topology whose producers are always part of the written topology
//! - prometheus_endpoint_url - the node's metrics endpoint, scraped for the current block number
//! - max_peers, network_magic - what to ask CLIO for
//! - clio_api_url, request_timeout - how to reach CLIO

use std::{path::PathBuf, time::Duration};

use clio_common::{configuration::serializers, SubConfigPath};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    clio::{PeerEndpoint, DEFAULT_CLIO_API_URL},
    error::ConfigError,
    prometheus::DEFAULT_BLOCK_NUMBER_METRIC,
    tip_updater::TipUpdaterConfig,
    topology_fetcher::TopologyFetcherConfig,
};

/// The network magic of the Cardano mainnet
pub const MAINNET_NETWORK_MAGIC: u32 = 764824073;

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct TopologySyncConfig {
    /// The public hostname (IP address or DNS name) of this relay
    pub hostname: Option<String>,
    /// The public port of this relay. 0 means unset.
    pub port: u16,
    /// The valency of this relay
    pub valency: u32,
    /// The topology file that is written every cycle
    pub topology_path: Option<PathBuf>,
    /// Optional topology with producers that take precedence over fetched ones
    pub fixed_topology_path: Option<PathBuf>,
    /// The URL of the node's prometheus endpoint
    pub prometheus_endpoint_url: Option<String>,
    /// The metric holding the node's current block number
    pub block_number_metric: String,
    /// The number of peers to fetch
    pub max_peers: u32,
    /// The magic number of the network
    pub network_magic: u32,
    /// The base URL of the CLIO topology-updater API
    pub clio_api_url: String,
    /// Connect and request timeout of every HTTP call
    #[serde(with = "serializers::seconds")]
    pub request_timeout: Duration,
}

impl Default for TopologySyncConfig {
    fn default() -> Self {
        Self {
            hostname: None,
            port: 0,
            valency: 1,
            topology_path: None,
            fixed_topology_path: None,
            prometheus_endpoint_url: None,
            block_number_metric: DEFAULT_BLOCK_NUMBER_METRIC.to_string(),
            max_peers: 10,
            network_magic: MAINNET_NETWORK_MAGIC,
            clio_api_url: DEFAULT_CLIO_API_URL.to_string(),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl SubConfigPath for TopologySyncConfig {
    fn main_key_prefix() -> &'static str {
        "topology_sync"
    }
}

/// Validated settings, from which both loops are configured.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub fetcher: TopologyFetcherConfig,
    pub tip_updater: TipUpdaterConfig,
    pub clio_api_url: Url,
    pub prometheus_endpoint_url: Url,
    pub block_number_metric: String,
    pub request_timeout: Duration,
}

impl TryFrom<TopologySyncConfig> for SyncSettings {
    type Error = ConfigError;

    fn try_from(config: TopologySyncConfig) -> Result<Self, Self::Error> {
        let hostname = config
            .hostname
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .ok_or(ConfigError::MissingHostname)?;
        if config.port == 0 {
            return Err(ConfigError::MissingPort);
        }
        if config.valency < 1 {
            return Err(ConfigError::InvalidValency);
        }
        let output_path = config
            .topology_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::MissingTopologyPath)?;
        let prometheus_endpoint_url = config
            .prometheus_endpoint_url
            .filter(|u| !u.trim().is_empty())
            .ok_or(ConfigError::MissingPrometheusEndpoint)?;
        let prometheus_endpoint_url =
            Url::parse(prometheus_endpoint_url.trim()).map_err(|source| ConfigError::InvalidUrl {
                field: "prometheus_endpoint_url",
                source,
            })?;
        let clio_api_url = Url::parse(config.clio_api_url.trim()).map_err(|source| ConfigError::InvalidUrl {
            field: "clio_api_url",
            source,
        })?;

        Ok(Self {
            fetcher: TopologyFetcherConfig {
                output_path,
                fixed_path: config.fixed_topology_path.filter(|p| !p.as_os_str().is_empty()),
                max_peers: config.max_peers,
                network_magic: config.network_magic,
            },
            tip_updater: TipUpdaterConfig {
                endpoint: PeerEndpoint {
                    hostname,
                    port: config.port,
                    valency: config.valency,
                },
                network_magic: config.network_magic,
            },
            clio_api_url,
            prometheus_endpoint_url,
            block_number_metric: config.block_number_metric,
            request_timeout: config.request_timeout,
        })
    }
}

#[cfg(test)]
mod test {
    use clio_common::DefaultConfigLoader;

    use super::*;

    fn valid() -> TopologySyncConfig {
        TopologySyncConfig {
            hostname: Some("relay.example.com".to_string()),
            port: 3001,
            topology_path: Some(PathBuf::from("/opt/cardano/topology.json")),
            prometheus_endpoint_url: Some("http://127.0.0.1:12798/metrics".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn topology_sync_configuration() {
        const CONFIG: &str = r#"
[topology_sync]
hostname = "relay.example.com"
port = 6000
topology_path = "/opt/cardano/topology.json"
fixed_topology_path = "/opt/cardano/fixed.json"
prometheus_endpoint_url = "http://127.0.0.1:12798/metrics"
network_magic = 1097911063
request_timeout = 10
"#;
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Toml))
            .build()
            .unwrap();
        let config = TopologySyncConfig::load_from(&cfg).expect("Failed to load config");
        assert_eq!(config.port, 6000);
        assert_eq!(config.valency, 1);
        assert_eq!(config.max_peers, 10);
        assert_eq!(config.network_magic, 1097911063);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.clio_api_url, DEFAULT_CLIO_API_URL);

        let settings = SyncSettings::try_from(config).unwrap();
        assert_eq!(settings.fetcher.fixed_path, Some(PathBuf::from("/opt/cardano/fixed.json")));
        assert_eq!(settings.tip_updater.endpoint.port, 6000);
        assert_eq!(settings.tip_updater.network_magic, 1097911063);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let cfg = config::Config::builder()
            .set_override("topology_sync.max_peer", 5)
            .unwrap()
            .build()
            .unwrap();
        assert!(TopologySyncConfig::load_from(&cfg).is_err());
    }

    #[test]
    fn it_requires_the_relay_identity() {
        let config = TopologySyncConfig {
            hostname: Some("  ".to_string()),
            ..valid()
        };
        assert!(matches!(SyncSettings::try_from(config), Err(ConfigError::MissingHostname)));

        let config = TopologySyncConfig { port: 0, ..valid() };
        assert!(matches!(SyncSettings::try_from(config), Err(ConfigError::MissingPort)));

        let config = TopologySyncConfig { valency: 0, ..valid() };
        assert!(matches!(SyncSettings::try_from(config), Err(ConfigError::InvalidValency)));
    }

    #[test]
    fn it_requires_the_paths_and_urls() {
        let config = TopologySyncConfig {
            topology_path: None,
            ..valid()
        };
        assert!(matches!(
            SyncSettings::try_from(config),
            Err(ConfigError::MissingTopologyPath)
        ));

        let config = TopologySyncConfig {
            prometheus_endpoint_url: None,
            ..valid()
        };
        assert!(matches!(
            SyncSettings::try_from(config),
            Err(ConfigError::MissingPrometheusEndpoint)
        ));

        let config = TopologySyncConfig {
            prometheus_endpoint_url: Some("127.0.0.1:12798 metrics".to_string()),
            ..valid()
        };
        assert!(matches!(
            SyncSettings::try_from(config),
            Err(ConfigError::InvalidUrl {
                field: "prometheus_endpoint_url",
                ..
            })
        ));

        let config = TopologySyncConfig {
            clio_api_url: "not a url".to_string(),
            ..valid()
        };
        assert!(matches!(
            SyncSettings::try_from(config),
            Err(ConfigError::InvalidUrl { field: "clio_api_url", .. })
        ));
    }
}
