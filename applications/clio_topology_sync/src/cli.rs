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

use std::path::PathBuf;

use clap::Parser;
use clio_common::ConfigOverrideProvider;

use crate::common_cli_args::CommonCliArgs;

/// Keeps the topology of a Cardano relay in sync with the CLIO topology-updater service, and reports the relay's tip
/// to it.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonCliArgs,
    /// Create a default configuration file if it doesn't exist, then exit
    #[clap(long)]
    pub init: bool,
    /// The public hostname (IP address or DNS name) of this relay
    #[clap(long)]
    pub hostname: Option<String>,
    /// The public port of this relay
    #[clap(long)]
    pub port: Option<u16>,
    /// The valency of this relay [default: 1]
    #[clap(long)]
    pub valency: Option<u32>,
    /// The path of the topology file that is written
    #[clap(long)]
    pub topology_path: Option<PathBuf>,
    /// The path of a topology file whose producers are always included
    #[clap(long)]
    pub fixed_topology_path: Option<PathBuf>,
    /// The URL of the node's prometheus endpoint
    #[clap(long)]
    pub prometheus_endpoint_url: Option<String>,
    /// The number of peers that shall be fetched [default: 10]
    #[clap(long)]
    pub max_peers: Option<u32>,
    /// The magic number of the network [default: 764824073 (mainnet)]
    #[clap(long)]
    pub network_magic: Option<u32>,
}

impl ConfigOverrideProvider for Cli {
    fn get_config_property_overrides(&self) -> Vec<(String, String)> {
        let mut overrides = self.common.get_config_property_overrides();
        let mut set = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                overrides.push((format!("topology_sync.{}", key), value));
            }
        };
        set("hostname", self.hostname.clone());
        set("port", self.port.map(|p| p.to_string()));
        set("valency", self.valency.map(|v| v.to_string()));
        set(
            "topology_path",
            self.topology_path.as_ref().map(|p| p.to_string_lossy().to_string()),
        );
        set(
            "fixed_topology_path",
            self.fixed_topology_path
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
        );
        set("prometheus_endpoint_url", self.prometheus_endpoint_url.clone());
        set("max_peers", self.max_peers.map(|m| m.to_string()));
        set("network_magic", self.network_magic.map(|m| m.to_string()));
        overrides
    }
}
