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
    net::{IpAddr, Ipv4Addr},
    time::Duration,
};

use async_trait::async_trait;
use log::*;
use reqwest::Client;
use url::Url;

use super::{ApiResponse, ClioApi, PeerEndpoint};
use crate::{error::ClioApiError, topology::Topology};

const LOG_TARGET: &str = "clio::topology_sync::clio";

/// [`ClioApi`] over HTTP.
///
/// The service registers the source address of a tip report, so every connection is made over IPv4.
#[derive(Debug, Clone)]
pub struct HttpClioApi {
    base_url: Url,
    client: Client,
}

impl HttpClioApi {
    /// Creates a client whose connections and requests time out after `timeout`.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: Url, client: Client) -> Self {
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base>/fetch?max=<max_peers>&magic=<network_magic>`
    pub fn fetch_url(&self, max_peers: u32, network_magic: u32) -> Result<Url, ClioApiError> {
        let mut url = with_trailing_slash(&self.base_url).join("fetch")?;
        url.set_query(self.base_url.query());
        set_query_pairs(&mut url, &[
            ("max", max_peers.to_string()),
            ("magic", network_magic.to_string()),
        ]);
        Ok(url)
    }

    /// `<base>?blockNo=<n>&magic=<m>&hostname=<h>&port=<p>&valency=<v>`
    pub fn tip_url(&self, endpoint: &PeerEndpoint, block_number: u64, network_magic: u32) -> Url {
        let mut url = self.base_url.clone();
        set_query_pairs(&mut url, &[
            ("blockNo", block_number.to_string()),
            ("magic", network_magic.to_string()),
            ("hostname", endpoint.hostname.clone()),
            ("port", endpoint.port.to_string()),
            ("valency", endpoint.valency.to_string()),
        ]);
        url
    }

    async fn get(&self, url: Url) -> Result<Vec<u8>, ClioApiError> {
        trace!(target: LOG_TARGET, "GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        trace!(target: LOG_TARGET, "HTTP {} ({} bytes)", status, body.len());
        Ok(body.to_vec())
    }
}

#[async_trait]
impl ClioApi for HttpClioApi {
    async fn fetch_topology(&self, max_peers: u32, network_magic: u32) -> Result<Topology, ClioApiError> {
        let url = self.fetch_url(max_peers, network_magic)?;
        let body = self.get(url).await?;
        parse_fetch_response(&body)
    }

    async fn update_tip(
        &self,
        endpoint: &PeerEndpoint,
        block_number: u64,
        network_magic: u32,
    ) -> Result<(), ClioApiError> {
        let url = self.tip_url(endpoint, block_number, network_magic);
        let body = self.get(url).await?;
        let response = parse_status_response(&body)?;
        debug!(
            target: LOG_TARGET,
            "Tip report accepted ({}): {}", response.result_code, response.message
        );
        Ok(())
    }
}

/// Checks the result code of a fetch response and extracts the topology it carries.
pub fn parse_fetch_response(body: &[u8]) -> Result<Topology, ClioApiError> {
    parse_status_response(body)?;
    Ok(serde_json::from_slice(body)?)
}

/// Checks the result code of a response.
pub fn parse_status_response(body: &[u8]) -> Result<ApiResponse, ClioApiError> {
    let response: ApiResponse = serde_json::from_slice(body)?;
    response.clone().into_result()?;
    Ok(response)
}

/// Sets each key to its value, keeping every other pair the url already carries.
fn set_query_pairs(url: &mut Url, pairs: &[(&str, String)]) {
    let kept = url
        .query_pairs()
        .filter(|(k, _)| pairs.iter().all(|(key, _)| &**k != *key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect::<Vec<_>>();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
}

fn with_trailing_slash(url: &Url) -> Url {
    let mut url = url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
