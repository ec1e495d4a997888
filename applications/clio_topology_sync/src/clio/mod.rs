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

//! Client of the CLIO topology-updater service.
//!
//! The service hands out a list of recommended peers for a relay ([`ClioApi::fetch_topology`]) and keeps track of the
//! relays that regularly report their tip ([`ClioApi::update_tip`]).

mod http;

use std::fmt;

use async_trait::async_trait;
pub use http::HttpClioApi;
use serde::Deserialize;

use crate::{error::ClioApiError, topology::Topology};

/// The default base URL of the CLIO topology-updater API.
pub const DEFAULT_CLIO_API_URL: &str = "https://api.clio.one/htopology/v1/";

/// The public identity of this relay as it is registered with the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerEndpoint {
    pub hostname: String,
    pub port: u16,
    pub valency: u32,
}

impl fmt::Display for PeerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hostname, self.port)
    }
}

#[async_trait]
pub trait ClioApi: Send + Sync {
    /// Fetches at most `max_peers` recommended peers for the network identified by `network_magic`.
    async fn fetch_topology(&self, max_peers: u32, network_magic: u32) -> Result<Topology, ClioApiError>;

    /// Reports the current block number of the relay at `endpoint`.
    async fn update_tip(
        &self,
        endpoint: &PeerEndpoint,
        block_number: u64,
        network_magic: u32,
    ) -> Result<(), ClioApiError>;
}

/// Outcome class of a call to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultClass {
    Success,
    /// The service answered with a non-success result code
    ApplicationError,
    /// The request failed or the response could not be understood
    TransportError,
}

/// The status part that every response of the service carries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    #[serde(rename = "resultcode", default)]
    pub result_code: String,
    #[serde(rename = "msg", default)]
    pub message: String,
}

impl ApiResponse {
    pub fn result_class(&self) -> ResultClass {
        if self.result_code.starts_with('2') {
            ResultClass::Success
        } else {
            ResultClass::ApplicationError
        }
    }

    /// Turns a non-success result code into an error.
    pub fn into_result(self) -> Result<(), ClioApiError> {
        match self.result_class() {
            ResultClass::Success => Ok(()),
            _ => Err(ClioApiError::Status {
                code: self.result_code,
                message: self.message,
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn result_codes_starting_with_2_are_successful() {
        let ok: ApiResponse = serde_json::from_str(r#"{"resultcode":"201","msg":"welcome to the topology"}"#).unwrap();
        assert_eq!(ok.result_class(), ResultClass::Success);
        assert!(ok.into_result().is_ok());

        let denied: ApiResponse = serde_json::from_str(r#"{"resultcode":"403","msg":"not allowed"}"#).unwrap();
        assert_eq!(denied.result_class(), ResultClass::ApplicationError);
        let err = denied.into_result().unwrap_err();
        assert_eq!(err.result_class(), ResultClass::ApplicationError);

        let empty: ApiResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.result_class(), ResultClass::ApplicationError);
    }

    #[test]
    fn endpoint_displays_as_host_and_port() {
        let endpoint = PeerEndpoint {
            hostname: "relay.example.com".to_string(),
            port: 3001,
            valency: 1,
        };
        assert_eq!(endpoint.to_string(), "relay.example.com:3001");
    }
}
