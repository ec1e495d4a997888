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

use clio_common::exit_codes::{ExitCode, ExitError};
use thiserror::Error;

use crate::clio::ResultClass;

/// Failure of a single call to the CLIO API.
#[derive(Debug, Error)]
pub enum ClioApiError {
    #[error("Request to the CLIO API failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("The CLIO API responded with result code {code}: {message}")]
    Status { code: String, message: String },
    #[error("Could not decode the CLIO API response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid CLIO API url: {0}")]
    Url(#[from] url::ParseError),
}

impl ClioApiError {
    pub fn result_class(&self) -> ResultClass {
        match self {
            ClioApiError::Status { .. } => ResultClass::ApplicationError,
            ClioApiError::Transport(_) | ClioApiError::Decode(_) | ClioApiError::Url(_) => ResultClass::TransportError,
        }
    }
}

#[derive(Debug, Error)]
pub enum TopologyFileError {
    #[error("Couldn't read topology from file at path '{path}': {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("Couldn't parse topology in file at path '{path}': {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("Couldn't encode topology (size: {size}): {source}")]
    Encode { size: usize, source: serde_json::Error },
    #[error("Couldn't write topology (size: {size}) to file at path '{path}': {source}")]
    Write {
        size: usize,
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Failure to determine the current block number of the local node.
#[derive(Debug, Error)]
pub enum TipScrapeError {
    #[error("Prometheus endpoint is unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("Could not read the prometheus response body: {0}")]
    Body(#[source] reqwest::Error),
    #[error("Metric '{0}' is not exposed by the prometheus endpoint")]
    MissingMetric(String),
    #[error("Metric '{metric}' has a value that is not a block number: '{value}'")]
    InvalidValue { metric: String, value: String },
}

/// Invalid topology sync settings, detected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("The hostname of this relay must be specified")]
    MissingHostname,
    #[error("The port of this relay must be specified and must not be 0")]
    MissingPort,
    #[error("The valency must be at least 1")]
    InvalidValency,
    #[error("The path of the topology file must be specified")]
    MissingTopologyPath,
    #[error("The URL of the prometheus endpoint must be specified")]
    MissingPrometheusEndpoint,
    #[error("Invalid URL for {field}: {source}")]
    InvalidUrl {
        field: &'static str,
        source: url::ParseError,
    },
    #[error("Could not create the HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl From<ConfigError> for ExitError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::HttpClient(_) => ExitError::new(ExitCode::NetworkError, err),
            _ => ExitError::new(ExitCode::ConfigError, err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_errors_are_application_errors() {
        let err = ClioApiError::Status {
            code: "403".to_string(),
            message: "forbidden".to_string(),
        };
        assert_eq!(err.result_class(), ResultClass::ApplicationError);
        assert_eq!(err.to_string(), "The CLIO API responded with result code 403: forbidden");

        let err = ClioApiError::from(serde_json::from_str::<u8>("x").unwrap_err());
        assert_eq!(err.result_class(), ResultClass::TransportError);
    }

    #[test]
    fn invalid_settings_exit_with_the_config_code() {
        let exit = ExitError::from(ConfigError::MissingPort);
        assert_eq!(exit.exit_code, ExitCode::ConfigError);
        assert!(exit.details.unwrap().contains("port"));
    }
}
