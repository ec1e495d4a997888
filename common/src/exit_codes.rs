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

use std::fmt;

use thiserror::Error;

use crate::{ConfigError, ConfigurationError};

#[derive(Debug, Clone, Error)]
#[error("{exit_code}{}", .details.as_ref().map(|d| format!(" {}", d)).unwrap_or_default())]
pub struct ExitError {
    pub exit_code: ExitCode,
    pub details: Option<String>,
}

impl ExitError {
    pub fn new<T: fmt::Display>(exit_code: ExitCode, details: T) -> Self {
        let details = Some(details.to_string());
        Self { exit_code, details }
    }
}

impl From<ConfigError> for ExitError {
    fn from(err: ConfigError) -> Self {
        Self::new(ExitCode::ConfigError, err)
    }
}

impl From<ConfigurationError> for ExitError {
    fn from(err: ConfigurationError) -> Self {
        Self::new(ExitCode::ConfigError, err)
    }
}

impl From<std::io::Error> for ExitError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ExitCode::IOError, err)
    }
}

const TROUBLESHOOTING_HINT: &str = "Please check the log files (in <base_path>/log) for more detail.";

impl ExitCode {
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    pub fn hint(&self) -> &str {
        use ExitCode::*;
        match self {
            ConfigError => "Check the configuration file and the command line flags for invalid values.",
            NetworkError => "Check that this host can reach the CLIO API and the Prometheus endpoint.",
            _ => TROUBLESHOOTING_HINT,
        }
    }
}

/// Enum to show failure information
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ExitCode {
    #[error("There is an error in the configuration.")]
    ConfigError = 101,
    #[error("The application exited because an unknown error occurred. Check the logs for more details.")]
    UnknownError = 102,
    #[error("IO error.")]
    IOError = 108,
    #[error("The application exited because of an internal network error.")]
    NetworkError = 110,
}
