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

#[derive(Debug)]
pub struct ConfigError {
    pub cause: &'static str,
    pub source: Option<String>,
}

impl ConfigError {
    pub fn new(cause: &'static str, source: Option<String>) -> Self {
        Self { cause, source }
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cause)?;
        if let Some(ref source) = self.source {
            write!(f, ": {}", source)?
        }

        Ok(())
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        Self {
            cause: "Failed to load configuration",
            source: Some(err.to_string()),
        }
    }
}

impl From<super::loader::ConfigurationError> for ConfigError {
    fn from(err: super::loader::ConfigurationError) -> Self {
        Self {
            cause: "Invalid configuration",
            source: Some(err.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn config_error_test() {
        let config_error = ConfigError::new("testing", Some(String::from("coverage")));
        assert_eq!(format!("{}", config_error), "testing: coverage");

        let config_error = ConfigError::new("no source", None);
        assert_eq!(format!("{}", config_error), "no source");

        let not_found = config::ConfigError::NotFound("topology_sync.hostname".to_string());
        let not_found_str = not_found.to_string();
        let new_config_error = ConfigError::from(not_found);
        assert_eq!(new_config_error.cause, "Failed to load configuration");
        assert_eq!(new_config_error.source, Some(not_found_str));
    }
}
