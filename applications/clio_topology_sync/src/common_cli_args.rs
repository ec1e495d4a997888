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

use std::{error::Error, path::PathBuf};

use clap::Args;
use clio_common::{configuration::resolve_path, ConfigOverrideProvider};

#[derive(Args, Debug)]
pub struct CommonCliArgs {
    /// A path to a directory to store your files
    #[clap(
        short,
        long,
        aliases = &["base_path", "base_dir", "base-dir"],
        default_value_t= defaults::base_path(),
        env = "CLIO_BASE_DIR"
    )]
    pub base_path: String,
    /// A path to the configuration file to use (config.toml)
    #[clap(short, long, default_value_t= defaults::config())]
    pub config: String,
    /// The path to the log configuration file
    #[clap(short, long, alias = "log_config")]
    pub log_config: Option<PathBuf>,

    /// Overrides for properties in the config file, e.g. -p topology_sync.max_peers=15
    #[clap(short = 'p', parse(try_from_str = parse_key_val), multiple_occurrences(true))]
    pub config_property_overrides: Vec<(String, String)>,
}

// Taken from clap examples
/// Parse a single key-value pair
fn parse_key_val<T, U>(s: &str) -> Result<(T, U), Box<dyn Error + Send + Sync + 'static>>
where
    T: std::str::FromStr,
    T::Err: Error + Send + Sync + 'static,
    U: std::str::FromStr,
    U::Err: Error + Send + Sync + 'static,
{
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid override: expected key=value: no `=` found in `{}`", s))?;
    let k = k.trim();
    if k.is_empty() {
        return Err(format!("invalid override: empty key in `{}`", s).into());
    }
    Ok((k.parse()?, v.trim().parse()?))
}

impl CommonCliArgs {
    pub fn config_path(&self) -> PathBuf {
        resolve_path(&self.config, self.get_base_path())
    }

    pub fn get_base_path(&self) -> PathBuf {
        PathBuf::from(&self.base_path)
    }

    pub fn log_config_path(&self, application_name: &str) -> PathBuf {
        match self.log_config {
            Some(ref log_config) => resolve_path(log_config, self.get_base_path()),
            None => self
                .get_base_path()
                .join("config")
                .join(application_name)
                .join(clio_common::DEFAULT_LOG_CONFIG),
        }
    }
}

impl ConfigOverrideProvider for CommonCliArgs {
    fn get_config_property_overrides(&self) -> Vec<(String, String)> {
        self.config_property_overrides.clone()
    }
}

mod defaults {
    use clio_common::{dir_utils, DEFAULT_CONFIG};

    pub(super) fn base_path() -> String {
        dir_utils::default_base_path().to_string_lossy().to_string()
    }

    pub(super) fn config() -> String {
        DEFAULT_CONFIG.to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_parses_property_overrides() {
        let (k, v): (String, String) = parse_key_val("topology_sync.clio_api_url = http://a/b?c=d").unwrap();
        assert_eq!(k, "topology_sync.clio_api_url");
        assert_eq!(v, "http://a/b?c=d");

        assert!(parse_key_val::<String, String>("topology_sync.port").is_err());
        assert!(parse_key_val::<String, String>("=3001").is_err());
    }
}
