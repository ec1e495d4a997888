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
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use config::{Config, Environment, File, FileFormat};
use log::*;

use crate::ConfigError;

pub mod error;
pub mod loader;
pub mod serializers;

const LOG_TARGET: &str = "clio::common::configuration";

/// Prefix of the environment variables that override configuration values, e.g.
/// `CLIO_TOPOLOGY_SYNC__HOSTNAME=relay.example.com`.
pub const ENV_PREFIX: &str = "CLIO";

/// Implemented by command line argument structs that map flags onto configuration keys.
pub trait ConfigOverrideProvider {
    /// Returns `(key, value)` pairs that take precedence over every other configuration source.
    fn get_config_property_overrides(&self) -> Vec<(String, String)>;
}

/// Overrides nothing.
impl ConfigOverrideProvider for () {
    fn get_config_property_overrides(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// Loads the configuration file at `config_path`, layering environment variables and the overrides on top.
///
/// If the file does not exist and `create_if_not_exists` is set, the default configuration preset is written to
/// `config_path` first. A missing file is not an error: every value then comes from the environment, the overrides or
/// the application defaults.
pub fn load_configuration<P: AsRef<Path>, TOverride: ConfigOverrideProvider>(
    config_path: P,
    create_if_not_exists: bool,
    overrides: &TOverride,
) -> Result<Config, ConfigError> {
    let config_path = config_path.as_ref();
    if !config_path.exists() && create_if_not_exists {
        write_default_config_to(config_path)
            .map_err(|io| ConfigError::new("Could not create default config", Some(io.to_string())))?;
        info!(
            target: LOG_TARGET,
            "Installed default configuration file at {}",
            config_path.display()
        );
    }

    debug!(target: LOG_TARGET, "Loading configuration file from {}", config_path.display());
    let mut builder = Config::builder()
        .add_source(File::from(config_path).format(FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

    for (key, value) in overrides.get_config_property_overrides() {
        trace!(target: LOG_TARGET, "Config override: {} = {}", key, value);
        builder = builder
            .set_override(key.as_str(), value)
            .map_err(|ce| ConfigError::new("Invalid config override", Some(ce.to_string())))?;
    }

    builder
        .build()
        .map_err(|ce| ConfigError::new("Could not build config", Some(ce.to_string())))
}

/// The default configuration file contents.
pub fn default_config_preset() -> &'static str {
    include_str!("../config/presets/topology_sync.toml")
}

/// Installs a new configuration file template, copied from the bundled preset, to the given path.
pub fn write_default_config_to<P: AsRef<Path>>(path: P) -> Result<(), std::io::Error> {
    let path = path.as_ref();
    if let Some(d) = path.parent() {
        fs::create_dir_all(d)?
    };
    let mut file = fs::File::create(path)?;
    file.write_all(default_config_preset().as_bytes())
}

/// Resolves `path` against `base_path` unless it is already absolute.
pub fn resolve_path<P: AsRef<Path>, B: AsRef<Path>>(path: P, base_path: B) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_path.as_ref().join(path)
    }
}
