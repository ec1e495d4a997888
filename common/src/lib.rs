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

//! # Common logging and configuration utilities
//!
//! ## The configuration file
//!
//! A single configuration file (usually `~/.clio/config/config.toml`) holds the settings of the topology sync
//! application.
//!
//! Setting of configuration parameters is applied using the following order of precedence:
//!
//! 1. Command-line argument
//! 2. Environment variable (`CLIO_<SECTION>__<KEY>`)
//! 3. `config.toml` file value
//! 4. Configuration default
//!
//! ### Example - Loading a section of the config file
//!
//! ```
//! # use config::Config;
//! # use serde::{Deserialize, Serialize};
//! # use clio_common::{DefaultConfigLoader, SubConfigPath};
//! #[derive(Default, Serialize, Deserialize)]
//! struct RelayConfig {
//!     hostname: Option<String>,
//! }
//! impl SubConfigPath for RelayConfig {
//!     fn main_key_prefix() -> &'static str {
//!         "relay"
//!     }
//! }
//!
//! let config = Config::builder()
//!     .set_override("relay.hostname", "relay.example.com")
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! let relay = <RelayConfig as DefaultConfigLoader>::load_from(&config).unwrap();
//! assert_eq!(relay.hostname.as_deref(), Some("relay.example.com"));
//! ```

pub mod configuration;
pub mod dir_utils;
pub mod exit_codes;
pub mod logging;

pub use configuration::{
    error::ConfigError,
    loader::{ConfigurationError, DefaultConfigLoader, SubConfigPath},
    load_configuration,
    ConfigOverrideProvider,
};
pub use logging::initialize_logging;

pub const DEFAULT_CONFIG: &str = "config/config.toml";
pub const DEFAULT_LOG_CONFIG: &str = "log4rs.yml";
