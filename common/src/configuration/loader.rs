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

//! # Application configuration
//!
//! Configuration is held in a [`config::Config`] that may carry settings for several applications, each under its own
//! section. An application configuration struct implements [`Deserialize`][serde::Deserialize] and [`SubConfigPath`]
//! to name its section, and is then loaded with [`DefaultConfigLoader::load_from`], which fills every value that is
//! not present in the section from the struct's [`Default`] implementation, so that a configuration file only needs
//! to mention the values that differ.
//!
//! ## Example
//!
//! ```
//! # use config::Config;
//! # use serde::{Deserialize, Serialize};
//! # use clio_common::{DefaultConfigLoader, SubConfigPath};
//! #[derive(Serialize, Deserialize)]
//! struct MyNodeConfig {
//!     welcome_message: String,
//!     goodbye_message: String,
//! }
//! impl Default for MyNodeConfig {
//!     fn default() -> Self {
//!         Self {
//!             welcome_message: "welcome".into(),
//!             goodbye_message: "bye bye".into(),
//!         }
//!     }
//! }
//! impl SubConfigPath for MyNodeConfig {
//!     fn main_key_prefix() -> &'static str {
//!         "my_node"
//!     }
//! }
//! let config = Config::builder()
//!     .set_override("my_node.goodbye_message", "see you later")
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! let my_config = <MyNodeConfig as DefaultConfigLoader>::load_from(&config).unwrap();
//! assert_eq!(my_config.goodbye_message, "see you later".to_string());
//! assert_eq!(my_config.welcome_message, MyNodeConfig::default().welcome_message);
//! ```

use std::fmt::{Display, Formatter};

use config::{Config, Value};
use serde::{de::DeserializeOwned, Serialize};

//---------------------------------------    DefaultConfigLoader trait    ---------------------------------------//

/// Names the configuration section an application struct is loaded from.
pub trait SubConfigPath {
    /// Main configuration section
    fn main_key_prefix() -> &'static str;
}

/// Configuration loader for a [`SubConfigPath`] section with Defaults
///
/// The section does not need to be present at all, in which case the struct's `Default` is returned.
pub trait DefaultConfigLoader: SubConfigPath + Default + Serialize + DeserializeOwned {
    /// Try to load configuration from supplied Config by `main_key_prefix()`
    ///
    /// Default values will be taken from Default impl for struct
    fn load_from(config: &Config) -> Result<Self, ConfigurationError> {
        let default = <Self as Default>::default();
        let buf = serde_json::to_string(&default)?;
        let value: Value = serde_json::from_str(buf.as_str())?;
        let merger = Config::builder()
            .set_default(Self::main_key_prefix(), value)?
            .add_source(config.clone())
            .build()?;
        let final_value: Value = merger.get(Self::main_key_prefix())?;
        final_value
            .try_deserialize()
            .map_err(|ce| ConfigurationError::new(Self::main_key_prefix(), &ce.to_string()))
    }
}
impl<C> DefaultConfigLoader for C where C: SubConfigPath + Default + Serialize + DeserializeOwned {}

//-------------------------------------      Configuration errors      --------------------------------------//

#[derive(Debug)]
pub struct ConfigurationError {
    field: String,
    message: String,
}

impl ConfigurationError {
    pub fn new(field: &str, msg: &str) -> Self {
        ConfigurationError {
            field: String::from(field),
            message: String::from(msg),
        }
    }
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "Invalid value for {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigurationError {}

impl From<config::ConfigError> for ConfigurationError {
    fn from(err: config::ConfigError) -> Self {
        use config::ConfigError;
        match err {
            ConfigError::FileParse { uri: Some(uri), cause } => Self {
                field: uri,
                message: cause.to_string(),
            },
            ConfigError::Type { ref key, .. } => Self {
                field: key.clone().unwrap_or_default(),
                message: err.to_string(),
            },
            ConfigError::NotFound(key) => Self {
                field: key,
                message: "required key not found".to_string(),
            },
            x => Self::new("", x.to_string().as_str()),
        }
    }
}

impl From<serde_json::error::Error> for ConfigurationError {
    fn from(err: serde_json::error::Error) -> Self {
        Self {
            field: "".to_string(),
            message: err.to_string(),
        }
    }
}
