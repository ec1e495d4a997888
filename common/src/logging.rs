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
    path::{Path, PathBuf},
};

use crate::ConfigError;

/// Set up application-level logging using the Log4rs configuration file at `config_file`.
///
/// If the file does not exist, `default_log_config` is written there first with every `{{log_dir}}` placeholder
/// replaced by `<base_path>/log`.
pub fn initialize_logging(config_file: &Path, base_path: &Path, default_log_config: &str) -> Result<(), ConfigError> {
    println!("Initializing logging according to {:?}", config_file);

    if !config_file.exists() {
        install_default_logfile_config(config_file, base_path, default_log_config)?;
    }

    log4rs::init_file(config_file, Default::default())
        .map_err(|e| ConfigError::new("Could not initialize logging", Some(e.to_string())))
}

/// Writes the default log configuration to `path`, pointing its log files at `<base_path>/log`.
pub fn install_default_logfile_config(
    path: &Path,
    base_path: &Path,
    default_log_config: &str,
) -> Result<(), ConfigError> {
    if let Some(d) = path.parent() {
        fs::create_dir_all(d)
            .map_err(|e| ConfigError::new("Could not create log config directory", Some(e.to_string())))?;
    }
    fs::write(path, render_log_config(base_path, default_log_config))
        .map_err(|e| ConfigError::new("Could not create default log config", Some(e.to_string())))
}

fn render_log_config(base_path: &Path, template: &str) -> String {
    let log_dir: PathBuf = base_path.join("log");
    // log4rs expects forward slashes on every platform
    let log_dir = log_dir.to_string_lossy().replace('\\', "/");
    template.replace("{{log_dir}}", &log_dir)
}
