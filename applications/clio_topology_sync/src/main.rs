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

use std::{io::stdout, process};

use clap::Parser;
use clio_common::{exit_codes::ExitError, initialize_logging, load_configuration, DefaultConfigLoader};
use clio_shutdown::Shutdown;
use clio_topology_sync::{
    config::{SyncSettings, TopologySyncConfig},
    run_topology_sync,
    Cli,
};
use crossterm::{execute, terminal::SetTitle};
use log::*;
use tokio::{runtime, signal, task};

const LOG_TARGET: &str = "clio::topology_sync::app";

fn main() {
    if let Err(err) = main_inner() {
        eprintln!("{}", err);
        eprintln!("{}", err.exit_code.hint());
        error!(
            target: LOG_TARGET,
            "Exiting with code ({}): {:?}",
            err.exit_code.as_i32(),
            err
        );
        process::exit(err.exit_code.as_i32());
    }
}

fn main_inner() -> Result<(), ExitError> {
    let terminal_title = format!("CLIO Topology Sync - Version {}", env!("CARGO_PKG_VERSION"));
    if let Err(e) = execute!(stdout(), SetTitle(terminal_title.as_str())) {
        println!("Error setting terminal title. {}", e)
    }

    let cli = Cli::parse();
    initialize_logging(
        &cli.common.log_config_path("topology_sync"),
        &cli.common.get_base_path(),
        include_str!("../log4rs_sample.yml"),
    )?;

    let config_path = cli.common.config_path();
    let cfg = load_configuration(&config_path, true, &cli)?;
    if cli.init {
        info!(
            target: LOG_TARGET,
            "Default configuration created at {}. Done.",
            config_path.display()
        );
        return Ok(());
    }

    let config = <TopologySyncConfig as DefaultConfigLoader>::load_from(&cfg)?;
    debug!(target: LOG_TARGET, "Using configuration: {:?}", config);
    let settings = SyncSettings::try_from(config)?;

    let runtime = runtime::Builder::new_multi_thread().enable_all().build()?;
    let mut shutdown = Shutdown::new();
    let shutdown_signal = shutdown.to_signal();

    runtime.block_on(async move {
        task::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => info!(target: LOG_TARGET, "Interrupt received, shutting down"),
                Err(err) => {
                    error!(target: LOG_TARGET, "Unable to listen for the interrupt signal: {}", err);
                    // Dropping `shutdown` would stop the loops as well
                    std::future::pending::<()>().await;
                },
            }
            shutdown.trigger();
        });
        run_topology_sync(settings, shutdown_signal).await
    })
}
