//! netplugind - network-lifecycle plugin daemon.
//!
//! Bridges the SDN control plane and the host virtual switch for the
//! container orchestrator's network lifecycle callbacks.

use clap::Parser;
use netplugind::DaemonConfig;
use std::process::ExitCode;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let config = DaemonConfig::parse();
    info!("--- Starting netplugind ---");
    info!(adapter = %config.adapter, controller = %config.controller, "loaded configuration");
    config.warn_on_empty();

    // TODO: wire the plugin transport (request framing and serving) to a
    // NetDriver once the transport crate lands; the lifecycle core is
    // complete and covered by the integration suites.

    ExitCode::SUCCESS
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();
}
