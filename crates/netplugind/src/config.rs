//! Daemon configuration.

use clap::Parser;
use tracing::warn;

/// netplugind - network-lifecycle plugin daemon.
#[derive(Debug, Clone, Parser)]
#[command(name = "netplugind", version, about)]
pub struct DaemonConfig {
    /// Host network adapter the backend binds transparent networks to.
    #[arg(long, default_value = "Ethernet0")]
    pub adapter: String,

    /// Control-plane API endpoint, host:port.
    #[arg(long, default_value = "127.0.0.1:8082")]
    pub controller: String,

    /// Auth URL of the control plane's identity service. Credentials
    /// themselves come from the environment, not the command line.
    #[arg(long, default_value = "")]
    pub auth_url: String,
}

impl DaemonConfig {
    /// Warns about empty settings the way an operator would want to hear
    /// about them before the first lifecycle call fails.
    pub fn warn_on_empty(&self) {
        if self.adapter.is_empty() {
            warn!("adapter is empty");
        }
        if self.controller.is_empty() {
            warn!("controller endpoint is empty");
        }
        if self.auth_url.is_empty() {
            warn!("auth URL is empty, control-plane calls will be unauthenticated");
        }
    }
}
