//! Managed-network lifecycle under the reserved naming scheme.

use crate::api::{BackendApi, BackendNetwork, BackendPort, BackendSubnet};
use crate::error::{BackendError, BackendResult};
use std::net::IpAddr;
use tracing::{debug, info, instrument};
use vnet_types::IpPrefix;

/// Reserved first field of every managed backend network name.
pub const NETWORK_NAME_PREFIX: &str = "vnet";

/// Network type requested from the switch for managed networks.
pub const NETWORK_TYPE_TRANSPARENT: &str = "transparent";

/// Deterministic backend network name: `"<prefix>:<tenant>:<network>"`.
pub fn backend_network_name(tenant: &str, network: &str) -> String {
    format!("{NETWORK_NAME_PREFIX}:{tenant}:{network}")
}

/// Inverse of [`backend_network_name`].
///
/// Accepts only the reserved schema: the prefix token plus exactly two
/// further colon-delimited fields. Anything else belongs to somebody else's
/// network and returns `None`.
pub fn parse_backend_network_name(name: &str) -> Option<(&str, &str)> {
    let mut fields = name.split(':');
    let prefix = fields.next()?;
    let tenant = fields.next()?;
    let network = fields.next()?;
    if prefix != NETWORK_NAME_PREFIX || fields.next().is_some() {
        return None;
    }
    Some((tenant, network))
}

/// Lifecycle operations for managed virtual networks and their ports.
pub struct BackendManager<A: BackendApi> {
    api: A,
}

impl<A: BackendApi> BackendManager<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Returns the underlying API handle.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Creates the backend network for `(tenant, network)`.
    ///
    /// Fails `AlreadyExists` if a network with the computed name is already
    /// on the host; otherwise creates it bound to `adapter` and returns the
    /// record fetched back from the switch.
    #[instrument(skip(self))]
    pub async fn create_network(
        &self,
        adapter: &str,
        tenant: &str,
        network: &str,
        subnet: &IpPrefix,
        gateway: IpAddr,
    ) -> BackendResult<BackendNetwork> {
        let name = backend_network_name(tenant, network);

        if self.find_network_record(&name).await?.is_some() {
            return Err(BackendError::already_exists(&name));
        }

        let config = BackendNetwork {
            id: String::new(),
            name: name.clone(),
            kind: NETWORK_TYPE_TRANSPARENT.to_string(),
            adapter: adapter.to_string(),
            subnets: vec![BackendSubnet {
                prefix: *subnet,
                gateway,
            }],
        };

        let id = self.api.create_network(&config).await?;
        info!(%name, %id, "created backend network");

        self.api.get_network(&id).await
    }

    /// Looks up the managed network for `(tenant, network)`.
    #[instrument(skip(self))]
    pub async fn get_network(&self, tenant: &str, network: &str) -> BackendResult<BackendNetwork> {
        let name = backend_network_name(tenant, network);
        self.find_network_record(&name)
            .await?
            .ok_or_else(|| BackendError::not_found(&name))
    }

    /// Deletes the managed network for `(tenant, network)`.
    ///
    /// Refuses with `HasActiveEndpoints` while any port still references the
    /// network.
    #[instrument(skip(self))]
    pub async fn delete_network(&self, tenant: &str, network: &str) -> BackendResult<()> {
        let record = self.get_network(tenant, network).await?;

        let ports = self
            .api
            .list_ports()
            .await?
            .into_iter()
            .filter(|port| port.network == record.name)
            .count();
        if ports > 0 {
            return Err(BackendError::HasActiveEndpoints {
                network: record.name,
                ports,
            });
        }

        self.api.delete_network(&record.id).await?;
        info!(name = %record.name, "deleted backend network");
        Ok(())
    }

    /// Lists the managed networks on the host.
    ///
    /// Only names matching the reserved schema exactly are returned; the
    /// host's unrelated networks are ignored.
    pub async fn list_networks(&self) -> BackendResult<Vec<BackendNetwork>> {
        let networks = self.api.list_networks().await?;
        Ok(networks
            .into_iter()
            .filter(|network| parse_backend_network_name(&network.name).is_some())
            .collect())
    }

    /// Creates a port from the given configuration and returns its id.
    #[instrument(skip(self, config), fields(name = %config.name, network = %config.network))]
    pub async fn create_port(&self, config: &BackendPort) -> BackendResult<String> {
        let id = self.api.create_port(config).await?;
        info!(name = %config.name, %id, "created backend port");
        Ok(id)
    }

    /// Looks up a port by name (the orchestrator's endpoint id).
    pub async fn find_port(&self, name: &str) -> BackendResult<Option<BackendPort>> {
        let ports = self.api.list_ports().await?;
        Ok(ports.into_iter().find(|port| port.name == name))
    }

    /// Deletes the port with the given name; `NotFound` if absent.
    #[instrument(skip(self))]
    pub async fn delete_port(&self, name: &str) -> BackendResult<()> {
        let port = self
            .find_port(name)
            .await?
            .ok_or_else(|| BackendError::not_found(name))?;
        self.api.delete_port(&port.id).await?;
        debug!(%name, "deleted backend port");
        Ok(())
    }

    async fn find_network_record(&self, name: &str) -> BackendResult<Option<BackendNetwork>> {
        let networks = self.api.list_networks().await?;
        Ok(networks.into_iter().find(|network| network.name == name))
    }
}
