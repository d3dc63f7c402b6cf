//! The network-lifecycle driver.

use crate::error::{DriverError, DriverResult};
use crate::messages::{
    CapabilitiesResponse, CreateEndpointRequest, CreateEndpointResponse, CreateNetworkRequest,
    DeleteEndpointRequest, DeleteNetworkRequest, JoinRequest, JoinResponse, LeaveRequest,
    SCOPE_LOCAL,
};
use crate::options::NetworkOptions;
use crate::orchestrator::OrchestratorApi;
use crate::reconcile;
use std::collections::HashSet;
use tracing::{debug, error, info, instrument, warn};
use vnet_backend::{parse_backend_network_name, BackendApi, BackendError, BackendManager, BackendPort};
use vnet_graph::{GraphApi, GraphClient, GraphError};

/// Stateless coordinator implementing the orchestrator's network lifecycle
/// contract.
///
/// Per endpoint the contract is a small state machine: absent → provisioned
/// (`create_endpoint`) → joined (`join`) → provisioned (`leave`) → absent
/// (`delete_endpoint`). Join and leave only validate presence and surface
/// gateway information; create/delete are the only mutating transitions, and
/// they mutate the two stores independently with no compensating rollback.
/// A retried call converges through the idempotent find-or-create layer.
///
/// The driver holds no state of its own; identity is re-derived from the
/// request and the orchestrator's records on every call.
pub struct NetDriver<G, B, O>
where
    G: GraphApi,
    B: BackendApi,
    O: OrchestratorApi,
{
    graph: GraphClient<G>,
    backend: BackendManager<B>,
    orchestrator: O,
    adapter: String,
}

impl<G, B, O> NetDriver<G, B, O>
where
    G: GraphApi,
    B: BackendApi,
    O: OrchestratorApi,
{
    pub fn new(graph: G, backend: B, orchestrator: O, adapter: impl Into<String>) -> Self {
        Self {
            graph: GraphClient::new(graph),
            backend: BackendManager::new(backend),
            orchestrator,
            adapter: adapter.into(),
        }
    }

    /// Returns the control-plane client handle.
    pub fn graph(&self) -> &GraphClient<G> {
        &self.graph
    }

    /// Returns the backend manager handle.
    pub fn backend(&self) -> &BackendManager<B> {
        &self.backend
    }

    /// Returns the orchestrator record handle.
    pub fn orchestrator(&self) -> &O {
        &self.orchestrator
    }

    /// Driver capabilities: networks are scoped to this host.
    pub fn capabilities(&self) -> CapabilitiesResponse {
        CapabilitiesResponse {
            scope: SCOPE_LOCAL.to_string(),
        }
    }

    /// Provisions the backend network for an orchestrator network.
    ///
    /// The control-plane network must already exist (it is the operator's
    /// object); this call mirrors it onto the host switch.
    #[instrument(skip(self, request), fields(network_id = %request.network_id))]
    pub async fn create_network(&self, request: &CreateNetworkRequest) -> DriverResult<()> {
        let opts = NetworkOptions::from_request(&request.options)?;
        info!(tenant = %opts.tenant, network = %opts.network, "creating network");

        let network = self.graph.find_network(&opts.tenant, &opts.network).await?;
        let subnet = self.graph.resolve_subnet(&network, &request.ipam_pool)?;
        let gateway = self.graph.default_gateway(subnet)?;

        self.backend
            .create_network(&self.adapter, &opts.tenant, &opts.network, &subnet.prefix, gateway)
            .await?;
        Ok(())
    }

    /// Removes the backend network for a deleted orchestrator network.
    ///
    /// Two paths: while the orchestrator record is still resolvable its tags
    /// name the backend network directly. When the record is already gone by
    /// the time this runs, the surviving tag sets are compared and the
    /// orphaned backend network is removed instead. Either way only networks
    /// without active ports are deleted; the backend manager enforces that.
    #[instrument(skip(self, request), fields(network_id = %request.network_id))]
    pub async fn delete_network(&self, request: &DeleteNetworkRequest) -> DriverResult<()> {
        match self.orchestrator.network(&request.network_id).await? {
            Some(record) => {
                let opts = NetworkOptions::from_record(&record)?;
                info!(tenant = %opts.tenant, network = %opts.network, "deleting network");
                self.backend
                    .delete_network(&opts.tenant, &opts.network)
                    .await?;
                Ok(())
            }
            None => self.reconcile_networks(&request.network_id).await,
        }
    }

    /// Reconciliation path of [`delete_network`](Self::delete_network): the
    /// record is gone, so diff the tag sets and remove the first orphan.
    async fn reconcile_networks(&self, network_id: &str) -> DriverResult<()> {
        debug!(%network_id, "record already gone, reconciling backend networks");

        let mut live = HashSet::new();
        for record in self.orchestrator.networks().await? {
            match NetworkOptions::from_record(&record) {
                Ok(opts) => {
                    live.insert(opts.pair());
                }
                // networks of other drivers carry no tags; skip them
                Err(_) => debug!(id = %record.id, "record carries no identity tags"),
            }
        }

        let backend_pairs: Vec<(String, String)> = self
            .backend
            .list_networks()
            .await?
            .iter()
            .filter_map(|network| parse_backend_network_name(&network.name))
            .map(|(tenant, network)| (tenant.to_string(), network.to_string()))
            .collect();

        let orphans = reconcile::orphaned_pairs(&live, &backend_pairs);
        match orphans.first() {
            Some((tenant, network)) => {
                info!(%tenant, %network, "removing orphaned backend network");
                self.backend.delete_network(tenant, network).await?;
                Ok(())
            }
            None => {
                warn!(%network_id, "no orphaned backend network to remove");
                Ok(())
            }
        }
    }

    /// Provisions an endpoint in both stores and reports its address/MAC.
    ///
    /// Control-plane objects are created first (instance, interface, address
    /// allocation), then the backend port. A failing step aborts with that
    /// error and rolls nothing back: the next attempt reuses whatever was
    /// already created.
    ///
    /// Known limitation: the endpoint id doubles as the workload identity,
    /// so a single workload attached to two networks would collide on its
    /// instance name.
    #[instrument(skip(self, request), fields(endpoint_id = %request.endpoint_id))]
    pub async fn create_endpoint(
        &self,
        request: &CreateEndpointRequest,
    ) -> DriverResult<CreateEndpointResponse> {
        let record = self
            .orchestrator
            .network(&request.network_id)
            .await?
            .ok_or_else(|| {
                DriverError::orchestrator(format!(
                    "network record '{}' not found",
                    request.network_id
                ))
            })?;
        let opts = NetworkOptions::from_record(&record)?;
        info!(tenant = %opts.tenant, network = %opts.network, "creating endpoint");

        let network = self.graph.find_network(&opts.tenant, &opts.network).await?;
        let instance = self
            .graph
            .get_or_create_instance(&opts.tenant, &request.endpoint_id)
            .await?;
        let interface = self
            .graph
            .get_or_create_interface(&network, &instance)
            .await?;
        let allocated = self
            .graph
            .get_or_create_instance_ip(&network, &interface)
            .await?;
        let ip = allocated
            .ip()
            .ok_or_else(|| GraphError::unavailable("allocated address has no ip yet"))?;

        let subnet = self.graph.resolve_subnet(&network, "")?;
        let gateway = self.graph.default_gateway(subnet)?;
        let mac = self.graph.interface_mac(&interface)?;

        let backend_network = self.backend.get_network(&opts.tenant, &opts.network).await?;
        let port = BackendPort {
            id: String::new(),
            network: backend_network.name,
            name: request.endpoint_id.clone(),
            ip,
            // the switch wants dash-delimited uppercase
            mac: mac.backend_format(),
            gateway,
        };
        self.backend.create_port(&port).await?;

        Ok(CreateEndpointResponse {
            address: format!("{}/{}", ip, subnet.prefix.prefix_len()),
            mac: mac.to_string(),
        })
    }

    /// Tears an endpoint down in both stores, best-effort.
    ///
    /// The two cleanups are independent so that one store having been reset
    /// (or cleaned by someone else) never blocks cleaning the other. An
    /// already-absent object on either side is logged and skipped; graph
    /// failures are logged and skipped too, while backend failures other
    /// than not-found propagate.
    #[instrument(skip(self, request), fields(endpoint_id = %request.endpoint_id))]
    pub async fn delete_endpoint(&self, request: &DeleteEndpointRequest) -> DriverResult<()> {
        match self.network_tags(&request.network_id).await {
            Some(opts) => {
                match self
                    .graph
                    .find_instance(&opts.tenant, &request.endpoint_id)
                    .await
                {
                    Ok(Some(instance)) => {
                        if let Err(err) = self.graph.delete_recursive(instance.object_ref()).await {
                            error!(%err, "graph cleanup failed, continuing with backend cleanup");
                        }
                    }
                    Ok(None) => debug!("workload instance already absent"),
                    Err(err) => {
                        error!(%err, "workload instance lookup failed, continuing with backend cleanup");
                    }
                }
            }
            None => {
                warn!(
                    network_id = %request.network_id,
                    "cannot derive workload identity, skipping graph cleanup"
                );
            }
        }

        match self.backend.delete_port(&request.endpoint_id).await {
            Ok(()) => {}
            Err(BackendError::NotFound { .. }) => debug!("backend port already absent"),
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }

    /// Surfaces gateway information for a provisioned endpoint.
    ///
    /// Never mutates either store. The response tells the orchestrator to
    /// keep its own default-gateway machinery off: the SDN stack owns
    /// gateway semantics.
    #[instrument(skip(self, request), fields(endpoint_id = %request.endpoint_id))]
    pub async fn join(&self, request: &JoinRequest) -> DriverResult<JoinResponse> {
        let port = self
            .backend
            .find_port(&request.endpoint_id)
            .await?
            .ok_or_else(|| DriverError::endpoint_not_found(&request.endpoint_id))?;

        Ok(JoinResponse {
            gateway: port.gateway.to_string(),
            disable_gateway_service: true,
        })
    }

    /// Validates that the endpoint is still provisioned; never mutates.
    #[instrument(skip(self, request), fields(endpoint_id = %request.endpoint_id))]
    pub async fn leave(&self, request: &LeaveRequest) -> DriverResult<()> {
        self.backend
            .find_port(&request.endpoint_id)
            .await?
            .ok_or_else(|| DriverError::endpoint_not_found(&request.endpoint_id))?;
        Ok(())
    }

    /// Global address-space allocation is not part of this driver's
    /// contract.
    pub fn allocate_network(&self) -> DriverResult<()> {
        Err(DriverError::not_implemented("allocate_network"))
    }

    /// Counterpart of [`allocate_network`](Self::allocate_network).
    pub fn free_network(&self) -> DriverResult<()> {
        Err(DriverError::not_implemented("free_network"))
    }

    /// Best-effort tag resolution for cleanup paths: any failure to resolve
    /// the record or its tags yields `None` rather than an error.
    async fn network_tags(&self, network_id: &str) -> Option<NetworkOptions> {
        match self.orchestrator.network(network_id).await {
            Ok(Some(record)) => NetworkOptions::from_record(&record).ok(),
            Ok(None) => None,
            Err(err) => {
                warn!(%network_id, %err, "orchestrator record lookup failed");
                None
            }
        }
    }
}
