//! Find-or-create provisioning and recursive deletion over a [`GraphApi`].

use crate::api::GraphApi;
use crate::error::{GraphError, GraphResult};
use crate::names;
use crate::objects::{
    AllocatedAddress, GraphObject, Instance, Interface, Network, ObjectRef, ResourceType, Subnet,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::future::Future;
use std::net::IpAddr;
use std::pin::Pin;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;
use vnet_types::MacAddress;

/// Matches the `<type>/<uuid>` references a conflict response embeds for
/// each dependent that blocked a delete. Type tokens are lowercase
/// hyphenated; uuids are 8-4-4-4-12 lowercase hex.
static CHILD_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"([a-z][a-z-]*)/([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})",
    )
    .expect("child reference pattern is valid")
});

/// Extracts every dependent reference from a conflict message.
pub(crate) fn parse_child_refs(message: &str) -> Vec<(String, Uuid)> {
    CHILD_REF
        .captures_iter(message)
        .filter_map(|caps| {
            let uuid = Uuid::parse_str(&caps[2]).ok()?;
            Some((caps[1].to_string(), uuid))
        })
        .collect()
}

/// Typed client over the control-plane object graph.
///
/// All provisioning operations are idempotent find-or-create: the remote
/// store's own name-uniqueness enforcement is the only synchronization, so a
/// lost creation race surfaces as `AlreadyExists` and is absorbed by
/// re-fetching. Created objects are always re-fetched because the control
/// plane assigns fields (uuids, MACs, addresses) server-side.
pub struct GraphClient<A: GraphApi> {
    api: A,
}

impl<A: GraphApi> GraphClient<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Returns the underlying API handle.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Looks up a virtual network by `(tenant, name)`.
    #[instrument(skip(self))]
    pub async fn find_network(&self, tenant: &str, name: &str) -> GraphResult<Network> {
        let fq_name = names::graph_fq_name(tenant, name);
        let found = self
            .api
            .find_by_name(ResourceType::Network, &fq_name)
            .await?
            .ok_or_else(|| GraphError::not_found(format!("virtual-network '{fq_name}'")))?;
        expect_network(found)
    }

    /// Looks up a workload instance by `(tenant, id)` without creating it.
    #[instrument(skip(self))]
    pub async fn find_instance(&self, tenant: &str, id: &str) -> GraphResult<Option<Instance>> {
        let fq_name = names::graph_fq_name(tenant, id);
        match self
            .api
            .find_by_name(ResourceType::Instance, &fq_name)
            .await?
        {
            Some(found) => expect_instance(found).map(Some),
            None => Ok(None),
        }
    }

    /// Selects a subnet of `network`.
    ///
    /// An empty `cidr` (or one starting `0.0.0.0`, which is how the
    /// orchestrator passes an unspecified pool) selects the single subnet if
    /// exactly one exists and is ambiguous otherwise. A concrete `cidr` must
    /// exactly match one subnet's `address/length` rendering.
    pub fn resolve_subnet<'n>(&self, network: &'n Network, cidr: &str) -> GraphResult<&'n Subnet> {
        // an all-zero pool means the user did not pick one
        let requested = if cidr.starts_with("0.0.0.0") { "" } else { cidr };

        if network.subnets.is_empty() {
            return Err(GraphError::not_found(format!(
                "subnets of virtual-network '{}'",
                network.fq_name()
            )));
        }

        if requested.is_empty() {
            if network.subnets.len() > 1 {
                return Err(GraphError::ambiguous(format!(
                    "virtual-network '{}' has {} subnets and no CIDR was given",
                    network.fq_name(),
                    network.subnets.len()
                )));
            }
            return Ok(&network.subnets[0]);
        }

        network
            .subnets
            .iter()
            .find(|subnet| subnet.prefix.to_string() == requested)
            .ok_or_else(|| {
                GraphError::not_found(format!(
                    "subnet '{}' in virtual-network '{}'",
                    requested,
                    network.fq_name()
                ))
            })
    }

    /// Returns the subnet's default gateway.
    pub fn default_gateway(&self, subnet: &Subnet) -> GraphResult<IpAddr> {
        subnet
            .default_gateway
            .ok_or_else(|| GraphError::NoDefaultGateway {
                subnet: subnet.prefix.to_string(),
            })
    }

    /// Returns the authoritative (first) MAC of an interface.
    ///
    /// MAC assignment is asynchronous server-side; reading an interface
    /// immediately after creating it may fail here and the caller retries.
    pub fn interface_mac(&self, interface: &Interface) -> GraphResult<MacAddress> {
        interface
            .mac_addresses
            .first()
            .copied()
            .ok_or_else(|| GraphError::EmptyMacList {
                interface: interface.fq_name(),
            })
    }

    /// Finds or creates the workload instance for `(tenant, id)`.
    ///
    /// Repeated calls with the same identity never create a second object:
    /// a creation race loses with `AlreadyExists`, which is absorbed, and
    /// the re-fetch returns whichever object won.
    #[instrument(skip(self))]
    pub async fn get_or_create_instance(&self, tenant: &str, id: &str) -> GraphResult<Instance> {
        let fq_name = names::graph_fq_name(tenant, id);
        if let Some(found) = self
            .api
            .find_by_name(ResourceType::Instance, &fq_name)
            .await?
        {
            debug!(%fq_name, "instance already present");
            return expect_instance(found);
        }

        let candidate = Instance {
            uuid: Uuid::nil(),
            tenant: tenant.to_string(),
            name: id.to_string(),
        };
        match self.api.create(GraphObject::Instance(candidate)).await {
            Ok(_) => {}
            Err(err) if err.is_already_exists() => {
                debug!(%fq_name, "lost creation race, reusing existing instance");
            }
            Err(err) => return Err(err),
        }

        // the control plane fills in server-assigned fields, so read back
        let created = self
            .api
            .find_by_name(ResourceType::Instance, &fq_name)
            .await?
            .ok_or_else(|| {
                GraphError::not_found(format!("workload-instance '{fq_name}' after create"))
            })?;
        expect_instance(created)
    }

    /// Finds or creates the interface attaching `instance` to `network`.
    ///
    /// The interface name is derived from the instance identity, and both
    /// the instance and network references are linked before persisting.
    #[instrument(skip(self, network, instance))]
    pub async fn get_or_create_interface(
        &self,
        network: &Network,
        instance: &Instance,
    ) -> GraphResult<Interface> {
        let fq_name = names::graph_fq_name(&instance.tenant, &instance.name);
        if let Some(found) = self
            .api
            .find_by_name(ResourceType::Interface, &fq_name)
            .await?
        {
            debug!(%fq_name, "interface already present");
            return expect_interface(found);
        }

        let candidate = Interface {
            uuid: Uuid::nil(),
            tenant: instance.tenant.clone(),
            name: instance.name.clone(),
            instance: Some(instance.object_ref()),
            network: Some(network.object_ref()),
            mac_addresses: Vec::new(),
        };
        match self.api.create(GraphObject::Interface(candidate)).await {
            Ok(_) => {}
            Err(err) if err.is_already_exists() => {
                debug!(%fq_name, "lost creation race, reusing existing interface");
            }
            Err(err) => return Err(err),
        }

        let created = self
            .api
            .find_by_name(ResourceType::Interface, &fq_name)
            .await?
            .ok_or_else(|| {
                GraphError::not_found(format!("virtual-interface '{fq_name}' after create"))
            })?;
        expect_interface(created)
    }

    /// Finds or creates the address allocation for `interface` on `network`.
    ///
    /// The name is derived deterministically from tenant + interface name;
    /// the re-fetch returns the address the control plane allocated.
    #[instrument(skip(self, network, interface))]
    pub async fn get_or_create_instance_ip(
        &self,
        network: &Network,
        interface: &Interface,
    ) -> GraphResult<AllocatedAddress> {
        let name = names::address_name(&interface.tenant, &interface.name);
        if let Some(found) = self.api.find_by_name(ResourceType::Address, &name).await? {
            debug!(%name, "address allocation already present");
            return expect_address(found);
        }

        let candidate = AllocatedAddress {
            uuid: Uuid::nil(),
            name: name.clone(),
            address: None,
            interface: Some(interface.object_ref()),
            network: Some(network.object_ref()),
        };
        match self.api.create(GraphObject::Address(candidate)).await {
            Ok(_) => {}
            Err(err) if err.is_already_exists() => {
                debug!(%name, "lost creation race, reusing existing allocation");
            }
            Err(err) => return Err(err),
        }

        let created = self
            .api
            .find_by_name(ResourceType::Address, &name)
            .await?
            .ok_or_else(|| {
                GraphError::not_found(format!("allocated-address '{name}' after create"))
            })?;
        expect_address(created)
    }

    /// Deletes `node` and, transitively, every object blocking it.
    ///
    /// The graph has no "list dependents" query; the only way to discover
    /// in-edges is to attempt the delete and parse the dependents out of the
    /// conflict message. Each round either succeeds, treats an already-gone
    /// object as success, or strictly shrinks the blocking set by deleting
    /// the discovered dependents first, so the loop terminates.
    #[instrument(skip(self))]
    pub async fn delete_recursive(&self, node: ObjectRef) -> GraphResult<()> {
        debug!(%node, "deleting graph object");
        loop {
            match self.api.delete(node).await {
                Ok(()) => return Ok(()),
                Err(err) if err.is_not_found() => {
                    warn!(%node, "object already absent, treating delete as done");
                    return Ok(());
                }
                Err(GraphError::Conflict { message }) => {
                    let children = parse_child_refs(&message);
                    if children.is_empty() {
                        // nothing actionable in the message; retrying would
                        // loop on the same conflict forever
                        return Err(GraphError::conflict(message));
                    }
                    debug!(%node, blocked_by = children.len(), "delete blocked, removing dependents");
                    for (ty_token, uuid) in children {
                        let child = self.lookup_child(&ty_token, uuid).await?;
                        self.delete_recursive_boxed(child).await?;
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Resolves one `<type>/<uuid>` reference from a conflict message.
    async fn lookup_child(&self, ty_token: &str, uuid: Uuid) -> GraphResult<ObjectRef> {
        let reference = format!("{ty_token}/{uuid}");
        let ty: ResourceType = ty_token
            .parse()
            .map_err(|_| GraphError::child_lookup_failed(&reference))?;
        match self.api.find_by_uuid(ty, uuid).await {
            Ok(Some(child)) => Ok(child.object_ref()),
            Ok(None) => Err(GraphError::child_lookup_failed(&reference)),
            Err(err) => {
                error!(%reference, %err, "dependent lookup failed");
                Err(GraphError::child_lookup_failed(&reference))
            }
        }
    }

    fn delete_recursive_boxed<'a>(
        &'a self,
        node: ObjectRef,
    ) -> Pin<Box<dyn Future<Output = GraphResult<()>> + Send + 'a>> {
        Box::pin(self.delete_recursive(node))
    }
}

fn expect_network(object: GraphObject) -> GraphResult<Network> {
    match object {
        GraphObject::Network(network) => Ok(network),
        other => Err(mismatched(ResourceType::Network, &other)),
    }
}

fn expect_instance(object: GraphObject) -> GraphResult<Instance> {
    match object {
        GraphObject::Instance(instance) => Ok(instance),
        other => Err(mismatched(ResourceType::Instance, &other)),
    }
}

fn expect_interface(object: GraphObject) -> GraphResult<Interface> {
    match object {
        GraphObject::Interface(interface) => Ok(interface),
        other => Err(mismatched(ResourceType::Interface, &other)),
    }
}

fn expect_address(object: GraphObject) -> GraphResult<AllocatedAddress> {
    match object {
        GraphObject::Address(address) => Ok(address),
        other => Err(mismatched(ResourceType::Address, &other)),
    }
}

fn mismatched(expected: ResourceType, got: &GraphObject) -> GraphError {
    GraphError::unavailable(format!(
        "expected {expected}, graph returned {}",
        got.object_ref()
    ))
}
