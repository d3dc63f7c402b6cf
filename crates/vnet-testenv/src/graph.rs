//! In-memory control-plane graph.

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Mutex;
use uuid::Uuid;
use vnet_graph::{
    GraphApi, GraphError, GraphObject, GraphResult, Network, ObjectRef, ResourceType, Subnet,
};
use vnet_types::MacAddress;

#[derive(Default)]
struct GraphState {
    objects: HashMap<Uuid, GraphObject>,
    /// Host offset for address allocation, per the usual convention of
    /// reserving the first few addresses of a subnet.
    next_host: u32,
}

/// In-memory graph store implementing [`GraphApi`].
///
/// Mimics the remote contract the client depends on:
///
/// - names are unique per resource type; a colliding create fails
///   `AlreadyExists`
/// - uuids, interface MACs and allocated addresses are assigned on create
///   (MAC assignment can be deferred with [`MemoryGraph::with_deferred_macs`]
///   to exercise the asynchronous-assignment window)
/// - deleting an object that others still reference fails `Conflict`, with
///   the dependents listed in the message as `<type>/<uuid>` URLs
#[derive(Default)]
pub struct MemoryGraph {
    state: Mutex<GraphState>,
    defer_macs: bool,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes interface creation leave the MAC list empty, as a slow control
    /// plane would.
    pub fn with_deferred_macs(mut self) -> Self {
        self.defer_macs = true;
        self
    }

    /// Seeds a virtual network with `(prefix, gateway)` subnets, the way an
    /// operator would have provisioned it out of band.
    pub fn seed_network(&self, tenant: &str, name: &str, subnets: &[(&str, &str)]) -> ObjectRef {
        let subnets = subnets
            .iter()
            .map(|(prefix, gateway)| Subnet {
                prefix: prefix.parse().expect("seed subnet prefix is valid"),
                default_gateway: Some(gateway.parse().expect("seed gateway is valid")),
            })
            .collect();
        let network = Network {
            uuid: Uuid::nil(),
            tenant: tenant.to_string(),
            name: name.to_string(),
            subnets,
        };
        self.insert(GraphObject::Network(network))
            .expect("seeding a fresh network cannot collide")
    }

    /// Number of live objects of the given type.
    pub fn count(&self, ty: ResourceType) -> usize {
        let state = self.state.lock().expect("graph state lock");
        state
            .objects
            .values()
            .filter(|object| object.resource_type() == ty)
            .count()
    }

    /// Returns true if the node is still resolvable.
    pub fn contains(&self, node: ObjectRef) -> bool {
        let state = self.state.lock().expect("graph state lock");
        state
            .objects
            .get(&node.uuid)
            .is_some_and(|object| object.resource_type() == node.ty)
    }

    fn insert(&self, mut object: GraphObject) -> GraphResult<ObjectRef> {
        let mut state = self.state.lock().expect("graph state lock");

        let name = object.lookup_name();
        let ty = object.resource_type();
        if state
            .objects
            .values()
            .any(|existing| existing.resource_type() == ty && existing.lookup_name() == name)
        {
            return Err(GraphError::already_exists(format!("{ty} '{name}'")));
        }

        object.set_uuid(Uuid::new_v4());
        assign_server_fields(&mut state, &mut object, self.defer_macs)?;

        let node = object.object_ref();
        state.objects.insert(node.uuid, object);
        Ok(node)
    }

    fn dependents_of(state: &GraphState, uuid: Uuid) -> Vec<ObjectRef> {
        state
            .objects
            .values()
            .filter(|object| references(object, uuid))
            .map(GraphObject::object_ref)
            .collect()
    }
}

/// Does `object` hold a reference onto `target`?
fn references(object: &GraphObject, target: Uuid) -> bool {
    match object {
        GraphObject::Interface(iface) => {
            iface.instance.is_some_and(|r| r.uuid == target)
                || iface.network.is_some_and(|r| r.uuid == target)
        }
        GraphObject::Address(address) => {
            address.interface.is_some_and(|r| r.uuid == target)
                || address.network.is_some_and(|r| r.uuid == target)
        }
        _ => false,
    }
}

/// Fills in the fields the control plane assigns on creation.
fn assign_server_fields(
    state: &mut GraphState,
    object: &mut GraphObject,
    defer_macs: bool,
) -> GraphResult<()> {
    match object {
        GraphObject::Interface(iface) => {
            if !defer_macs {
                let bytes = iface.uuid.as_bytes();
                // locally administered unicast, derived from the uuid
                iface.mac_addresses = vec![MacAddress::new([
                    0x02, bytes[0], bytes[1], bytes[2], bytes[3], bytes[4],
                ])];
            }
        }
        GraphObject::Address(address) => {
            let network_ref = address
                .network
                .ok_or_else(|| GraphError::unavailable("address allocation has no network"))?;
            let network = match state.objects.get(&network_ref.uuid) {
                Some(GraphObject::Network(network)) => network,
                _ => {
                    return Err(GraphError::unavailable(
                        "address allocation references an unknown network",
                    ))
                }
            };
            let subnet = network
                .subnets
                .first()
                .ok_or_else(|| GraphError::unavailable("network has no subnet to allocate from"))?;
            let base = match subnet.prefix.address() {
                IpAddr::V4(base) => u32::from(base),
                IpAddr::V6(_) => {
                    return Err(GraphError::unavailable(
                        "this store only allocates IPv4 addresses",
                    ))
                }
            };
            state.next_host += 1;
            let host = base + 3 + state.next_host;
            address.address = Some(IpAddr::V4(Ipv4Addr::from(host)));
        }
        _ => {}
    }
    Ok(())
}

#[async_trait]
impl GraphApi for MemoryGraph {
    async fn create(&self, object: GraphObject) -> GraphResult<ObjectRef> {
        self.insert(object)
    }

    async fn update(&self, object: GraphObject) -> GraphResult<()> {
        let mut state = self.state.lock().expect("graph state lock");
        let uuid = object.uuid();
        if !state.objects.contains_key(&uuid) {
            return Err(GraphError::not_found(format!(
                "{} for update",
                object.object_ref()
            )));
        }
        state.objects.insert(uuid, object);
        Ok(())
    }

    async fn delete(&self, node: ObjectRef) -> GraphResult<()> {
        let mut state = self.state.lock().expect("graph state lock");

        let present = state
            .objects
            .get(&node.uuid)
            .is_some_and(|object| object.resource_type() == node.ty);
        if !present {
            return Err(GraphError::not_found(node.to_string()));
        }

        let dependents = Self::dependents_of(&state, node.uuid);
        if !dependents.is_empty() {
            let refs: Vec<String> = dependents
                .iter()
                .map(|child| format!("'https://controller:8082/{}/{}'", child.ty, child.uuid))
                .collect();
            return Err(GraphError::conflict(format!(
                "409 Conflict: delete when children still present: [{}]",
                refs.join(", ")
            )));
        }

        state.objects.remove(&node.uuid);
        Ok(())
    }

    async fn find_by_name(
        &self,
        ty: ResourceType,
        name: &str,
    ) -> GraphResult<Option<GraphObject>> {
        let state = self.state.lock().expect("graph state lock");
        Ok(state
            .objects
            .values()
            .find(|object| object.resource_type() == ty && object.lookup_name() == name)
            .cloned())
    }

    async fn find_by_uuid(
        &self,
        ty: ResourceType,
        uuid: Uuid,
    ) -> GraphResult<Option<GraphObject>> {
        let state = self.state.lock().expect("graph state lock");
        Ok(state
            .objects
            .get(&uuid)
            .filter(|object| object.resource_type() == ty)
            .cloned())
    }
}
