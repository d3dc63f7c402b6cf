//! Typed object model for the control-plane graph.

use crate::names;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use uuid::Uuid;
use vnet_types::{IpPrefix, MacAddress};

/// Resource type discriminator, matching the lowercase hyphenated tokens the
/// remote uses in URLs and conflict messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Tenant,
    Network,
    Instance,
    Interface,
    Address,
}

impl ResourceType {
    /// The wire token for this type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Tenant => "tenant",
            ResourceType::Network => "virtual-network",
            ResourceType::Instance => "workload-instance",
            ResourceType::Interface => "virtual-interface",
            ResourceType::Address => "allocated-address",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tenant" => Ok(ResourceType::Tenant),
            "virtual-network" => Ok(ResourceType::Network),
            "workload-instance" => Ok(ResourceType::Instance),
            "virtual-interface" => Ok(ResourceType::Interface),
            "allocated-address" => Ok(ResourceType::Address),
            _ => Err(()),
        }
    }
}

/// A `(type, uuid)` handle onto a graph object.
///
/// This is the unit the recursive delete operates on: conflict messages name
/// dependents in exactly this shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub ty: ResourceType,
    pub uuid: Uuid,
}

impl ObjectRef {
    pub const fn new(ty: ResourceType, uuid: Uuid) -> Self {
        ObjectRef { ty, uuid }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ty, self.uuid)
    }
}

/// An isolation namespace for networks and workloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    pub uuid: Uuid,
    pub name: String,
}

/// One subnet of a virtual network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    pub prefix: IpPrefix,
    pub default_gateway: Option<IpAddr>,
}

/// A virtual network, identified by `(tenant, name)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    /// Server-assigned identifier; nil until persisted.
    pub uuid: Uuid,
    pub tenant: String,
    pub name: String,
    pub subnets: Vec<Subnet>,
}

impl Network {
    pub fn fq_name(&self) -> String {
        names::graph_fq_name(&self.tenant, &self.name)
    }

    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(ResourceType::Network, self.uuid)
    }
}

/// A workload (running container), identified by `(tenant, container-id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// Server-assigned identifier; nil until persisted.
    pub uuid: Uuid,
    pub tenant: String,
    pub name: String,
}

impl Instance {
    pub fn fq_name(&self) -> String {
        names::graph_fq_name(&self.tenant, &self.name)
    }

    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(ResourceType::Instance, self.uuid)
    }
}

/// A network interface, belonging to one instance and one network.
///
/// MAC addresses are assigned asynchronously server-side; the first entry in
/// `mac_addresses` is authoritative once present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    /// Server-assigned identifier; nil until persisted.
    pub uuid: Uuid,
    pub tenant: String,
    pub name: String,
    pub instance: Option<ObjectRef>,
    pub network: Option<ObjectRef>,
    pub mac_addresses: Vec<MacAddress>,
}

impl Interface {
    pub fn fq_name(&self) -> String {
        names::graph_fq_name(&self.tenant, &self.name)
    }

    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(ResourceType::Interface, self.uuid)
    }
}

/// An address allocation, belonging to one interface and one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedAddress {
    /// Server-assigned identifier; nil until persisted.
    pub uuid: Uuid,
    /// Deterministic name: `<tenant>_<interface>`.
    pub name: String,
    /// The allocated address; assigned server-side on creation.
    pub address: Option<IpAddr>,
    pub interface: Option<ObjectRef>,
    pub network: Option<ObjectRef>,
}

impl AllocatedAddress {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(ResourceType::Address, self.uuid)
    }

    /// The allocated IP, if the server has assigned one yet.
    pub fn ip(&self) -> Option<IpAddr> {
        self.address
    }
}

/// Any graph object, as returned by the generic find operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphObject {
    Tenant(Tenant),
    Network(Network),
    Instance(Instance),
    Interface(Interface),
    Address(AllocatedAddress),
}

impl GraphObject {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            GraphObject::Tenant(_) => ResourceType::Tenant,
            GraphObject::Network(_) => ResourceType::Network,
            GraphObject::Instance(_) => ResourceType::Instance,
            GraphObject::Interface(_) => ResourceType::Interface,
            GraphObject::Address(_) => ResourceType::Address,
        }
    }

    pub fn uuid(&self) -> Uuid {
        match self {
            GraphObject::Tenant(o) => o.uuid,
            GraphObject::Network(o) => o.uuid,
            GraphObject::Instance(o) => o.uuid,
            GraphObject::Interface(o) => o.uuid,
            GraphObject::Address(o) => o.uuid,
        }
    }

    /// Overwrites the identifier. Used by stores that assign ids on create.
    pub fn set_uuid(&mut self, uuid: Uuid) {
        match self {
            GraphObject::Tenant(o) => o.uuid = uuid,
            GraphObject::Network(o) => o.uuid = uuid,
            GraphObject::Instance(o) => o.uuid = uuid,
            GraphObject::Interface(o) => o.uuid = uuid,
            GraphObject::Address(o) => o.uuid = uuid,
        }
    }

    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.resource_type(), self.uuid())
    }

    /// The canonical name this object is found under with `find_by_name`.
    ///
    /// Tenant-scoped objects use the fully-qualified `<domain>:<tenant>:<name>`
    /// form; address allocations use their flat deterministic name.
    pub fn lookup_name(&self) -> String {
        match self {
            GraphObject::Tenant(o) => o.name.clone(),
            GraphObject::Network(o) => o.fq_name(),
            GraphObject::Instance(o) => o.fq_name(),
            GraphObject::Interface(o) => o.fq_name(),
            GraphObject::Address(o) => o.name.clone(),
        }
    }
}
