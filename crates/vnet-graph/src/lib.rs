//! Typed client for the SDN control-plane object graph.
//!
//! The control plane stores tenants, virtual networks, workload instances,
//! interfaces and allocated addresses as an object graph behind a CRUD API.
//! This crate provides:
//!
//! - [`GraphApi`]: the transport boundary trait (create/update/delete/find)
//! - [`GraphClient`]: find-or-create provisioning and recursive deletion
//! - The typed object model ([`Network`], [`Instance`], [`Interface`], ...)
//!
//! Two properties of the remote contract shape the client:
//!
//! 1. Several object fields (MAC addresses, allocated IPs, uuids) are
//!    assigned server-side, so every create is followed by a re-fetch.
//! 2. The graph exposes no "list dependents" query. The only way to discover
//!    in-edges is to attempt a delete and parse the `<type>/<uuid>`
//!    references out of the conflict response, which is exactly what
//!    [`GraphClient::delete_recursive`] does.

mod api;
mod client;
mod error;
mod names;
mod objects;

pub use api::GraphApi;
pub use client::GraphClient;
pub use error::{GraphError, GraphResult};
pub use names::{address_name, graph_fq_name, TENANT_DOMAIN};
pub use objects::{
    AllocatedAddress, GraphObject, Instance, Interface, Network, ObjectRef, ResourceType, Subnet,
    Tenant,
};
