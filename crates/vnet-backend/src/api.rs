//! The request boundary trait and wire records for the virtual switch.

use crate::error::BackendResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use vnet_types::IpPrefix;

/// One subnet of a backend network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSubnet {
    pub prefix: IpPrefix,
    pub gateway: IpAddr,
}

/// A host-side virtual network record.
///
/// `id` is assigned by the switch on create and left empty in requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendNetwork {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub adapter: String,
    pub subnets: Vec<BackendSubnet>,
}

/// A host-side port record attaching one container to one network.
///
/// `name` equals the orchestrator's endpoint identifier; `mac` is in the
/// switch's textual form (dash-delimited, uppercase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendPort {
    #[serde(default)]
    pub id: String,
    /// Name of the owning backend network.
    pub network: String,
    pub name: String,
    pub ip: IpAddr,
    pub mac: String,
    pub gateway: IpAddr,
}

/// CRUD against the virtual switch.
///
/// Implementations marshal these records onto the switch's request surface.
/// The switch indexes objects by its own ids only; name lookups are the
/// caller's business.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Creates a virtual network and returns its switch-assigned id.
    async fn create_network(&self, config: &BackendNetwork) -> BackendResult<String>;

    /// Fetches a virtual network by switch id.
    async fn get_network(&self, id: &str) -> BackendResult<BackendNetwork>;

    /// Deletes a virtual network by switch id.
    async fn delete_network(&self, id: &str) -> BackendResult<()>;

    /// Lists every virtual network on the host, managed or not.
    async fn list_networks(&self) -> BackendResult<Vec<BackendNetwork>>;

    /// Creates a port and returns its switch-assigned id.
    async fn create_port(&self, config: &BackendPort) -> BackendResult<String>;

    /// Deletes a port by switch id.
    async fn delete_port(&self, id: &str) -> BackendResult<()>;

    /// Lists every port on the host.
    async fn list_ports(&self) -> BackendResult<Vec<BackendPort>>;
}
