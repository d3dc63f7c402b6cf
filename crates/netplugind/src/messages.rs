//! Request and response types of the plugin lifecycle contract.
//!
//! The transport layer (pipe/HTTP framing) lives outside this crate; these
//! are the already-deframed messages it hands to the driver.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Scope advertised to the orchestrator: networks are host-local.
pub const SCOPE_LOCAL: &str = "local";

/// Driver capabilities response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitiesResponse {
    pub scope: String,
}

/// Network creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNetworkRequest {
    /// The orchestrator's opaque network id.
    pub network_id: String,
    /// Option bag; tenant/network identity lives under the generic key.
    #[serde(default)]
    pub options: Map<String, Value>,
    /// Address pool the orchestrator picked; all-zero when the user gave
    /// none.
    #[serde(default)]
    pub ipam_pool: String,
}

/// Network deletion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteNetworkRequest {
    pub network_id: String,
}

/// Endpoint creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEndpointRequest {
    pub network_id: String,
    pub endpoint_id: String,
}

/// Endpoint creation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEndpointResponse {
    /// Allocated address in CIDR form, `ip/prefix-length`.
    pub address: String,
    /// Interface MAC in the graph's form (colon-separated lowercase).
    pub mac: String,
}

/// Endpoint deletion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteEndpointRequest {
    pub network_id: String,
    pub endpoint_id: String,
}

/// Join request: attach a sandbox to a provisioned endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub network_id: String,
    pub endpoint_id: String,
}

/// Join response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinResponse {
    /// Gateway address for the sandbox.
    pub gateway: String,
    /// Always true: the SDN stack owns gateway semantics, so the
    /// orchestrator must not install its own default gateway.
    pub disable_gateway_service: bool,
}

/// Leave request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub network_id: String,
    pub endpoint_id: String,
}
