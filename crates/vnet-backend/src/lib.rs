//! Typed client for the host virtual-switch backend.
//!
//! The virtual switch manages host-side virtual networks and the ports that
//! attach containers to them. This crate provides:
//!
//! - [`BackendApi`]: the request boundary trait (network and port CRUD)
//! - [`BackendManager`]: lifecycle operations under the reserved naming
//!   scheme `"<prefix>:<tenant>:<network>"`, which keeps managed networks
//!   apart from unrelated switch networks (a host's default NAT switch, for
//!   example)
//!
//! The switch API has no name index, so every lookup-by-name is
//! list-and-filter.

mod api;
mod error;
mod manager;

pub use api::{BackendApi, BackendNetwork, BackendPort, BackendSubnet};
pub use error::{BackendError, BackendResult};
pub use manager::{
    backend_network_name, parse_backend_network_name, BackendManager, NETWORK_NAME_PREFIX,
    NETWORK_TYPE_TRANSPARENT,
};
