//! Naming contracts for graph objects.
//!
//! These encodings are part of the wire contract with the control plane and
//! must be reproduced bit-exactly: other agents resolve the same objects by
//! the same names.

/// Root domain under which all tenants live.
pub const TENANT_DOMAIN: &str = "default-domain";

/// Fully-qualified graph name: `<domain>:<tenant>:<name>`.
pub fn graph_fq_name(tenant: &str, name: &str) -> String {
    format!("{TENANT_DOMAIN}:{tenant}:{name}")
}

/// Deterministic allocated-address name: `<tenant>_<interface>`.
///
/// Address objects are not domain-qualified; the tenant prefix keeps them
/// unique across tenants that reuse interface names.
pub fn address_name(tenant: &str, interface: &str) -> String {
    format!("{tenant}_{interface}")
}
