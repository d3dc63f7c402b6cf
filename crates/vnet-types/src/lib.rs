//! Shared wire-level types for the vnet container network plugin.
//!
//! The plugin talks to two stores that render the same values differently:
//! the control-plane graph keeps MAC addresses colon-separated lowercase,
//! while the host virtual switch wants them dash-separated uppercase. The
//! types in this crate hold the canonical value and produce either textual
//! form at the store boundary:
//!
//! - [`MacAddress`]: 48-bit MAC with per-store formatting
//! - [`IpPrefix`]: IP network prefix in CIDR notation

mod mac;
mod prefix;

pub use mac::MacAddress;
pub use prefix::IpPrefix;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    #[error("invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("invalid IP prefix format: {0}")]
    InvalidIpPrefix(String),
}
