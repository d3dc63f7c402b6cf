//! Validated extraction of tenant/network identity from option bags.
//!
//! The orchestrator carries our identity as opaque tags: nested under a
//! generic key in creation requests, flat on its own network records.
//! Extraction validates shape up front and reports `MissingOption` /
//! `MalformedOption` instead of failing on a cast mid-operation.

use crate::error::{DriverError, DriverResult};
use crate::orchestrator::OrchestratorNetwork;
use serde_json::{Map, Value};

/// Option-bag key holding the driver-specific generic options.
pub const GENERIC_OPTIONS_KEY: &str = "generic";

/// Generic-option key naming the control-plane tenant.
pub const OPT_TENANT: &str = "tenant";

/// Generic-option key naming the control-plane network.
pub const OPT_NETWORK: &str = "network";

/// The `(tenant, network)` identity extracted from a request or record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkOptions {
    pub tenant: String,
    pub network: String,
}

impl NetworkOptions {
    /// Extracts identity from a creation request's option bag.
    ///
    /// Expects `options[GENERIC_OPTIONS_KEY]` to be an object with string
    /// values for [`OPT_TENANT`] and [`OPT_NETWORK`].
    pub fn from_request(options: &Map<String, Value>) -> DriverResult<Self> {
        let generic = options
            .get(GENERIC_OPTIONS_KEY)
            .ok_or_else(|| DriverError::missing_option(GENERIC_OPTIONS_KEY))?;
        let generic = generic
            .as_object()
            .ok_or_else(|| DriverError::malformed_option(GENERIC_OPTIONS_KEY))?;

        Ok(NetworkOptions {
            tenant: string_option(generic, OPT_TENANT)?,
            network: string_option(generic, OPT_NETWORK)?,
        })
    }

    /// Extracts identity from the tags on an orchestrator network record.
    pub fn from_record(record: &OrchestratorNetwork) -> DriverResult<Self> {
        let tenant = record
            .options
            .get(OPT_TENANT)
            .ok_or_else(|| DriverError::missing_option(OPT_TENANT))?;
        let network = record
            .options
            .get(OPT_NETWORK)
            .ok_or_else(|| DriverError::missing_option(OPT_NETWORK))?;
        Ok(NetworkOptions {
            tenant: tenant.clone(),
            network: network.clone(),
        })
    }

    /// The `(tenant, network)` pair as owned strings.
    pub fn pair(&self) -> (String, String) {
        (self.tenant.clone(), self.network.clone())
    }
}

fn string_option(options: &Map<String, Value>, key: &str) -> DriverResult<String> {
    let value = options
        .get(key)
        .ok_or_else(|| DriverError::missing_option(key))?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| DriverError::malformed_option(key))
}
