//! Read access to the orchestrator's network records.

use crate::error::DriverResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An orchestrator network record.
///
/// The orchestrator stores our tenant/network identity as opaque string
/// tags in `options`; `endpoints` maps container ids to endpoint ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorNetwork {
    pub id: String,
    #[serde(default)]
    pub options: HashMap<String, String>,
    #[serde(default)]
    pub endpoints: HashMap<String, String>,
}

/// Lookup of orchestrator network records.
///
/// An explicit handle rather than an ambient client so the driver's
/// reconciliation logic can be exercised against fakes.
#[async_trait]
pub trait OrchestratorApi: Send + Sync {
    /// Fetches one network record; `None` if the orchestrator no longer
    /// knows the id.
    async fn network(&self, id: &str) -> DriverResult<Option<OrchestratorNetwork>>;

    /// Lists every live network record.
    async fn networks(&self) -> DriverResult<Vec<OrchestratorNetwork>>;
}
