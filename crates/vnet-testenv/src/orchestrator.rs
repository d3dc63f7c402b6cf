//! In-memory orchestrator record store.

use async_trait::async_trait;
use netplugind::{OrchestratorApi, OrchestratorNetwork};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory orchestrator implementing [`OrchestratorApi`].
#[derive(Default)]
pub struct MemoryOrchestrator {
    records: Mutex<Vec<OrchestratorNetwork>>,
}

impl MemoryOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a network record tagged with `(tenant, network)`.
    pub fn add_network(&self, id: &str, tenant: &str, network: &str) {
        let mut records = self.records.lock().expect("orchestrator lock");
        records.push(OrchestratorNetwork {
            id: id.to_string(),
            options: HashMap::from([
                ("tenant".to_string(), tenant.to_string()),
                ("network".to_string(), network.to_string()),
            ]),
            endpoints: HashMap::new(),
        });
    }

    /// Registers a record with no identity tags, as another driver's
    /// network would appear.
    pub fn add_untagged_network(&self, id: &str) {
        let mut records = self.records.lock().expect("orchestrator lock");
        records.push(OrchestratorNetwork {
            id: id.to_string(),
            options: HashMap::new(),
            endpoints: HashMap::new(),
        });
    }

    /// Records a container→endpoint attachment on a network.
    pub fn add_endpoint(&self, network_id: &str, container_id: &str, endpoint_id: &str) {
        let mut records = self.records.lock().expect("orchestrator lock");
        if let Some(record) = records.iter_mut().find(|record| record.id == network_id) {
            record
                .endpoints
                .insert(container_id.to_string(), endpoint_id.to_string());
        }
    }

    /// Drops a record, as the orchestrator does before (or racing with) the
    /// driver's delete callback.
    pub fn remove_network(&self, id: &str) {
        let mut records = self.records.lock().expect("orchestrator lock");
        records.retain(|record| record.id != id);
    }
}

#[async_trait]
impl OrchestratorApi for MemoryOrchestrator {
    async fn network(
        &self,
        id: &str,
    ) -> netplugind::DriverResult<Option<OrchestratorNetwork>> {
        let records = self.records.lock().expect("orchestrator lock");
        Ok(records.iter().find(|record| record.id == id).cloned())
    }

    async fn networks(&self) -> netplugind::DriverResult<Vec<OrchestratorNetwork>> {
        let records = self.records.lock().expect("orchestrator lock");
        Ok(records.clone())
    }
}
