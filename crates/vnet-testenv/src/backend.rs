//! In-memory host virtual switch.

use async_trait::async_trait;
use std::sync::Mutex;
use vnet_backend::{BackendApi, BackendError, BackendNetwork, BackendPort, BackendResult};

#[derive(Default)]
struct BackendState {
    networks: Vec<BackendNetwork>,
    ports: Vec<BackendPort>,
    next_id: u64,
}

/// In-memory virtual switch implementing [`BackendApi`].
///
/// Objects are indexed by switch-assigned ids; list order is creation
/// order, which keeps the driver's first-orphan reconciliation policy
/// deterministic in tests.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<BackendState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plants a network record under an arbitrary name, as a host's
    /// pre-existing switch configuration (a default NAT network, another
    /// agent's networks) would appear.
    pub fn plant_network(&self, name: &str) {
        let mut state = self.state.lock().expect("backend state lock");
        let id = format!("bnet-{}", state.next_id);
        state.next_id += 1;
        state.networks.push(BackendNetwork {
            id,
            name: name.to_string(),
            kind: "nat".to_string(),
            adapter: String::new(),
            subnets: Vec::new(),
        });
    }

    /// Names of every network on the switch, in creation order.
    pub fn network_names(&self) -> Vec<String> {
        let state = self.state.lock().expect("backend state lock");
        state.networks.iter().map(|n| n.name.clone()).collect()
    }

    /// Number of ports on the switch.
    pub fn port_count(&self) -> usize {
        let state = self.state.lock().expect("backend state lock");
        state.ports.len()
    }
}

#[async_trait]
impl BackendApi for MemoryBackend {
    async fn create_network(&self, config: &BackendNetwork) -> BackendResult<String> {
        let mut state = self.state.lock().expect("backend state lock");
        let id = format!("bnet-{}", state.next_id);
        state.next_id += 1;
        let mut record = config.clone();
        record.id = id.clone();
        state.networks.push(record);
        Ok(id)
    }

    async fn get_network(&self, id: &str) -> BackendResult<BackendNetwork> {
        let state = self.state.lock().expect("backend state lock");
        state
            .networks
            .iter()
            .find(|network| network.id == id)
            .cloned()
            .ok_or_else(|| BackendError::not_found(id))
    }

    async fn delete_network(&self, id: &str) -> BackendResult<()> {
        let mut state = self.state.lock().expect("backend state lock");
        let index = state
            .networks
            .iter()
            .position(|network| network.id == id)
            .ok_or_else(|| BackendError::not_found(id))?;
        state.networks.remove(index);
        Ok(())
    }

    async fn list_networks(&self) -> BackendResult<Vec<BackendNetwork>> {
        let state = self.state.lock().expect("backend state lock");
        Ok(state.networks.clone())
    }

    async fn create_port(&self, config: &BackendPort) -> BackendResult<String> {
        let mut state = self.state.lock().expect("backend state lock");
        let id = format!("bport-{}", state.next_id);
        state.next_id += 1;
        let mut record = config.clone();
        record.id = id.clone();
        state.ports.push(record);
        Ok(id)
    }

    async fn delete_port(&self, id: &str) -> BackendResult<()> {
        let mut state = self.state.lock().expect("backend state lock");
        let index = state
            .ports
            .iter()
            .position(|port| port.id == id)
            .ok_or_else(|| BackendError::not_found(id))?;
        state.ports.remove(index);
        Ok(())
    }

    async fn list_ports(&self) -> BackendResult<Vec<BackendPort>> {
        let state = self.state.lock().expect("backend state lock");
        Ok(state.ports.clone())
    }
}
