//! End-to-end endpoint lifecycle through the driver, against all three
//! in-memory stores.

use netplugind::{
    CreateEndpointRequest, CreateNetworkRequest, DeleteEndpointRequest, DeleteNetworkRequest,
    DriverError, JoinRequest, LeaveRequest, NetDriver,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use vnet_backend::BackendError;
use vnet_graph::ResourceType;
use vnet_testenv::{MemoryBackend, MemoryGraph, MemoryOrchestrator};
use vnet_types::MacAddress;

type TestDriver = NetDriver<MemoryGraph, MemoryBackend, MemoryOrchestrator>;

fn options(tenant: &str, network: &str) -> Map<String, Value> {
    match json!({ "generic": { "tenant": tenant, "network": network } }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Driver over a seeded control plane: tenant `blue`, network `frontend`,
/// subnet 10.10.10.0/24 with gateway 10.10.10.1, known to the orchestrator
/// as `net-1`.
fn driver() -> TestDriver {
    let graph = MemoryGraph::new();
    graph.seed_network("blue", "frontend", &[("10.10.10.0/24", "10.10.10.1")]);
    let orchestrator = MemoryOrchestrator::new();
    orchestrator.add_network("net-1", "blue", "frontend");
    NetDriver::new(graph, MemoryBackend::new(), orchestrator, "Ethernet0")
}

fn create_network_request() -> CreateNetworkRequest {
    CreateNetworkRequest {
        network_id: "net-1".to_string(),
        options: options("blue", "frontend"),
        // the orchestrator passes an all-zero pool when the user gave none
        ipam_pool: "0.0.0.0/0".to_string(),
    }
}

async fn provisioned_driver() -> TestDriver {
    let driver = driver();
    driver.create_network(&create_network_request()).await.unwrap();
    driver
}

#[test]
fn test_capabilities() {
    assert_eq!(driver().capabilities().scope, "local");
}

#[tokio::test]
async fn test_create_network_mirrors_graph_subnet() {
    let driver = provisioned_driver().await;

    let network = driver.backend().get_network("blue", "frontend").await.unwrap();
    assert_eq!(network.name, "vnet:blue:frontend");
    assert_eq!(network.kind, "transparent");
    assert_eq!(network.adapter, "Ethernet0");
    assert_eq!(network.subnets[0].prefix.to_string(), "10.10.10.0/24");
    assert_eq!(network.subnets[0].gateway.to_string(), "10.10.10.1");
}

#[tokio::test]
async fn test_create_network_twice_collides() {
    let driver = provisioned_driver().await;
    let err = driver.create_network(&create_network_request()).await.unwrap_err();
    assert!(matches!(
        err,
        DriverError::Backend(BackendError::AlreadyExists { .. })
    ));
}

#[tokio::test]
async fn test_create_network_requires_identity_options() {
    let driver = driver();
    let request = CreateNetworkRequest {
        network_id: "net-1".to_string(),
        options: Map::new(),
        ipam_pool: String::new(),
    };
    assert!(matches!(
        driver.create_network(&request).await.unwrap_err(),
        DriverError::MissingOption { .. }
    ));
}

#[tokio::test]
async fn test_create_network_unknown_graph_network() {
    let driver = driver();
    let request = CreateNetworkRequest {
        network_id: "net-1".to_string(),
        options: options("blue", "no-such-net"),
        ipam_pool: String::new(),
    };
    assert!(matches!(
        driver.create_network(&request).await.unwrap_err(),
        DriverError::Graph(err) if err.is_not_found()
    ));
}

/// 1. provision the network and an endpoint for container `c1`
/// 2. the response address carries the subnet's prefix length
/// 3. the response MAC (graph form) and the port MAC (backend form) are the
///    same octets
#[tokio::test]
async fn test_create_endpoint_end_to_end() {
    let driver = provisioned_driver().await;

    let response = driver
        .create_endpoint(&CreateEndpointRequest {
            network_id: "net-1".to_string(),
            endpoint_id: "c1".to_string(),
        })
        .await
        .unwrap();

    let (ip, prefix_len) = response.address.split_once('/').unwrap();
    assert_eq!(prefix_len, "24");
    assert!(ip.starts_with("10.10.10."));

    let mac: MacAddress = response.mac.parse().unwrap();
    assert_eq!(response.mac, mac.to_string(), "response MAC is in graph form");

    let port = driver.backend().find_port("c1").await.unwrap().unwrap();
    assert_eq!(port.network, "vnet:blue:frontend");
    assert_eq!(port.ip.to_string(), ip);
    assert_eq!(port.gateway.to_string(), "10.10.10.1");
    assert_eq!(port.mac, mac.backend_format());

    // one graph object of each kind backs the endpoint
    let graph = driver.graph().api();
    assert_eq!(graph.count(ResourceType::Instance), 1);
    assert_eq!(graph.count(ResourceType::Interface), 1);
    assert_eq!(graph.count(ResourceType::Address), 1);
}

#[tokio::test]
async fn test_create_endpoint_without_backend_network() {
    // the backend was reset after the network was provisioned
    let driver = driver();
    let err = driver
        .create_endpoint(&CreateEndpointRequest {
            network_id: "net-1".to_string(),
            endpoint_id: "c1".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DriverError::Backend(BackendError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_join_surfaces_gateway_and_owns_it() {
    let driver = provisioned_driver().await;
    driver
        .create_endpoint(&CreateEndpointRequest {
            network_id: "net-1".to_string(),
            endpoint_id: "c1".to_string(),
        })
        .await
        .unwrap();

    let response = driver
        .join(&JoinRequest {
            network_id: "net-1".to_string(),
            endpoint_id: "c1".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(response.gateway, "10.10.10.1");
    assert!(response.disable_gateway_service);

    driver
        .leave(&LeaveRequest {
            network_id: "net-1".to_string(),
            endpoint_id: "c1".to_string(),
        })
        .await
        .unwrap();

    // join and leave never mutate: the port is still there
    assert!(driver.backend().find_port("c1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_join_unknown_endpoint() {
    let driver = provisioned_driver().await;
    let err = driver
        .join(&JoinRequest {
            network_id: "net-1".to_string(),
            endpoint_id: "nope".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DriverError::EndpointNotFound { .. }));
}

#[tokio::test]
async fn test_leave_unknown_endpoint() {
    let driver = provisioned_driver().await;
    let err = driver
        .leave(&LeaveRequest {
            network_id: "net-1".to_string(),
            endpoint_id: "nope".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DriverError::EndpointNotFound { .. }));
}

#[tokio::test]
async fn test_delete_endpoint_cleans_both_stores() {
    let driver = provisioned_driver().await;
    driver
        .create_endpoint(&CreateEndpointRequest {
            network_id: "net-1".to_string(),
            endpoint_id: "c1".to_string(),
        })
        .await
        .unwrap();

    let request = DeleteEndpointRequest {
        network_id: "net-1".to_string(),
        endpoint_id: "c1".to_string(),
    };
    driver.delete_endpoint(&request).await.unwrap();

    assert!(driver.backend().find_port("c1").await.unwrap().is_none());
    let graph = driver.graph().api();
    assert_eq!(graph.count(ResourceType::Instance), 0);
    assert_eq!(graph.count(ResourceType::Interface), 0);
    assert_eq!(graph.count(ResourceType::Address), 0);

    // both sides already clean: still not an error
    driver.delete_endpoint(&request).await.unwrap();
}

#[tokio::test]
async fn test_delete_network_direct_path() {
    let driver = provisioned_driver().await;

    driver
        .delete_network(&DeleteNetworkRequest {
            network_id: "net-1".to_string(),
        })
        .await
        .unwrap();

    assert!(driver
        .backend()
        .get_network("blue", "frontend")
        .await
        .unwrap_err()
        .is_not_found());
    // the control-plane network is the operator's object, never ours to
    // delete
    assert_eq!(driver.graph().api().count(ResourceType::Network), 1);
}

#[tokio::test]
async fn test_delete_network_refused_while_endpoints_exist() {
    let driver = provisioned_driver().await;
    driver
        .create_endpoint(&CreateEndpointRequest {
            network_id: "net-1".to_string(),
            endpoint_id: "c1".to_string(),
        })
        .await
        .unwrap();

    let err = driver
        .delete_network(&DeleteNetworkRequest {
            network_id: "net-1".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DriverError::Backend(BackendError::HasActiveEndpoints { .. })
    ));
}

#[tokio::test]
async fn test_allocation_calls_are_not_implemented() {
    let driver = driver();
    assert!(matches!(
        driver.allocate_network().unwrap_err(),
        DriverError::NotImplemented { .. }
    ));
    assert!(matches!(
        driver.free_network().unwrap_err(),
        DriverError::NotImplemented { .. }
    ));
}
