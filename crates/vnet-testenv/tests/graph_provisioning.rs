//! Find-or-create provisioning against the in-memory control plane.

use pretty_assertions::assert_eq;
use vnet_graph::{GraphApi, GraphClient, GraphError, GraphObject, ResourceType};
use vnet_testenv::MemoryGraph;

fn client_with_network() -> GraphClient<MemoryGraph> {
    let graph = MemoryGraph::new();
    graph.seed_network("blue", "frontend", &[("10.10.10.0/24", "10.10.10.1")]);
    GraphClient::new(graph)
}

#[tokio::test]
async fn test_find_network() {
    let client = client_with_network();
    let network = client.find_network("blue", "frontend").await.unwrap();
    assert_eq!(network.fq_name(), "default-domain:blue:frontend");
    assert_eq!(network.subnets.len(), 1);
}

#[tokio::test]
async fn test_find_network_absent() {
    let client = client_with_network();
    let err = client.find_network("blue", "no-such-net").await.unwrap_err();
    assert!(err.is_not_found());
}

/// N calls with the same identity create exactly one instance, and every
/// call returns the same object.
#[tokio::test]
async fn test_get_or_create_instance_is_idempotent() {
    let client = client_with_network();

    let first = client.get_or_create_instance("blue", "c1").await.unwrap();
    let second = client.get_or_create_instance("blue", "c1").await.unwrap();
    let third = client.get_or_create_instance("blue", "c1").await.unwrap();

    assert!(!first.uuid.is_nil(), "create must assign a server-side uuid");
    assert_eq!(first.uuid, second.uuid);
    assert_eq!(first.uuid, third.uuid);
    assert_eq!(client.api().count(ResourceType::Instance), 1);
}

#[tokio::test]
async fn test_distinct_identities_create_distinct_instances() {
    let client = client_with_network();

    let one = client.get_or_create_instance("blue", "c1").await.unwrap();
    let other = client.get_or_create_instance("green", "c1").await.unwrap();

    assert_ne!(one.uuid, other.uuid);
    assert_eq!(client.api().count(ResourceType::Instance), 2);
}

#[tokio::test]
async fn test_get_or_create_interface_links_and_mac() {
    let client = client_with_network();
    let network = client.find_network("blue", "frontend").await.unwrap();
    let instance = client.get_or_create_instance("blue", "c1").await.unwrap();

    let interface = client
        .get_or_create_interface(&network, &instance)
        .await
        .unwrap();

    assert_eq!(interface.instance, Some(instance.object_ref()));
    assert_eq!(interface.network, Some(network.object_ref()));
    // the store assigns the MAC on create; the re-fetch must observe it
    let mac = client.interface_mac(&interface).unwrap();
    assert_eq!(mac.to_string(), mac.to_string().to_lowercase());

    let again = client
        .get_or_create_interface(&network, &instance)
        .await
        .unwrap();
    assert_eq!(again.uuid, interface.uuid);
    assert_eq!(client.api().count(ResourceType::Interface), 1);
}

#[tokio::test]
async fn test_get_or_create_instance_ip_allocates() {
    let client = client_with_network();
    let network = client.find_network("blue", "frontend").await.unwrap();
    let instance = client.get_or_create_instance("blue", "c1").await.unwrap();
    let interface = client
        .get_or_create_interface(&network, &instance)
        .await
        .unwrap();

    let allocated = client
        .get_or_create_instance_ip(&network, &interface)
        .await
        .unwrap();

    let ip = allocated.ip().expect("re-fetch returns the allocation");
    assert!(ip.to_string().starts_with("10.10.10."));
    assert_eq!(allocated.name, "blue_c1");

    let again = client
        .get_or_create_instance_ip(&network, &interface)
        .await
        .unwrap();
    assert_eq!(again.uuid, allocated.uuid);
    assert_eq!(again.ip(), allocated.ip());
    assert_eq!(client.api().count(ResourceType::Address), 1);
}

/// MAC assignment is asynchronous server-side; an interface read before the
/// control plane got around to it has an empty MAC list.
#[tokio::test]
async fn test_interface_mac_before_assignment() {
    let graph = MemoryGraph::new().with_deferred_macs();
    graph.seed_network("blue", "frontend", &[("10.10.10.0/24", "10.10.10.1")]);
    let client = GraphClient::new(graph);

    let network = client.find_network("blue", "frontend").await.unwrap();
    let instance = client.get_or_create_instance("blue", "c1").await.unwrap();
    let interface = client
        .get_or_create_interface(&network, &instance)
        .await
        .unwrap();

    assert!(matches!(
        client.interface_mac(&interface),
        Err(GraphError::EmptyMacList { .. })
    ));
}

#[tokio::test]
async fn test_update_replaces_object() {
    let client = client_with_network();
    let mut network = client.find_network("blue", "frontend").await.unwrap();

    network.subnets.push(vnet_graph::Subnet {
        prefix: "10.20.0.0/24".parse().unwrap(),
        default_gateway: Some("10.20.0.1".parse().unwrap()),
    });
    client
        .api()
        .update(GraphObject::Network(network))
        .await
        .unwrap();

    let refreshed = client.find_network("blue", "frontend").await.unwrap();
    assert_eq!(refreshed.subnets.len(), 2);
    // two subnets and no CIDR means the choice is ambiguous now
    assert!(matches!(
        client.resolve_subnet(&refreshed, ""),
        Err(GraphError::Ambiguous { .. })
    ));
}
