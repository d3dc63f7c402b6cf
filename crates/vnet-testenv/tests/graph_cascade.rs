//! Recursive deletion, with dependents discovered only through conflict
//! responses.

use async_trait::async_trait;
use uuid::Uuid;
use vnet_graph::{
    GraphApi, GraphClient, GraphError, GraphObject, GraphResult, ObjectRef, ResourceType,
};
use vnet_testenv::MemoryGraph;

async fn provisioned_chain(
    client: &GraphClient<MemoryGraph>,
) -> (ObjectRef, ObjectRef, ObjectRef, ObjectRef) {
    let network = client.find_network("blue", "frontend").await.unwrap();
    let instance = client.get_or_create_instance("blue", "c1").await.unwrap();
    let interface = client
        .get_or_create_interface(&network, &instance)
        .await
        .unwrap();
    let address = client
        .get_or_create_instance_ip(&network, &interface)
        .await
        .unwrap();
    (
        network.object_ref(),
        instance.object_ref(),
        interface.object_ref(),
        address.object_ref(),
    )
}

fn seeded_client() -> GraphClient<MemoryGraph> {
    let graph = MemoryGraph::new();
    graph.seed_network("blue", "frontend", &[("10.10.10.0/24", "10.10.10.1")]);
    GraphClient::new(graph)
}

/// Instance ← interface ← address: deleting the instance discovers the
/// interface from the first conflict and the address from the next one,
/// then unwinds the whole chain.
#[tokio::test]
async fn test_delete_removes_dependency_chain() {
    let client = seeded_client();
    let (network, instance, interface, address) = provisioned_chain(&client).await;

    client.delete_recursive(instance).await.unwrap();

    assert!(!client.api().contains(instance));
    assert!(!client.api().contains(interface));
    assert!(!client.api().contains(address));
    // the network was never in the instance's dependency cone
    assert!(client.api().contains(network));
}

/// Deleting the network takes the attachment objects with it but leaves the
/// workload instance, which nothing under the network references.
#[tokio::test]
async fn test_delete_network_cascades_attachments() {
    let client = seeded_client();
    let (network, instance, interface, address) = provisioned_chain(&client).await;

    client.delete_recursive(network).await.unwrap();

    assert!(!client.api().contains(network));
    assert!(!client.api().contains(interface));
    assert!(!client.api().contains(address));
    assert!(client.api().contains(instance));
}

/// An already-absent object is not an error: somebody else finished the
/// cleanup first.
#[tokio::test]
async fn test_delete_tolerates_absent_object() {
    let client = seeded_client();
    let ghost = ObjectRef::new(ResourceType::Instance, Uuid::new_v4());
    client.delete_recursive(ghost).await.unwrap();
}

/// Store stub whose delete always fails the same scripted way.
struct ScriptedApi {
    delete_error: fn() -> GraphError,
}

#[async_trait]
impl GraphApi for ScriptedApi {
    async fn create(&self, _object: GraphObject) -> GraphResult<ObjectRef> {
        Err(GraphError::unavailable("not scripted"))
    }

    async fn update(&self, _object: GraphObject) -> GraphResult<()> {
        Err(GraphError::unavailable("not scripted"))
    }

    async fn delete(&self, _node: ObjectRef) -> GraphResult<()> {
        Err((self.delete_error)())
    }

    async fn find_by_name(
        &self,
        _ty: ResourceType,
        _name: &str,
    ) -> GraphResult<Option<GraphObject>> {
        Err(GraphError::unavailable("not scripted"))
    }

    async fn find_by_uuid(
        &self,
        _ty: ResourceType,
        _uuid: Uuid,
    ) -> GraphResult<Option<GraphObject>> {
        // whatever the conflict message named, it is gone
        Ok(None)
    }
}

/// A conflict naming a dependent that can no longer be fetched fails the
/// lookup rather than looping.
#[tokio::test]
async fn test_unfetchable_dependent_fails_lookup() {
    let client = GraphClient::new(ScriptedApi {
        delete_error: || {
            GraphError::conflict(
                "409 Conflict: delete when children still present: \
                 ['https://controller:8082/virtual-interface/23e300f4-ab1a-4d97-a1d9-9ed69b601e17']",
            )
        },
    });

    let err = client
        .delete_recursive(ObjectRef::new(ResourceType::Instance, Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::ChildLookupFailed { .. }));
}

/// A conflict whose message carries no parseable references would retry
/// forever; it must propagate instead.
#[tokio::test]
async fn test_conflict_without_references_propagates() {
    let client = GraphClient::new(ScriptedApi {
        delete_error: || GraphError::conflict("409 Conflict: delete refused"),
    });

    let err = client
        .delete_recursive(ObjectRef::new(ResourceType::Instance, Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::Conflict { .. }));
}

/// Anything that is neither success, not-found nor conflict is returned
/// as-is.
#[tokio::test]
async fn test_unrecognized_error_propagates() {
    let client = GraphClient::new(ScriptedApi {
        delete_error: || GraphError::unavailable("connection reset"),
    });

    let err = client
        .delete_recursive(ObjectRef::new(ResourceType::Instance, Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::Unavailable { .. }));
}
