//! The transport boundary trait for the control-plane graph.

use crate::error::GraphResult;
use crate::objects::{GraphObject, ObjectRef, ResourceType};
use async_trait::async_trait;
use uuid::Uuid;

/// Object CRUD against the control-plane graph.
///
/// Implementations are thin typed wrappers over the remote REST surface; the
/// client layers find-or-create and recursive deletion on top. Error
/// contract:
///
/// - `delete` of a missing object fails `NotFound`.
/// - `delete` of an object that other objects still reference fails
///   `Conflict`, with the dependents embedded in the message as
///   `<type>/<uuid>` references.
/// - `create` of a name that already exists fails `AlreadyExists`.
/// - `find_*` return `Ok(None)` for absent objects; errors are reserved for
///   transport failures.
#[async_trait]
pub trait GraphApi: Send + Sync {
    /// Persists a new object and returns its server-assigned handle.
    async fn create(&self, object: GraphObject) -> GraphResult<ObjectRef>;

    /// Replaces an existing object, matched by uuid.
    async fn update(&self, object: GraphObject) -> GraphResult<()>;

    /// Deletes one object.
    async fn delete(&self, node: ObjectRef) -> GraphResult<()>;

    /// Looks up an object by its canonical name.
    async fn find_by_name(
        &self,
        ty: ResourceType,
        name: &str,
    ) -> GraphResult<Option<GraphObject>>;

    /// Looks up an object by uuid.
    async fn find_by_uuid(&self, ty: ResourceType, uuid: Uuid)
        -> GraphResult<Option<GraphObject>>;
}
