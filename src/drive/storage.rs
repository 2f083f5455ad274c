use crate::drive::error::DriveError;
use crate::stream::ByteStream;
use async_trait::async_trait;
#[cfg(test)]
use bytes::Bytes;
use std::sync::Arc;

/// A file created in the object store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub id: String,
    /// Link for viewing the file; stores may omit it
    pub view_url: Option<String>,
}

/// Object store interface used to persist report photos
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Create a file in the configured folder
    ///
    /// * `name` - File name to create
    /// * `mime_type` - Content type recorded with the file
    /// * `content` - Photo bytes, consumed once
    async fn upload_object(
        &self,
        name: &str,
        mime_type: &str,
        content: ByteStream,
    ) -> Result<StoredObject, DriveError>;

    /// Download a stored file (test-only)
    #[cfg(test)]
    async fn fetch_object(&self, id: &str) -> Result<Bytes, DriveError>;

    /// Delete a stored file (test-only)
    #[cfg(test)]
    async fn remove_object(&self, id: &str) -> Result<(), DriveError>;
}

/// Implementation of ObjectStore for Arc<T> where T implements ObjectStore
///
/// This allows sharing one store between the server and tests.
#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for Arc<T> {
    async fn upload_object(
        &self,
        name: &str,
        mime_type: &str,
        content: ByteStream,
    ) -> Result<StoredObject, DriveError> {
        (**self).upload_object(name, mime_type, content).await
    }

    #[cfg(test)]
    async fn fetch_object(&self, id: &str) -> Result<Bytes, DriveError> {
        (**self).fetch_object(id).await
    }

    #[cfg(test)]
    async fn remove_object(&self, id: &str) -> Result<(), DriveError> {
        (**self).remove_object(id).await
    }
}
