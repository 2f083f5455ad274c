use crate::drive::error::DriveError;
use crate::drive::storage::{ObjectStore, StoredObject};
use crate::stream::ByteStream;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct FakeFile {
    name: String,
    mime_type: String,
    data: Bytes,
}

/// `FakeObjectStore` is an in-memory implementation of the `ObjectStore` trait for testing purposes.
/// It records every upload attempt and can simulate failures and missing links.
#[derive(Clone, Default)]
pub struct FakeObjectStore {
    files: Arc<Mutex<HashMap<String, FakeFile>>>,
    attempts: Arc<Mutex<Vec<String>>>,
    fail_names: Arc<Mutex<Vec<String>>>,
    links: Arc<Mutex<HashMap<String, Option<String>>>>,
    misconfigured: Arc<Mutex<bool>>,
}

impl FakeObjectStore {
    /// Create a new empty FakeObjectStore instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every upload whose file name contains `fragment`
    pub fn fake_fail_object(&self, fragment: &str) {
        self.fail_names.lock().unwrap().push(fragment.to_string());
    }

    /// Answer uploads whose file name contains `fragment` with this link
    /// (`None` simulates a success response without a link)
    pub fn fake_respond_with_link(&self, fragment: &str, link: Option<&str>) {
        self.links
            .lock()
            .unwrap()
            .insert(fragment.to_string(), link.map(str::to_string));
    }

    /// Report a configuration error on every upload
    pub fn fake_misconfigure(&self) {
        *self.misconfigured.lock().unwrap() = true;
    }

    /// File names passed to `upload_object`, in call order, including failed ones
    pub fn attempted_uploads(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn stored_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    /// Name and MIME type of a stored file
    pub fn stored_file(&self, id: &str) -> Option<(String, String)> {
        self.files
            .lock()
            .unwrap()
            .get(id)
            .map(|f| (f.name.clone(), f.mime_type.clone()))
    }

    fn link_for(&self, name: &str, id: &str) -> Option<String> {
        let links = self.links.lock().unwrap();
        match links.iter().find(|(fragment, _)| name.contains(fragment.as_str())) {
            Some((_, link)) => link.clone(),
            None => Some(format!("https://drive.fake/file/d/{}/view", id)),
        }
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn upload_object(
        &self,
        name: &str,
        mime_type: &str,
        content: ByteStream,
    ) -> Result<StoredObject, DriveError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(name.to_string());
            attempts.len()
        };

        if *self.misconfigured.lock().unwrap() {
            return Err(DriveError::Configuration(
                "Simulated missing folder id".to_string(),
            ));
        }

        let should_fail = self
            .fail_names
            .lock()
            .unwrap()
            .iter()
            .any(|fragment| name.contains(fragment.as_str()));
        if should_fail {
            return Err(DriveError::Network(
                name.to_string(),
                "Simulated failure".to_string(),
            ));
        }

        let data = content.into_bytes().await?;

        let id = format!("fake-{}", attempt);
        self.files.lock().unwrap().insert(
            id.clone(),
            FakeFile {
                name: name.to_string(),
                mime_type: mime_type.to_string(),
                data,
            },
        );

        let view_url = self.link_for(name, &id);
        Ok(StoredObject { id, view_url })
    }

    #[cfg(test)]
    async fn fetch_object(&self, id: &str) -> Result<Bytes, DriveError> {
        self.files
            .lock()
            .unwrap()
            .get(id)
            .map(|f| f.data.clone())
            .ok_or_else(|| DriveError::NotFound(id.to_string()))
    }

    #[cfg(test)]
    async fn remove_object(&self, id: &str) -> Result<(), DriveError> {
        match self.files.lock().unwrap().remove(id) {
            Some(_) => Ok(()),
            None => Err(DriveError::NotFound(id.to_string())),
        }
    }
}
