use async_trait::async_trait;
use chrono::{DateTime, Utc};
use picmeta_storage::{
    ObjectLocation, Storage, StorageBackend, StorageError, StorageResult, StoredObject,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// Storage that keeps objects in memory
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<ObjectLocation, (Vec<u8>, String)>>,
    last_modified: Option<DateTime<Utc>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_last_modified(last_modified: DateTime<Utc>) -> Self {
        Self {
            last_modified: Some(last_modified),
            ..Default::default()
        }
    }

    pub fn put(&self, location: &ObjectLocation, data: Vec<u8>) {
        self.objects
            .lock()
            .unwrap()
            .insert(location.clone(), (data, "application/octet-stream".to_string()));
    }

    pub fn get(&self, location: &ObjectLocation) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(location)
            .map(|(data, _)| data.clone())
    }

    pub fn content_type(&self, location: &ObjectLocation) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(location)
            .map(|(_, ct)| ct.clone())
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn download(&self, location: &ObjectLocation) -> StorageResult<StoredObject> {
        let data = self
            .get(location)
            .ok_or_else(|| StorageError::NotFound(location.to_string()))?;
        Ok(StoredObject {
            data,
            last_modified: self.last_modified,
        })
    }

    async fn upload(
        &self,
        location: &ObjectLocation,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        self.objects
            .lock()
            .unwrap()
            .insert(location.clone(), (data, content_type.to_string()));
        Ok(format!("memory://{}", location))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
