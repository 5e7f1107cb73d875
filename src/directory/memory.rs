//! In-memory category directory
//!
//! Holds a catalog in process memory. Counts calls and can be told to fail,
//! which is what tests and demos need from a backend.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::CategoryDirectory;
use crate::category::{Category, CategoryPatch};
use crate::config::Credentials;
use crate::error::{DirectoryError, DirectoryResult};

#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    categories: Mutex<Vec<Category>>,
    list_calls: AtomicUsize,
    update_calls: AtomicUsize,
    fail_list: AtomicBool,
    fail_update: AtomicBool,
}

impl InMemoryDirectory {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories: Mutex::new(categories),
            ..Default::default()
        }
    }

    /// Make every `list_all` fail with a connection error
    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Make every `update` fail with an update error
    pub fn fail_update(&self, fail: bool) {
        self.fail_update.store(fail, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Current catalog contents
    pub fn snapshot(&self) -> Vec<Category> {
        self.lock().clone()
    }

    pub fn get(&self, id: u64) -> Option<Category> {
        self.lock().iter().find(|c| c.id == id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Category>> {
        // A poisoned lock only means a test panicked mid-write; the data is still usable
        self.categories
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CategoryDirectory for InMemoryDirectory {
    async fn list_all(&self, _credentials: &Credentials) -> DirectoryResult<Vec<Category>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(DirectoryError::Connection(
                "in-memory directory set to fail".to_string(),
            ));
        }
        Ok(self.snapshot())
    }

    async fn update(
        &self,
        _credentials: &Credentials,
        id: u64,
        patch: &CategoryPatch,
    ) -> DirectoryResult<Category> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(DirectoryError::Update {
                category_id: id,
                reason: "in-memory directory set to fail".to_string(),
            });
        }

        let mut categories = self.lock();
        let category = categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DirectoryError::Update {
                category_id: id,
                reason: "term does not exist".to_string(),
            })?;
        category.apply(patch);
        Ok(category.clone())
    }

    fn backend_name(&self) -> &str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::parse("https://shop.example.com", "admin", "pw").unwrap()
    }

    #[tokio::test]
    async fn test_update_is_sparse() {
        let dir = InMemoryDirectory::new(vec![
            Category::new(1, "Shoes", "shoes").with_description("Old")
        ]);
        let patch = CategoryPatch {
            slug: Some("chaussures".to_string()),
            ..Default::default()
        };
        let updated = dir.update(&creds(), 1, &patch).await.unwrap();

        assert_eq!(updated.slug, "chaussures");
        assert_eq!(updated.description, "Old");
        assert_eq!(dir.get(1).unwrap().slug, "chaussures");
        assert_eq!(dir.update_calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_update_error() {
        let dir = InMemoryDirectory::new(vec![]);
        let err = dir
            .update(&creds(), 99, &CategoryPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Update { category_id: 99, .. }));
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let dir = InMemoryDirectory::new(vec![Category::new(1, "Shoes", "shoes")]);
        dir.fail_list(true);
        assert!(dir.list_all(&creds()).await.unwrap_err().is_connection());
        dir.fail_list(false);
        assert_eq!(dir.list_all(&creds()).await.unwrap().len(), 1);
        assert_eq!(dir.list_calls(), 2);
    }
}
