//! Category Directory
//!
//! The backend seam: a full catalog read and an id-addressed sparse write.
//! Implementations never cache; every call goes to the backend.

pub mod memory;
pub mod wordpress;

use async_trait::async_trait;

use crate::category::{Category, CategoryPatch};
use crate::config::Credentials;
use crate::error::DirectoryResult;

pub use memory::InMemoryDirectory;
pub use wordpress::WordPressDirectory;

/// Read/write access to the category catalog
#[async_trait]
pub trait CategoryDirectory: Send + Sync {
    /// Fetch every category known to the backend.
    ///
    /// Fails with `DirectoryError::Connection` if the backend is unreachable
    /// or rejects the credentials.
    async fn list_all(&self, credentials: &Credentials) -> DirectoryResult<Vec<Category>>;

    /// Apply only the fields present in `patch` to category `id`.
    ///
    /// Returns the category as stored after the write. Fails with
    /// `DirectoryError::Update` when the backend rejects the write.
    async fn update(
        &self,
        credentials: &Credentials,
        id: u64,
        patch: &CategoryPatch,
    ) -> DirectoryResult<Category>;

    /// Backend name for logging
    fn backend_name(&self) -> &str;
}
