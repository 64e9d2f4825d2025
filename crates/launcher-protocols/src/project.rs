//! Project registry protocol.

use async_trait::async_trait;

use crate::types::Project;

/// Read-only access to the user's projects.
///
/// Owned by the launcher UI; the scheduler only looks projects up.
#[async_trait]
pub trait ProjectRegistry: Send + Sync {
    /// All projects. Unreadable storage yields an empty list.
    async fn list_projects(&self) -> Vec<Project>;

    async fn get_project(&self, id: &str) -> Option<Project> {
        self.list_projects().await.into_iter().find(|p| p.id == id)
    }

    /// Whether `path` is the working directory of a registered project.
    async fn is_registered_path(&self, path: &str) -> bool {
        self.list_projects().await.iter().any(|p| p.path == path)
    }
}
