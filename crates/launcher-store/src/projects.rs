//! Project registry backends.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::warn;

use launcher_protocols::{Project, ProjectRegistry};

/// Reads the launcher's `projects.json` on every lookup.
///
/// The file is owned by the UI, so it is never cached or written here.
pub struct FileProjectRegistry {
    path: PathBuf,
}

impl FileProjectRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl ProjectRegistry for FileProjectRegistry {
    async fn list_projects(&self) -> Vec<Project> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("Failed to read projects file {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Project>>(&content) {
            Ok(projects) => projects.into_iter().map(Project::normalized).collect(),
            Err(e) => {
                warn!("Failed to parse projects file {:?}: {}", self.path, e);
                Vec::new()
            }
        }
    }
}

/// Fixed project list for tests and embedding.
#[derive(Default)]
pub struct MemoryProjectRegistry {
    projects: RwLock<Vec<Project>>,
}

impl MemoryProjectRegistry {
    pub fn new(projects: Vec<Project>) -> Self {
        Self {
            projects: RwLock::new(projects.into_iter().map(Project::normalized).collect()),
        }
    }

    pub async fn insert(&self, project: Project) {
        self.projects.write().await.push(project.normalized());
    }
}

#[async_trait]
impl ProjectRegistry for MemoryProjectRegistry {
    async fn list_projects(&self) -> Vec<Project> {
        self.projects.read().await.clone()
    }
}
