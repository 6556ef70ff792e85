use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult, Entity, StoreError};
use crate::storage::{DataStore, MergeRequest, Status};

/// Fields accepted when opening a merge request.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeRequestCreate {
    /// Caller-chosen identifier.
    pub id: String,
    /// Short title.
    pub title: String,
    /// Free-form description; empty when omitted.
    #[serde(default)]
    pub description: String,
    /// Repository slug, e.g. `org/app`.
    #[serde(alias = "repository")]
    pub repo: String,
    /// Source branch.
    pub branch: String,
}

/// Partial merge request update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MergeRequestUpdate {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New repository slug.
    #[serde(alias = "repository")]
    pub repo: Option<String>,
    /// New source branch.
    pub branch: Option<String>,
    /// New status.
    pub status: Option<Status>,
}

/// Result of a branch synchronisation.
#[derive(Debug, Clone, Serialize)]
pub struct BranchUpdateResponse {
    /// The merge request after synchronisation.
    pub data: MergeRequest,
    /// Human-readable confirmation.
    pub message: String,
}

/// Merge request operations.
pub struct MergeRequestService {
    store: Arc<DataStore>,
}

impl MergeRequestService {
    /// Create a new merge request service
    pub fn new(store: Arc<DataStore>) -> Self {
        Self { store }
    }

    /// All merge requests, ordered by id.
    pub fn list(&self) -> Vec<MergeRequest> {
        self.store.read().merge_requests.list()
    }

    /// A single merge request.
    pub fn get(&self, id: &str) -> AppResult<MergeRequest> {
        self.store
            .read()
            .merge_requests
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// Open a new merge request in draft status.
    pub fn create(&self, params: MergeRequestCreate) -> AppResult<MergeRequest> {
        let mut guard = self.store.write();
        if guard.merge_requests.get(&params.id).is_some() {
            warn!(merge_request_id = %params.id, "Rejected duplicate merge request");
            return Err(StoreError::AlreadyExists {
                entity: Entity::MergeRequest,
                id: params.id,
            }
            .into());
        }

        let item = MergeRequest::new(params.id, params.title, params.repo, params.branch)
            .with_description(params.description);
        debug!(merge_request_id = %item.id, "Merge request created");
        Ok(guard.merge_requests.upsert(item))
    }

    /// Apply a partial update; absent fields are left unchanged.
    pub fn update(&self, id: &str, update: MergeRequestUpdate) -> AppResult<MergeRequest> {
        let mut guard = self.store.write();
        let mut item = guard
            .merge_requests
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))?;

        if let Some(title) = update.title {
            item.title = title;
        }
        if let Some(description) = update.description {
            item.description = description;
        }
        if let Some(repo) = update.repo {
            item.repository = repo;
        }
        if let Some(branch) = update.branch {
            item.branch = branch;
        }
        if let Some(status) = update.status {
            item.status = status;
        }

        debug!(merge_request_id = %id, "Merge request updated");
        Ok(guard.merge_requests.upsert(item))
    }

    /// Change only the status.
    pub fn set_status(&self, id: &str, status: Status) -> AppResult<MergeRequest> {
        let updated = self
            .store
            .write()
            .merge_requests
            .update_status(id, status)
            .ok_or_else(|| not_found(id))?;
        debug!(merge_request_id = %id, status = %status, "Merge request status changed");
        Ok(updated)
    }

    /// Synchronise the branch: toggles drift and stamps the sync time.
    pub fn update_branch(&self, id: &str) -> AppResult<BranchUpdateResponse> {
        let data = self
            .store
            .write()
            .merge_requests
            .update_branch(id)
            .ok_or_else(|| not_found(id))?;
        debug!(merge_request_id = %id, drift = data.drift, "Branch synchronised");
        Ok(BranchUpdateResponse {
            data,
            message: "Branch updated successfully".to_string(),
        })
    }

    /// Remove a merge request; its stories stay in the store.
    pub fn delete(&self, id: &str) -> AppResult<MergeRequest> {
        let removed = self
            .store
            .write()
            .merge_requests
            .delete(id)
            .ok_or_else(|| not_found(id))?;
        debug!(merge_request_id = %id, "Merge request deleted");
        Ok(removed)
    }
}

fn not_found(id: &str) -> AppError {
    StoreError::NotFound {
        entity: Entity::MergeRequest,
        id: id.to_string(),
    }
    .into()
}
