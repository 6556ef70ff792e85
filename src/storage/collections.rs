use std::collections::HashMap;

use chrono::Utc;

use super::{AcceptanceTest, MergeRequest, Status};

/// Merge requests keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MergeRequestRepository {
    items: HashMap<String, MergeRequest>,
}

impl MergeRequestRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// All merge requests, sorted by id.
    pub fn list(&self) -> Vec<MergeRequest> {
        let mut items: Vec<MergeRequest> = self.items.values().cloned().collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        items
    }

    /// Look up a merge request.
    pub fn get(&self, id: &str) -> Option<&MergeRequest> {
        self.items.get(id)
    }

    /// Insert or replace a merge request.
    pub fn upsert(&mut self, item: MergeRequest) -> MergeRequest {
        self.items.insert(item.id.clone(), item.clone());
        item
    }

    /// Remove a merge request; its stories are left in place.
    pub fn delete(&mut self, id: &str) -> Option<MergeRequest> {
        self.items.remove(id)
    }

    /// Set the status of a merge request.
    pub fn update_status(&mut self, id: &str, status: Status) -> Option<MergeRequest> {
        let item = self.items.get_mut(id)?;
        item.status = status;
        Some(item.clone())
    }

    /// Record a branch synchronisation: flips the drift flag and stamps
    /// the sync time.
    pub fn update_branch(&mut self, id: &str) -> Option<MergeRequest> {
        let item = self.items.get_mut(id)?;
        item.drift = !item.drift;
        item.last_sync_at = Some(Utc::now());
        Some(item.clone())
    }

    /// Replace every merge request.
    pub fn reset(&mut self, items: impl IntoIterator<Item = MergeRequest>) {
        self.items = items.into_iter().map(|i| (i.id.clone(), i)).collect();
    }

    /// Number of merge requests.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no merge requests.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Acceptance tests keyed by id.
#[derive(Debug, Clone, Default)]
pub struct AcceptanceTestRepository {
    items: HashMap<String, AcceptanceTest>,
}

impl AcceptanceTestRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// All tests, sorted by id.
    pub fn list(&self) -> Vec<AcceptanceTest> {
        let mut items: Vec<AcceptanceTest> = self.items.values().cloned().collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        items
    }

    /// Tests of one story, sorted by id.
    pub fn list_by_story(&self, story_id: &str) -> Vec<AcceptanceTest> {
        let mut items: Vec<AcceptanceTest> = self
            .items
            .values()
            .filter(|t| t.story_id == story_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        items
    }

    /// Look up a test.
    pub fn get(&self, id: &str) -> Option<&AcceptanceTest> {
        self.items.get(id)
    }

    /// Insert or replace a test.
    pub fn upsert(&mut self, item: AcceptanceTest) -> AcceptanceTest {
        self.items.insert(item.id.clone(), item.clone());
        item
    }

    /// Remove a test.
    pub fn delete(&mut self, id: &str) -> Option<AcceptanceTest> {
        self.items.remove(id)
    }

    /// Replace every test.
    pub fn reset(&mut self, items: impl IntoIterator<Item = AcceptanceTest>) {
        self.items = items.into_iter().map(|i| (i.id.clone(), i)).collect();
    }

    /// Number of tests.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no tests.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_request_crud() {
        let mut repo = MergeRequestRepository::new();
        repo.upsert(MergeRequest::new("MR-2", "Second", "org/app", "feature/b"));
        repo.upsert(MergeRequest::new("MR-1", "First", "org/app", "feature/a"));

        let ids: Vec<_> = repo.list().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["MR-1", "MR-2"]);

        assert!(repo.delete("MR-2").is_some());
        assert!(repo.get("MR-2").is_none());
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_update_status() {
        let mut repo = MergeRequestRepository::new();
        repo.upsert(MergeRequest::new("MR-1", "First", "org/app", "main"));

        let updated = repo.update_status("MR-1", Status::Review).unwrap();
        assert_eq!(updated.status, Status::Review);
        assert_eq!(repo.get("MR-1").unwrap().status, Status::Review);
        assert!(repo.update_status("missing", Status::Done).is_none());
    }

    #[test]
    fn test_update_branch_toggles_drift() {
        let mut repo = MergeRequestRepository::new();
        repo.upsert(MergeRequest::new("MR-1", "First", "org/app", "main"));

        let first = repo.update_branch("MR-1").unwrap();
        assert!(first.drift);
        assert!(first.last_sync_at.is_some());

        let second = repo.update_branch("MR-1").unwrap();
        assert!(!second.drift);
        assert!(second.last_sync_at >= first.last_sync_at);
        assert!(repo.update_branch("missing").is_none());
    }

    #[test]
    fn test_tests_by_story() {
        let mut repo = AcceptanceTestRepository::new();
        repo.reset([
            AcceptanceTest::new("AT-2", "S-1", "a", "b", "c"),
            AcceptanceTest::new("AT-1", "S-1", "a", "b", "c"),
            AcceptanceTest::new("AT-3", "S-2", "a", "b", "c"),
        ]);

        let ids: Vec<_> = repo.list_by_story("S-1").into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["AT-1", "AT-2"]);
        assert!(repo.list_by_story("S-9").is_empty());
        assert_eq!(repo.len(), 3);
    }
}
