//! In-memory [`Store`] for tests and local development.
//!
//! Data lives only as long as the process. Writes are serialized by a single
//! `RwLock`, which gives the same credential semantics as the database: one
//! initializer wins, last `replace` wins.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use bridgia_core::{AdminCredential, ContactSubmission, NewSubmission, PasswordHash, SubmissionId};

use super::{CredentialStore, RepositoryError, Store, SubmissionStore};

#[derive(Default)]
struct Inner {
    /// Insertion order, oldest first.
    submissions: Vec<ContactSubmission>,
    credential: Option<AdminCredential>,
}

/// Process-local store. Cheap to clone; clones share data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(submissions: &[ContactSubmission]) -> Vec<ContactSubmission> {
        let mut sorted: Vec<ContactSubmission> = submissions.iter().rev().cloned().collect();
        // Stable sort: equal timestamps keep the later insert first
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn create_submission(
        &self,
        new: NewSubmission,
    ) -> Result<ContactSubmission, RepositoryError> {
        let submission = new.into_submission(SubmissionId::generate(), Utc::now());
        self.inner.write().await.submissions.push(submission.clone());
        Ok(submission)
    }

    async fn list_submissions(&self) -> Result<Vec<ContactSubmission>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(Self::newest_first(&inner.submissions))
    }

    async fn recent_submissions(
        &self,
        limit: u32,
    ) -> Result<Vec<ContactSubmission>, RepositoryError> {
        let inner = self.inner.read().await;
        let mut recent = Self::newest_first(&inner.submissions);
        recent.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(recent)
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get_credential(&self) -> Result<Option<AdminCredential>, RepositoryError> {
        Ok(self.inner.read().await.credential.clone())
    }

    async fn insert_credential(&self, hash: &PasswordHash) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.credential.is_some() {
            return Err(RepositoryError::Conflict(
                "admin credential already initialized".to_owned(),
            ));
        }

        let now = Utc::now();
        inner.credential = Some(AdminCredential {
            password_hash: hash.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(())
    }

    async fn replace_credential(&self, hash: &PasswordHash) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        let credential = inner.credential.as_mut().ok_or(RepositoryError::NotFound)?;
        credential.password_hash = hash.clone();
        credential.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bridgia_core::Email;

    fn new_submission(name: &str) -> NewSubmission {
        NewSubmission {
            name: name.to_owned(),
            email: Email::parse("visitor@example.com").unwrap(),
            company: None,
            message: "Hello".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = MemoryStore::new();
        store.create_submission(new_submission("first")).await.unwrap();
        store.create_submission(new_submission("second")).await.unwrap();
        store.create_submission(new_submission("third")).await.unwrap();

        let names: Vec<_> = store
            .list_submissions()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_recent_respects_limit() {
        let store = MemoryStore::new();
        for name in ["a", "b", "c"] {
            store.create_submission(new_submission(name)).await.unwrap();
        }

        let recent = store.recent_submissions(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].name, "c");
    }

    #[tokio::test]
    async fn test_credential_insert_once() {
        let store = MemoryStore::new();
        let hash = PasswordHash::new("hash-1".to_owned());

        store.insert_credential(&hash).await.unwrap();
        let second = store
            .insert_credential(&PasswordHash::new("hash-2".to_owned()))
            .await;

        assert!(matches!(second, Err(RepositoryError::Conflict(_))));
        let stored = store.get_credential().await.unwrap().unwrap();
        assert_eq!(stored.password_hash, hash);
    }

    #[tokio::test]
    async fn test_replace_requires_existing() {
        let store = MemoryStore::new();
        let result = store
            .replace_credential(&PasswordHash::new("hash".to_owned()))
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_replace_overwrites_hash() {
        let store = MemoryStore::new();
        store
            .insert_credential(&PasswordHash::new("old".to_owned()))
            .await
            .unwrap();
        store
            .replace_credential(&PasswordHash::new("new".to_owned()))
            .await
            .unwrap();

        let stored = store.get_credential().await.unwrap().unwrap();
        assert_eq!(stored.password_hash.as_str(), "new");
    }
}
