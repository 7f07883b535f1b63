//! Profile read and write entry points used by the HTTP handlers

use std::sync::Arc;

use chrono_tz::Tz;

use crate::{
    error::{ProfileError, ProfileResult},
    images::ImageIngestor,
    models::{IdentityClaims, NormalizedProfileView, ProfileUpdateRequest},
    pipeline::ProfileUpdatePipeline,
    reconcile::ProfileReconciler,
    repositories::ProfileRepository,
    usage::UsageCounter,
};

/// Profile reads and updates for the authenticated user
#[derive(Clone)]
pub struct ProfileService {
    repository: Arc<dyn ProfileRepository>,
    usage: UsageCounter,
    reconciler: ProfileReconciler,
    pipeline: ProfileUpdatePipeline,
}

impl ProfileService {
    pub fn new(
        repository: Arc<dyn ProfileRepository>,
        images: ImageIngestor,
        timezone: Tz,
        max_daily_generations: u32,
    ) -> Self {
        let usage = UsageCounter::new(repository.clone(), timezone);
        let reconciler = ProfileReconciler::new(max_daily_generations);
        let pipeline =
            ProfileUpdatePipeline::new(repository.clone(), images, usage.clone(), reconciler);

        Self {
            repository,
            usage,
            reconciler,
            pipeline,
        }
    }

    /// Current profile of the token's subject. A subject with no stored
    /// record is `NotFound`; no claims-only view is produced.
    pub async fn current(&self, claims: &IdentityClaims) -> ProfileResult<NormalizedProfileView> {
        let user_id = claims.user_id().ok_or(ProfileError::InvalidSubject)?;
        let record = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or(ProfileError::NotFound)?;
        let usage = self.usage.count_today(user_id).await?;

        Ok(self.reconciler.reconcile(claims, &record, usage))
    }

    /// Apply a partial update for the token's subject
    pub async fn update(
        &self,
        claims: &IdentityClaims,
        request: ProfileUpdateRequest,
    ) -> ProfileResult<NormalizedProfileView> {
        self.pipeline.apply(claims, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::UserRecord, repositories::MemoryProfileRepository};
    use chrono_tz::Asia::Seoul;
    use serde_json::json;

    fn service(repo: Arc<MemoryProfileRepository>, dir: &tempfile::TempDir) -> ProfileService {
        ProfileService::new(repo, ImageIngestor::new(dir.path(), "/static/uploads/profiles"), Seoul, 3)
    }

    fn seeded() -> Arc<MemoryProfileRepository> {
        let repo = Arc::new(MemoryProfileRepository::new());
        repo.insert_user(UserRecord {
            id: 4,
            email: "sora@example.com".to_string(),
            name: Some("Sora".to_string()),
            hashed_password: None,
            role: "MEMBER".to_string(),
            profile_image: None,
            picture: None,
            face_shape: None,
            personal_color: Some("summer-cool".to_string()),
            height: None,
            gender: Some("Female".to_string()),
            body_type: None,
        });
        repo
    }

    #[tokio::test]
    async fn test_read_and_write_share_one_shape() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(seeded(), &dir);
        let claims: IdentityClaims = serde_json::from_value(json!({"sub": "4"})).unwrap();

        let read = service.current(&claims).await.unwrap();
        let written = service
            .update(&claims, ProfileUpdateRequest::default())
            .await
            .unwrap();

        assert_eq!(read, written);
        let mut read_keys: Vec<_> = read.as_map().keys().collect();
        let mut write_keys: Vec<_> = written.as_map().keys().collect();
        read_keys.sort();
        write_keys.sort();
        assert_eq!(read_keys, write_keys);
        assert_eq!(read.get("personalColor"), Some(&json!("summer-cool")));
    }

    #[tokio::test]
    async fn test_read_of_missing_user_is_not_found_rather_than_claims_only() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(seeded(), &dir);
        let claims: IdentityClaims = serde_json::from_value(json!({"sub": "40"})).unwrap();

        assert!(matches!(
            service.current(&claims).await,
            Err(ProfileError::NotFound)
        ));
    }
}
