//! Partial profile update pipeline
//!
//! Validation and the existence check happen before anything touches disk
//! or the database. Image ingestion failures never fail the update: the image
//! is dropped and the remaining fields are still written.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    error::{ProfileError, ProfileResult},
    images::ImageIngestor,
    models::{IdentityClaims, NormalizedProfileView, ProfileChanges, ProfileUpdateRequest},
    reconcile::ProfileReconciler,
    repositories::ProfileRepository,
    usage::UsageCounter,
    validation::validate_profile_update,
};

#[derive(Clone)]
pub struct ProfileUpdatePipeline {
    repository: Arc<dyn ProfileRepository>,
    images: ImageIngestor,
    usage: UsageCounter,
    reconciler: ProfileReconciler,
}

impl ProfileUpdatePipeline {
    pub fn new(
        repository: Arc<dyn ProfileRepository>,
        images: ImageIngestor,
        usage: UsageCounter,
        reconciler: ProfileReconciler,
    ) -> Self {
        Self {
            repository,
            images,
            usage,
            reconciler,
        }
    }

    /// Apply `request` to the user named by the token subject and return the
    /// same view a profile read would produce.
    pub async fn apply(
        &self,
        claims: &IdentityClaims,
        request: ProfileUpdateRequest,
    ) -> ProfileResult<NormalizedProfileView> {
        let user_id = claims.user_id().ok_or(ProfileError::InvalidSubject)?;
        validate_profile_update(&request).map_err(ProfileError::Validation)?;

        if self.repository.find_by_id(user_id).await?.is_none() {
            return Err(ProfileError::NotFound);
        }

        let ProfileUpdateRequest {
            face_shape,
            personal_color,
            height,
            gender,
            body_type,
            profile_image,
        } = request;

        let mut changes = ProfileChanges {
            face_shape,
            personal_color,
            height,
            gender,
            body_type,
            picture: None,
        };

        if let Some(payload) = profile_image.flatten().filter(|p| !p.trim().is_empty()) {
            match self.images.ingest(&payload, user_id).await {
                Ok(image) => changes.picture = Some(Some(image.into_reference())),
                Err(e) => warn!("Dropping profile image for user {}: {}", user_id, e),
            }
        }

        let record = self
            .repository
            .update_partial(user_id, &changes)
            .await?
            .ok_or(ProfileError::NotFound)?;

        if !changes.is_empty() {
            info!("Updated profile for user {}", user_id);
        }

        let usage = self.usage.count_today(user_id).await?;
        Ok(self.reconciler.reconcile(claims, &record, usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{UserId, UserRecord},
        repositories::MemoryProfileRepository,
    };
    use chrono_tz::Asia::Seoul;
    use serde_json::json;
    use tempfile::TempDir;

    struct Fixture {
        repo: Arc<MemoryProfileRepository>,
        pipeline: ProfileUpdatePipeline,
        reconciler: ProfileReconciler,
        uploads: TempDir,
    }

    impl Fixture {
        fn upload_count(&self) -> usize {
            std::fs::read_dir(self.uploads.path().join("profiles"))
                .map(|entries| entries.count())
                .unwrap_or(0)
        }
    }

    fn record(id: UserId) -> UserRecord {
        UserRecord {
            id,
            email: format!("user{}@example.com", id),
            name: Some("Hana".to_string()),
            hashed_password: None,
            role: "MEMBER".to_string(),
            profile_image: Some("https://api.multiavatar.com/hana.png".to_string()),
            picture: Some("/static/uploads/profiles/old.png".to_string()),
            face_shape: Some("round".to_string()),
            personal_color: None,
            height: Some(160),
            gender: Some("Female".to_string()),
            body_type: Some("average".to_string()),
        }
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(MemoryProfileRepository::new());
        repo.insert_user(record(1));

        let uploads = tempfile::tempdir().unwrap();
        let images = ImageIngestor::new(uploads.path().join("profiles"), "/static/uploads/profiles");
        let usage = UsageCounter::new(repo.clone(), Seoul);
        let reconciler = ProfileReconciler::default();
        let pipeline = ProfileUpdatePipeline::new(repo.clone(), images, usage, reconciler);

        Fixture {
            repo,
            pipeline,
            reconciler,
            uploads,
        }
    }

    fn claims_for(id: UserId) -> IdentityClaims {
        serde_json::from_value(json!({"sub": id.to_string(), "exp": 1_900_000_000u64})).unwrap()
    }

    fn request(value: serde_json::Value) -> ProfileUpdateRequest {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_empty_update_changes_nothing() {
        let fx = fixture();
        let claims = claims_for(1);

        let view = fx.pipeline.apply(&claims, request(json!({}))).await.unwrap();

        assert_eq!(fx.repo.write_count(), 0);
        assert_eq!(fx.repo.find_by_id(1).await.unwrap(), Some(record(1)));
        assert_eq!(view, fx.reconciler.reconcile(&claims, &record(1), 0));
    }

    #[tokio::test]
    async fn test_only_present_fields_are_written() {
        let fx = fixture();

        let view = fx
            .pipeline
            .apply(&claims_for(1), request(json!({"height": 175, "face_shape": null})))
            .await
            .unwrap();

        let stored = fx.repo.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored.height, Some(175));
        assert_eq!(stored.face_shape, None);
        assert_eq!(stored.body_type.as_deref(), Some("average"));
        assert_eq!(stored.picture.as_deref(), Some("/static/uploads/profiles/old.png"));
        assert_eq!(fx.repo.write_count(), 1);

        assert_eq!(view.get("height"), Some(&json!(175)));
        assert_eq!(view.get("faceShape"), Some(&serde_json::Value::Null));
        assert_eq!(view.get("bodyType"), Some(&json!("average")));
    }

    #[tokio::test]
    async fn test_url_image_is_stored_verbatim() {
        let fx = fixture();

        let view = fx
            .pipeline
            .apply(
                &claims_for(1),
                request(json!({"profileImage": "http://example.com/x.png"})),
            )
            .await
            .unwrap();

        let stored = fx.repo.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored.picture.as_deref(), Some("http://example.com/x.png"));
        assert_eq!(view.get("generationPhoto"), Some(&json!("http://example.com/x.png")));
        assert_eq!(fx.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_inline_image_is_written_and_referenced() {
        let fx = fixture();

        fx.pipeline
            .apply(
                &claims_for(1),
                request(json!({"profile_image": "data:image/png;base64,iVBORw0KGgo="})),
            )
            .await
            .unwrap();

        let stored = fx.repo.find_by_id(1).await.unwrap().unwrap();
        let picture = stored.picture.unwrap();
        assert!(picture.starts_with("/static/uploads/profiles/profile_1_"));
        assert_eq!(fx.upload_count(), 1);
    }

    #[tokio::test]
    async fn test_garbage_image_does_not_block_other_fields() {
        let fx = fixture();

        let result = fx
            .pipeline
            .apply(
                &claims_for(1),
                request(json!({
                    "profile_image": "data:image/png;base64,<garbage>",
                    "personal_color": "autumn-deep"
                })),
            )
            .await;

        assert!(result.is_ok());
        let stored = fx.repo.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored.picture.as_deref(), Some("/static/uploads/profiles/old.png"));
        assert_eq!(stored.personal_color.as_deref(), Some("autumn-deep"));
        assert_eq!(fx.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_unwritable_upload_dir_does_not_block_other_fields() {
        let fx = fixture();
        let blocker = fx.uploads.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let images = ImageIngestor::new(blocker.join("profiles"), "/static/uploads/profiles");
        let pipeline = ProfileUpdatePipeline::new(
            fx.repo.clone(),
            images,
            UsageCounter::new(fx.repo.clone(), Seoul),
            fx.reconciler,
        );

        let result = pipeline
            .apply(
                &claims_for(1),
                request(json!({"profile_image": "iVBORw0KGgo=", "height": 170})),
            )
            .await;

        assert!(result.is_ok());
        let stored = fx.repo.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored.picture.as_deref(), Some("/static/uploads/profiles/old.png"));
        assert_eq!(stored.height, Some(170));
    }

    #[tokio::test]
    async fn test_null_or_empty_image_leaves_photo_alone() {
        let fx = fixture();

        for payload in [json!({"profile_image": null}), json!({"profile_image": ""})] {
            fx.pipeline.apply(&claims_for(1), request(payload)).await.unwrap();
        }

        let stored = fx.repo.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored.picture.as_deref(), Some("/static/uploads/profiles/old.png"));
        assert_eq!(fx.repo.write_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_user_fails_without_writes() {
        let fx = fixture();

        let result = fx
            .pipeline
            .apply(
                &claims_for(999),
                request(json!({"height": 180, "profile_image": "iVBORw0KGgo="})),
            )
            .await;

        assert!(matches!(result, Err(ProfileError::NotFound)));
        assert_eq!(fx.repo.write_count(), 0);
        assert_eq!(fx.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_update_is_rejected_before_writing() {
        let fx = fixture();

        let result = fx
            .pipeline
            .apply(
                &claims_for(1),
                request(json!({"height": 999, "profile_image": "iVBORw0KGgo="})),
            )
            .await;

        assert!(matches!(result, Err(ProfileError::Validation(_))));
        assert_eq!(fx.repo.write_count(), 0);
        assert_eq!(fx.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_non_numeric_subject_is_rejected() {
        let fx = fixture();
        let claims: IdentityClaims = serde_json::from_value(json!({"sub": "google|abc"})).unwrap();

        let result = fx.pipeline.apply(&claims, request(json!({"height": 170}))).await;
        assert!(matches!(result, Err(ProfileError::InvalidSubject)));
    }
}
