//! Profile reconciliation
//!
//! Builds the client-facing profile document from three sources: the token
//! claims, the stored user record, and the day's usage count. The record
//! wins over the claims on every shared key, and `sub` always names the
//! record's id.

use serde_json::{Map, Value};

use crate::models::{IdentityClaims, NormalizedProfileView, UserRecord};

/// Generations a user may run per day unless configured otherwise
pub const DEFAULT_MAX_DAILY_GENERATIONS: u32 = 3;

/// Column names and the client keys they are also exposed under
pub const FIELD_RENAMES: &[(&str, &str)] = &[
    ("profile_image", "avatarUrl"),
    ("picture", "generationPhoto"),
    ("face_shape", "faceShape"),
    ("personal_color", "personalColor"),
    ("body_type", "bodyType"),
];

/// Copy every renamed field to its client key, keeping the original key
pub fn apply_field_renames(doc: &mut Map<String, Value>) {
    for (source, target) in FIELD_RENAMES {
        if let Some(value) = doc.get(*source).cloned() {
            doc.insert((*target).to_string(), value);
        }
    }
}

/// Merges claims, record and usage into a [`NormalizedProfileView`]
#[derive(Debug, Clone, Copy)]
pub struct ProfileReconciler {
    max_daily_generations: u32,
}

impl Default for ProfileReconciler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DAILY_GENERATIONS)
    }
}

impl ProfileReconciler {
    pub fn new(max_daily_generations: u32) -> Self {
        Self {
            max_daily_generations,
        }
    }

    pub fn reconcile(
        &self,
        claims: &IdentityClaims,
        record: &UserRecord,
        usage_count: u32,
    ) -> NormalizedProfileView {
        let mut doc = claims.as_map().clone();
        doc.extend(record.to_document());
        doc.insert("sub".into(), Value::from(record.id.to_string()));
        doc.insert("dailyGenerationsUsed".into(), Value::from(usage_count));
        doc.insert(
            "maxDailyGenerations".into(),
            Value::from(self.max_daily_generations),
        );
        apply_field_renames(&mut doc);

        NormalizedProfileView::from_document(doc)
    }
}
