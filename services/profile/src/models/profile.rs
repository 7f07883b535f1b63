//! Profile views and the partial update payload

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::user::UserId;

/// Claims asserted by a validated bearer token.
///
/// Kept as an opaque document so fields the token carries (session metadata,
/// expiry, ...) pass through to the client untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityClaims(Map<String, Value>);

impl IdentityClaims {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// User id carried in `sub`, accepted as a numeric string or a number
    pub fn user_id(&self) -> Option<UserId> {
        match self.0.get("sub")? {
            Value::String(sub) => sub.trim().parse().ok(),
            Value::Number(sub) => sub.as_i64().and_then(|id| UserId::try_from(id).ok()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for IdentityClaims {
    fn from(claims: Map<String, Value>) -> Self {
        Self(claims)
    }
}

/// Flat client-facing profile document.
///
/// Keys are sorted, so equal inputs always serialize to identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedProfileView(Map<String, Value>);

impl NormalizedProfileView {
    pub(crate) fn from_document(doc: Map<String, Value>) -> Self {
        Self(doc)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Partial profile update sent by the client.
///
/// Every field is tri-state: missing from the payload (`None`), explicitly
/// null (`Some(None)`), or set (`Some(Some(v))`). Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileUpdateRequest {
    #[serde(default, alias = "faceShape", deserialize_with = "present")]
    pub face_shape: Option<Option<String>>,
    #[serde(default, alias = "personalColor", deserialize_with = "present")]
    pub personal_color: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub height: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub gender: Option<Option<String>>,
    #[serde(default, alias = "bodyType", deserialize_with = "present")]
    pub body_type: Option<Option<String>>,
    /// New generation photo: a URL, a `/static` path, or inline base64 data
    #[serde(default, alias = "profileImage", deserialize_with = "present")]
    pub profile_image: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> IdentityClaims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_subject_parsing() {
        assert_eq!(claims(json!({"sub": "42"})).user_id(), Some(42));
        assert_eq!(claims(json!({"sub": 42})).user_id(), Some(42));
        assert_eq!(claims(json!({"sub": "abc"})).user_id(), None);
        assert_eq!(claims(json!({"name": "no sub"})).user_id(), None);
    }

    #[test]
    fn test_update_distinguishes_absent_and_null() {
        let request: ProfileUpdateRequest =
            serde_json::from_value(json!({"face_shape": null, "height": 180})).unwrap();

        assert_eq!(request.face_shape, Some(None));
        assert_eq!(request.height, Some(Some(180)));
        assert_eq!(request.personal_color, None);
        assert_eq!(request.profile_image, None);
    }

    #[test]
    fn test_update_accepts_camel_case_and_ignores_unknown_fields() {
        let request: ProfileUpdateRequest = serde_json::from_value(json!({
            "bodyType": "slim",
            "profileImage": "http://example.com/x.png",
            "id": 999,
            "role": "ADMIN"
        }))
        .unwrap();

        assert_eq!(request.body_type, Some(Some("slim".to_string())));
        assert_eq!(
            request.profile_image,
            Some(Some("http://example.com/x.png".to_string()))
        );
    }

    #[test]
    fn test_update_rejects_wrong_types() {
        let result = serde_json::from_value::<ProfileUpdateRequest>(json!({"height": "tall"}));
        assert!(result.is_err());
    }
}
