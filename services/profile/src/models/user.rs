//! User record model and the column-level change set applied to it

use serde::Serialize;
use serde_json::{Map, Value};

/// Primary key of the `users` table
pub type UserId = i32;

/// Persisted user entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    #[serde(skip_serializing)]
    pub hashed_password: Option<String>,
    pub role: String,
    /// Avatar shown next to the user's name
    pub profile_image: Option<String>,
    /// Photo used as the base for generations
    pub picture: Option<String>,
    pub face_shape: Option<String>,
    pub personal_color: Option<String>,
    pub height: Option<i32>,
    pub gender: Option<String>,
    pub body_type: Option<String>,
}

impl UserRecord {
    /// Outward fields as a flat document, keyed by column name.
    ///
    /// The credential hash is never part of the document.
    pub fn to_document(&self) -> Map<String, Value> {
        let mut doc = Map::new();
        doc.insert("id".into(), Value::from(self.id));
        doc.insert("email".into(), Value::from(self.email.clone()));
        doc.insert("name".into(), optional(&self.name));
        doc.insert("role".into(), Value::from(self.role.clone()));
        doc.insert("profile_image".into(), optional(&self.profile_image));
        doc.insert("picture".into(), optional(&self.picture));
        doc.insert("face_shape".into(), optional(&self.face_shape));
        doc.insert("personal_color".into(), optional(&self.personal_color));
        doc.insert("height".into(), optional(&self.height));
        doc.insert("gender".into(), optional(&self.gender));
        doc.insert("body_type".into(), optional(&self.body_type));
        doc
    }
}

fn optional<T: Clone + Into<Value>>(value: &Option<T>) -> Value {
    value.clone().map_or(Value::Null, Into::into)
}

/// New user creation payload
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub hashed_password: Option<String>,
    pub role: String,
    pub profile_image: Option<String>,
    pub picture: Option<String>,
}

/// Column-level change set for a partial profile update.
///
/// `None` leaves the column untouched, `Some(None)` clears it and
/// `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub face_shape: Option<Option<String>>,
    pub personal_color: Option<Option<String>>,
    pub height: Option<Option<i32>>,
    pub gender: Option<Option<String>>,
    pub body_type: Option<Option<String>>,
    pub picture: Option<Option<String>>,
}

impl ProfileChanges {
    /// True when no column would be written
    pub fn is_empty(&self) -> bool {
        self.face_shape.is_none()
            && self.personal_color.is_none()
            && self.height.is_none()
            && self.gender.is_none()
            && self.body_type.is_none()
            && self.picture.is_none()
    }

    /// Apply the change set to an in-memory record
    pub fn apply_to(&self, record: &mut UserRecord) {
        if let Some(value) = &self.face_shape {
            record.face_shape = value.clone();
        }
        if let Some(value) = &self.personal_color {
            record.personal_color = value.clone();
        }
        if let Some(value) = self.height {
            record.height = value;
        }
        if let Some(value) = &self.gender {
            record.gender = value.clone();
        }
        if let Some(value) = &self.body_type {
            record.body_type = value.clone();
        }
        if let Some(value) = &self.picture {
            record.picture = value.clone();
        }
    }
}
