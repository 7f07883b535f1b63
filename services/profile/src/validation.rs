//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::models::ProfileUpdateRequest;

/// Column width of the free-form profile attributes
const ATTRIBUTE_MAX_LEN: usize = 50;
/// Column width of `users.gender`
const GENDER_MAX_LEN: usize = 10;
const HEIGHT_RANGE: std::ops::RangeInclusive<i32> = 0..=300;

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate display name
pub fn validate_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name is required".to_string());
    }

    if name.chars().count() > 100 {
        return Err("Name must be at most 100 characters long".to_string());
    }

    Ok(())
}

fn validate_attribute(field: &str, value: &Option<Option<String>>, max: usize) -> Result<(), String> {
    if let Some(Some(value)) = value {
        if value.chars().count() > max {
            return Err(format!("{} must be at most {} characters long", field, max));
        }
    }
    Ok(())
}

/// Validate a partial profile update before anything is written
pub fn validate_profile_update(request: &ProfileUpdateRequest) -> Result<(), String> {
    validate_attribute("face_shape", &request.face_shape, ATTRIBUTE_MAX_LEN)?;
    validate_attribute("personal_color", &request.personal_color, ATTRIBUTE_MAX_LEN)?;
    validate_attribute("body_type", &request.body_type, ATTRIBUTE_MAX_LEN)?;
    validate_attribute("gender", &request.gender, GENDER_MAX_LEN)?;

    if let Some(Some(height)) = request.height {
        if !HEIGHT_RANGE.contains(&height) {
            return Err(format!(
                "height must be between {} and {}",
                HEIGHT_RANGE.start(),
                HEIGHT_RANGE.end()
            ));
        }
    }

    Ok(())
}
