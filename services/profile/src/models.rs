//! Domain models for request and response payloads

pub mod creation;
pub mod profile;
pub mod user;

pub use creation::CreationRecord;
pub use profile::{IdentityClaims, NormalizedProfileView, ProfileUpdateRequest};
pub use user::{NewUser, ProfileChanges, UserId, UserRecord};
