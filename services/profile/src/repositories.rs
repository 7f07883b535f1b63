//! Repositories for user records and creations

use async_trait::async_trait;
use common::{
    error::{DatabaseError, DatabaseResult},
    time::DayWindow,
};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use tracing::info;

use crate::models::{CreationRecord, NewUser, ProfileChanges, UserId, UserRecord};

pub mod memory;

pub use memory::MemoryProfileRepository;

/// Persisted user-record access
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: UserId) -> DatabaseResult<Option<UserRecord>>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<UserRecord>>;

    /// Create a new user
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<UserRecord>;

    /// Write only the columns present in `changes`.
    ///
    /// Returns `None` when no user has this id. An empty change set writes
    /// nothing and returns the current record.
    async fn update_partial(
        &self,
        id: UserId,
        changes: &ProfileChanges,
    ) -> DatabaseResult<Option<UserRecord>>;

    /// Count the user's creations inside `today`
    async fn count_creations_today(&self, id: UserId, today: DayWindow) -> DatabaseResult<u32>;

    /// All creations of a user, newest first
    async fn list_creations_by_user(&self, id: UserId) -> DatabaseResult<Vec<CreationRecord>>;

    /// All users ordered by id
    async fn list_users(&self) -> DatabaseResult<Vec<UserRecord>>;
}

const USER_COLUMNS: &str = "id, email, name, hashed_password, role, profile_image, picture, \
                            face_shape, personal_color, height, gender, body_type";

const CREATION_COLUMNS: &str = "id, user_id, media_url, prompt, recommendation_text, style, \
                                colors, height, body_type, created_at";

/// PostgreSQL-backed repository
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    /// Create a new repository over a connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> Result<UserRecord, sqlx::Error> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        hashed_password: row.try_get("hashed_password")?,
        role: row
            .try_get::<Option<String>, _>("role")?
            .unwrap_or_else(|| "MEMBER".to_string()),
        profile_image: row.try_get("profile_image")?,
        picture: row.try_get("picture")?,
        face_shape: row.try_get("face_shape")?,
        personal_color: row.try_get("personal_color")?,
        height: row.try_get("height")?,
        gender: row.try_get("gender")?,
        body_type: row.try_get("body_type")?,
    })
}

fn creation_from_row(row: &PgRow) -> Result<CreationRecord, sqlx::Error> {
    Ok(CreationRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        media_url: row.try_get("media_url")?,
        prompt: row.try_get("prompt")?,
        recommendation_text: row.try_get("recommendation_text")?,
        style: row.try_get("style")?,
        colors: row.try_get("colors")?,
        height: row.try_get("height")?,
        body_type: row.try_get("body_type")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_by_id(&self, id: UserId) -> DatabaseResult<Option<UserRecord>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(DatabaseError::Query)
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<UserRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(DatabaseError::Query)
    }

    async fn create(&self, new_user: &NewUser) -> DatabaseResult<UserRecord> {
        info!("Creating new user: {}", new_user.email);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (email, name, hashed_password, role, profile_image, picture)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&new_user.email)
        .bind(&new_user.name)
        .bind(&new_user.hashed_password)
        .bind(&new_user.role)
        .bind(&new_user.profile_image)
        .bind(&new_user.picture)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        user_from_row(&row).map_err(DatabaseError::Query)
    }

    async fn update_partial(
        &self,
        id: UserId,
        changes: &ProfileChanges,
    ) -> DatabaseResult<Option<UserRecord>> {
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        {
            let mut columns = builder.separated(", ");
            if let Some(value) = &changes.face_shape {
                columns.push("face_shape = ");
                columns.push_bind_unseparated(value.clone());
            }
            if let Some(value) = &changes.personal_color {
                columns.push("personal_color = ");
                columns.push_bind_unseparated(value.clone());
            }
            if let Some(value) = changes.height {
                columns.push("height = ");
                columns.push_bind_unseparated(value);
            }
            if let Some(value) = &changes.gender {
                columns.push("gender = ");
                columns.push_bind_unseparated(value.clone());
            }
            if let Some(value) = &changes.body_type {
                columns.push("body_type = ");
                columns.push_bind_unseparated(value.clone());
            }
            if let Some(value) = &changes.picture {
                columns.push("picture = ");
                columns.push_bind_unseparated(value.clone());
            }
        }
        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(USER_COLUMNS);

        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(DatabaseError::Query)
    }

    async fn count_creations_today(&self, id: UserId, today: DayWindow) -> DatabaseResult<u32> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM creations
            WHERE user_id = $1 AND created_at >= $2 AND created_at < $3
            "#,
        )
        .bind(id)
        .bind(today.start)
        .bind(today.end)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn list_creations_by_user(&self, id: UserId) -> DatabaseResult<Vec<CreationRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM creations WHERE user_id = $1 ORDER BY created_at DESC",
            CREATION_COLUMNS
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        rows.iter()
            .map(creation_from_row)
            .collect::<Result<_, _>>()
            .map_err(DatabaseError::Query)
    }

    async fn list_users(&self) -> DatabaseResult<Vec<UserRecord>> {
        let rows = sqlx::query(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        rows.iter()
            .map(user_from_row)
            .collect::<Result<_, _>>()
            .map_err(DatabaseError::Query)
    }
}
