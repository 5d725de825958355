/// User model
///
/// Identity resolution (sessions, tokens) lives outside this system; the
/// user table exists so that boards can reference owners and members and
/// activity queries can join display names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Display name (optional)
    pub name: Option<String>,

    /// Email address (unique)
    pub email: String,

    /// When the user was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Creates a user record
    ///
    /// Used by seeding and tests; registration is handled by the external
    /// identity collaborator.
    pub async fn create(
        pool: &PgPool,
        name: Option<&str>,
        email: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .fetch_one(pool)
        .await
    }

    /// Returns a name suitable for activity messages
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_name() {
        let user = User {
            id: Uuid::new_v4(),
            name: Some("Ada".to_string()),
            email: "ada@example.com".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(user.display_name(), "Ada");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user = User {
            id: Uuid::new_v4(),
            name: None,
            email: "ada@example.com".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(user.display_name(), "ada@example.com");
    }
}
