//! # User Repository
//!
//! Back-office accounts. Password hashing happens in the API layer; this
//! repository only stores and returns the PHC string.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use wako_core::validation::validate_username;
use wako_core::User;

/// A user together with the stored password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredUser {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a user with an already hashed password.
    ///
    /// ## Errors
    /// - [`DbError::Validation`] for a malformed username
    /// - [`DbError::UniqueViolation`] if the username is taken
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> DbResult<User> {
        let username = username.trim();
        validate_username(username)?;
        let email = email.map(str::trim).filter(|e| !e.is_empty());

        debug!(username, "Creating user");

        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, email, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, username, email, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => {
                info!(user_id = user.id, username = %user.username, "User registered");
                Ok(user)
            }
            Err(err) => match DbError::from(err) {
                DbError::UniqueViolation { .. } => Err(DbError::duplicate("username", username)),
                other => Err(other),
            },
        }
    }

    /// Looks up a user and their password hash by username.
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<StoredUser>> {
        let user = sqlx::query_as::<_, StoredUser>(
            r#"
            SELECT id, username, email, created_at, password_hash
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_create_and_find() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let user = db
            .users()
            .create("admin", "$argon2id$stub", Some(" admin@wako.test "))
            .await
            .unwrap();
        assert_eq!(user.email.as_deref(), Some("admin@wako.test"));

        let stored = db.users().find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(stored.user, user);
        assert_eq!(stored.password_hash, "$argon2id$stub");

        assert!(db.users().find_by_username("nobody").await.unwrap().is_none());
        assert_eq!(db.users().get_by_id(user.id).await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.users().create("admin", "h1", None).await.unwrap();

        let result = db.users().create("admin", "h2", None).await;

        match result {
            Err(DbError::UniqueViolation { field, value }) => {
                assert_eq!(field, "username");
                assert_eq!(value, "admin");
            }
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_username_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let result = db.users().create("a b", "h", None).await;
        assert!(matches!(result, Err(DbError::Validation(_))));
    }
}
