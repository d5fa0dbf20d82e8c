use async_trait::async_trait;

use crate::db::PgStorage;
use crate::storage::{StorageResult, UserRepository};
use crate::users::repo_types::{NewUser, User};

#[async_trait]
impl UserRepository for PgStorage {
    async fn create(&self, user: NewUser) -> StorageResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, username, password_hash
            "#,
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> StorageResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, email, username, password_hash FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn get_all(&self) -> StorageResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"SELECT id, email, username, password_hash FROM users ORDER BY id"#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    async fn exists_by_email(&self, email: &str) -> StorageResult<bool> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)"#)
                .bind(email)
                .fetch_one(&self.db)
                .await?;
        Ok(exists)
    }

    /// Find a user by email.
    async fn find_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}
