//! `PostgreSQL` implementation of the directory repository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{from_sqlx_error, DirectoryResult};
use crate::record::{DirectoryRecord, Page};
use crate::repository::DirectoryRepository;

/// `PostgreSQL` directory repository.
///
/// All queries restrict to `enabled = TRUE`; disabled rows are invisible on
/// every path. `LIMIT` binds NULL for an unbounded page, which `PostgreSQL`
/// treats as no limit.
pub struct PgDirectoryRepository {
    pool: PgPool,
}

impl PgDirectoryRepository {
    /// Creates a new `PostgreSQL` directory repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_enabled(
        &self,
        query: &str,
        param: &str,
    ) -> DirectoryResult<Option<DirectoryRecord>> {
        sqlx::query_as(query)
            .bind(param)
            .fetch_optional(&self.pool)
            .await
            .map_err(from_sqlx_error)
    }
}

#[async_trait]
impl DirectoryRepository for PgDirectoryRepository {
    async fn find_by_id(&self, id: &str) -> DirectoryResult<Option<DirectoryRecord>> {
        tracing::debug!(id = %id, "directory lookup by id");
        self.fetch_one_enabled(
            "SELECT * FROM users WHERE id = $1 AND enabled = TRUE",
            id,
        )
        .await
    }

    async fn find_by_username(&self, username: &str) -> DirectoryResult<Option<DirectoryRecord>> {
        tracing::debug!(username = %username, "directory lookup by username");
        self.fetch_one_enabled(
            "SELECT * FROM users WHERE username = $1 AND enabled = TRUE ORDER BY id LIMIT 1",
            username,
        )
        .await
    }

    async fn find_by_email(&self, email: &str) -> DirectoryResult<Option<DirectoryRecord>> {
        tracing::debug!(email = %email, "directory lookup by email");
        self.fetch_one_enabled(
            "SELECT * FROM users WHERE email = $1 AND enabled = TRUE ORDER BY id LIMIT 1",
            email,
        )
        .await
    }

    async fn find_by_pattern(
        &self,
        pattern: &str,
        page: Page,
    ) -> DirectoryResult<Vec<DirectoryRecord>> {
        tracing::debug!(pattern = %pattern, "directory pattern search");
        let like = format!("%{pattern}%");
        sqlx::query_as(
            r"SELECT * FROM users
            WHERE (username ILIKE $1 OR email ILIKE $1) AND enabled = TRUE
            ORDER BY username LIMIT $2 OFFSET $3",
        )
        .bind(&like)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(from_sqlx_error)
    }

    async fn find_all(&self, page: Page) -> DirectoryResult<Vec<DirectoryRecord>> {
        tracing::debug!(?page, "directory list");
        sqlx::query_as(
            r"SELECT * FROM users WHERE enabled = TRUE
            ORDER BY username LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(from_sqlx_error)
    }

    async fn count(&self) -> DirectoryResult<u64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE enabled = TRUE")
                .fetch_one(&self.pool)
                .await
                .map_err(from_sqlx_error)?;

        #[allow(clippy::cast_sign_loss)]
        Ok(count as u64)
    }

    async fn update_password(&self, username: &str, new_hash: &str) -> DirectoryResult<()> {
        let result =
            sqlx::query("UPDATE users SET password = $2 WHERE username = $1 AND enabled = TRUE")
                .bind(username)
                .bind(new_hash)
                .execute(&self.pool)
                .await
                .map_err(from_sqlx_error)?;

        if result.rows_affected() == 0 {
            tracing::debug!(username = %username, "password update matched no directory record");
        }

        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
