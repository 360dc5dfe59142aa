//! Read access to student profiles written by onboarding. Used to fill in
//! chatbot context the caller did not send.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::profile::UserProfileRow;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn lookup(&self, user_id: &str) -> Result<Option<UserProfileRow>, sqlx::Error>;
}

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn lookup(&self, user_id: &str) -> Result<Option<UserProfileRow>, sqlx::Error> {
        sqlx::query_as(
            "SELECT user_id, stage, career_id, year, updated_at FROM user_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }
}
