// src/services/profile.rs

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::{error::AppError, models::profile::UserProfile};

/// Read access to student profiles, owned by the profile module.
#[async_trait]
pub trait ProfileProvider: Send + Sync {
    /// `Ok(None)` when the student has no profile yet; errors are storage failures.
    async fn fetch_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError>;
}

#[derive(Clone)]
pub struct PgProfileProvider {
    pool: PgPool,
}

impl PgProfileProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileProvider for PgProfileProvider {
    async fn fetch_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT uid, grade, semester
            FROM user_profiles
            WHERE uid = $1 AND deleted_dt IS NULL
            "#,
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch profile for {}: {:?}", uid, e);
            AppError::from(e)
        })?;

        Ok(profile)
    }
}

/// Profiles kept in memory; backs the service when no database is configured.
#[derive(Default)]
pub struct StaticProfileProvider {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl StaticProfileProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, profile: UserProfile) {
        self.profiles
            .write()
            .await
            .insert(profile.uid.clone(), profile);
    }
}

#[async_trait]
impl ProfileProvider for StaticProfileProvider {
    async fn fetch_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        Ok(self.profiles.read().await.get(uid).cloned())
    }
}
