use crate::secrets::{parse_secret, SecretError, SecretStore};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct PgSecretStore {
    pool: sqlx::PgPool,
}

impl PgSecretStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SecretStore for PgSecretStore {
    async fn get_secret(&self, name: &str) -> Result<BTreeMap<String, String>, SecretError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM secrets WHERE name = $1")
            .persistent(false)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| SecretError::Transport {
                name: name.to_string(),
                source: err.into(),
            })?;

        let Some((raw,)) = row else {
            return Err(SecretError::NotFound {
                name: name.to_string(),
            });
        };

        parse_secret(name, &raw)
    }
}
