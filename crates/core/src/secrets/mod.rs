pub mod env;
pub mod postgres;

pub use env::EnvSecretStore;
pub use postgres::PgSecretStore;

use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("secret {name} not found")]
    NotFound { name: String },

    #[error("secret store unreachable while reading {name}: {source}")]
    Transport {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("secret {name} is not a JSON object of strings: {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Named credential lookup.
#[async_trait::async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_secret(&self, name: &str) -> Result<BTreeMap<String, String>, SecretError>;
}

fn parse_secret(name: &str, raw: &str) -> Result<BTreeMap<String, String>, SecretError> {
    serde_json::from_str::<BTreeMap<String, String>>(raw).map_err(|source| SecretError::Malformed {
        name: name.to_string(),
        source,
    })
}
