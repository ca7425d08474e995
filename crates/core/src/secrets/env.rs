use crate::secrets::{parse_secret, SecretError, SecretStore};
use std::collections::BTreeMap;

const PREFIX: &str = "PRICEWATCH_SECRET_";

/// Reads secret `name` from `PRICEWATCH_SECRET_<NAME>`, which must hold a JSON
/// object of strings.
#[derive(Debug, Clone, Default)]
pub struct EnvSecretStore {
    overrides: Option<BTreeMap<String, String>>,
}

impl EnvSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves variables from `vars` instead of the process environment.
    pub fn from_vars(vars: BTreeMap<String, String>) -> Self {
        Self {
            overrides: Some(vars),
        }
    }

    pub fn var_name(name: &str) -> String {
        let suffix: String = name
            .trim()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        format!("{PREFIX}{suffix}")
    }

    fn lookup(&self, var: &str) -> Option<String> {
        match &self.overrides {
            Some(vars) => vars.get(var).cloned(),
            None => std::env::var(var).ok(),
        }
    }
}

#[async_trait::async_trait]
impl SecretStore for EnvSecretStore {
    async fn get_secret(&self, name: &str) -> Result<BTreeMap<String, String>, SecretError> {
        let var = Self::var_name(name);
        let raw = self.lookup(&var).ok_or_else(|| SecretError::NotFound {
            name: name.to_string(),
        })?;
        parse_secret(name, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_name_is_normalized() {
        assert_eq!(
            EnvSecretStore::var_name("BinanceApiKeys"),
            "PRICEWATCH_SECRET_BINANCEAPIKEYS"
        );
        assert_eq!(
            EnvSecretStore::var_name("prod/binance-keys"),
            "PRICEWATCH_SECRET_PROD_BINANCE_KEYS"
        );
    }

    #[tokio::test]
    async fn returns_key_value_mapping() {
        let store = EnvSecretStore::from_vars(BTreeMap::from([(
            "PRICEWATCH_SECRET_BINANCEAPIKEYS".to_string(),
            r#"{"api_key":"abc","api_secret":"def"}"#.to_string(),
        )]));

        let secret = store.get_secret("BinanceApiKeys").await.unwrap();
        assert_eq!(secret.get("api_key").map(String::as_str), Some("abc"));
        assert_eq!(secret.len(), 2);
    }

    #[tokio::test]
    async fn missing_is_not_found() {
        let store = EnvSecretStore::from_vars(BTreeMap::new());
        let err = store.get_secret("BinanceApiKeys").await.unwrap_err();
        assert!(matches!(err, SecretError::NotFound { .. }));
    }

    #[tokio::test]
    async fn non_object_is_malformed() {
        let store = EnvSecretStore::from_vars(BTreeMap::from([(
            "PRICEWATCH_SECRET_K".to_string(),
            "plain-text".to_string(),
        )]));
        let err = store.get_secret("k").await.unwrap_err();
        assert!(matches!(err, SecretError::Malformed { .. }));
    }
}
