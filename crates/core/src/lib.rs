pub mod domain;
pub mod evaluate;
pub mod ingest;
pub mod notify;
pub mod run;
pub mod secrets;
pub mod storage;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;
    use std::str::FromStr;

    use crate::domain::MonitoredAssetSet;

    const DEFAULT_ASSETS: &str = "BTCUSDT,ETHUSDT,BNBUSDT";
    const DEFAULT_THRESHOLD_PCT: f64 = 5.0;
    const DEFAULT_TICKER_URL: &str = "https://api.binance.com/api/v3/ticker/24hr";
    const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_SNAPSHOT_KEY: &str = "CryptoLastPrices";
    const DEFAULT_SNAPSHOT_DIR: &str = "./.pricewatch";
    const DEFAULT_NOTIFY_TOPIC: &str = "crypto-price-alerts";

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum SnapshotBackend {
        File,
        Postgres,
    }

    impl FromStr for SnapshotBackend {
        type Err = anyhow::Error;

        fn from_str(s: &str) -> anyhow::Result<Self> {
            match s.trim().to_ascii_lowercase().as_str() {
                "file" => Ok(Self::File),
                "postgres" | "pg" => Ok(Self::Postgres),
                other => anyhow::bail!("unknown snapshot backend {other:?} (expected file|postgres)"),
            }
        }
    }

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub monitored_assets: MonitoredAssetSet,
        pub threshold_pct: f64,
        pub ticker_url: String,
        pub http_timeout_secs: u64,
        pub snapshot_key: String,
        pub snapshot_backend: SnapshotBackend,
        pub snapshot_dir: PathBuf,
        pub database_url: Option<String>,
        pub notify_topic: String,
        pub notify_webhook_url: Option<String>,
        pub secret_name: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        /// Builds settings from an arbitrary variable source. Blank values count
        /// as unset.
        pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
        where
            F: Fn(&str) -> Option<String>,
        {
            let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

            let assets_raw = get("PRICEWATCH_ASSETS").unwrap_or_else(|| DEFAULT_ASSETS.to_string());
            let monitored_assets = MonitoredAssetSet::new(assets_raw.split(','))
                .context("PRICEWATCH_ASSETS must name at least one symbol")?;

            let threshold_pct = match get("PRICEWATCH_THRESHOLD_PCT") {
                Some(s) => s
                    .parse::<f64>()
                    .with_context(|| format!("PRICEWATCH_THRESHOLD_PCT is not a number: {s}"))?,
                None => DEFAULT_THRESHOLD_PCT,
            };
            anyhow::ensure!(
                threshold_pct.is_finite() && threshold_pct > 0.0,
                "PRICEWATCH_THRESHOLD_PCT must be a positive number (got {threshold_pct})"
            );

            let http_timeout_secs = match get("PRICEWATCH_HTTP_TIMEOUT_SECS") {
                Some(s) => s
                    .parse::<u64>()
                    .with_context(|| format!("PRICEWATCH_HTTP_TIMEOUT_SECS is not an integer: {s}"))?,
                None => DEFAULT_HTTP_TIMEOUT_SECS,
            };

            let snapshot_backend = match get("PRICEWATCH_SNAPSHOT_BACKEND") {
                Some(s) => s.parse().context("invalid PRICEWATCH_SNAPSHOT_BACKEND")?,
                None => SnapshotBackend::File,
            };

            Ok(Self {
                monitored_assets,
                threshold_pct,
                ticker_url: get("PRICEWATCH_TICKER_URL")
                    .unwrap_or_else(|| DEFAULT_TICKER_URL.to_string()),
                http_timeout_secs,
                snapshot_key: get("PRICEWATCH_SNAPSHOT_KEY")
                    .unwrap_or_else(|| DEFAULT_SNAPSHOT_KEY.to_string()),
                snapshot_backend,
                snapshot_dir: get("PRICEWATCH_SNAPSHOT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_DIR)),
                database_url: get("DATABASE_URL"),
                notify_topic: get("PRICEWATCH_NOTIFY_TOPIC")
                    .unwrap_or_else(|| DEFAULT_NOTIFY_TOPIC.to_string()),
                notify_webhook_url: get("PRICEWATCH_NOTIFY_WEBHOOK_URL"),
                secret_name: get("PRICEWATCH_SECRET_NAME"),
                sentry_dsn: get("SENTRY_DSN"),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::collections::HashMap;

        fn settings(vars: &[(&str, &str)]) -> anyhow::Result<Settings> {
            let map: HashMap<String, String> = vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            Settings::from_lookup(|k| map.get(k).cloned())
        }

        #[test]
        fn defaults_match_original_job() {
            let s = settings(&[]).unwrap();
            let assets: Vec<_> = s.monitored_assets.iter().collect();
            assert_eq!(assets, vec!["BTCUSDT", "ETHUSDT", "BNBUSDT"]);
            assert_eq!(s.threshold_pct, 5.0);
            assert_eq!(s.snapshot_key, "CryptoLastPrices");
            assert_eq!(s.snapshot_backend, SnapshotBackend::File);
            assert!(s.notify_webhook_url.is_none());
            assert!(s.require_database_url().is_err());
        }

        #[test]
        fn reads_overrides() {
            let s = settings(&[
                ("PRICEWATCH_ASSETS", "solusdt, btcusdt"),
                ("PRICEWATCH_THRESHOLD_PCT", "2.5"),
                ("PRICEWATCH_SNAPSHOT_BACKEND", "postgres"),
                ("DATABASE_URL", "postgres://localhost/pw"),
                ("PRICEWATCH_SECRET_NAME", "BinanceApiKeys"),
            ])
            .unwrap();
            let assets: Vec<_> = s.monitored_assets.iter().collect();
            assert_eq!(assets, vec!["SOLUSDT", "BTCUSDT"]);
            assert_eq!(s.threshold_pct, 2.5);
            assert_eq!(s.snapshot_backend, SnapshotBackend::Postgres);
            assert_eq!(s.require_database_url().unwrap(), "postgres://localhost/pw");
            assert_eq!(s.secret_name.as_deref(), Some("BinanceApiKeys"));
        }

        #[test]
        fn blank_values_fall_back_to_defaults() {
            let s = settings(&[("PRICEWATCH_THRESHOLD_PCT", "  "), ("DATABASE_URL", "")]).unwrap();
            assert_eq!(s.threshold_pct, 5.0);
            assert!(s.database_url.is_none());
        }

        #[test]
        fn rejects_non_positive_threshold() {
            assert!(settings(&[("PRICEWATCH_THRESHOLD_PCT", "0")]).is_err());
            assert!(settings(&[("PRICEWATCH_THRESHOLD_PCT", "-1")]).is_err());
            assert!(settings(&[("PRICEWATCH_THRESHOLD_PCT", "NaN")]).is_err());
            assert!(settings(&[("PRICEWATCH_THRESHOLD_PCT", "five")]).is_err());
        }

        #[test]
        fn rejects_empty_asset_list_and_unknown_backend() {
            assert!(settings(&[("PRICEWATCH_ASSETS", ", ,")]).is_err());
            assert!(settings(&[("PRICEWATCH_SNAPSHOT_BACKEND", "redis")]).is_err());
        }
    }
}
