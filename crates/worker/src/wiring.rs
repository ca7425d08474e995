use anyhow::Context;
use pricewatch_core::config::{Settings, SnapshotBackend};
use pricewatch_core::ingest::{BinanceTickerSource, PriceSource};
use pricewatch_core::notify::{LogNotifier, Notifier, WebhookNotifier};
use pricewatch_core::secrets::{EnvSecretStore, PgSecretStore, SecretStore};
use pricewatch_core::storage::{FileSnapshotStore, PgSnapshotStore, SnapshotStore};
use std::sync::Arc;
use std::time::Duration;

const API_KEY_FIELD: &str = "api_key";

/// Concrete collaborators for one run, built once at startup.
pub struct Dependencies {
    pub source: Arc<dyn PriceSource>,
    pub store: Arc<dyn SnapshotStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl Dependencies {
    pub async fn from_settings(settings: &Settings, dry_run: bool) -> anyhow::Result<Self> {
        let pool = match settings.snapshot_backend {
            SnapshotBackend::Postgres => Some(connect(settings, !dry_run).await?),
            SnapshotBackend::File => None,
        };

        let secrets: Arc<dyn SecretStore> = match &pool {
            Some(pool) => Arc::new(PgSecretStore::new(pool.clone())),
            None => Arc::new(EnvSecretStore::new()),
        };

        Self::assemble(settings, dry_run, pool, secrets.as_ref()).await
    }

    async fn assemble(
        settings: &Settings,
        dry_run: bool,
        pool: Option<sqlx::PgPool>,
        secrets: &dyn SecretStore,
    ) -> anyhow::Result<Self> {
        let store: Arc<dyn SnapshotStore> = match pool {
            Some(pool) => Arc::new(PgSnapshotStore::new(pool)),
            None => Arc::new(FileSnapshotStore::new(settings.snapshot_dir.clone())),
        };

        let api_key = resolve_api_key(secrets, settings).await?;
        let source = BinanceTickerSource::from_settings(settings)?.with_api_key(api_key);

        Ok(Self {
            source: Arc::new(source),
            store,
            notifier: build_notifier(settings, dry_run)?,
        })
    }
}

/// Dry runs never deliver; otherwise a configured webhook wins over the log.
fn build_notifier(settings: &Settings, dry_run: bool) -> anyhow::Result<Arc<dyn Notifier>> {
    match (&settings.notify_webhook_url, dry_run) {
        (Some(url), false) => Ok(Arc::new(WebhookNotifier::new(
            url.clone(),
            Duration::from_secs(settings.http_timeout_secs),
        )?)),
        _ => Ok(Arc::new(LogNotifier)),
    }
}

async fn connect(settings: &Settings, run_migrations: bool) -> anyhow::Result<sqlx::PgPool> {
    let db_url = settings.require_database_url()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(db_url)
        .await
        .context("connect DATABASE_URL failed")?;

    if run_migrations {
        pricewatch_core::storage::migrate(&pool).await?;
    } else {
        tracing::info!("dry run; skipping migrations");
    }
    Ok(pool)
}

/// The ticker endpoint is public; a key is only sent when a secret is named.
async fn resolve_api_key(
    secrets: &dyn SecretStore,
    settings: &Settings,
) -> anyhow::Result<Option<String>> {
    let Some(name) = settings.secret_name.as_deref() else {
        return Ok(None);
    };

    let secret = secrets
        .get_secret(name)
        .await
        .with_context(|| format!("failed to load credentials {name}"))?;

    let api_key = secret.get(API_KEY_FIELD).cloned();
    if api_key.is_none() {
        tracing::warn!(secret = name, field = API_KEY_FIELD, "secret has no api key entry");
    }
    Ok(api_key)
}
