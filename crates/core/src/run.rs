use crate::domain::{ChangeAlert, MonitoredAssetSet};
use crate::evaluate::{evaluate, notification_body};
use crate::ingest::{current_prices, FetchError, PriceSource};
use crate::notify::{Notifier, NotifyError, ALERT_SUBJECT};
use crate::storage::{load_last_prices, persist_prices, SnapshotStore, StoreError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

pub const SUCCESS_MESSAGE: &str = "Crypto prices checked successfully!";

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub assets: MonitoredAssetSet,
    pub threshold_pct: f64,
    pub snapshot_key: String,
    pub notify_topic: String,
    /// `false` skips the snapshot write (dry run).
    pub persist: bool,
}

impl RunOptions {
    pub fn from_settings(settings: &crate::config::Settings) -> Self {
        Self {
            assets: settings.monitored_assets.clone(),
            threshold_pct: settings.threshold_pct,
            snapshot_key: settings.snapshot_key.clone(),
            notify_topic: settings.notify_topic.clone(),
            persist: true,
        }
    }
}

/// Fatal run failures. Notification failures are not here: they never stop a
/// run and are carried on [`RunReport`] instead.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("error fetching prices from {source_name}: {source}")]
    Fetch {
        source_name: &'static str,
        #[source]
        source: FetchError,
    },

    #[error("error loading last prices: {0}")]
    StoreRead(#[source] StoreError),

    /// Carries the notification failure too when both happened in one run.
    #[error("error storing current prices: {source}{}", undelivered_note(.notify_error))]
    StoreWrite {
        #[source]
        source: StoreError,
        notify_error: Option<NotifyError>,
    },
}

fn undelivered_note(notify_error: &Option<NotifyError>) -> String {
    match notify_error {
        Some(err) => format!(" (alerts were also not delivered: {err})"),
        None => String::new(),
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Monitored assets present in the fetched listing.
    pub checked: usize,
    pub alerts: Vec<ChangeAlert>,
    pub notify_error: Option<NotifyError>,
    pub persisted: bool,
}

/// What the process hands back to whoever triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStatus {
    pub status_code: u16,
    pub message: String,
}

impl RunStatus {
    pub fn from_result(result: &Result<RunReport, RunError>) -> Self {
        match result {
            Ok(report) => match &report.notify_error {
                None => Self {
                    status_code: 200,
                    message: SUCCESS_MESSAGE.to_string(),
                },
                Some(err) => Self {
                    status_code: 500,
                    message: format!(
                        "Prices stored but {} alert(s) were not delivered: {err}",
                        report.alerts.len()
                    ),
                },
            },
            Err(err) => Self {
                status_code: 500,
                message: err.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// One price check wired to its collaborators.
pub struct PriceWatcher {
    source: Arc<dyn PriceSource>,
    store: Arc<dyn SnapshotStore>,
    notifier: Arc<dyn Notifier>,
}

impl PriceWatcher {
    pub fn new(
        source: Arc<dyn PriceSource>,
        store: Arc<dyn SnapshotStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            store,
            notifier,
        }
    }

    pub async fn run_once(&self, opts: &RunOptions) -> Result<RunReport, RunError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("price_check", %run_id);
        self.run_inner(run_id, opts).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid, opts: &RunOptions) -> Result<RunReport, RunError> {
        let started_at = Utc::now();

        let records = self
            .source
            .fetch_tickers()
            .await
            .map_err(|source| RunError::Fetch {
                source_name: self.source.source_name(),
                source,
            })?;
        let current = current_prices(&records, &opts.assets);

        let last = load_last_prices(self.store.as_ref(), &opts.snapshot_key)
            .await
            .map_err(RunError::StoreRead)?;

        let alerts = evaluate(&last, &current, opts.threshold_pct);
        for alert in &alerts {
            tracing::info!(
                asset = %alert.asset,
                previous_price = alert.previous_price,
                current_price = alert.current_price,
                percent_change = %alert.percent_change_display(),
                direction = %alert.direction,
                "price change over threshold"
            );
        }

        let mut notify_error = None;
        if !alerts.is_empty() {
            let body = notification_body(&alerts);
            if let Err(err) = self
                .notifier
                .publish(&opts.notify_topic, ALERT_SUBJECT, &body)
                .await
            {
                tracing::error!(
                    sink = self.notifier.sink_name(),
                    topic = %opts.notify_topic,
                    error = %err,
                    "notification delivery failed; still storing prices"
                );
                notify_error = Some(err);
            }
        }

        if opts.persist {
            if let Err(source) =
                persist_prices(self.store.as_ref(), &opts.snapshot_key, &current).await
            {
                return Err(RunError::StoreWrite {
                    source,
                    notify_error,
                });
            }
        } else {
            tracing::info!(key = %opts.snapshot_key, "dry run; snapshot not written");
        }

        tracing::info!(
            checked = current.len(),
            baseline = last.len(),
            alerts = alerts.len(),
            persisted = opts.persist,
            "price check complete"
        );

        Ok(RunReport {
            run_id,
            started_at,
            checked: current.len(),
            alerts,
            notify_error,
            persisted: opts.persist,
        })
    }
}
