use clap::Parser;
use pricewatch_core::run::{PriceWatcher, RunOptions, RunStatus};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod wiring;

#[derive(Debug, Parser)]
#[command(name = "pricewatch_worker")]
struct Args {
    /// Check prices and log alerts, but send nothing and leave the snapshot as is.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let settings = match pricewatch_core::config::Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            // Logging is not installed yet; the status line is the only channel.
            return emit(RunStatus {
                status_code: 500,
                message: format!("invalid configuration: {err:#}"),
            });
        }
    };
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let status = match run(&settings, args.dry_run).await {
        Ok(status) => status,
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %format!("{err:#}"), "price check could not start");
            RunStatus {
                status_code: 500,
                message: format!("An error occurred: {err:#}"),
            }
        }
    };

    emit(status)
}

async fn run(
    settings: &pricewatch_core::config::Settings,
    dry_run: bool,
) -> anyhow::Result<RunStatus> {
    let deps = wiring::Dependencies::from_settings(settings, dry_run).await?;

    tracing::info!(
        assets = ?settings.monitored_assets.iter().collect::<Vec<_>>(),
        threshold_pct = settings.threshold_pct,
        source = deps.source.source_name(),
        store = deps.store.backend_name(),
        sink = deps.notifier.sink_name(),
        dry_run,
        "starting price check"
    );

    let watcher = PriceWatcher::new(deps.source, deps.store, deps.notifier);
    let opts = RunOptions {
        persist: !dry_run,
        ..RunOptions::from_settings(settings)
    };

    let result = watcher.run_once(&opts).await;
    match &result {
        Ok(report) => {
            if let Some(err) = &report.notify_error {
                sentry::capture_error(err);
            }
            tracing::info!(
                run_id = %report.run_id,
                checked = report.checked,
                alerts = report.alerts.len(),
                "price check finished"
            );
        }
        Err(err) => {
            sentry::capture_error(err);
            tracing::error!(error = %err, "price check failed");
        }
    }

    Ok(RunStatus::from_result(&result))
}

fn emit(status: RunStatus) -> ExitCode {
    println!(
        "{}",
        serde_json::json!({"statusCode": status.status_code, "body": status.message})
    );
    if status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn init_sentry(settings: &pricewatch_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
