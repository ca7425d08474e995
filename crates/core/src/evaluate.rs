use crate::domain::{ChangeAlert, Direction, PriceSnapshot};

/// Compares `current` against `last` and returns an alert for every asset whose
/// absolute percent change is at least `threshold_pct`.
///
/// Output order follows `current`. Assets without a usable baseline (missing,
/// zero, or non-finite previous price) are skipped, never reported as errors.
pub fn evaluate(last: &PriceSnapshot, current: &PriceSnapshot, threshold_pct: f64) -> Vec<ChangeAlert> {
    let mut alerts = Vec::new();

    for (asset, current_price) in current.iter() {
        let Some(previous_price) = last.get(asset) else {
            tracing::debug!(asset, current_price, "no baseline; seeding only");
            continue;
        };

        let Some(percent_change) = percent_change(previous_price, current_price) else {
            tracing::warn!(asset, previous_price, current_price, "degenerate price pair; skipping");
            continue;
        };

        if percent_change.abs() < threshold_pct {
            continue;
        }

        let direction = if percent_change > 0.0 {
            Direction::Increased
        } else {
            Direction::Decreased
        };

        alerts.push(ChangeAlert {
            asset: asset.to_string(),
            previous_price,
            current_price,
            percent_change,
            direction,
        });
    }

    alerts
}

/// Joins alert messages into one notification body, one alert per line.
pub fn notification_body(alerts: &[ChangeAlert]) -> String {
    alerts
        .iter()
        .map(ChangeAlert::message)
        .collect::<Vec<_>>()
        .join("\n")
}

fn percent_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return None;
    }
    let pct = (current - previous) / previous * 100.0;
    pct.is_finite().then_some(pct)
}
