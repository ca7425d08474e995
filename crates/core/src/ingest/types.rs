use crate::domain::{MonitoredAssetSet, PriceSnapshot};
use serde::{Deserialize, Serialize};

/// One row of the upstream ticker listing. Only the fields the job reads are
/// kept; everything else in the payload is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerRecord {
    pub symbol: String,
    #[serde(rename = "lastPrice")]
    pub last_price: String,
}

impl TickerRecord {
    pub fn parse_price(&self) -> Option<f64> {
        let t = self.last_price.trim();
        if t.is_empty() {
            return None;
        }
        t.parse::<f64>().ok().filter(|p| p.is_finite())
    }
}

/// Filters the listing down to the monitored assets, keeping response order.
pub fn current_prices(records: &[TickerRecord], assets: &MonitoredAssetSet) -> PriceSnapshot {
    let mut out = PriceSnapshot::new();
    for record in records {
        if !assets.contains(&record.symbol) {
            continue;
        }
        match record.parse_price() {
            Some(price) => out.insert(record.symbol.clone(), price),
            None => tracing::warn!(
                symbol = %record.symbol,
                last_price = %record.last_price,
                "unparseable lastPrice; skipping asset"
            ),
        }
    }

    let missing: Vec<&str> = assets.iter().filter(|s| out.get(s).is_none()).collect();
    if !missing.is_empty() {
        tracing::warn!(?missing, "monitored assets absent from ticker listing");
    }

    out
}
