use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Symbol -> price mapping. Keeps insertion order so that alerts come out in
/// the order the upstream ticker listing produced them.
#[derive(Debug, Clone, Default)]
pub struct PriceSnapshot {
    entries: Vec<(String, f64)>,
}

impl PriceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the price for `symbol`. A replaced symbol keeps its
    /// original position.
    pub fn insert(&mut self, symbol: impl Into<String>, price: f64) {
        let symbol = symbol.into();
        match self.entries.iter_mut().find(|(s, _)| *s == symbol) {
            Some(entry) => entry.1 = price,
            None => self.entries.push((symbol, price)),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, p)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(s, p)| (s.as_str(), *p))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(s, _)| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Equal when both map the same symbols to the same prices, in any order.
impl PartialEq for PriceSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(s, p)| other.get(s) == Some(p))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for PriceSnapshot {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (symbol, price) in iter {
            out.insert(symbol, price);
        }
        out
    }
}

impl Serialize for PriceSnapshot {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (symbol, price) in &self.entries {
            map.serialize_entry(symbol, price)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PriceSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Stored order carries no meaning; a sorted map keeps loads deterministic.
        let map = BTreeMap::<String, f64>::deserialize(deserializer)?;
        Ok(map.into_iter().collect())
    }
}

/// Ordered, de-duplicated set of symbols watched by a run. Fixed once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoredAssetSet {
    symbols: Vec<String>,
}

impl MonitoredAssetSet {
    /// Trims and upper-cases each symbol, dropping blanks and repeats.
    pub fn new<I, S>(symbols: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for s in symbols {
            let symbol = s.as_ref().trim().to_ascii_uppercase();
            if symbol.is_empty() || out.contains(&symbol) {
                continue;
            }
            out.push(symbol);
        }

        anyhow::ensure!(!out.is_empty(), "monitored asset set must be non-empty");
        Ok(Self { symbols: out })
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.symbols.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_replaces_in_place() {
        let mut snap = PriceSnapshot::new();
        snap.insert("ETHUSDT", 2000.0);
        snap.insert("BTCUSDT", 100.0);
        snap.insert("ETHUSDT", 2100.0);

        let order: Vec<_> = snap.symbols().collect();
        assert_eq!(order, vec!["ETHUSDT", "BTCUSDT"]);
        assert_eq!(snap.get("ETHUSDT"), Some(2100.0));
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn equality_ignores_order() {
        let a: PriceSnapshot = [("ETHUSDT", 2000.0), ("BTCUSDT", 100.0)].into_iter().collect();
        let b: PriceSnapshot = [("BTCUSDT", 100.0), ("ETHUSDT", 2000.0)].into_iter().collect();
        let c: PriceSnapshot = [("BTCUSDT", 100.0), ("ETHUSDT", 2001.0)].into_iter().collect();
        let d: PriceSnapshot = [("BTCUSDT", 100.0)].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_ne!(d, a);
    }

    #[test]
    fn serializes_as_flat_json_object() {
        let snap: PriceSnapshot = [("BTCUSDT", 100.5), ("ETHUSDT", 2000.0)]
            .into_iter()
            .collect();
        let v = serde_json::to_value(&snap).unwrap();
        assert_eq!(v, json!({"BTCUSDT": 100.5, "ETHUSDT": 2000.0}));
    }

    #[test]
    fn rejects_non_numeric_prices() {
        let res = serde_json::from_value::<PriceSnapshot>(json!({"BTCUSDT": "100"}));
        assert!(res.is_err());
    }

    #[test]
    fn asset_set_normalizes_and_dedups() {
        let set = MonitoredAssetSet::new([" btcusdt", "ETHUSDT", "BTCUSDT", ""]).unwrap();
        let symbols: Vec<_> = set.iter().collect();
        assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT"]);
        assert!(set.contains("ETHUSDT"));
        assert!(!set.contains("ethusdt"));
    }

    #[test]
    fn asset_set_rejects_empty() {
        assert!(MonitoredAssetSet::new(Vec::<String>::new()).is_err());
        assert!(MonitoredAssetSet::new([" ", ""]).is_err());
    }
}
