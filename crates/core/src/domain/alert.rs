use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increased,
    Decreased,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Increased => "increased",
            Direction::Decreased => "decreased",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One asset whose move between the stored and the fetched price crossed the
/// threshold. Lives only for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeAlert {
    pub asset: String,
    pub previous_price: f64,
    pub current_price: f64,
    /// Unrounded; rounding is a display concern.
    pub percent_change: f64,
    pub direction: Direction,
}

impl ChangeAlert {
    pub fn percent_change_display(&self) -> String {
        format!("{:.2}", self.percent_change)
    }

    pub fn message(&self) -> String {
        format!(
            "ALERT: {} has {} by {}% in the last 24 hours. Current price: {}",
            self.asset,
            self.direction,
            self.percent_change_display(),
            self.current_price
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_uses_two_decimals() {
        let alert = ChangeAlert {
            asset: "BTCUSDT".to_string(),
            previous_price: 100.0,
            current_price: 94.0,
            percent_change: -6.0,
            direction: Direction::Decreased,
        };
        assert_eq!(alert.percent_change_display(), "-6.00");
        assert_eq!(
            alert.message(),
            "ALERT: BTCUSDT has decreased by -6.00% in the last 24 hours. Current price: 94"
        );
    }
}
