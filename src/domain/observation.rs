//! Dated price/market-cap rows and leader selection.

use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Market-cap value substituted for missing or unparseable cells.
/// Never selected as the maximum while any candidate has a real value.
pub const SENTINEL_MARKET_CAP: f64 = -1.0;

/// One observation: prices for every ticker (benchmarks included) and
/// market caps for the rotation candidates only.
///
/// Both maps are `BTreeMap` so candidate iteration runs in lexicographic
/// ticker order, which makes the leader tie-break deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub prices: BTreeMap<String, f64>,
    pub market_caps: BTreeMap<String, f64>,
}

impl Observation {
    pub fn price(&self, ticker: &str) -> Option<f64> {
        self.prices.get(ticker).copied()
    }

    /// The candidate with the maximum market cap. Ties resolve to the
    /// lexicographically smallest ticker: iteration is ordered and only
    /// a strictly greater value displaces the current leader. Returns
    /// `None` only when the candidate map is empty.
    pub fn leader(&self) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for (ticker, &cap) in &self.market_caps {
            match best {
                Some((_, max)) if cap <= max => {}
                _ => best = Some((ticker, cap)),
            }
        }
        best.map(|(ticker, _)| ticker)
    }

    /// True when every candidate carries the sentinel market cap.
    pub fn all_sentinel(&self) -> bool {
        !self.market_caps.is_empty()
            && self
                .market_caps
                .values()
                .all(|&cap| cap == SENTINEL_MARKET_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(caps: &[(&str, f64)]) -> Observation {
        Observation {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            prices: caps.iter().map(|(t, _)| (t.to_string(), 100.0)).collect(),
            market_caps: caps.iter().map(|(t, c)| (t.to_string(), *c)).collect(),
        }
    }

    #[test]
    fn leader_picks_max_market_cap() {
        let o = obs(&[("AAPL", 3000.0), ("MSFT", 2800.0), ("NVDA", 2900.0)]);
        assert_eq!(o.leader(), Some("AAPL"));
    }

    #[test]
    fn leader_tie_breaks_lexicographically() {
        let o = obs(&[("MSFT", 3000.0), ("AAPL", 3000.0)]);
        assert_eq!(o.leader(), Some("AAPL"));
    }

    #[test]
    fn leader_ignores_sentinel_when_real_value_exists() {
        let o = obs(&[("AAPL", SENTINEL_MARKET_CAP), ("MSFT", 1.0)]);
        assert_eq!(o.leader(), Some("MSFT"));
    }

    #[test]
    fn leader_all_sentinel_is_lexicographic_first() {
        let o = obs(&[
            ("MSFT", SENTINEL_MARKET_CAP),
            ("AAPL", SENTINEL_MARKET_CAP),
        ]);
        assert_eq!(o.leader(), Some("AAPL"));
        assert!(o.all_sentinel());
    }

    #[test]
    fn leader_empty_candidates() {
        let o = obs(&[]);
        assert_eq!(o.leader(), None);
        assert!(!o.all_sentinel());
    }

    #[test]
    fn all_sentinel_false_with_real_value() {
        let o = obs(&[("AAPL", SENTINEL_MARKET_CAP), ("MSFT", 5.0)]);
        assert!(!o.all_sentinel());
    }

    #[test]
    fn price_lookup() {
        let o = obs(&[("AAPL", 1.0)]);
        assert_eq!(o.price("AAPL"), Some(100.0));
        assert_eq!(o.price("XYZ"), None);
    }
}
