//! Peer-implied per-share valuations.

use crate::comps::PeerMetrics;
use serde::Serialize;

/// Valuation multiple used for peer-implied values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Multiple {
    /// Price / earnings
    PriceEarnings,
    /// Enterprise value / sales
    EvSales,
    /// Enterprise value / EBITDA
    EvEbitda,
}

impl Multiple {
    /// All multiples, in output order.
    pub const ALL: [Self; 3] = [Self::PriceEarnings, Self::EvSales, Self::EvEbitda];

    /// Row heading.
    pub const fn label(self) -> &'static str {
        match self {
            Self::PriceEarnings => "P/E Ratio",
            Self::EvSales => "EV/Sales",
            Self::EvEbitda => "EV/EBITDA",
        }
    }

    /// The multiple of one peer.
    pub const fn of(self, peer: &PeerMetrics) -> Option<f64> {
        match self {
            Self::PriceEarnings => peer.pe_ratio,
            Self::EvSales => peer.ev_sales,
            Self::EvEbitda => peer.ev_ebitda,
        }
    }

    /// The subject metric the multiple is applied to.
    pub const fn base_metric(self, subject: &PeerMetrics) -> Option<f64> {
        match self {
            Self::PriceEarnings => subject.ltm_earnings,
            Self::EvSales => subject.ltm_sales,
            Self::EvEbitda => subject.ltm_ebitda,
        }
    }

    /// Per-share value implied by `multiple`, or `None` when the multiple is
    /// not positive or the base metric or share count is unknown. Unknown cash
    /// or debt counts as zero.
    pub fn implied_value(self, multiple: Option<f64>, subject: &PeerMetrics) -> Option<f64> {
        let multiple = multiple.filter(|m| *m > 0.0)?;
        let metric = self.base_metric(subject)?;
        let shares = subject.shares_outstanding.filter(|s| *s != 0.0)?;
        let value = match self {
            Self::PriceEarnings => multiple * metric,
            Self::EvSales | Self::EvEbitda => {
                subject.cash.unwrap_or(0.0) - subject.total_debt.unwrap_or(0.0)
                    + multiple * metric
            }
        };
        Some(value / shares)
    }
}

/// Average, minimum and maximum of a multiple across peers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MultipleStats {
    /// Mean of the positive values
    pub average: Option<f64>,
    /// Smallest positive value
    pub minimum: Option<f64>,
    /// Largest value
    pub maximum: Option<f64>,
}

impl MultipleStats {
    /// Summarize the known values of a multiple.
    pub fn from_values(values: &[f64]) -> Self {
        let positive: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();
        let average =
            (!positive.is_empty()).then(|| positive.iter().sum::<f64>() / positive.len() as f64);
        Self {
            average,
            minimum: positive.iter().copied().reduce(f64::min),
            maximum: values.iter().copied().reduce(f64::max),
        }
    }
}

/// Peer statistics of one multiple and the per-share values they imply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpliedRange {
    /// Multiple
    pub multiple: Multiple,
    /// The subject's own multiple
    pub subject: Option<f64>,
    /// Peer statistics
    pub peers: MultipleStats,
    /// Value per share at the peer average
    pub implied_average: Option<f64>,
    /// Value per share at the peer minimum
    pub implied_minimum: Option<f64>,
    /// Value per share at the peer maximum
    pub implied_maximum: Option<f64>,
}

/// Implied ranges for every multiple.
pub fn implied_ranges(subject: &PeerMetrics, peers: &[PeerMetrics]) -> Vec<ImpliedRange> {
    Multiple::ALL
        .into_iter()
        .map(|multiple| {
            let values: Vec<f64> = peers.iter().filter_map(|p| multiple.of(p)).collect();
            let stats = MultipleStats::from_values(&values);
            ImpliedRange {
                multiple,
                subject: multiple.of(subject),
                peers: stats,
                implied_average: multiple.implied_value(stats.average, subject),
                implied_minimum: multiple.implied_value(stats.minimum, subject),
                implied_maximum: multiple.implied_value(stats.maximum, subject),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn subject() -> PeerMetrics {
        PeerMetrics {
            ticker: "ACME".to_string(),
            ltm_earnings: Some(100.0),
            ltm_sales: Some(1000.0),
            ltm_ebitda: Some(200.0),
            cash: Some(50.0),
            total_debt: Some(150.0),
            shares_outstanding: Some(10.0),
            pe_ratio: Some(12.0),
            ..PeerMetrics::default()
        }
    }

    fn peer(pe: f64, ev_sales: f64, ev_ebitda: f64) -> PeerMetrics {
        PeerMetrics {
            pe_ratio: Some(pe),
            ev_sales: Some(ev_sales),
            ev_ebitda: Some(ev_ebitda),
            ..PeerMetrics::default()
        }
    }

    #[test]
    fn test_stats_ignore_non_positive_for_average_and_minimum() {
        let stats = MultipleStats::from_values(&[0.0, 10.0, 20.0]);
        assert_relative_eq!(stats.average.unwrap(), 15.0);
        assert_relative_eq!(stats.minimum.unwrap(), 10.0);
        assert_relative_eq!(stats.maximum.unwrap(), 20.0);

        let empty = MultipleStats::from_values(&[0.0]);
        assert_eq!(empty.average, None);
        assert_eq!(empty.minimum, None);
        assert_eq!(empty.maximum, Some(0.0));
    }

    #[test]
    fn test_implied_ranges() {
        let peers = [peer(10.0, 1.0, 5.0), peer(20.0, 2.0, 0.0)];
        let ranges = implied_ranges(&subject(), &peers);
        assert_eq!(ranges.len(), 3);

        let pe = &ranges[0];
        assert_eq!(pe.multiple, Multiple::PriceEarnings);
        assert_eq!(pe.subject, Some(12.0));
        assert_relative_eq!(pe.implied_average.unwrap(), 150.0);
        assert_relative_eq!(pe.implied_minimum.unwrap(), 100.0);
        assert_relative_eq!(pe.implied_maximum.unwrap(), 200.0);

        let ev_sales = &ranges[1];
        // (cash - debt + 1.5 x 1000) / 10
        assert_relative_eq!(ev_sales.implied_average.unwrap(), 140.0);

        let ev_ebitda = &ranges[2];
        assert_relative_eq!(ev_ebitda.peers.average.unwrap(), 5.0);
        assert_relative_eq!(ev_ebitda.implied_minimum.unwrap(), 90.0);
    }

    #[test]
    fn test_non_positive_multiple_is_blank() {
        let peers = [peer(0.0, 0.0, 0.0)];
        let ranges = implied_ranges(&subject(), &peers);
        for range in ranges {
            assert_eq!(range.implied_average, None);
            assert_eq!(range.implied_minimum, None);
            assert_eq!(range.implied_maximum, None);
        }
    }

    #[test]
    fn test_unknown_cash_counts_as_zero() {
        let s = PeerMetrics {
            ltm_sales: Some(1000.0),
            total_debt: Some(200.0),
            cash: None,
            shares_outstanding: Some(100.0),
            ..subject()
        };
        // (0 - 200 + 2 x 1000) / 100
        assert_relative_eq!(Multiple::EvSales.implied_value(Some(2.0), &s).unwrap(), 18.0);

        let no_debt = PeerMetrics {
            total_debt: None,
            ..s
        };
        assert_relative_eq!(
            Multiple::EvSales.implied_value(Some(2.0), &no_debt).unwrap(),
            20.0
        );
    }

    #[test]
    fn test_unknown_base_metric_or_shares_is_blank() {
        let no_sales = PeerMetrics {
            ltm_sales: None,
            ..subject()
        };
        let ranges = implied_ranges(&no_sales, &[peer(10.0, 1.0, 5.0)]);
        assert!(ranges[0].implied_average.is_some());
        assert_eq!(ranges[1].implied_average, None);

        let no_shares = PeerMetrics {
            shares_outstanding: None,
            ..subject()
        };
        assert_eq!(Multiple::PriceEarnings.implied_value(Some(10.0), &no_shares), None);
    }
}
