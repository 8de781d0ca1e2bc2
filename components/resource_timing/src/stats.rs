//! count/max/median/average over integer samples

use crate::types::AggregateStat;

/// Computes [`AggregateStat`]s
///
/// Samples are sorted in descending order before the max and median are
/// read; [`StatAggregator::median`] gives the same answer for either sort
/// direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatAggregator;

impl StatAggregator {
    /// Aggregate a sample set
    pub fn aggregate(samples: &[i64]) -> AggregateStat {
        let count = samples.len();
        if count == 0 {
            return AggregateStat::default();
        }

        let mut sorted = samples.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));

        AggregateStat {
            count,
            max: sorted.first().copied(),
            median: Self::median(&sorted),
            average: Self::average(&sorted),
        }
    }

    /// Median of a sorted slice (ascending or descending)
    ///
    /// Odd length: the middle element. Even length: the two central
    /// elements averaged and rounded half up. Both picks are symmetric around
    /// the centre, so the direction of the sort does not matter.
    pub fn median(sorted: &[i64]) -> Option<i64> {
        let len = sorted.len();
        if len == 0 {
            return None;
        }

        let middle = len / 2;
        if len % 2 == 0 {
            let sum = i128::from(sorted[middle - 1]) + i128::from(sorted[middle]);
            Some(rounded_div(sum, 2))
        } else {
            Some(sorted[middle])
        }
    }

    /// Rounded arithmetic mean
    pub fn average(samples: &[i64]) -> Option<i64> {
        if samples.is_empty() {
            return None;
        }

        let sum: i128 = samples.iter().copied().map(i128::from).sum();
        Some(rounded_div(sum, samples.len() as i128))
    }
}

/// `numerator / denominator` rounded half up, for a positive denominator
///
/// Callers pass a sum of i64 samples and their count, so the quotient lies
/// between the smallest and largest sample and fits in an i64.
fn rounded_div(numerator: i128, denominator: i128) -> i64 {
    (2 * numerator + denominator).div_euclid(2 * denominator) as i64
}
