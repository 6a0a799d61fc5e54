//! Order statistics over salary samples.
//!
//! Quartiles use the nearest-rank rule `sorted[round(p * (n - 1))]` with
//! ties rounded to even; the median averages the two middle values.

use serde::Serialize;

/// Sorts a copy ascending, NaN-tolerant.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    out
}

/// Nearest-rank percentile of ascending `sorted` input, `p` in `0.0..=1.0`. Empty gives 0.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let last = sorted.len() - 1;
    let rank = (p.clamp(0.0, 1.0) * last as f64).round_ties_even() as usize;
    sorted[rank.min(last)]
}

/// Median of ascending `sorted` input. Empty gives 0.
pub fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 0 => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
        _ => sorted[n / 2],
    }
}

/// Arithmetic mean. Empty gives 0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance around the mean, dividing by N. Empty gives 0.
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct BoxPlot {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxPlot {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let sorted = sorted(values);
        Self {
            min: sorted[0],
            q1: percentile(&sorted, 0.25),
            median: percentile(&sorted, 0.5),
            q3: percentile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        }
    }

    /// `[min, q1, median, q3, max]`, the order chart libraries expect.
    pub fn to_array(self) -> [f64; 5] {
        [self.min, self.q1, self.median, self.q3, self.max]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub variance: f64,
}

impl SalaryStats {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let sorted = sorted(values);
        Self {
            mean: mean(&sorted),
            median: median(&sorted),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            variance: population_variance(&sorted),
        }
    }
}

/// Rounds half to even at `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

/// `numerator * 100 / denominator`, or 0 when the denominator is 0.
pub fn pct(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator * 100.0 / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<Vec<f64>> {
        vec![
            vec![42_000.0],
            vec![90_000.0, 50_000.0],
            vec![50_000.0, 60_000.0, 70_000.0, 80_000.0, 90_000.0],
            vec![120_500.0, 61_250.0, 61_250.0, 99_000.0, 54_000.0, 75_000.0, 150_000.0],
            (1..=40).map(|i| f64::from(i * 1_750 % 97) * 1_000.0).collect(),
        ]
    }

    #[test]
    fn five_evenly_spaced_salaries() {
        let plot = BoxPlot::from_values(&[90_000.0, 50_000.0, 70_000.0, 60_000.0, 80_000.0]);
        assert_eq!(
            plot.to_array(),
            [50_000.0, 60_000.0, 70_000.0, 80_000.0, 90_000.0]
        );
    }

    #[test]
    fn box_plot_is_monotonic() {
        for values in samples() {
            let plot = BoxPlot::from_values(&values);
            assert!(plot.min <= plot.q1, "{values:?}");
            assert!(plot.q1 <= plot.median, "{values:?}");
            assert!(plot.median <= plot.q3, "{values:?}");
            assert!(plot.q3 <= plot.max, "{values:?}");
        }
    }

    #[test]
    fn empty_inputs_are_all_zero() {
        assert_eq!(BoxPlot::from_values(&[]).to_array(), [0.0; 5]);
        assert_eq!(SalaryStats::from_values(&[]), SalaryStats::default());
        assert_eq!(percentile(&[], 0.5), 0.0);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn nearest_rank_rounds_ties_to_even() {
        // n = 3: 0.25 * 2 = 0.5 rounds to 0, 0.75 * 2 = 1.5 rounds to 2.
        let sorted = [10.0, 20.0, 30.0];
        assert_eq!(percentile(&sorted, 0.25), 10.0);
        assert_eq!(percentile(&sorted, 0.75), 30.0);
        assert_eq!(percentile(&sorted, 1.5), 30.0);
    }

    #[test]
    fn median_averages_the_middle_pair() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(median(&[1.0, 2.0, 9.0]), 2.0);
    }

    #[test]
    fn variance_is_population_variance() {
        assert_eq!(population_variance(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 4.0);
        assert_eq!(population_variance(&[70_000.0; 6]), 0.0);
        for values in samples() {
            assert!(population_variance(&values) >= 0.0);
        }
    }

    #[test]
    fn salary_stats_summarise_the_sample() {
        let stats = SalaryStats::from_values(&[50_000.0, 70_000.0, 60_000.0, 80_000.0]);
        assert_eq!(stats.mean, 65_000.0);
        assert_eq!(stats.median, 65_000.0);
        assert_eq!(stats.min, 50_000.0);
        assert_eq!(stats.max, 80_000.0);
        assert_eq!(stats.variance, 125_000_000.0);
    }

    #[test]
    fn rates_with_zero_denominator_are_zero() {
        assert_eq!(pct(3.0, 0.0), 0.0);
        assert_eq!(pct(1.0, 4.0), 25.0);
        assert_eq!(round_to(2.345, 2), 2.34);
        assert_eq!(round_to(12.25, 1), 12.2);
    }
}
