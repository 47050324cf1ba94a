//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is the sample standard deviation (divides by N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined.

use crate::domain::indicator::calculate_sma;
use crate::domain::indicator::stddev::calculate_stddev;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

pub fn calculate_bollinger(closes: &[f64], period: usize, mult: f64) -> BollingerSeries {
    let middle = calculate_sma(closes, period);
    let stddev = calculate_stddev(closes, period);

    let mut upper = Vec::with_capacity(closes.len());
    let mut lower = Vec::with_capacity(closes.len());
    let mut mid_out = Vec::with_capacity(closes.len());

    for (m, s) in middle.into_iter().zip(stddev) {
        match (m, s) {
            (Some(m), Some(s)) => {
                upper.push(Some(m + mult * s));
                mid_out.push(Some(m));
                lower.push(Some(m - mult * s));
            }
            _ => {
                upper.push(None);
                mid_out.push(None);
                lower.push(None);
            }
        }
    }

    BollingerSeries {
        upper,
        middle: mid_out,
        lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bollinger_warmup() {
        let series = calculate_bollinger(&[10.0, 20.0, 30.0, 40.0, 50.0], 3, 2.0);

        assert!(series.middle[0].is_none());
        assert!(series.upper[1].is_none());
        assert!(series.lower[1].is_none());
        assert!(series.middle[2].is_some());
        assert!(series.upper[4].is_some());
    }

    #[test]
    fn bollinger_constant_values() {
        let series = calculate_bollinger(&[100.0; 5], 3, 2.0);

        assert_eq!(series.middle[2], Some(100.0));
        assert_eq!(series.upper[2], Some(100.0));
        assert_eq!(series.lower[2], Some(100.0));
    }

    #[test]
    fn bollinger_basic_calculation() {
        let series = calculate_bollinger(&[10.0, 20.0, 30.0], 3, 2.0);

        let expected_middle: f64 = 20.0;
        let variance: f64 =
            ((10.0 - expected_middle).powi(2) + (30.0 - expected_middle).powi(2)) / 2.0;
        let stddev = variance.sqrt();

        assert!((series.middle[2].unwrap() - expected_middle).abs() < 1e-10);
        assert!((series.upper[2].unwrap() - (expected_middle + 2.0 * stddev)).abs() < 1e-10);
        assert!((series.lower[2].unwrap() - (expected_middle - 2.0 * stddev)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_multiplier_variations() {
        let one = calculate_bollinger(&[10.0, 20.0, 30.0], 3, 1.0);
        let two = calculate_bollinger(&[10.0, 20.0, 30.0], 3, 2.0);

        let width_one = one.upper[2].unwrap() - one.lower[2].unwrap();
        let width_two = two.upper[2].unwrap() - two.lower[2].unwrap();
        assert!((width_two - 2.0 * width_one).abs() < 1e-10);
    }

    #[test]
    fn bollinger_symmetry() {
        let series = calculate_bollinger(&[10.0, 20.0, 30.0], 3, 2.0);

        let middle = series.middle[2].unwrap();
        let upper_dist = series.upper[2].unwrap() - middle;
        let lower_dist = middle - series.lower[2].unwrap();
        assert!((upper_dist - lower_dist).abs() < 1e-10);
    }

    #[test]
    fn bollinger_window_of_one_is_undefined() {
        let series = calculate_bollinger(&[10.0, 20.0], 1, 2.0);
        assert_eq!(series.middle, vec![None, None]);
    }
}
