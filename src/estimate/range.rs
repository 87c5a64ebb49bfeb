//! Bounded calorie ranges
//!
//! Shared primitive for every estimator: a low/mid/high kilocalorie triple
//! with a relative uncertainty. The uncertainty is always clamped into
//! [0.05, 0.60] so an unsure estimator still produces a usable range.

use serde::{Deserialize, Serialize};

/// Lower clamp for relative uncertainty
pub const MIN_UNCERTAINTY: f64 = 0.05;
/// Upper clamp for relative uncertainty
pub const MAX_UNCERTAINTY: f64 = 0.60;

/// A calorie estimate expressed as a bounded range
///
/// Invariant: `0 <= low <= mid <= high`, `uncertainty` in [0.05, 0.60].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalorieRange {
    pub low: u32,
    pub mid: u32,
    pub high: u32,
    pub uncertainty: f64,
}

impl CalorieRange {
    /// A zero range (no signal)
    pub fn zero() -> Self {
        Self {
            low: 0,
            mid: 0,
            high: 0,
            uncertainty: MIN_UNCERTAINTY,
        }
    }

    /// Width of the range in kilocalories
    pub fn width(&self) -> u32 {
        self.high - self.low
    }
}

/// Build a range around a midpoint with a relative uncertainty
///
/// The uncertainty is clamped into [0.05, 0.60]. Non-finite or negative
/// midpoints are treated as 0 (callers sanitize their inputs, this is the
/// backstop).
pub fn bounded_range(mid: f64, uncertainty: f64) -> CalorieRange {
    let mid = if mid.is_finite() && mid > 0.0 { mid } else { 0.0 };
    let u = clamp_uncertainty(uncertainty);

    let low = (mid * (1.0 - u)).round().max(0.0) as u32;
    let high = ((mid * (1.0 + u)).round() as u32).max(low);

    CalorieRange {
        low,
        mid: mid.round() as u32,
        high,
        uncertainty: u,
    }
}

/// Build a range from explicit low/high bounds
///
/// The midpoint is the rounded bound average; the uncertainty is derived
/// from the range's own relative half-width, then clamped into the supplied
/// band (which itself stays within [0.05, 0.60]).
pub fn range_from_bounds(low: f64, high: f64, min_u: f64, max_u: f64) -> CalorieRange {
    let low = if low.is_finite() && low > 0.0 { low } else { 0.0 };
    let high = if high.is_finite() { high.max(low) } else { low };

    let mid = (low + high) / 2.0;
    let rel_half_width = if mid > 0.0 {
        (high - low) / (2.0 * mid)
    } else {
        max_u
    };
    let u = clamp_uncertainty(rel_half_width.clamp(min_u, max_u));

    CalorieRange {
        low: low.round() as u32,
        mid: mid.round() as u32,
        high: high.round() as u32,
        uncertainty: u,
    }
}

fn clamp_uncertainty(u: f64) -> f64 {
    if u.is_finite() {
        u.clamp(MIN_UNCERTAINTY, MAX_UNCERTAINTY)
    } else {
        MAX_UNCERTAINTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_range_ordering() {
        for mid in [0.0, 1.0, 35.0, 200.0, 1234.0, 99999.0] {
            for u in [0.0, 0.05, 0.2, 0.6, 1.0] {
                let r = bounded_range(mid, u);
                assert!(r.low <= r.mid, "low > mid for mid={} u={}", mid, u);
                assert!(r.mid <= r.high, "mid > high for mid={} u={}", mid, u);
            }
        }
    }

    #[test]
    fn test_uncertainty_clamped() {
        assert_eq!(bounded_range(100.0, 0.0).uncertainty, 0.05);
        assert_eq!(bounded_range(100.0, 0.9).uncertainty, 0.60);
        assert_eq!(bounded_range(100.0, 0.3).uncertainty, 0.3);
    }

    #[test]
    fn test_width_bounded_by_clamp() {
        // With u capped at 0.6 the width can never exceed 1.2 x mid (+1 rounding)
        for mid in [50.0, 123.0, 800.0] {
            let r = bounded_range(mid, 1.0);
            assert!(f64::from(r.width()) <= 1.2 * mid + 1.0);
        }
    }

    #[test]
    fn test_negative_and_nan_mid_treated_as_zero() {
        for bad in [-50.0, f64::NAN, f64::NEG_INFINITY] {
            let r = bounded_range(bad, 0.2);
            assert_eq!((r.low, r.mid, r.high), (0, 0, 0));
            assert_eq!(r.uncertainty, 0.2);
        }
    }

    #[test]
    fn test_round_trip_mid() {
        // Reconstructing mid from low/high lands within +-1 of the original
        for mid in [73.0, 200.0, 451.0, 1999.0] {
            for u in [0.05, 0.08, 0.25, 0.45] {
                let r = bounded_range(mid, u);
                let mid2 = ((f64::from(r.low) + f64::from(r.high)) / 2.0).round() as i64;
                assert!(
                    (mid2 - mid as i64).abs() <= 1,
                    "round trip drift: {} -> {}",
                    mid,
                    mid2
                );
            }
        }
    }

    #[test]
    fn test_range_from_bounds() {
        let r = range_from_bounds(180.0, 220.0, 0.10, 0.45);
        assert_eq!(r.mid, 200);
        // half-width 20/200 = 0.10
        assert!((r.uncertainty - 0.10).abs() < 1e-9);

        // Very wide bounds clamp at the band ceiling
        let r = range_from_bounds(100.0, 900.0, 0.10, 0.45);
        assert_eq!(r.mid, 500);
        assert!((r.uncertainty - 0.45).abs() < 1e-9);
    }
}
