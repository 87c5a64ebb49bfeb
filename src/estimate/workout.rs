//! Heart-rate energy estimation
//!
//! Converts heart-rate data plus profile attributes into kilocalorie
//! expenditure and a training-load score. The kcal/min core is the Keytel
//! et al. population regression (sex-specific coefficients over heart rate,
//! body weight, and age); the training load is a Bannister-style
//! heart-rate-reserve TRIMP. Neither is calibrated to the individual beyond
//! the profile's linear calibration factor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Keytel regression, male: kcal/min = (-55.0969 + 0.6309*hr + 0.1988*kg + 0.2017*age) / 4.184
const MALE_INTERCEPT: f64 = -55.0969;
const MALE_HR_COEF: f64 = 0.6309;
const MALE_WEIGHT_COEF: f64 = 0.1988;
const MALE_AGE_COEF: f64 = 0.2017;

/// Keytel regression, female: kcal/min = (-20.4022 + 0.4472*hr - 0.1263*kg + 0.074*age) / 4.184
const FEMALE_INTERCEPT: f64 = -20.4022;
const FEMALE_HR_COEF: f64 = 0.4472;
const FEMALE_WEIGHT_COEF: f64 = -0.1263;
const FEMALE_AGE_COEF: f64 = 0.074;

/// Kilojoules per kilocalorie; the regression is published in kJ/min
const KJ_PER_KCAL: f64 = 4.184;

/// Expenditure is never zero at elevated heart rate; floor the rate
const MIN_KCAL_PER_MIN: f64 = 0.5;

/// Gaps above this are sensor dropout, not rest, and are excluded
pub const DROPOUT_GAP_MINUTES: f64 = 10.0;

/// Bannister TRIMP constants, (multiplier, exponent) per sex
const TRIMP_MALE: (f64, f64) = (0.64, 1.92);
const TRIMP_FEMALE: (f64, f64) = (0.86, 1.67);

/// Heart-rate reserve fraction is allowed slightly above 1 to tolerate a
/// measured average above the configured max
const MAX_HR_RESERVE_FRACTION: f64 = 1.2;

/// Biological sex, selecting the regression coefficient set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "male" | "m" | "男" => Some(Sex::Male),
            "female" | "f" | "女" => Some(Sex::Female),
            _ => None,
        }
    }
}

/// One heart-rate sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    pub timestamp: DateTime<Utc>,
    pub bpm: f64,
}

/// A time-ordered heart-rate series; duplicate timestamps are permitted
pub type HeartRateSeries = Vec<HeartRateSample>;

/// Result of a series-based workout estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct WorkoutEstimate {
    pub kcal: u32,
    /// Minutes actually integrated (dropout gaps excluded)
    pub minutes: f64,
    /// Mean of the heart-rate values used in accepted intervals
    pub avg_hr: f64,
}

/// Kilocalories per minute at a given heart rate
///
/// Floored at a small positive rate; the regression goes negative at
/// resting heart rates, where expenditure is still not zero.
fn kcal_per_minute(sex: Sex, hr: f64, weight_kg: f64, age_years: f64) -> f64 {
    let kj_per_min = match sex {
        Sex::Male => {
            MALE_INTERCEPT + MALE_HR_COEF * hr + MALE_WEIGHT_COEF * weight_kg + MALE_AGE_COEF * age_years
        }
        Sex::Female => {
            FEMALE_INTERCEPT
                + FEMALE_HR_COEF * hr
                + FEMALE_WEIGHT_COEF * weight_kg
                + FEMALE_AGE_COEF * age_years
        }
    };
    (kj_per_min / KJ_PER_KCAL).max(MIN_KCAL_PER_MIN)
}

/// Point estimate from an average heart rate over a known duration
///
/// Missing or non-positive heart rate, minutes, or weight yields 0 rather
/// than an error; callers validate required fields, this is the designed
/// no-signal outcome.
pub fn kcal_from_average(
    sex: Sex,
    avg_hr: f64,
    minutes: f64,
    weight_kg: f64,
    age_years: f64,
    cal_factor: f64,
) -> u32 {
    if !(avg_hr > 0.0) || !(minutes > 0.0) || !(weight_kg > 0.0) {
        return 0;
    }
    let kcal = kcal_per_minute(sex, avg_hr, weight_kg, age_years) * minutes * cal_factor;
    if kcal.is_finite() {
        kcal.round().max(0.0) as u32
    } else {
        0
    }
}

/// Series estimate: trapezoid-style accumulation over consecutive samples
///
/// Each adjacent pair contributes the earlier sample's rate over the
/// elapsed gap. Non-positive gaps and gaps above [`DROPOUT_GAP_MINUTES`]
/// are skipped entirely - a stale reading must not be integrated over an
/// enormous interval it says nothing about. Fewer than two usable samples
/// yields an all-zero estimate.
pub fn kcal_from_series(
    sex: Sex,
    series: &[HeartRateSample],
    weight_kg: f64,
    age_years: f64,
    cal_factor: f64,
) -> WorkoutEstimate {
    if series.len() < 2 || !(weight_kg > 0.0) {
        return WorkoutEstimate::default();
    }

    let mut sorted: Vec<HeartRateSample> = series
        .iter()
        .copied()
        .filter(|s| s.bpm.is_finite() && s.bpm > 0.0)
        .collect();
    sorted.sort_by_key(|s| s.timestamp);

    let mut kcal = 0.0;
    let mut minutes = 0.0;
    let mut hr_sum = 0.0;
    let mut hr_count = 0u32;

    for pair in sorted.windows(2) {
        let gap_minutes = (pair[1].timestamp - pair[0].timestamp).num_milliseconds() as f64 / 60_000.0;
        if gap_minutes <= 0.0 || gap_minutes > DROPOUT_GAP_MINUTES {
            continue;
        }
        kcal += kcal_per_minute(sex, pair[0].bpm, weight_kg, age_years) * gap_minutes;
        minutes += gap_minutes;
        hr_sum += pair[0].bpm;
        hr_count += 1;
    }

    if hr_count == 0 {
        return WorkoutEstimate::default();
    }

    WorkoutEstimate {
        kcal: (kcal * cal_factor).round().max(0.0) as u32,
        minutes,
        avg_hr: hr_sum / f64::from(hr_count),
    }
}

/// Bannister-style training impulse (TRIMP)
///
/// `minutes * HRr * a * e^(b * HRr)` with sex-specific (a, b), where HRr is
/// the heart-rate reserve fraction clamped into [0, 1.2]. Returns 0 when any
/// input is missing/non-positive or when `hr_max <= hr_rest`.
pub fn training_load(minutes: f64, avg_hr: f64, hr_rest: f64, hr_max: f64, sex: Sex) -> f64 {
    if !(minutes > 0.0) || !(avg_hr > 0.0) || !(hr_rest > 0.0) || !(hr_max > 0.0) {
        return 0.0;
    }
    if hr_max <= hr_rest {
        return 0.0;
    }

    let hr_reserve = ((avg_hr - hr_rest) / (hr_max - hr_rest)).clamp(0.0, MAX_HR_RESERVE_FRACTION);
    let (a, b) = match sex {
        Sex::Male => TRIMP_MALE,
        Sex::Female => TRIMP_FEMALE,
    };
    minutes * hr_reserve * a * (b * hr_reserve).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(minute: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + minute * 60, 0).unwrap()
    }

    fn sample(minute: i64, bpm: f64) -> HeartRateSample {
        HeartRateSample {
            timestamp: ts(minute),
            bpm,
        }
    }

    #[test]
    fn test_average_estimate_male() {
        // 140 bpm, 80 kg, 35 y: (-55.0969 + 88.326 + 15.904 + 7.0595)/4.184
        // = 13.41 kcal/min; 30 min -> 402
        let kcal = kcal_from_average(Sex::Male, 140.0, 30.0, 80.0, 35.0, 1.0);
        assert!((395..=410).contains(&kcal), "got {}", kcal);
    }

    #[test]
    fn test_female_coefficients_differ() {
        let male = kcal_from_average(Sex::Male, 140.0, 30.0, 70.0, 30.0, 1.0);
        let female = kcal_from_average(Sex::Female, 140.0, 30.0, 70.0, 30.0, 1.0);
        assert_ne!(male, female);
        assert!(female < male);
    }

    #[test]
    fn test_calibration_factor_scales_linearly() {
        let base = kcal_from_average(Sex::Male, 150.0, 60.0, 75.0, 40.0, 1.0);
        let scaled = kcal_from_average(Sex::Male, 150.0, 60.0, 75.0, 40.0, 1.2);
        let ratio = f64::from(scaled) / f64::from(base);
        assert!((ratio - 1.2).abs() < 0.01);
    }

    #[test]
    fn test_missing_inputs_yield_zero() {
        assert_eq!(kcal_from_average(Sex::Male, 0.0, 30.0, 80.0, 35.0, 1.0), 0);
        assert_eq!(kcal_from_average(Sex::Male, 140.0, 0.0, 80.0, 35.0, 1.0), 0);
        assert_eq!(kcal_from_average(Sex::Male, 140.0, 30.0, 0.0, 35.0, 1.0), 0);
    }

    #[test]
    fn test_rate_floor_at_resting_hr() {
        // At 50 bpm the male regression is negative; the floor keeps a
        // small positive expenditure
        let kcal = kcal_from_average(Sex::Male, 50.0, 60.0, 60.0, 25.0, 1.0);
        assert_eq!(kcal, (MIN_KCAL_PER_MIN * 60.0).round() as u32);
    }

    #[test]
    fn test_series_basic_integration() {
        // Steady 140 bpm for 10 minutes, samples each minute
        let series: Vec<_> = (0..=10).map(|m| sample(m, 140.0)).collect();
        let est = kcal_from_series(Sex::Male, &series, 80.0, 35.0, 1.0);
        assert!((est.minutes - 10.0).abs() < 1e-9);
        assert!((est.avg_hr - 140.0).abs() < 1e-9);
        let point = kcal_from_average(Sex::Male, 140.0, 10.0, 80.0, 35.0, 1.0);
        assert!((i64::from(est.kcal) - i64::from(point)).abs() <= 1);
    }

    #[test]
    fn test_series_excludes_dropout_gap() {
        // 5 one-minute intervals, then a 20-minute hole, then 5 more
        let mut series: Vec<_> = (0..=5).map(|m| sample(m, 130.0)).collect();
        series.extend((25..=30).map(|m| sample(m, 150.0)));
        let est = kcal_from_series(Sex::Male, &series, 80.0, 35.0, 1.0);
        // wall clock is 30 minutes; only 10 were integrated
        assert!((est.minutes - 10.0).abs() < 1e-9);
        assert!(est.minutes < 30.0);
    }

    #[test]
    fn test_series_avg_hr_uses_accepted_intervals_only() {
        // The 90-bpm sample sits behind a dropout gap and is never the
        // earlier sample of an accepted pair
        let series = vec![sample(0, 140.0), sample(1, 140.0), sample(30, 90.0)];
        let est = kcal_from_series(Sex::Male, &series, 80.0, 35.0, 1.0);
        assert!((est.avg_hr - 140.0).abs() < 1e-9);
    }

    #[test]
    fn test_series_unsorted_input() {
        let series = vec![sample(2, 150.0), sample(0, 130.0), sample(1, 140.0)];
        let est = kcal_from_series(Sex::Male, &series, 80.0, 35.0, 1.0);
        assert!((est.minutes - 2.0).abs() < 1e-9);
        // earlier-sample rule: 130 and 140 are used, 150 never is
        assert!((est.avg_hr - 135.0).abs() < 1e-9);
    }

    #[test]
    fn test_series_too_short_is_zero() {
        assert_eq!(
            kcal_from_series(Sex::Male, &[], 80.0, 35.0, 1.0),
            WorkoutEstimate::default()
        );
        assert_eq!(
            kcal_from_series(Sex::Male, &[sample(0, 140.0)], 80.0, 35.0, 1.0),
            WorkoutEstimate::default()
        );
    }

    #[test]
    fn test_series_duplicate_timestamps_skipped_not_fatal() {
        let series = vec![sample(0, 140.0), sample(0, 141.0), sample(1, 142.0)];
        let est = kcal_from_series(Sex::Male, &series, 80.0, 35.0, 1.0);
        // the zero-gap pair contributes nothing; the 1-minute pair remains
        assert!((est.minutes - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_trimp_zero_cases() {
        assert_eq!(training_load(0.0, 150.0, 60.0, 190.0, Sex::Male), 0.0);
        assert_eq!(training_load(30.0, 0.0, 60.0, 190.0, Sex::Male), 0.0);
        assert_eq!(training_load(30.0, 150.0, 0.0, 190.0, Sex::Male), 0.0);
        assert_eq!(training_load(30.0, 150.0, 60.0, 0.0, Sex::Male), 0.0);
        // max <= rest is unusable
        assert_eq!(training_load(30.0, 150.0, 190.0, 190.0, Sex::Male), 0.0);
        assert_eq!(training_load(30.0, 150.0, 190.0, 60.0, Sex::Male), 0.0);
    }

    #[test]
    fn test_trimp_male_formula() {
        // HRr = (150-60)/(190-60) = 0.6923
        let hrr: f64 = (150.0 - 60.0) / (190.0 - 60.0);
        let expected = 60.0 * hrr * 0.64 * (1.92 * hrr).exp();
        let got = training_load(60.0, 150.0, 60.0, 190.0, Sex::Male);
        assert!((got - expected).abs() < 1e-9);
        assert!(got > 0.0);
    }

    #[test]
    fn test_trimp_sex_constants_differ() {
        let male = training_load(60.0, 150.0, 60.0, 190.0, Sex::Male);
        let female = training_load(60.0, 150.0, 60.0, 190.0, Sex::Female);
        assert_ne!(male, female);
    }

    #[test]
    fn test_trimp_reserve_fraction_clamped() {
        // Average above max: HRr clamps at 1.2 instead of failing
        let at_cap = training_load(30.0, 250.0, 60.0, 190.0, Sex::Male);
        let above_cap = training_load(30.0, 300.0, 60.0, 190.0, Sex::Male);
        assert!((at_cap - above_cap).abs() < 1e-9);
    }
}
