//! Estimation engine
//!
//! Deterministic, pure estimators that turn free-text food descriptions and
//! heart-rate data into bounded calorie estimates with explicit uncertainty.
//! Everything in this module is synchronous, allocation-light, and reads only
//! the immutable reference tables built at startup.

pub mod food;
pub mod range;
pub mod reconcile;
pub mod table;
pub mod units;
pub mod workout;

pub use food::{estimate_food_text, FoodEstimate, MatchedFood, QuantityMatch};
pub use range::{bounded_range, range_from_bounds, CalorieRange};
pub use reconcile::{reconcile_estimates, reconcile_values, MacroSet, ReconciledEstimate};
pub use table::{Density, FoodCategory, FoodEntry, FoodTable};
pub use workout::{
    kcal_from_average, kcal_from_series, training_load, HeartRateSample, HeartRateSeries, Sex,
    WorkoutEstimate,
};
