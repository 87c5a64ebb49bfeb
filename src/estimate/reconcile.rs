//! Estimate reconciliation
//!
//! Merges two independently produced estimates of the same event. Close
//! estimates average; estimates that disagree substantially do NOT average -
//! a midpoint neither source supports is worse than a flagged primary,
//! especially when underestimation is the costlier error for a calorie
//! budget. Disagreement is reported as raised uncertainty instead.

use serde::{Deserialize, Serialize};

/// Relative difference (against the larger value) up to which two
/// estimates are considered to agree
pub const AGREEMENT_THRESHOLD: f64 = 0.15;

/// Uncertainty floor and ceiling applied when estimates disagree
const DISAGREEMENT_BASE_U: f64 = 0.2;
const DISAGREEMENT_MAX_U: f64 = 0.95;

/// Optional macronutrient values carried alongside a calorie estimate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacroSet {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

/// Result of reconciling two estimates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledEstimate {
    pub kcal: u32,
    /// Raised above the inputs only when they disagreed
    pub uncertainty: f64,
    /// Whether the two inputs agreed within the threshold
    pub agreed: bool,
    pub macros: Option<MacroSet>,
}

/// Reconcile two scalar values per the agreement rule
///
/// Returns the merged value and, when the inputs disagree, the raised
/// uncertainty `0.2 + relative difference` clamped into [0.2, 0.95].
/// A zero/absent side passes the other through unchanged.
pub fn reconcile_values(a: f64, b: f64) -> (f64, Option<f64>) {
    let a = if a.is_finite() && a > 0.0 { a } else { 0.0 };
    let b = if b.is_finite() && b > 0.0 { b } else { 0.0 };

    if a == 0.0 {
        return (b, None);
    }
    if b == 0.0 {
        return (a, None);
    }

    let larger = a.max(b);
    let relative_diff = (a - b).abs() / larger;
    if relative_diff <= AGREEMENT_THRESHOLD {
        return ((a + b) / 2.0, None);
    }

    // The first estimate is primary; keep it and flag the disagreement.
    let uncertainty = (DISAGREEMENT_BASE_U + relative_diff).clamp(DISAGREEMENT_BASE_U, DISAGREEMENT_MAX_U);
    (a, Some(uncertainty))
}

/// Reconcile two calorie estimates (with optional macros) for one event
///
/// `base_uncertainty` is the uncertainty the merged estimate keeps when the
/// inputs agree (typically the primary estimate's own uncertainty).
pub fn reconcile_estimates(
    a_kcal: f64,
    b_kcal: f64,
    base_uncertainty: f64,
    a_macros: Option<MacroSet>,
    b_macros: Option<MacroSet>,
) -> ReconciledEstimate {
    let (kcal, raised) = reconcile_values(a_kcal, b_kcal);

    let macros = match (a_macros, b_macros) {
        (Some(a), Some(b)) => Some(MacroSet {
            protein_g: reconcile_values(a.protein_g, b.protein_g).0,
            carbs_g: reconcile_values(a.carbs_g, b.carbs_g).0,
            fat_g: reconcile_values(a.fat_g, b.fat_g).0,
        }),
        (a, b) => a.or(b),
    };

    ReconciledEstimate {
        kcal: kcal.round().max(0.0) as u32,
        uncertainty: raised.unwrap_or(base_uncertainty),
        agreed: raised.is_none(),
        macros,
    }
}
