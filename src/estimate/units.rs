//! Household unit lookup
//!
//! Maps count-unit words ("bowl", "碗", "slice", "片"...) to a nominal
//! portion weight used when converting counted quantities to calories.
//! Weights are grams for solids and milliliters for liquids; the two are
//! treated as interchangeable at this level of precision.

// ============================================================================
// Portion Weight Constants (grams or milliliters per unit)
// ============================================================================

/// Grams per bowl (cooked staple serving)
pub const G_PER_BOWL: f64 = 300.0;
/// Milliliters per cup
pub const ML_PER_CUP: f64 = 240.0;
/// Milliliters per glass
pub const ML_PER_GLASS: f64 = 250.0;
/// Grams per plate
pub const G_PER_PLATE: f64 = 300.0;
/// Milliliters per spoon/tablespoon
pub const ML_PER_SPOON: f64 = 15.0;
/// Milliliters per teaspoon
pub const ML_PER_TSP: f64 = 5.0;
/// Grams per slice
pub const G_PER_SLICE: f64 = 30.0;
/// Grams per chunk
pub const G_PER_CHUNK: f64 = 40.0;
/// Grams per stick (e.g. a banana, a sausage)
pub const G_PER_STICK: f64 = 80.0;

/// A resolved count unit: nominal weight plus whether the unit is a
/// container whose real volume varies a lot between households
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitPortion {
    /// Nominal grams (or milliliters) for one unit
    pub amount: f64,
    /// Containers (bowl, cup, plate...) vary more than shaped pieces
    pub volumetric: bool,
}

/// Look up the nominal portion weight for a count-unit word
///
/// Returns `None` for unit words whose weight only makes sense per food
/// ("piece", "个"); callers fall back to the food's own default portion.
pub fn unit_portion(unit: &str) -> Option<UnitPortion> {
    let lower = unit.to_lowercase();
    let trimmed = lower.trim();

    let (amount, volumetric) = match trimmed {
        "bowl" | "bowls" | "碗" => (G_PER_BOWL, true),
        "cup" | "cups" | "杯" => (ML_PER_CUP, true),
        "glass" | "glasses" => (ML_PER_GLASS, true),
        "plate" | "plates" | "盘" | "碟" => (G_PER_PLATE, true),
        "spoon" | "spoons" | "tbsp" | "tablespoon" | "tablespoons" | "勺" | "匙" => {
            (ML_PER_SPOON, false)
        }
        "tsp" | "teaspoon" | "teaspoons" => (ML_PER_TSP, false),
        "slice" | "slices" | "片" => (G_PER_SLICE, false),
        "chunk" | "chunks" | "块" => (G_PER_CHUNK, false),
        "stick" | "sticks" | "根" | "条" => (G_PER_STICK, false),
        _ => return None,
    };

    Some(UnitPortion { amount, volumetric })
}

/// All unit words the quantity scanner recognizes after a number
///
/// Includes per-food words ("piece", "个") that have no table weight; the
/// conversion step falls back to the food's default portion for those.
pub fn count_unit_words() -> &'static [&'static str] {
    &[
        // Containers
        "bowls", "bowl", "碗", "cups", "cup", "杯", "glasses", "glass", "plates", "plate", "盘", "碟",
        // Measures
        "tablespoons", "tablespoon", "tbsp", "teaspoons", "teaspoon", "tsp", "spoons", "spoon", "勺", "匙",
        // Shaped pieces
        "slices", "slice", "片", "chunks", "chunk", "块", "sticks", "stick", "根", "条",
        // Per-food counts
        "pieces", "piece", "servings", "serving", "个", "只", "颗", "份", "张",
    ]
}

/// Whether a unit word denotes a container with high real-volume variance
pub fn is_volumetric(unit: &str) -> bool {
    unit_portion(unit).map(|p| p.volumetric).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_units() {
        let bowl = unit_portion("bowl").unwrap();
        assert_eq!(bowl.amount, G_PER_BOWL);
        assert!(bowl.volumetric);

        // CJK and English words agree
        assert_eq!(unit_portion("碗"), unit_portion("bowl"));
        assert_eq!(unit_portion("杯"), unit_portion("cup"));
    }

    #[test]
    fn test_shaped_units_not_volumetric() {
        assert!(!unit_portion("slice").unwrap().volumetric);
        assert!(!unit_portion("勺").unwrap().volumetric);
        assert!(!is_volumetric("片"));
    }

    #[test]
    fn test_per_food_units_have_no_weight() {
        assert_eq!(unit_portion("piece"), None);
        assert_eq!(unit_portion("个"), None);
        assert!(!is_volumetric("个"));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(unit_portion("Bowl"), unit_portion("bowl"));
        assert_eq!(unit_portion(" CUP "), unit_portion("cup"));
    }

    #[test]
    fn test_scanner_words_cover_table() {
        // Every word with a table weight must be reachable by the scanner
        for word in ["bowl", "碗", "cup", "杯", "slice", "片", "勺"] {
            assert!(count_unit_words().contains(&word), "{} missing", word);
        }
    }
}
